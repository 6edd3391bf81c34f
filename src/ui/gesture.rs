//! Pointer and keyboard gestures over the timeline.
//!
//! An explicit state machine: `Idle`, `Dragging` (move / trim-left /
//! trim-right) and `Marquee`. While a gesture runs, the controller only
//! exposes provisional values computed from the anchor captured at
//! pointer-down. Releasing the pointer issues the mutation requests; the
//! timeline itself is never written here.

use crate::bridge::{CommandBridge, Request, RequestId};
use crate::config::TimelineConfig;
use crate::error::EditError;
use crate::ops::clip_ops::{ClipBounds, move_clip, trim_left, trim_right};
use crate::ops::geometry::{ms_to_pixels, pixels_to_ms};
use crate::ops::snap::SnapSettings;
use crate::types::selection::Selection;
use crate::types::timeline::Timeline;
use crate::types::view_state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    TrimLeft,
    TrimRight,
}

/// What sits under the pointer at pointer-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Clip { clip_id: String, mode: DragMode },
    Background,
}

/// A point in timeline-content coordinates (independent of scroll).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContentPos {
    pub x: f64,
    pub y: f64,
}

impl ContentPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl/Cmd/Shift: toggle on click, union on marquee.
    pub extend: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    DeleteSelection,
    SelectAll,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub clip_id: String,
    pub mode: DragMode,
    pub anchor: ClipBounds,
    anchor_x: f64,
    current_x: f64,
    targets: Vec<i64>,
    /// Extended press on an already selected clip: deselect only if the
    /// pointer comes back up without moving.
    deselect_on_release: bool,
}

impl Drag {
    fn moved(&self) -> bool {
        self.current_x != self.anchor_x
    }

    fn delta_ms(&self, zoom: f64) -> f64 {
        pixels_to_ms(self.current_x - self.anchor_x, zoom)
    }

    fn bounds(&self, settings: &GestureSettings) -> ClipBounds {
        let delta = self.delta_ms(settings.zoom);
        match self.mode {
            DragMode::Move => move_clip(&self.anchor, delta, &self.targets, &settings.snap),
            DragMode::TrimLeft => trim_left(&self.anchor, delta, settings.min_clip_ms),
            DragMode::TrimRight => trim_right(&self.anchor, delta, settings.min_clip_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub origin: ContentPos,
    pub current: ContentPos,
    pub additive: bool,
}

impl Marquee {
    pub fn width(&self) -> f64 {
        (self.current.x - self.origin.x).abs()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(Drag),
    Marquee(Marquee),
}

/// Per-call knobs derived from config and the current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    pub zoom: f64,
    pub snap: SnapSettings,
    pub min_clip_ms: i64,
    pub marquee_min_px: f64,
}

impl GestureSettings {
    pub fn new(config: &TimelineConfig, view: &ViewState) -> Self {
        let mut snap = SnapSettings::from_config(config, view.zoom());
        snap.grid = view.grid_snap;
        snap.targets = view.target_snap;
        Self {
            zoom: view.zoom(),
            snap,
            min_clip_ms: config.min_clip_ms,
            marquee_min_px: config.marquee_min_px,
        }
    }
}

/// Find the clip (and edge zone) under content x on one track.
///
/// The first clip in track order wins where clips overlap. A point within
/// `handle_px` of the left edge is a trim-left handle, then the right edge,
/// otherwise the clip body.
pub fn hit_test(
    timeline: &Timeline,
    track_id: Option<&str>,
    x: f64,
    zoom: f64,
    handle_px: f64,
) -> HitTarget {
    let Some(clips) = track_id.and_then(|id| timeline.clips_on_track(id)) else {
        return HitTarget::Background;
    };
    for clip in clips {
        let left = ms_to_pixels(clip.start_ms as f64, zoom);
        let right = ms_to_pixels(clip.end_ms() as f64, zoom);
        if x < left || x >= right {
            continue;
        }
        let mode = if x - left < handle_px {
            DragMode::TrimLeft
        } else if right - x <= handle_px {
            DragMode::TrimRight
        } else {
            DragMode::Move
        };
        return HitTarget::Clip {
            clip_id: clip.clip_id.clone(),
            mode,
        };
    }
    HitTarget::Background
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Start a gesture. Clicking a clip also applies click selection:
    /// plain replaces, extended adds. Extended on a selected clip removes it
    /// at release, and only when the pointer never moved.
    pub fn pointer_down(
        &mut self,
        pos: ContentPos,
        target: HitTarget,
        modifiers: Modifiers,
        timeline: &Timeline,
        selection: &mut Selection,
    ) {
        if !self.is_idle() {
            log::debug!("pointer down during an active gesture; dropping it");
            self.cancel();
        }
        match target {
            HitTarget::Clip { clip_id, mode } => {
                let Some(clip) = timeline.clip(&clip_id) else {
                    log::warn!("pointer down on clip {clip_id} missing from timeline");
                    return;
                };
                let deselect_on_release = modifiers.extend && selection.contains(&clip_id);
                if !modifiers.extend {
                    selection.select_clip(&clip_id);
                } else if !deselect_on_release {
                    selection.add_clips([clip_id.as_str()]);
                }
                log::debug!("drag {:?} start on {}", mode, clip_id);
                self.state = GestureState::Dragging(Drag {
                    targets: timeline.snap_targets(&clip_id),
                    anchor: ClipBounds::of(clip),
                    clip_id,
                    mode,
                    anchor_x: pos.x,
                    current_x: pos.x,
                    deselect_on_release,
                });
            }
            HitTarget::Background => {
                self.state = GestureState::Marquee(Marquee {
                    origin: pos,
                    current: pos,
                    additive: modifiers.extend,
                });
            }
        }
    }

    pub fn pointer_move(&mut self, pos: ContentPos) {
        match &mut self.state {
            GestureState::Dragging(drag) => drag.current_x = pos.x,
            GestureState::Marquee(marquee) => marquee.current = pos,
            GestureState::Idle => {}
        }
    }

    /// Provisional bounds of the clip being dragged, for live feedback.
    pub fn provisional(&self, settings: &GestureSettings) -> Option<(&str, ClipBounds)> {
        match &self.state {
            GestureState::Dragging(drag) => Some((drag.clip_id.as_str(), drag.bounds(settings))),
            _ => None,
        }
    }

    pub fn marquee(&self) -> Option<&Marquee> {
        match &self.state {
            GestureState::Marquee(marquee) => Some(marquee),
            _ => None,
        }
    }

    /// Finish the gesture. Drags issue their mutation requests (none when
    /// nothing changed); marquees update the selection.
    pub fn pointer_up(
        &mut self,
        pos: ContentPos,
        settings: &GestureSettings,
        timeline: &Timeline,
        selection: &mut Selection,
        bridge: &mut CommandBridge,
    ) -> Result<Vec<RequestId>, EditError> {
        self.pointer_move(pos);
        match std::mem::take(&mut self.state) {
            GestureState::Idle => Ok(Vec::new()),
            GestureState::Dragging(drag) => {
                let sent = Self::commit_drag(&drag, settings, timeline, bridge)?;
                if drag.deselect_on_release && !drag.moved() {
                    selection.toggle_clip(&drag.clip_id);
                }
                Ok(sent)
            }
            GestureState::Marquee(marquee) => {
                Self::commit_marquee(&marquee, settings, timeline, selection);
                Ok(Vec::new())
            }
        }
    }

    /// Abandon any gesture in flight without issuing requests.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            log::debug!("gesture canceled");
        }
        self.state = GestureState::Idle;
    }

    fn commit_drag(
        drag: &Drag,
        settings: &GestureSettings,
        timeline: &Timeline,
        bridge: &mut CommandBridge,
    ) -> Result<Vec<RequestId>, EditError> {
        if timeline.clip(&drag.clip_id).is_none() {
            log::warn!("clip {} vanished during drag", drag.clip_id);
            return Err(EditError::stale_clip(&drag.clip_id));
        }
        let bounds = drag.bounds(settings);
        let anchor = drag.anchor;
        let clip_id = drag.clip_id.clone();
        let mut sent = Vec::new();
        match drag.mode {
            DragMode::Move => {
                if bounds.start_ms != anchor.start_ms {
                    sent.push(bridge.send(Request::MoveClip {
                        clip_id,
                        start_ms: bounds.start_ms,
                    }));
                }
            }
            DragMode::TrimLeft => {
                if bounds.in_ms != anchor.in_ms {
                    sent.push(bridge.send(Request::TrimClip {
                        clip_id: clip_id.clone(),
                        in_ms: Some(bounds.in_ms),
                        out_ms: None,
                    }));
                }
                if bounds.start_ms != anchor.start_ms {
                    sent.push(bridge.send(Request::MoveClip {
                        clip_id,
                        start_ms: bounds.start_ms,
                    }));
                }
            }
            DragMode::TrimRight => {
                if bounds.out_ms != anchor.out_ms {
                    sent.push(bridge.send(Request::TrimClip {
                        clip_id,
                        in_ms: None,
                        out_ms: Some(bounds.out_ms),
                    }));
                }
            }
        }
        if sent.is_empty() {
            log::debug!("drag on {} ended with no change", drag.clip_id);
        }
        Ok(sent)
    }

    fn commit_marquee(
        marquee: &Marquee,
        settings: &GestureSettings,
        timeline: &Timeline,
        selection: &mut Selection,
    ) {
        if marquee.width() < settings.marquee_min_px {
            return;
        }
        let lo = pixels_to_ms(marquee.origin.x.min(marquee.current.x), settings.zoom);
        let hi = pixels_to_ms(marquee.origin.x.max(marquee.current.x), settings.zoom);
        if marquee.additive {
            selection.add_range(timeline, lo, hi);
        } else {
            selection.select_range(timeline, lo, hi);
        }
        log::debug!("marquee [{lo:.0}, {hi:.0}) -> {} selected", selection.len());
    }

    /// Keyboard shortcuts. Delete sends one removal per selected clip and
    /// clears the selection straight away.
    pub fn key(
        &mut self,
        command: KeyCommand,
        timeline: &Timeline,
        selection: &mut Selection,
        bridge: &mut CommandBridge,
    ) -> Vec<RequestId> {
        match command {
            KeyCommand::DeleteSelection => {
                let sent = selection
                    .clip_ids()
                    .into_iter()
                    .filter(|id| timeline.clip(id).is_some())
                    .map(|clip_id| bridge.send(Request::RemoveClip { clip_id }))
                    .collect();
                selection.clear_selection();
                sent
            }
            KeyCommand::SelectAll => {
                selection.select_all(timeline);
                Vec::new()
            }
            KeyCommand::Escape => {
                selection.clear_range();
                Vec::new()
            }
        }
    }

    /// A click on the ruler at content x feeds the range picker.
    pub fn ruler_click(&self, x: f64, zoom: f64, selection: &mut Selection) {
        let t_ms = pixels_to_ms(x, zoom).max(0.0).round() as i64;
        selection.ruler_click(t_ms);
    }
}
