//! Keeps a preview surface in step with the playhead.
//!
//! Each tick advances the playhead by the scheduler's elapsed time, stops at
//! the end of the timeline, then resolves which clip on the designated video
//! track covers the playhead and tells the surface what to show.

use crate::bridge::Request;
use crate::config::TimelineConfig;
use crate::renderer::scheduler::FrameScheduler;
use crate::types::media::Clip;
use crate::types::playback_state::PlaybackState;
use crate::types::project::ProjectSnapshot;
use crate::types::task::TaskKind;
use crate::types::track::TrackKind;
use serde_json::json;
use std::time::{Duration, Instant};

/// What the surface should load when a new clip becomes active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub clip_id: String,
    pub asset_id: String,
    pub path: String,
    pub is_proxy: bool,
}

/// The media element the synchronizer drives. Implemented by the egui
/// preview panel and by recording fakes in tests.
pub trait PreviewSurface {
    /// Black out; no clip covers the playhead.
    fn show_blank(&mut self);
    fn load_source(&mut self, source: &MediaSource);
    /// The surface's own playback clock, in asset-local seconds.
    fn position_secs(&self) -> f64;
    fn seek(&mut self, secs: f64);
    fn set_playing(&mut self, playing: bool);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum SurfaceState {
    #[default]
    Unknown,
    Blank,
    Showing(String),
}

#[derive(Debug)]
pub struct PreviewSync {
    scheduler: FrameScheduler,
    surface_state: SurfaceState,
    drift_tolerance_secs: f64,
    prefer_proxy: bool,
}

impl PreviewSync {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            scheduler: FrameScheduler::new(),
            surface_state: SurfaceState::Unknown,
            drift_tolerance_secs: config.drift_tolerance_secs,
            prefer_proxy: config.prefer_proxy,
        }
    }

    /// Clip currently loaded on the surface, if any.
    pub fn active_clip_id(&self) -> Option<&str> {
        match &self.surface_state {
            SurfaceState::Showing(clip_id) => Some(clip_id),
            _ => None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn play(
        &mut self,
        playback: &mut PlaybackState,
        now: Instant,
        surface: &mut dyn PreviewSurface,
    ) {
        if playback.is_playing {
            return;
        }
        playback.is_playing = true;
        self.scheduler.start(now);
        surface.set_playing(true);
    }

    pub fn pause(&mut self, playback: &mut PlaybackState, surface: &mut dyn PreviewSurface) {
        if !playback.is_playing {
            return;
        }
        playback.is_playing = false;
        self.scheduler.stop();
        surface.set_playing(false);
    }

    pub fn toggle(
        &mut self,
        playback: &mut PlaybackState,
        now: Instant,
        surface: &mut dyn PreviewSurface,
    ) {
        if playback.is_playing {
            self.pause(playback, surface);
        } else {
            self.play(playback, now, surface);
        }
    }

    /// Poll the scheduler and advance by whatever time has passed.
    pub fn tick(
        &mut self,
        now: Instant,
        playback: &mut PlaybackState,
        snapshot: &ProjectSnapshot,
        surface: &mut dyn PreviewSurface,
    ) {
        if !playback.is_playing {
            return;
        }
        if let Some(elapsed) = self.scheduler.poll(now) {
            self.advance(elapsed, playback, snapshot, surface);
        }
    }

    /// Advance the playhead by `elapsed`, stopping at the end of the timeline.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        playback: &mut PlaybackState,
        snapshot: &ProjectSnapshot,
        surface: &mut dyn PreviewSurface,
    ) {
        if !playback.is_playing {
            return;
        }
        let duration_ms = snapshot.timeline.duration_ms() as f64;
        playback.playhead_ms += elapsed.as_micros() as f64 / 1000.0;
        if playback.playhead_ms >= duration_ms {
            playback.playhead_ms = duration_ms;
            log::debug!("playback reached end at {duration_ms} ms");
            self.pause(playback, surface);
        }
        self.resolve(playback, snapshot, surface);
    }

    /// Jump the playhead, clamped to the timeline, and update the surface.
    pub fn seek(
        &mut self,
        t_ms: f64,
        playback: &mut PlaybackState,
        snapshot: &ProjectSnapshot,
        surface: &mut dyn PreviewSurface,
    ) {
        let duration_ms = snapshot.timeline.duration_ms() as f64;
        playback.playhead_ms = t_ms.clamp(0.0, duration_ms);
        self.resolve(playback, snapshot, surface);
    }

    /// Point the surface at whatever covers the playhead right now.
    pub fn resolve(
        &mut self,
        playback: &PlaybackState,
        snapshot: &ProjectSnapshot,
        surface: &mut dyn PreviewSurface,
    ) {
        let Some(clip) = active_clip(snapshot, playback.playhead_ms) else {
            self.blank(surface);
            return;
        };
        let target_secs = clip.local_secs_at(playback.playhead_ms);

        if self.active_clip_id() == Some(clip.clip_id.as_str()) {
            let drift = (surface.position_secs() - target_secs).abs();
            if drift > self.drift_tolerance_secs {
                surface.seek(target_secs);
            }
            return;
        }

        let Some(source) = self.source_for(clip, snapshot) else {
            if self.surface_state != SurfaceState::Blank {
                log::warn!("clip {} references unknown asset {}", clip.clip_id, clip.asset_id);
            }
            self.blank(surface);
            return;
        };
        log::debug!("preview switches to {} ({})", clip.clip_id, source.path);
        surface.load_source(&source);
        surface.seek(target_secs);
        surface.set_playing(playback.is_playing);
        self.surface_state = SurfaceState::Showing(clip.clip_id.clone());
    }

    /// One-shot frame capture at the playhead, handed to the task system.
    /// `None` when nothing is on screen.
    pub fn capture_request(
        &self,
        playback: &PlaybackState,
        snapshot: &ProjectSnapshot,
    ) -> Option<Request> {
        let clip = active_clip(snapshot, playback.playhead_ms)?;
        let t_ms = (clip.local_secs_at(playback.playhead_ms) * 1000.0).round() as i64;
        Some(Request::EnqueueTask {
            kind: TaskKind::CaptureFrame,
            input: json!({
                "assetId": clip.asset_id,
                "tMs": t_ms,
                "useProxy": true,
            }),
            deps: Vec::new(),
            dedupe_key: Some(format!("capture:{}:{}", clip.asset_id, t_ms)),
        })
    }

    fn blank(&mut self, surface: &mut dyn PreviewSurface) {
        if self.surface_state != SurfaceState::Blank {
            surface.show_blank();
            self.surface_state = SurfaceState::Blank;
        }
    }

    fn source_for(&self, clip: &Clip, snapshot: &ProjectSnapshot) -> Option<MediaSource> {
        let asset = snapshot.asset(&clip.asset_id)?;
        let (path, is_proxy) = asset.preview_path(self.prefer_proxy);
        Some(MediaSource {
            clip_id: clip.clip_id.clone(),
            asset_id: asset.asset_id.clone(),
            path: path.to_string(),
            is_proxy,
        })
    }
}

/// First clip on the first video track covering `t_ms`.
fn active_clip(snapshot: &ProjectSnapshot, t_ms: f64) -> Option<&Clip> {
    let timeline = &snapshot.timeline;
    let track = timeline.first_track_of(TrackKind::Video)?;
    timeline.active_clip_on_track(&track.track_id, t_ms)
}
