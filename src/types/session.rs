use crate::bridge::{BackendEvent, CommandBridge, Envelope, Request, RequestId};
use crate::config::TimelineConfig;
use crate::error::EditError;
use crate::ops::clip_ops::ClipBounds;
use crate::renderer::preview_sync::{PreviewSurface, PreviewSync};
use crate::types::project::ProjectSnapshot;
use crate::types::task::{TaskBoard, TaskKind};
use crate::types::timeline::Timeline;
use crate::types::view_state::ViewState;
use crate::ui::gesture::{
    ContentPos, GestureController, GestureSettings, HitTarget, KeyCommand, Modifiers, hit_test,
};
use std::time::Instant;

/// EditorSession groups the authoritative ProjectSnapshot with the transient
/// editor state around it (view, gesture, preview, pending requests).
///
/// Only `apply_event` ever replaces the snapshot. Everything else reads it
/// and turns user intent into requests on the bridge.
#[derive(Debug)]
pub struct EditorSession {
    snapshot: ProjectSnapshot,
    config: TimelineConfig,
    pub view: ViewState,
    gesture: GestureController,
    preview: PreviewSync,
    bridge: CommandBridge,
    tasks: TaskBoard,
    notices: Vec<EditError>,
}

impl EditorSession {
    pub fn new(snapshot: ProjectSnapshot, config: TimelineConfig) -> Self {
        Self {
            view: ViewState::new(&config),
            preview: PreviewSync::new(&config),
            snapshot,
            config,
            gesture: GestureController::new(),
            bridge: CommandBridge::new(),
            tasks: TaskBoard::new(),
            notices: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    pub fn timeline(&self) -> &Timeline {
        &self.snapshot.timeline
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn tasks(&self) -> &TaskBoard {
        &self.tasks
    }

    pub fn gesture(&self) -> &GestureController {
        &self.gesture
    }

    pub fn preview(&self) -> &PreviewSync {
        &self.preview
    }

    pub fn in_flight_count(&self) -> usize {
        self.bridge.in_flight_count()
    }

    /// Requests for the host to ship to the backend.
    pub fn drain_requests(&mut self) -> Vec<Envelope> {
        self.bridge.drain()
    }

    /// Notices raised since the last call, oldest first.
    pub fn drain_notices(&mut self) -> Vec<EditError> {
        std::mem::take(&mut self.notices)
    }

    fn reject(&mut self, err: EditError) -> EditError {
        log::warn!("{err}");
        self.notices.push(err.clone());
        err
    }

    // --- Backend events ---

    pub fn apply_event(&mut self, event: BackendEvent, surface: &mut dyn PreviewSurface) {
        match event {
            BackendEvent::ProjectUpdated { snapshot } => {
                self.snapshot = snapshot;
                let pruned = self.view.selection.prune(&self.snapshot.timeline);
                log::info!(
                    "snapshot applied: {} clips, {} ms, {} selection ids pruned",
                    self.snapshot.timeline.clip_count(),
                    self.snapshot.timeline.duration_ms(),
                    pruned
                );
                let inconsistent = self.snapshot.timeline.inconsistent_clip_ids();
                if !inconsistent.is_empty() {
                    log::warn!("snapshot has inconsistent clips: {inconsistent:?}");
                }
                self.preview
                    .resolve(&self.view.playback, &self.snapshot, surface);
            }
            BackendEvent::TaskUpdated { task } => {
                log::debug!("task {} is {:?}", task.task_id, task.state);
                self.tasks.merge(task);
            }
            BackendEvent::RequestAccepted {
                request_id,
                created,
            } => {
                if self.bridge.settle(request_id).is_none() {
                    log::debug!("ack for unknown request {request_id}");
                }
                if let Some(created) = created {
                    log::debug!("request {request_id} created {created:?}");
                }
            }
            BackendEvent::RequestRejected {
                request_id,
                code,
                message,
            } => {
                self.bridge.settle(request_id);
                self.reject(EditError::BridgeFailure {
                    request_id,
                    code,
                    message,
                });
            }
        }
    }

    // --- Gestures ---

    fn gesture_settings(&self) -> GestureSettings {
        GestureSettings::new(&self.config, &self.view)
    }

    /// What is under content x on a track at the current zoom.
    pub fn hit_test(&self, track_id: Option<&str>, x: f64) -> HitTarget {
        hit_test(
            &self.snapshot.timeline,
            track_id,
            x,
            self.view.zoom(),
            self.config.trim_handle_px,
        )
    }

    pub fn pointer_down(&mut self, pos: ContentPos, target: HitTarget, modifiers: Modifiers) {
        self.gesture.pointer_down(
            pos,
            target,
            modifiers,
            &self.snapshot.timeline,
            &mut self.view.selection,
        );
    }

    pub fn pointer_move(&mut self, pos: ContentPos) {
        self.gesture.pointer_move(pos);
    }

    pub fn pointer_up(&mut self, pos: ContentPos) -> Vec<RequestId> {
        let settings = self.gesture_settings();
        let result = self.gesture.pointer_up(
            pos,
            &settings,
            &self.snapshot.timeline,
            &mut self.view.selection,
            &mut self.bridge,
        );
        result.unwrap_or_else(|err| {
            self.reject(err);
            Vec::new()
        })
    }

    /// Drop an in-flight gesture, e.g. when the timeline view goes away.
    pub fn cancel_gesture(&mut self) {
        self.gesture.cancel();
    }

    /// Bounds to draw for the clip being dragged.
    pub fn provisional(&self) -> Option<(&str, ClipBounds)> {
        self.gesture.provisional(&self.gesture_settings())
    }

    pub fn key(&mut self, command: KeyCommand) -> Vec<RequestId> {
        self.gesture.key(
            command,
            &self.snapshot.timeline,
            &mut self.view.selection,
            &mut self.bridge,
        )
    }

    pub fn ruler_click(&mut self, x: f64) {
        self.gesture
            .ruler_click(x, self.view.zoom(), &mut self.view.selection);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in(&self.config.zoom_levels);
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out(&self.config.zoom_levels);
    }

    // --- Playback ---

    pub fn toggle_playback(&mut self, now: Instant, surface: &mut dyn PreviewSurface) {
        self.preview.toggle(&mut self.view.playback, now, surface);
    }

    pub fn tick(&mut self, now: Instant, surface: &mut dyn PreviewSurface) {
        self.preview
            .tick(now, &mut self.view.playback, &self.snapshot, surface);
    }

    pub fn seek(&mut self, t_ms: f64, surface: &mut dyn PreviewSurface) {
        self.preview
            .seek(t_ms, &mut self.view.playback, &self.snapshot, surface);
    }

    /// Queue a frame capture at the playhead. `None` over a gap.
    pub fn capture_frame(&mut self) -> Option<RequestId> {
        let request = self
            .preview
            .capture_request(&self.view.playback, &self.snapshot)?;
        Some(self.bridge.send(request))
    }

    // --- Direct edits ---

    pub fn add_clip(
        &mut self,
        track_id: &str,
        asset_id: &str,
        start_ms: i64,
    ) -> Result<RequestId, EditError> {
        if self.snapshot.timeline.track(track_id).is_none() {
            return Err(self.reject(EditError::stale_track(track_id)));
        }
        Ok(self.bridge.send(Request::AddClip {
            track_id: track_id.to_string(),
            asset_id: asset_id.to_string(),
            start_ms: start_ms.max(0),
        }))
    }

    /// Reorder a track. The new order must name exactly the track's clips.
    pub fn reorder_clips(
        &mut self,
        track_id: &str,
        clip_ids: Vec<String>,
    ) -> Result<RequestId, EditError> {
        let Some(track) = self.snapshot.timeline.track(track_id) else {
            return Err(self.reject(EditError::stale_track(track_id)));
        };
        let mut current = track.clip_ids.clone();
        let mut proposed = clip_ids.clone();
        current.sort_unstable();
        proposed.sort_unstable();
        if current != proposed {
            return Err(self.reject(EditError::OrderMismatch {
                track_id: track_id.to_string(),
            }));
        }
        Ok(self.bridge.send(Request::ReorderClips {
            track_id: track_id.to_string(),
            clip_ids,
        }))
    }

    pub fn add_marker_at_playhead(
        &mut self,
        label: Option<String>,
        prompt: Option<String>,
    ) -> RequestId {
        let t_ms = self.view.playback.playhead_ms.max(0.0).round() as i64;
        self.bridge.send(Request::AddMarker { t_ms, label, prompt })
    }

    pub fn update_marker(
        &mut self,
        marker_id: &str,
        label: Option<String>,
        prompt: Option<String>,
        t_ms: Option<i64>,
    ) -> Result<RequestId, EditError> {
        if self.snapshot.timeline.marker(marker_id).is_none() {
            return Err(self.reject(EditError::stale_marker(marker_id)));
        }
        Ok(self.bridge.send(Request::UpdateMarker {
            marker_id: marker_id.to_string(),
            label,
            prompt,
            t_ms: t_ms.map(|t| t.max(0)),
        }))
    }

    pub fn remove_marker(&mut self, marker_id: &str) -> Result<RequestId, EditError> {
        if self.snapshot.timeline.marker(marker_id).is_none() {
            return Err(self.reject(EditError::stale_marker(marker_id)));
        }
        Ok(self.bridge.send(Request::RemoveMarker {
            marker_id: marker_id.to_string(),
        }))
    }

    /// Ask for a video generation. Only one may be queued or running.
    ///
    /// The result is placed over the committed ruler range (`startMs` and
    /// `durationMs`), or at the playhead when no range is committed.
    pub fn request_generation(
        &mut self,
        mut input: serde_json::Map<String, serde_json::Value>,
        deps: Vec<String>,
    ) -> Result<RequestId, EditError> {
        if self.tasks.has_active(TaskKind::GenVideo) {
            return Err(self.reject(EditError::TaskBusy {
                kind: TaskKind::GenVideo,
            }));
        }
        let range = self
            .view
            .selection
            .committed_range()
            .filter(|range| range.hi() > range.lo());
        match range {
            Some(range) => {
                input.insert("startMs".to_string(), range.lo().into());
                input.insert("durationMs".to_string(), (range.hi() - range.lo()).into());
            }
            None => {
                let playhead = self.view.playback.playhead_ms.max(0.0).round() as i64;
                input.insert("startMs".to_string(), playhead.into());
            }
        }
        Ok(self.bridge.send(Request::EnqueueTask {
            kind: TaskKind::GenVideo,
            input: input.into(),
            deps,
            dedupe_key: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::error::TargetKind;
    use crate::renderer::preview_sync::tests::{RecordingSurface, SurfaceCall, sample_snapshot};
    use crate::types::marker::Marker;
    use crate::types::media::{Asset, AssetKind, Clip};
    use crate::types::task::{Task, TaskState};
    use crate::types::track::{Track, TrackKind};
    use crate::ui::gesture::DragMode;
    use serde_json::json;

    fn prompt(text: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut input = serde_json::Map::new();
        input.insert("prompt".to_string(), json!(text));
        input
    }

    struct Harness {
        session: EditorSession,
        backend: InMemoryBackend,
        surface: RecordingSurface,
    }

    impl Harness {
        fn new(snapshot: ProjectSnapshot) -> Self {
            Self {
                session: EditorSession::new(snapshot.clone(), TimelineConfig::default()),
                backend: InMemoryBackend::new(snapshot),
                surface: RecordingSurface::default(),
            }
        }

        /// Ship every queued request and feed the replies back in.
        fn round_trip(&mut self) {
            for envelope in self.session.drain_requests() {
                for event in self.backend.handle(envelope) {
                    self.session.apply_event(event, &mut self.surface);
                }
            }
        }
    }

    fn one_clip_project() -> ProjectSnapshot {
        let timeline = Timeline::new()
            .with_track(Track::new("trk_v", TrackKind::Video, "Draft Video"))
            .with_clip(Clip::new("c1", "trk_v", "ast_1", 0, 0, 5000))
            .with_marker(Marker::new("m1", 7000));
        ProjectSnapshot::new("prj_1", "Snap", timeline).with_asset(
            Asset::new("ast_1", AssetKind::Video, "assets/a.mp4").with_duration_ms(5000),
        )
    }

    fn drag_move(session: &mut EditorSession, from_x: f64, to_x: f64) -> Vec<RequestId> {
        let target = session.hit_test(Some("trk_v"), from_x);
        assert!(matches!(
            target,
            HitTarget::Clip {
                mode: DragMode::Move,
                ..
            }
        ));
        session.pointer_down(ContentPos::new(from_x, 10.0), target, Modifiers::default());
        session.pointer_move(ContentPos::new(to_x, 10.0));
        session.pointer_up(ContentPos::new(to_x, 10.0))
    }

    #[test]
    fn test_drag_snaps_to_marker_end_to_end() {
        let mut h = Harness::new(one_clip_project());
        // Pointer delta of 695px at zoom 100 is a provisional start of 6950 ms
        let sent = drag_move(&mut h.session, 100.0, 795.0);
        assert_eq!(sent.len(), 1);
        assert_eq!(h.session.in_flight_count(), 1);

        h.round_trip();
        assert_eq!(h.session.timeline().clip("c1").unwrap().start_ms, 7000);
        assert_eq!(h.session.in_flight_count(), 0);
        assert!(h.session.drain_notices().is_empty());
    }

    #[test]
    fn test_provisional_does_not_touch_snapshot() {
        let mut h = Harness::new(one_clip_project());
        let target = h.session.hit_test(Some("trk_v"), 100.0);
        h.session
            .pointer_down(ContentPos::new(100.0, 0.0), target, Modifiers::default());
        h.session.pointer_move(ContentPos::new(300.0, 0.0));
        let (_, bounds) = h.session.provisional().unwrap();
        assert_eq!(bounds.start_ms, 2000);
        assert_eq!(h.session.timeline().clip("c1").unwrap().start_ms, 0);

        h.session.cancel_gesture();
        assert!(h.session.provisional().is_none());
        assert!(h.session.drain_requests().is_empty());
    }

    #[test]
    fn test_clip_removed_mid_drag_becomes_notice() {
        let mut h = Harness::new(one_clip_project());
        let target = h.session.hit_test(Some("trk_v"), 100.0);
        h.session
            .pointer_down(ContentPos::new(100.0, 0.0), target, Modifiers::default());
        h.session.pointer_move(ContentPos::new(300.0, 0.0));

        // Someone else deletes c1 while the drag is in progress
        let events = h.backend.handle(Envelope {
            request_id: RequestId(900),
            request: Request::RemoveClip {
                clip_id: "c1".to_string(),
            },
        });
        for event in events {
            h.session.apply_event(event, &mut h.surface);
        }
        assert!(h.session.view.selection.is_empty());

        let sent = h.session.pointer_up(ContentPos::new(300.0, 0.0));
        assert!(sent.is_empty());
        assert_eq!(
            h.session.drain_notices(),
            vec![EditError::StaleTarget {
                kind: TargetKind::Clip,
                id: "c1".to_string()
            }]
        );
    }

    #[test]
    fn test_rejection_becomes_notice() {
        let mut h = Harness::new(one_clip_project());
        h.session.add_clip("trk_v", "ast_missing", 0).unwrap();
        h.round_trip();
        let notices = h.session.drain_notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(&notices[0], EditError::BridgeFailure { code, .. } if code == "not_found"));
        assert_eq!(h.session.in_flight_count(), 0);
        assert_eq!(h.session.timeline().clip_count(), 1);
    }

    #[test]
    fn test_delete_selection_round_trip() {
        let mut h = Harness::new(sample_snapshot());
        h.session.key(KeyCommand::SelectAll);
        assert_eq!(h.session.view.selection.len(), 5);
        let sent = h.session.key(KeyCommand::DeleteSelection);
        assert_eq!(sent.len(), 5);
        assert!(h.session.view.selection.is_empty());

        h.round_trip();
        assert_eq!(h.session.timeline().clip_count(), 0);
        assert_eq!(h.session.timeline().duration_ms(), 0);
    }

    #[test]
    fn test_snapshot_replacement_reresolves_preview() {
        let mut h = Harness::new(sample_snapshot());
        h.session.seek(1000.0, &mut h.surface);
        assert_eq!(h.session.preview().active_clip_id(), Some("v1"));
        h.surface.take();

        h.session.view.selection.select_clip("v1");
        h.session.key(KeyCommand::DeleteSelection);
        h.round_trip();
        assert_eq!(h.session.preview().active_clip_id(), None);
        assert_eq!(h.surface.take(), vec![SurfaceCall::Blank]);
    }

    #[test]
    fn test_stale_marker_and_track_edits() {
        let mut h = Harness::new(one_clip_project());
        assert_eq!(
            h.session.remove_marker("m404"),
            Err(EditError::stale_marker("m404"))
        );
        assert_eq!(
            h.session.add_clip("trk_gone", "ast_1", 0),
            Err(EditError::stale_track("trk_gone"))
        );
        assert!(matches!(
            h.session.reorder_clips("trk_v", vec!["c1".to_string(), "c2".to_string()]),
            Err(EditError::OrderMismatch { .. })
        ));
        assert_eq!(h.session.drain_notices().len(), 3);
        assert!(h.session.drain_requests().is_empty());
    }

    #[test]
    fn test_marker_at_playhead_round_trip() {
        let mut h = Harness::new(one_clip_project());
        h.session.seek(2500.4, &mut h.surface);
        h.session
            .add_marker_at_playhead(Some("Hook".to_string()), None);
        h.round_trip();
        let added = h
            .session
            .timeline()
            .markers()
            .iter()
            .find(|m| m.label == "Hook")
            .unwrap()
            .clone();
        assert_eq!(added.t_ms, 2500);

        h.session
            .update_marker(&added.marker_id, None, Some("pan left".to_string()), None)
            .unwrap();
        h.round_trip();
        let updated = h.session.timeline().marker(&added.marker_id).unwrap();
        assert_eq!(updated.prompt_text, "pan left");
    }

    #[test]
    fn test_generation_gated_while_active() {
        let mut h = Harness::new(one_clip_project());
        h.session
            .request_generation(prompt("sunrise"), Vec::new())
            .unwrap();
        h.round_trip();
        assert!(h.session.tasks().has_active(TaskKind::GenVideo));

        let err = h
            .session
            .request_generation(prompt("again"), Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            EditError::TaskBusy {
                kind: TaskKind::GenVideo
            }
        );

        let task_id = h.session.tasks().tasks()[0].task_id.clone();
        let mut done = Task::queued(task_id, TaskKind::GenVideo);
        done.state = TaskState::Succeeded;
        h.session
            .apply_event(BackendEvent::TaskUpdated { task: done }, &mut h.surface);
        assert!(
            h.session
                .request_generation(prompt("again"), Vec::new())
                .is_ok()
        );
    }

    #[test]
    fn test_generation_placed_over_ruler_range() {
        let mut h = Harness::new(one_clip_project());
        // End before start: the range is normalized
        h.session.ruler_click(500.0);
        h.session.ruler_click(200.0);
        h.session.request_generation(prompt("x"), Vec::new()).unwrap();

        let requests = h.session.drain_requests();
        let Request::EnqueueTask { kind, input, .. } = &requests[0].request else {
            panic!("expected an enqueue, got {:?}", requests[0].request);
        };
        assert_eq!(*kind, TaskKind::GenVideo);
        assert_eq!(*input, json!({"prompt": "x", "startMs": 2000, "durationMs": 3000}));
    }

    #[test]
    fn test_generation_without_range_starts_at_playhead() {
        let mut h = Harness::new(one_clip_project());
        h.session.seek(1234.4, &mut h.surface);
        h.session.request_generation(prompt("x"), Vec::new()).unwrap();

        let requests = h.session.drain_requests();
        let Request::EnqueueTask { input, .. } = &requests[0].request else {
            panic!("expected an enqueue, got {:?}", requests[0].request);
        };
        assert_eq!(*input, json!({"prompt": "x", "startMs": 1234}));
    }

    #[test]
    fn test_capture_frame_only_over_a_clip() {
        let mut h = Harness::new(sample_snapshot());
        h.session.seek(9000.0, &mut h.surface);
        assert!(h.session.capture_frame().is_none());

        h.session.seek(10_500.0, &mut h.surface);
        assert!(h.session.capture_frame().is_some());
        let requests = h.session.drain_requests();
        assert!(matches!(
            &requests[0].request,
            Request::EnqueueTask { kind: TaskKind::CaptureFrame, dedupe_key: Some(key), .. }
                if key == "capture:ast_v3:500"
        ));
    }
}
