//! A backend that keeps the project in memory.
//!
//! Used by the demo binary and the end-to-end tests. It owns the truth: every
//! request is applied to its own snapshot, and accepted edits are answered
//! with a fresh `ProjectUpdated` followed by `RequestAccepted`.

use crate::bridge::{BackendEvent, Created, Envelope, Request};
use crate::types::marker::Marker;
use crate::types::media::{Asset, AssetKind, Clip};
use crate::types::project::ProjectSnapshot;
use crate::types::task::{Task, TaskKind, TaskProgress, TaskState};
use crate::types::timeline::Timeline;
use crate::types::track::{Track, TrackKind};
use thiserror::Error;
use uuid::Uuid;

/// Clip length for assets with no probed duration (stills).
const DEFAULT_STILL_MS: i64 = 5000;

#[derive(Debug, Error, PartialEq)]
pub enum BackendError {
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },

    #[error("invalid trim for clip {clip_id}: in {in_ms} / out {out_ms}")]
    InvalidTrim {
        clip_id: String,
        in_ms: i64,
        out_ms: i64,
    },

    #[error("clip order for track {0} does not match its clips")]
    OrderMismatch(String),
}

impl BackendError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidTrim { .. } => "invalid_range",
            Self::OrderMismatch(_) => "order_mismatch",
        }
    }
}

enum Applied {
    Project(Option<Created>),
    Task(Task),
}

fn mint(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn not_found(what: &'static str, id: &str) -> BackendError {
    BackendError::NotFound {
        what,
        id: id.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    snapshot: ProjectSnapshot,
    tasks: Vec<(Task, Option<String>)>,
}

impl InMemoryBackend {
    pub fn new(snapshot: ProjectSnapshot) -> Self {
        Self {
            snapshot,
            tasks: Vec::new(),
        }
    }

    /// A draft project with the three default lanes and a couple of clips.
    pub fn demo() -> Self {
        let timeline = Timeline::new()
            .with_track(Track::new("trk_video", TrackKind::Video, "Draft Video"))
            .with_track(Track::new("trk_audio", TrackKind::Audio, "Draft Audio"))
            .with_track(Track::new("trk_text", TrackKind::Text, "Notes / Prompts"))
            .with_clip(Clip::new("clip_intro", "trk_video", "ast_intro", 0, 0, 4000))
            .with_clip(Clip::new("clip_city", "trk_video", "ast_city", 4000, 1000, 7000))
            .with_clip(Clip::new("clip_music", "trk_audio", "ast_music", 0, 0, 9000))
            .with_marker(Marker {
                label: "Beat drop".to_string(),
                ..Marker::new("mrk_drop", 6000)
            });
        let snapshot = ProjectSnapshot::new("prj_demo", "Untitled Project", timeline)
            .with_asset(
                Asset::new("ast_intro", AssetKind::Video, "workspace/assets/video/intro.mp4")
                    .with_proxy("workspace/cache/proxy/intro.mp4")
                    .with_duration_ms(4000),
            )
            .with_asset(
                Asset::new("ast_city", AssetKind::Video, "workspace/assets/video/city.mp4")
                    .with_duration_ms(12_000),
            )
            .with_asset(
                Asset::new("ast_music", AssetKind::Audio, "workspace/assets/audio/music.wav")
                    .with_duration_ms(30_000),
            );
        Self::new(snapshot)
    }

    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().map(|(task, _)| task)
    }

    /// Apply one request and produce the events the core should see, in order.
    pub fn handle(&mut self, envelope: Envelope) -> Vec<BackendEvent> {
        let Envelope {
            request_id,
            request,
        } = envelope;
        let name = request.name();
        match self.apply(request) {
            Ok(Applied::Project(created)) => vec![
                BackendEvent::ProjectUpdated {
                    snapshot: self.snapshot.clone(),
                },
                BackendEvent::RequestAccepted {
                    request_id,
                    created,
                },
            ],
            Ok(Applied::Task(task)) => {
                let created = Created::Task {
                    task_id: task.task_id.clone(),
                };
                vec![
                    BackendEvent::TaskUpdated { task },
                    BackendEvent::RequestAccepted {
                        request_id,
                        created: Some(created),
                    },
                ]
            }
            Err(err) => {
                log::warn!("{name} {request_id} rejected: {err}");
                vec![BackendEvent::RequestRejected {
                    request_id,
                    code: err.code().to_string(),
                    message: err.to_string(),
                }]
            }
        }
    }

    fn apply(&mut self, request: Request) -> Result<Applied, BackendError> {
        let timeline = &mut self.snapshot.timeline;
        match request {
            Request::AddClip {
                track_id,
                asset_id,
                start_ms,
            } => {
                if timeline.track(&track_id).is_none() {
                    return Err(not_found("track", &track_id));
                }
                let asset = self
                    .snapshot
                    .asset(&asset_id)
                    .ok_or_else(|| not_found("asset", &asset_id))?;
                let length = asset.duration_ms().unwrap_or(DEFAULT_STILL_MS);
                let clip = Clip::new(mint("clip"), track_id, asset_id, start_ms.max(0), 0, length);
                self.snapshot.timeline.insert_clip(clip.clone());
                Ok(Applied::Project(Some(Created::Clip { clip })))
            }
            Request::MoveClip { clip_id, start_ms } => {
                let clip = timeline
                    .clip_mut(&clip_id)
                    .ok_or_else(|| not_found("clip", &clip_id))?;
                clip.start_ms = start_ms.max(0);
                Ok(Applied::Project(None))
            }
            Request::TrimClip {
                clip_id,
                in_ms,
                out_ms,
            } => {
                let clip = timeline
                    .clip_mut(&clip_id)
                    .ok_or_else(|| not_found("clip", &clip_id))?;
                let new_in = in_ms.unwrap_or(clip.in_ms);
                let new_out = out_ms.unwrap_or(clip.out_ms);
                if new_in < 0 || new_in >= new_out {
                    return Err(BackendError::InvalidTrim {
                        clip_id,
                        in_ms: new_in,
                        out_ms: new_out,
                    });
                }
                clip.in_ms = new_in;
                clip.out_ms = new_out;
                Ok(Applied::Project(None))
            }
            Request::RemoveClip { clip_id } => {
                timeline
                    .remove_clip(&clip_id)
                    .ok_or_else(|| not_found("clip", &clip_id))?;
                Ok(Applied::Project(None))
            }
            Request::ReorderClips { track_id, clip_ids } => {
                let track = timeline
                    .track_mut(&track_id)
                    .ok_or_else(|| not_found("track", &track_id))?;
                let mut current = track.clip_ids.clone();
                let mut proposed = clip_ids.clone();
                current.sort_unstable();
                proposed.sort_unstable();
                if current != proposed {
                    return Err(BackendError::OrderMismatch(track_id));
                }
                track.clip_ids = clip_ids;
                Ok(Applied::Project(None))
            }
            Request::AddMarker { t_ms, label, prompt } => {
                let marker = Marker {
                    label: label.unwrap_or_default(),
                    prompt_text: prompt.unwrap_or_default(),
                    ..Marker::new(mint("mrk"), t_ms.max(0))
                };
                timeline.markers_mut().push(marker.clone());
                Ok(Applied::Project(Some(Created::Marker { marker })))
            }
            Request::UpdateMarker {
                marker_id,
                label,
                prompt,
                t_ms,
            } => {
                let marker = timeline
                    .markers_mut()
                    .iter_mut()
                    .find(|m| m.marker_id == marker_id)
                    .ok_or_else(|| not_found("marker", &marker_id))?;
                if let Some(label) = label {
                    marker.label = label;
                }
                if let Some(prompt) = prompt {
                    marker.prompt_text = prompt;
                }
                if let Some(t_ms) = t_ms {
                    marker.t_ms = t_ms.max(0);
                }
                Ok(Applied::Project(None))
            }
            Request::RemoveMarker { marker_id } => {
                let markers = timeline.markers_mut();
                let before = markers.len();
                markers.retain(|m| m.marker_id != marker_id);
                if markers.len() == before {
                    return Err(not_found("marker", &marker_id));
                }
                Ok(Applied::Project(None))
            }
            Request::EnqueueTask {
                kind, dedupe_key, ..
            } => Ok(Applied::Task(self.enqueue(kind, dedupe_key))),
        }
    }

    /// Run the task queue one transition forward, one task at a time: a
    /// running task succeeds, otherwise the oldest queued task starts.
    /// Returns the update to forward to the core, if anything changed.
    pub fn step_tasks(&mut self) -> Option<BackendEvent> {
        let next = self
            .tasks
            .iter()
            .position(|(task, _)| task.state == TaskState::Running)
            .or_else(|| {
                self.tasks
                    .iter()
                    .position(|(task, _)| task.state == TaskState::Queued)
            })?;
        let task = &mut self.tasks[next].0;
        if task.state == TaskState::Running {
            task.state = TaskState::Succeeded;
            task.progress = Some(TaskProgress {
                phase: "done".to_string(),
                percent: Some(100.0),
                message: None,
            });
            log::info!("task {} succeeded", task.task_id);
        } else {
            task.state = TaskState::Running;
            task.progress = Some(TaskProgress {
                phase: "running".to_string(),
                percent: None,
                message: None,
            });
            log::info!("task {} started ({})", task.task_id, task.kind);
        }
        Some(BackendEvent::TaskUpdated { task: task.clone() })
    }

    /// Queue a task. An active task with the same dedupe key is reused.
    fn enqueue(&mut self, kind: TaskKind, dedupe_key: Option<String>) -> Task {
        if let Some(key) = &dedupe_key {
            let existing = self
                .tasks
                .iter()
                .find(|(task, k)| k.as_ref() == Some(key) && task.state.is_active());
            if let Some((task, _)) = existing {
                log::debug!("task {} reused for {key}", task.task_id);
                return task.clone();
            }
        }
        let task = Task::queued(mint("task"), kind);
        log::info!("task {} queued ({kind})", task.task_id);
        self.tasks.push((task.clone(), dedupe_key));
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RequestId;
    use crate::types::task::TaskState;
    use serde_json::json;

    fn envelope(id: u64, request: Request) -> Envelope {
        Envelope {
            request_id: RequestId(id),
            request,
        }
    }

    fn updated_timeline(events: &[BackendEvent]) -> &Timeline {
        match &events[0] {
            BackendEvent::ProjectUpdated { snapshot } => &snapshot.timeline,
            other => panic!("expected a project update, got {other:?}"),
        }
    }

    #[test]
    fn test_move_and_trim() {
        let mut backend = InMemoryBackend::demo();
        let events = backend.handle(envelope(
            1,
            Request::MoveClip {
                clip_id: "clip_city".to_string(),
                start_ms: 6000,
            },
        ));
        assert_eq!(events.len(), 2);
        assert_eq!(updated_timeline(&events).clip("clip_city").unwrap().start_ms, 6000);
        assert_eq!(
            events[1],
            BackendEvent::RequestAccepted {
                request_id: RequestId(1),
                created: None
            }
        );

        let events = backend.handle(envelope(
            2,
            Request::TrimClip {
                clip_id: "clip_city".to_string(),
                in_ms: None,
                out_ms: Some(3000),
            },
        ));
        let clip = updated_timeline(&events).clip("clip_city").unwrap();
        assert_eq!((clip.in_ms, clip.out_ms), (1000, 3000));
        assert_eq!(backend.snapshot().timeline.duration_ms(), 9000);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let mut backend = InMemoryBackend::demo();
        let events = backend.handle(envelope(
            5,
            Request::RemoveClip {
                clip_id: "clip_gone".to_string(),
            },
        ));
        assert_eq!(
            events,
            vec![BackendEvent::RequestRejected {
                request_id: RequestId(5),
                code: "not_found".to_string(),
                message: "clip clip_gone not found".to_string(),
            }]
        );

        let events = backend.handle(envelope(
            6,
            Request::UpdateMarker {
                marker_id: "mrk_gone".to_string(),
                label: Some("x".to_string()),
                prompt: None,
                t_ms: None,
            },
        ));
        assert!(matches!(&events[0], BackendEvent::RequestRejected { code, .. } if code == "not_found"));
    }

    #[test]
    fn test_add_clip_uses_asset_length() {
        let mut backend = InMemoryBackend::demo();
        let events = backend.handle(envelope(
            1,
            Request::AddClip {
                track_id: "trk_video".to_string(),
                asset_id: "ast_city".to_string(),
                start_ms: 20_000,
            },
        ));
        let BackendEvent::RequestAccepted {
            created: Some(Created::Clip { clip }),
            ..
        } = &events[1]
        else {
            panic!("expected a created clip");
        };
        assert!(clip.clip_id.starts_with("clip_"));
        assert_eq!(clip.duration_ms(), 12_000);
        let track = backend.snapshot().timeline.track("trk_video").unwrap();
        assert_eq!(track.clip_ids.last(), Some(&clip.clip_id));
    }

    #[test]
    fn test_bad_trim_and_reorder() {
        let mut backend = InMemoryBackend::demo();
        let events = backend.handle(envelope(
            1,
            Request::TrimClip {
                clip_id: "clip_intro".to_string(),
                in_ms: Some(4000),
                out_ms: None,
            },
        ));
        assert!(matches!(&events[0], BackendEvent::RequestRejected { code, .. } if code == "invalid_range"));

        let events = backend.handle(envelope(
            2,
            Request::ReorderClips {
                track_id: "trk_video".to_string(),
                clip_ids: vec!["clip_city".to_string()],
            },
        ));
        assert!(matches!(&events[0], BackendEvent::RequestRejected { code, .. } if code == "order_mismatch"));

        let events = backend.handle(envelope(
            3,
            Request::ReorderClips {
                track_id: "trk_video".to_string(),
                clip_ids: vec!["clip_city".to_string(), "clip_intro".to_string()],
            },
        ));
        let order = &updated_timeline(&events).track("trk_video").unwrap().clip_ids;
        assert_eq!(order, &vec!["clip_city".to_string(), "clip_intro".to_string()]);
    }

    #[test]
    fn test_marker_lifecycle() {
        let mut backend = InMemoryBackend::demo();
        let events = backend.handle(envelope(
            1,
            Request::AddMarker {
                t_ms: 2500,
                label: Some("Cut".to_string()),
                prompt: None,
            },
        ));
        let BackendEvent::RequestAccepted {
            created: Some(Created::Marker { marker }),
            ..
        } = &events[1]
        else {
            panic!("expected a created marker");
        };
        let marker_id = marker.marker_id.clone();

        backend.handle(envelope(
            2,
            Request::UpdateMarker {
                marker_id: marker_id.clone(),
                label: None,
                prompt: Some("slow zoom".to_string()),
                t_ms: Some(3000),
            },
        ));
        let marker = backend.snapshot().timeline.marker(&marker_id).unwrap();
        assert_eq!((marker.t_ms, marker.label.as_str()), (3000, "Cut"));
        assert_eq!(marker.prompt_text, "slow zoom");

        backend.handle(envelope(3, Request::RemoveMarker { marker_id: marker_id.clone() }));
        assert!(backend.snapshot().timeline.marker(&marker_id).is_none());
    }

    #[test]
    fn test_enqueue_dedupes_active_tasks() {
        let mut backend = InMemoryBackend::demo();
        let capture = || Request::EnqueueTask {
            kind: TaskKind::CaptureFrame,
            input: json!({"assetId": "ast_city", "tMs": 1000, "useProxy": true}),
            deps: Vec::new(),
            dedupe_key: Some("capture:ast_city:1000".to_string()),
        };
        let first = backend.handle(envelope(1, capture()));
        let second = backend.handle(envelope(2, capture()));
        let task_id = |events: &[BackendEvent]| match &events[0] {
            BackendEvent::TaskUpdated { task } => {
                assert_eq!(task.state, TaskState::Queued);
                task.task_id.clone()
            }
            other => panic!("expected a task update, got {other:?}"),
        };
        assert_eq!(task_id(&first), task_id(&second));
        assert_eq!(backend.tasks().count(), 1);
    }

    #[test]
    fn test_step_tasks_runs_queue_in_order() {
        let mut backend = InMemoryBackend::demo();
        assert!(backend.step_tasks().is_none());

        let generate = |prompt: &str| Request::EnqueueTask {
            kind: TaskKind::GenVideo,
            input: json!({ "prompt": prompt }),
            deps: Vec::new(),
            dedupe_key: None,
        };
        backend.handle(envelope(1, generate("first")));
        backend.handle(envelope(2, generate("second")));

        let ids: Vec<String> = backend.tasks().map(|t| t.task_id.clone()).collect();
        let mut steps = Vec::new();
        while let Some(event) = backend.step_tasks() {
            match event {
                BackendEvent::TaskUpdated { task } => steps.push((task.task_id, task.state)),
                other => panic!("expected a task update, got {other:?}"),
            }
        }
        assert_eq!(
            steps,
            vec![
                (ids[0].clone(), TaskState::Running),
                (ids[0].clone(), TaskState::Succeeded),
                (ids[1].clone(), TaskState::Running),
                (ids[1].clone(), TaskState::Succeeded),
            ]
        );
        assert!(backend.tasks().all(|t| t.state == TaskState::Succeeded));
    }
}
