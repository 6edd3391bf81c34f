use crate::types::task::TaskKind;
use serde::{Deserialize, Serialize};

/// A mutation or job the core asks the backend to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    AddClip {
        track_id: String,
        asset_id: String,
        start_ms: i64,
    },
    #[serde(rename_all = "camelCase")]
    MoveClip { clip_id: String, start_ms: i64 },
    #[serde(rename_all = "camelCase")]
    TrimClip {
        clip_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        in_ms: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        out_ms: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveClip { clip_id: String },
    #[serde(rename_all = "camelCase")]
    ReorderClips {
        track_id: String,
        clip_ids: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    AddMarker {
        t_ms: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateMarker {
        marker_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        t_ms: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveMarker { marker_id: String },
    #[serde(rename_all = "camelCase")]
    EnqueueTask {
        kind: TaskKind,
        input: serde_json::Value,
        #[serde(default)]
        deps: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dedupe_key: Option<String>,
    },
}

impl Request {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddClip { .. } => "add_clip",
            Self::MoveClip { .. } => "move_clip",
            Self::TrimClip { .. } => "trim_clip",
            Self::RemoveClip { .. } => "remove_clip",
            Self::ReorderClips { .. } => "reorder_clips",
            Self::AddMarker { .. } => "add_marker",
            Self::UpdateMarker { .. } => "update_marker",
            Self::RemoveMarker { .. } => "remove_marker",
            Self::EnqueueTask { .. } => "enqueue_task",
        }
    }
}
