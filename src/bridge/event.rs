use crate::bridge::RequestId;
use crate::types::marker::Marker;
use crate::types::media::Clip;
use crate::types::project::ProjectSnapshot;
use crate::types::task::Task;
use serde::{Deserialize, Serialize};

/// What a successful create-style request produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Created {
    Clip { clip: Clip },
    Marker { marker: Marker },
    #[serde(rename_all = "camelCase")]
    Task { task_id: String },
}

/// Everything the backend can tell the core, applied in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BackendEvent {
    /// A new authoritative project state. Replaces the previous one wholesale.
    ProjectUpdated { snapshot: ProjectSnapshot },
    /// One task's state changed.
    TaskUpdated { task: Task },
    #[serde(rename_all = "camelCase")]
    RequestAccepted {
        request_id: RequestId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created: Option<Created>,
    },
    #[serde(rename_all = "camelCase")]
    RequestRejected {
        request_id: RequestId,
        code: String,
        message: String,
    },
}
