//! Error types for rejected edits and bad configuration.
//!
//! Nothing here is fatal. An `EditError` ends up as a transient notice and
//! the view re-renders from the last authoritative snapshot.

use crate::bridge::RequestId;
use crate::types::task::TaskKind;
use std::fmt;
use thiserror::Error;

/// What kind of entity a request pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Clip,
    Marker,
    Track,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clip => "clip",
            Self::Marker => "marker",
            Self::Track => "track",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// The target vanished from the latest snapshot before the edit was sent.
    #[error("{kind} {id} no longer exists")]
    StaleTarget { kind: TargetKind, id: String },

    /// The backend rejected a request.
    #[error("request {request_id} rejected ({code}): {message}")]
    BridgeFailure {
        request_id: RequestId,
        code: String,
        message: String,
    },

    /// A task of this kind is already queued or running.
    #[error("a {kind} task is already in progress")]
    TaskBusy { kind: TaskKind },

    /// A reorder named clips that do not match the track's current contents.
    #[error("clip order for track {track_id} does not match its clips")]
    OrderMismatch { track_id: String },
}

impl EditError {
    pub fn stale_clip(id: &str) -> Self {
        Self::StaleTarget {
            kind: TargetKind::Clip,
            id: id.to_string(),
        }
    }

    pub fn stale_marker(id: &str) -> Self {
        Self::StaleTarget {
            kind: TargetKind::Marker,
            id: id.to_string(),
        }
    }

    pub fn stale_track(id: &str) -> Self {
        Self::StaleTarget {
            kind: TargetKind::Track,
            id: id.to_string(),
        }
    }

    /// Short text for the transient notice shown to the user.
    pub fn notice_text(&self) -> String {
        match self {
            Self::StaleTarget { kind, .. } => {
                format!("That {kind} was changed elsewhere; your edit was discarded.")
            }
            Self::BridgeFailure { message, .. } => format!("Edit failed: {message}"),
            Self::TaskBusy { kind } => format!("Wait for the running {kind} task to finish."),
            Self::OrderMismatch { .. } => {
                "The track changed while you were reordering it.".to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
