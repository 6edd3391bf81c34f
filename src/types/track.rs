use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

/// An ordered lane of clips. The order of `clip_ids` is the evaluation order
/// used when clips on the same track overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub track_id: String,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub name: String,
    #[serde(default)]
    pub clip_ids: Vec<String>,
}

impl Track {
    pub fn new(track_id: impl Into<String>, kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            kind,
            name: name.into(),
            clip_ids: Vec::new(),
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }

    pub fn contains_clip(&self, clip_id: &str) -> bool {
        self.clip_ids.iter().any(|id| id == clip_id)
    }
}
