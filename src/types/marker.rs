use serde::{Deserialize, Serialize};

/// A labeled point in absolute timeline time. Markers span every track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub marker_id: String,
    pub t_ms: i64,
    #[serde(default)]
    pub label: String,
    /// Free-text prompt annotation attached to this point.
    #[serde(default)]
    pub prompt_text: String,
}

impl Marker {
    pub fn new(marker_id: impl Into<String>, t_ms: i64) -> Self {
        Self {
            marker_id: marker_id.into(),
            t_ms,
            label: String::new(),
            prompt_text: String::new(),
        }
    }
}
