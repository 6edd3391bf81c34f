/// Transport state shared by the preview synchronizer and the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Current scrub/playback position in milliseconds.
    pub playhead_ms: f64,
    pub is_playing: bool,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            playhead_ms: 0.0,
            is_playing: false,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}
