use crate::config::TimelineConfig;
use crate::ops::geometry::{nearest_zoom, next_zoom, pixels_to_ms, prev_zoom};
use crate::types::playback_state::PlaybackState;
use crate::types::selection::Selection;

/// Transient, UI-local view of the timeline. Rebuilt from nothing on reload.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub playback: PlaybackState,
    /// Pixels per second; always one of the configured zoom levels.
    zoom: f64,
    /// Horizontal scroll offset in pixels, never negative.
    scroll_x: f64,
    pub selection: Selection,
    pub grid_snap: bool,
    pub target_snap: bool,
}

impl ViewState {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            playback: PlaybackState::new(),
            zoom: config.default_zoom,
            scroll_x: 0.0,
            selection: Selection::new(),
            grid_snap: config.grid_snap,
            target_snap: config.target_snap,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    /// Set zoom to the configured level nearest `requested`.
    pub fn set_zoom(&mut self, requested: f64, levels: &[f64]) {
        if let Some(level) = nearest_zoom(requested, levels) {
            self.zoom = level;
        }
    }

    pub fn zoom_in(&mut self, levels: &[f64]) {
        self.zoom = next_zoom(self.zoom, levels);
    }

    pub fn zoom_out(&mut self, levels: &[f64]) {
        self.zoom = prev_zoom(self.zoom, levels);
    }

    pub fn set_scroll_x(&mut self, scroll_x: f64) {
        self.scroll_x = scroll_x.max(0.0);
    }

    pub fn scroll_by(&mut self, dx: f64) {
        self.set_scroll_x(self.scroll_x + dx);
    }

    /// Convert an x offset in the visible viewport to timeline-content x.
    pub fn content_x(&self, viewport_x: f64) -> f64 {
        viewport_x + self.scroll_x
    }

    /// Timeline time under a viewport x offset, clamped to 0.
    pub fn time_at_viewport_x(&self, viewport_x: f64) -> f64 {
        pixels_to_ms(self.content_x(viewport_x), self.zoom).max(0.0)
    }
}
