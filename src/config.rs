//! Tunables for timeline interaction and preview sync.
//!
//! The core never touches the filesystem; the host hands it a JSON string
//! (or nothing, for defaults). Missing fields fall back to defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Allowed zoom levels in pixels per second, ascending.
    pub zoom_levels: Vec<f64>,
    /// Zoom used for a fresh view (must be one of `zoom_levels`).
    pub default_zoom: f64,

    /// Grid spacing for move snapping, in ms.
    pub snap_grid_ms: i64,
    /// Snap distance in screen pixels; converted to ms at the current zoom.
    pub snap_threshold_px: f64,
    pub grid_snap: bool,
    pub target_snap: bool,

    /// Width of the trim handle at either clip edge.
    pub trim_handle_px: f64,
    /// Shortest clip a trim may produce, in ms.
    pub min_clip_ms: i64,
    /// A marquee narrower than this is a click, not a selection.
    pub marquee_min_px: f64,

    /// Re-seek the preview only when it drifts further than this.
    pub drift_tolerance_secs: f64,
    /// Load an asset's proxy instead of the original when one exists.
    pub prefer_proxy: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            zoom_levels: vec![50.0, 100.0, 200.0],
            default_zoom: 100.0,

            snap_grid_ms: 100,
            snap_threshold_px: 8.0,
            grid_snap: true,
            target_snap: true,

            trim_handle_px: 6.0,
            min_clip_ms: 100,
            marquee_min_px: 4.0,

            drift_tolerance_secs: 0.1,
            prefer_proxy: true,
        }
    }
}

impl TimelineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zoom_levels.is_empty() {
            return Err(ConfigError::Invalid {
                field: "zoom_levels",
                reason: "at least one zoom level is required".to_string(),
            });
        }
        if self.zoom_levels.iter().any(|z| !z.is_finite() || *z <= 0.0) {
            return Err(ConfigError::Invalid {
                field: "zoom_levels",
                reason: "zoom levels must be positive".to_string(),
            });
        }
        if self.zoom_levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid {
                field: "zoom_levels",
                reason: "zoom levels must be strictly ascending".to_string(),
            });
        }
        if !self.zoom_levels.contains(&self.default_zoom) {
            return Err(ConfigError::Invalid {
                field: "default_zoom",
                reason: format!("{} is not one of the zoom levels", self.default_zoom),
            });
        }
        if self.snap_grid_ms <= 0 {
            return Err(ConfigError::Invalid {
                field: "snap_grid_ms",
                reason: "grid spacing must be positive".to_string(),
            });
        }
        if self.min_clip_ms <= 0 {
            return Err(ConfigError::Invalid {
                field: "min_clip_ms",
                reason: "minimum clip length must be positive".to_string(),
            });
        }
        if self.snap_threshold_px < 0.0 || self.trim_handle_px < 0.0 || self.marquee_min_px < 0.0
        {
            return Err(ConfigError::Invalid {
                field: "pixel thresholds",
                reason: "pixel thresholds cannot be negative".to_string(),
            });
        }
        if self.drift_tolerance_secs < 0.0 {
            return Err(ConfigError::Invalid {
                field: "drift_tolerance_secs",
                reason: "tolerance cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}
