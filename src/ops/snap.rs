//! Snapping for dragged clip starts.
//!
//! Grid is tried first, then the nearest snap target; the first that falls
//! within the threshold wins. Thresholds are inclusive.

use crate::config::TimelineConfig;
use crate::ops::geometry::pixels_to_ms;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapSettings {
    pub grid_ms: i64,
    /// Threshold already converted to ms at the current zoom.
    pub threshold_ms: f64,
    pub grid: bool,
    pub targets: bool,
}

impl SnapSettings {
    pub fn from_config(config: &TimelineConfig, pixels_per_second: f64) -> Self {
        Self {
            grid_ms: config.snap_grid_ms,
            threshold_ms: pixels_to_ms(config.snap_threshold_px, pixels_per_second),
            grid: config.grid_snap,
            targets: config.target_snap,
        }
    }

    pub fn disabled() -> Self {
        Self {
            grid_ms: 1,
            threshold_ms: 0.0,
            grid: false,
            targets: false,
        }
    }
}

/// Nearest grid line to `value`, if it is within the threshold.
pub fn snap_to_grid(value: f64, grid_ms: i64, threshold_ms: f64) -> Option<f64> {
    if grid_ms <= 0 {
        return None;
    }
    let grid = grid_ms as f64;
    let line = (value / grid).round() * grid;
    ((line - value).abs() <= threshold_ms).then_some(line)
}

/// Nearest target to `value` within the threshold. Equal distances resolve
/// to the earlier target in `targets`.
pub fn snap_to_target(value: f64, targets: &[i64], threshold_ms: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for &target in targets {
        let target = target as f64;
        let distance = (target - value).abs();
        if distance > threshold_ms {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((target, distance)),
        }
    }
    best.map(|(target, _)| target)
}

/// Resolve `value` against grid, then targets, else return it unchanged.
pub fn snap(value: f64, targets: &[i64], settings: &SnapSettings) -> f64 {
    if settings.grid {
        if let Some(line) = snap_to_grid(value, settings.grid_ms, settings.threshold_ms) {
            return line;
        }
    }
    if settings.targets {
        if let Some(target) = snap_to_target(value, targets, settings.threshold_ms) {
            return target;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(threshold_ms: f64) -> SnapSettings {
        SnapSettings {
            grid_ms: 100,
            threshold_ms,
            grid: true,
            targets: true,
        }
    }

    #[test]
    fn test_threshold_from_pixels() {
        let config = TimelineConfig::default();
        assert_eq!(SnapSettings::from_config(&config, 100.0).threshold_ms, 80.0);
        assert_eq!(SnapSettings::from_config(&config, 200.0).threshold_ms, 40.0);
        assert_eq!(SnapSettings::from_config(&config, 50.0).threshold_ms, 160.0);
    }

    #[test]
    fn test_grid_wins_over_target() {
        // 6950 is 50ms from both the 7000 grid line and a target at 6900
        assert_eq!(snap(6950.0, &[6900], &settings(80.0)), 7000.0);
    }

    #[test]
    fn test_target_used_when_grid_out_of_reach() {
        // threshold 40: nearest grid line 7000 is 50 away, target 6930 is 20 away
        assert_eq!(snap(6950.0, &[6930], &settings(40.0)), 6930.0);
    }

    #[test]
    fn test_unsnapped_when_nothing_close() {
        assert_eq!(snap(6950.0, &[9000], &settings(40.0)), 6950.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(snap_to_grid(6960.0, 100, 40.0), Some(7000.0));
        assert_eq!(snap_to_target(1000.0, &[1040], 40.0), Some(1040.0));
        assert_eq!(snap_to_target(1000.0, &[1041], 40.0), None);
    }

    #[test]
    fn test_target_tie_prefers_earlier() {
        assert_eq!(snap_to_target(1000.0, &[990, 1010], 20.0), Some(990.0));
        assert_eq!(snap_to_target(1000.0, &[980, 1005], 20.0), Some(1005.0));
    }

    #[test]
    fn test_disabled() {
        assert_eq!(snap(6950.0, &[6950], &SnapSettings::disabled()), 6950.0);
        let grid_only = SnapSettings {
            targets: false,
            ..settings(40.0)
        };
        assert_eq!(snap(6950.0, &[6940], &grid_only), 6950.0);
    }
}
