//! Time <-> pixel conversion and timecode formatting.
//!
//! Zoom is expressed in pixels per second. Everything here is stateless.

/// Convert a millisecond position to a horizontal pixel offset.
pub fn ms_to_pixels(ms: f64, pixels_per_second: f64) -> f64 {
    ms / 1000.0 * pixels_per_second
}

/// Convert a horizontal pixel offset back to milliseconds.
pub fn pixels_to_ms(px: f64, pixels_per_second: f64) -> f64 {
    px / pixels_per_second * 1000.0
}

/// Format a millisecond count as `MM:SS.cc`.
///
/// The input is rounded to the nearest whole millisecond first. Minutes are
/// not wrapped, so an hour renders as `60:00.00`.
pub fn format_ms(ms: f64) -> String {
    let total = ms.max(0.0).round() as u64;
    let minutes = total / 60_000;
    let seconds = (total % 60_000) / 1000;
    let centis = (total % 1000) / 10;
    format!("{:02}:{:02}.{:02}", minutes, seconds, centis)
}

/// Pick the zoom preset closest to `requested`.
pub fn nearest_zoom(requested: f64, levels: &[f64]) -> Option<f64> {
    levels.iter().copied().min_by(|a, b| {
        (a - requested)
            .abs()
            .partial_cmp(&(b - requested).abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Next higher zoom preset, or the highest if already at or above it.
pub fn next_zoom(current: f64, levels: &[f64]) -> f64 {
    for &level in levels {
        if level > current {
            return level;
        }
    }
    levels.last().copied().unwrap_or(current)
}

/// Next lower zoom preset, or the lowest if already at or below it.
pub fn prev_zoom(current: f64, levels: &[f64]) -> f64 {
    for &level in levels.iter().rev() {
        if level < current {
            return level;
        }
    }
    levels.first().copied().unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: &[f64] = &[50.0, 100.0, 200.0];

    #[test]
    fn test_round_trip_within_one_ms() {
        for &zoom in LEVELS {
            let mut ms = 0.0;
            while ms < 3_600_000.0 {
                let back = pixels_to_ms(ms_to_pixels(ms, zoom), zoom);
                assert!((back - ms).abs() < 1.0, "zoom {zoom}: {ms} -> {back}");
                ms += 1234.567;
            }
        }
    }

    #[test]
    fn test_ms_to_pixels_scale() {
        assert_eq!(ms_to_pixels(1000.0, 100.0), 100.0);
        assert_eq!(ms_to_pixels(2500.0, 50.0), 125.0);
        assert_eq!(pixels_to_ms(80.0, 100.0), 800.0);
    }

    #[test]
    fn test_format_ms_literals() {
        assert_eq!(format_ms(0.0), "00:00.00");
        assert_eq!(format_ms(1000.0), "00:01.00");
        assert_eq!(format_ms(90_000.0), "01:30.00");
        assert_eq!(format_ms(1500.0), "00:01.50");
        assert_eq!(format_ms(1234.0), "00:01.23");
    }

    #[test]
    fn test_format_ms_rounds_first() {
        // 59999.6 rounds up to a full minute
        assert_eq!(format_ms(59_999.6), "01:00.00");
        assert_eq!(format_ms(1009.4), "00:01.00");
    }

    #[test]
    fn test_zoom_presets() {
        assert_eq!(next_zoom(100.0, LEVELS), 200.0);
        assert_eq!(next_zoom(200.0, LEVELS), 200.0);
        assert_eq!(prev_zoom(100.0, LEVELS), 50.0);
        assert_eq!(prev_zoom(50.0, LEVELS), 50.0);
        assert_eq!(nearest_zoom(120.0, LEVELS), Some(100.0));
        assert_eq!(nearest_zoom(170.0, LEVELS), Some(200.0));
        assert_eq!(nearest_zoom(1.0, &[]), None);
    }
}
