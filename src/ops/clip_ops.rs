//! Provisional clip geometry for move and trim gestures.
//!
//! Every function works from the anchor captured at gesture start plus a
//! pointer delta; none of them look at live timeline state.

use crate::ops::snap::{SnapSettings, snap};
use crate::types::media::Clip;

/// The clip bounds a gesture started from, or the provisional bounds it
/// currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipBounds {
    pub start_ms: i64,
    pub in_ms: i64,
    pub out_ms: i64,
}

impl ClipBounds {
    pub fn of(clip: &Clip) -> Self {
        Self {
            start_ms: clip.start_ms,
            in_ms: clip.in_ms,
            out_ms: clip.out_ms,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.out_ms - self.in_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms()
    }
}

/// New start for a move: snapped, then clamped to be non-negative.
pub fn move_clip(
    anchor: &ClipBounds,
    delta_ms: f64,
    targets: &[i64],
    snap_settings: &SnapSettings,
) -> ClipBounds {
    let raw = anchor.start_ms as f64 + delta_ms;
    let start_ms = snap(raw, targets, snap_settings).round().max(0.0) as i64;
    ClipBounds { start_ms, ..*anchor }
}

/// Move the head of the clip. The absolute end stays put, `in` never drops
/// below 0, the clip never gets shorter than `min_clip_ms`, and the visual
/// start never goes negative.
pub fn trim_left(anchor: &ClipBounds, delta_ms: f64, min_clip_ms: i64) -> ClipBounds {
    let requested = anchor.in_ms + delta_ms.round() as i64;
    let floor = 0.max(anchor.in_ms - anchor.start_ms);
    let in_ms = requested.min(anchor.out_ms - min_clip_ms).max(floor);
    ClipBounds {
        start_ms: anchor.start_ms + (in_ms - anchor.in_ms),
        in_ms,
        out_ms: anchor.out_ms,
    }
}

/// Move the tail of the clip; the start is unaffected.
pub fn trim_right(anchor: &ClipBounds, delta_ms: f64, min_clip_ms: i64) -> ClipBounds {
    let requested = anchor.out_ms + delta_ms.round() as i64;
    ClipBounds {
        out_ms: requested.max(anchor.in_ms + min_clip_ms),
        ..*anchor
    }
}
