//! UI-local selection: a set of clip ids plus the ruler range picker.
//!
//! Never persisted. Ids are pruned whenever a new snapshot drops them.

use crate::types::timeline::Timeline;
use std::collections::HashSet;

/// A committed time range. Endpoints are stored as clicked and normalized
/// by every consumer through `lo()`/`hi()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn lo(&self) -> i64 {
        self.start_ms.min(self.end_ms)
    }

    pub fn hi(&self) -> i64 {
        self.start_ms.max(self.end_ms)
    }
}

/// Two-phase ruler range picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePick {
    #[default]
    None,
    Pending {
        start_ms: i64,
    },
    Committed(TimeRange),
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    clips: HashSet<String>,
    range: RangePick,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, clip_id: &str) -> bool {
        self.clips.contains(clip_id)
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Selected ids in a stable (sorted) order.
    pub fn clip_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.clips.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Replace the selection with exactly one clip.
    pub fn select_clip(&mut self, clip_id: &str) {
        self.clips.clear();
        self.clips.insert(clip_id.to_string());
    }

    /// Flip one clip's membership, leaving the others alone.
    pub fn toggle_clip(&mut self, clip_id: &str) {
        if !self.clips.remove(clip_id) {
            self.clips.insert(clip_id.to_string());
        }
    }

    /// Union ids into the selection.
    pub fn add_clips<I, S>(&mut self, clip_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clips.extend(clip_ids.into_iter().map(Into::into));
    }

    /// Replace the selection with the given ids.
    pub fn set_clips<I, S>(&mut self, clip_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clips.clear();
        self.add_clips(clip_ids);
    }

    pub fn clear_selection(&mut self) {
        self.clips.clear();
    }

    pub fn select_all(&mut self, timeline: &Timeline) {
        self.set_clips(timeline.clip_ids().cloned());
    }

    /// Replace the selection with every clip overlapping `[min(a,b), max(a,b))`.
    pub fn select_range(&mut self, timeline: &Timeline, a_ms: f64, b_ms: f64) {
        let ids = Self::ids_in_range(timeline, a_ms, b_ms);
        self.set_clips(ids);
    }

    /// Union every clip overlapping `[min(a,b), max(a,b))` into the selection.
    pub fn add_range(&mut self, timeline: &Timeline, a_ms: f64, b_ms: f64) {
        let ids = Self::ids_in_range(timeline, a_ms, b_ms);
        self.add_clips(ids);
    }

    fn ids_in_range(timeline: &Timeline, a_ms: f64, b_ms: f64) -> Vec<String> {
        let (lo, hi) = (a_ms.min(b_ms), a_ms.max(b_ms));
        timeline
            .clips_overlapping(lo, hi)
            .into_iter()
            .map(|c| c.clip_id.clone())
            .collect()
    }

    /// Drop ids the timeline no longer contains. Returns how many were dropped.
    pub fn prune(&mut self, timeline: &Timeline) -> usize {
        let before = self.clips.len();
        self.clips.retain(|id| timeline.clip(id).is_some());
        before - self.clips.len()
    }

    pub fn range_pick(&self) -> RangePick {
        self.range
    }

    pub fn committed_range(&self) -> Option<TimeRange> {
        match self.range {
            RangePick::Committed(range) => Some(range),
            _ => None,
        }
    }

    /// A ruler click: starts a new range unless a start is pending, in which
    /// case it commits the end.
    pub fn ruler_click(&mut self, t_ms: i64) {
        self.range = match self.range {
            RangePick::Pending { start_ms } => RangePick::Committed(TimeRange {
                start_ms,
                end_ms: t_ms,
            }),
            RangePick::None | RangePick::Committed(_) => RangePick::Pending { start_ms: t_ms },
        };
    }

    pub fn clear_range(&mut self) {
        self.range = RangePick::None;
    }
}
