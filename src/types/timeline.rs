use crate::types::marker::Marker;
use crate::types::media::Clip;
use crate::types::track::{Track, TrackKind};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The authoritative timeline aggregate: tracks, clips by id, markers.
///
/// Fields are private. Outside this crate a `Timeline` is only ever read or
/// replaced wholesale; the builder methods produce new values for snapshots
/// and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    clips: HashMap<String, Clip>,
    #[serde(default)]
    markers: Vec<Marker>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Append a clip to the end of its owning track's order.
    /// A clip naming an unknown track is dropped.
    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.insert_clip(clip);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }

    pub fn clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.get(clip_id)
    }

    pub fn marker(&self, marker_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.marker_id == marker_id)
    }

    pub fn clip_ids(&self) -> impl Iterator<Item = &String> {
        self.clips.keys()
    }

    /// First track of the given kind, in track order.
    pub fn first_track_of(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Clips on a track in the track's own order. `None` for an unknown track.
    pub fn clips_on_track(&self, track_id: &str) -> Option<Vec<&Clip>> {
        self.track(track_id).map(|track| {
            track
                .clip_ids
                .iter()
                .filter_map(|id| self.clips.get(id))
                .collect()
        })
    }

    /// First clip in the track's order whose `[start, end)` contains `time_ms`.
    pub fn active_clip_on_track(&self, track_id: &str, time_ms: f64) -> Option<&Clip> {
        let track = self.track(track_id)?;
        track
            .clip_ids
            .iter()
            .filter_map(|id| self.clips.get(id))
            .find(|clip| clip.is_active_at(time_ms))
    }

    /// All clips overlapping the half-open interval `[lo, hi)`.
    /// An empty interval yields nothing.
    pub fn clips_overlapping(&self, lo: f64, hi: f64) -> Vec<&Clip> {
        if hi <= lo {
            return Vec::new();
        }
        self.clips
            .values()
            .filter(|clip| clip.overlaps(lo, hi))
            .collect()
    }

    /// End of the last clip on any track; 0 for an empty timeline.
    pub fn duration_ms(&self) -> i64 {
        self.clips.values().map(Clip::end_ms).max().unwrap_or(0)
    }

    /// Times a dragged clip's start gravitates to: every other clip's start
    /// and end, plus every marker.
    pub fn snap_targets(&self, excluding_clip: &str) -> Vec<i64> {
        let mut targets: Vec<i64> = self
            .clips
            .values()
            .filter(|clip| clip.clip_id != excluding_clip)
            .flat_map(|clip| [clip.start_ms, clip.end_ms()])
            .chain(self.markers.iter().map(|m| m.t_ms))
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Clips whose owning track is missing, whose bounds are invalid, or that
    /// no track lists.
    pub fn inconsistent_clip_ids(&self) -> Vec<&str> {
        self.clips
            .values()
            .filter(|clip| {
                !clip.has_valid_bounds()
                    || !self
                        .track(&clip.track_id)
                        .is_some_and(|t| t.contains_clip(&clip.clip_id))
            })
            .map(|clip| clip.clip_id.as_str())
            .collect()
    }

    // --- In-place edits, reserved for the backend that owns the truth ---

    pub(crate) fn insert_clip(&mut self, clip: Clip) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.track_id == clip.track_id) else {
            return false;
        };
        if !track.contains_clip(&clip.clip_id) {
            track.clip_ids.push(clip.clip_id.clone());
        }
        self.clips.insert(clip.clip_id.clone(), clip);
        true
    }

    pub(crate) fn clip_mut(&mut self, clip_id: &str) -> Option<&mut Clip> {
        self.clips.get_mut(clip_id)
    }

    pub(crate) fn remove_clip(&mut self, clip_id: &str) -> Option<Clip> {
        let clip = self.clips.remove(clip_id)?;
        for track in &mut self.tracks {
            track.clip_ids.retain(|id| id != clip_id);
        }
        Some(clip)
    }

    pub(crate) fn track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.track_id == track_id)
    }

    pub(crate) fn markers_mut(&mut self) -> &mut Vec<Marker> {
        &mut self.markers
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three tracks with the clip layout used across the selection tests:
    /// v1=[0,5000) v2=[5000,8000) v3=[10000,12000) on video,
    /// a1=[1000,5000) on audio, t1=[6000,8000) on text.
    pub(crate) fn sample_timeline() -> Timeline {
        Timeline::new()
            .with_track(Track::new("trk_v", TrackKind::Video, "Draft Video"))
            .with_track(Track::new("trk_a", TrackKind::Audio, "Draft Audio"))
            .with_track(Track::new("trk_t", TrackKind::Text, "Notes / Prompts"))
            .with_clip(Clip::new("v1", "trk_v", "ast_v1", 0, 0, 5000))
            .with_clip(Clip::new("v2", "trk_v", "ast_v2", 5000, 0, 3000))
            .with_clip(Clip::new("v3", "trk_v", "ast_v3", 10_000, 0, 2000))
            .with_clip(Clip::new("a1", "trk_a", "ast_a1", 1000, 0, 4000))
            .with_clip(Clip::new("t1", "trk_t", "ast_t1", 6000, 0, 2000))
    }

    fn ids(clips: Vec<&Clip>) -> Vec<&str> {
        let mut ids: Vec<&str> = clips.iter().map(|c| c.clip_id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_duration_is_max_clip_end() {
        assert_eq!(sample_timeline().duration_ms(), 12_000);
        assert_eq!(Timeline::new().duration_ms(), 0);
    }

    #[test]
    fn test_lookup_by_id() {
        let timeline = sample_timeline();
        assert_eq!(timeline.track("trk_a").map(|t| t.kind), Some(TrackKind::Audio));
        assert!(timeline.track("nope").is_none());
        assert_eq!(timeline.clip("v2").map(|c| c.start_ms), Some(5000));
        assert!(timeline.clip("nope").is_none());
    }

    #[test]
    fn test_clips_overlapping_half_open() {
        let timeline = sample_timeline();
        assert_eq!(ids(timeline.clips_overlapping(500.0, 4500.0)), vec!["a1", "v1"]);
        assert_eq!(
            ids(timeline.clips_overlapping(0.0, 9000.0)),
            vec!["a1", "t1", "v1", "v2"]
        );
        assert_eq!(ids(timeline.clips_overlapping(0.0, 5000.0)), vec!["a1", "v1"]);
        assert!(timeline.clips_overlapping(3000.0, 3000.0).is_empty());
        assert!(Timeline::new().clips_overlapping(0.0, 10_000.0).is_empty());
    }

    #[test]
    fn test_clips_on_track_keeps_track_order() {
        let timeline = sample_timeline();
        let video = timeline.clips_on_track("trk_v").unwrap();
        let order: Vec<&str> = video.iter().map(|c| c.clip_id.as_str()).collect();
        assert_eq!(order, vec!["v1", "v2", "v3"]);
        assert!(timeline.clips_on_track("notrack").is_none());
    }

    #[test]
    fn test_active_clip_first_match_wins_on_overlap() {
        let timeline = Timeline::new()
            .with_track(Track::new("trk_v", TrackKind::Video, "V"))
            .with_clip(Clip::new("late", "trk_v", "ast", 1000, 0, 4000))
            .with_clip(Clip::new("early", "trk_v", "ast", 0, 0, 3000));
        let active = timeline.active_clip_on_track("trk_v", 2000.0).unwrap();
        assert_eq!(active.clip_id, "late");
        let active = timeline.active_clip_on_track("trk_v", 500.0).unwrap();
        assert_eq!(active.clip_id, "early");
        assert!(timeline.active_clip_on_track("trk_v", 5000.0).is_none());
    }

    #[test]
    fn test_snap_targets_exclude_dragged_clip() {
        let timeline = sample_timeline().with_marker(Marker::new("m1", 7000));
        let targets = timeline.snap_targets("v1");
        assert!(targets.contains(&7000));
        assert!(targets.contains(&1000));
        assert!(targets.contains(&8000));
        // v1's own end (5000) is still present through v2's start and a1's end
        assert!(targets.contains(&5000));
        let targets = timeline.snap_targets("v3");
        assert!(!targets.contains(&10_000));
        assert!(!targets.contains(&12_000));
    }

    #[test]
    fn test_with_clip_on_unknown_track_is_dropped() {
        let timeline = Timeline::new().with_clip(Clip::new("c", "ghost", "ast", 0, 0, 100));
        assert_eq!(timeline.clip_count(), 0);
    }

    #[test]
    fn test_inconsistent_clip_ids() {
        let timeline = sample_timeline();
        assert!(timeline.inconsistent_clip_ids().is_empty());

        let json = r#"{
            "tracks": [{"trackId": "trk_v", "type": "video", "name": "V", "clipIds": ["ok"]}],
            "clips": {
                "ok": {"clipId": "ok", "trackId": "trk_v", "assetId": "a", "startMs": 0, "inMs": 0, "outMs": 10},
                "orphan": {"clipId": "orphan", "trackId": "trk_v", "assetId": "a", "startMs": 0, "inMs": 0, "outMs": 10}
            }
        }"#;
        let parsed: Timeline = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.inconsistent_clip_ids(), vec!["orphan"]);
        assert!(parsed.markers().is_empty());
    }

    #[test]
    fn test_remove_clip_detaches_from_track() {
        let mut timeline = sample_timeline();
        assert!(timeline.remove_clip("v2").is_some());
        assert!(!timeline.track("trk_v").unwrap().contains_clip("v2"));
        assert!(timeline.remove_clip("v2").is_none());
    }
}
