use serde::{Deserialize, Serialize};

/// A bounded reference to an asset placed on a track.
///
/// Times are integer milliseconds. `start_ms` is absolute timeline time,
/// `in_ms`/`out_ms` are asset-local trim bounds. Duration is always derived
/// from the trim bounds; a `durationMs` field in incoming JSON is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub clip_id: String,
    pub track_id: String,
    pub asset_id: String,
    pub start_ms: i64,
    pub in_ms: i64,
    pub out_ms: i64,
}

impl Clip {
    pub fn new(
        clip_id: impl Into<String>,
        track_id: impl Into<String>,
        asset_id: impl Into<String>,
        start_ms: i64,
        in_ms: i64,
        out_ms: i64,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            track_id: track_id.into(),
            asset_id: asset_id.into(),
            start_ms,
            in_ms,
            out_ms,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.out_ms - self.in_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms()
    }

    /// Half-open containment: `[start, end)`.
    pub fn is_active_at(&self, time_ms: f64) -> bool {
        time_ms >= self.start_ms as f64 && time_ms < self.end_ms() as f64
    }

    /// Whether `[start, end)` intersects the half-open interval `[lo, hi)`.
    pub fn overlaps(&self, lo: f64, hi: f64) -> bool {
        (self.start_ms as f64) < hi && (self.end_ms() as f64) > lo
    }

    /// Asset-local position in seconds for an absolute timeline time.
    pub fn local_secs_at(&self, time_ms: f64) -> f64 {
        (time_ms - self.start_ms as f64 + self.in_ms as f64) / 1000.0
    }

    pub fn has_valid_bounds(&self) -> bool {
        self.start_ms >= 0 && self.in_ms >= 0 && self.in_ms < self.out_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    Audio,
    Image,
}

/// Probe results and derived files the backend records per asset.
///
/// Only the keys the editor reads are typed; everything else the backend
/// stores under `meta` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_uri: Option<String>,
    /// Probed media length. Stills have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,
}

/// Media the backend has registered for the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub path: String,
    #[serde(default)]
    pub meta: AssetMeta,
}

impl Asset {
    pub fn new(asset_id: impl Into<String>, kind: AssetKind, path: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            kind,
            path: path.into(),
            meta: AssetMeta::default(),
        }
    }

    pub fn with_proxy(mut self, proxy_uri: impl Into<String>) -> Self {
        self.meta.proxy_uri = Some(proxy_uri.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.meta.duration_sec = Some(duration_ms as f64 / 1000.0);
        self
    }

    pub fn proxy_uri(&self) -> Option<&str> {
        self.meta.proxy_uri.as_deref()
    }

    /// Probed length rounded to whole milliseconds.
    pub fn duration_ms(&self) -> Option<i64> {
        self.meta
            .duration_sec
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| (secs * 1000.0).round() as i64)
    }

    /// Path the preview should load; the proxy wins when one exists and is wanted.
    pub fn preview_path(&self, prefer_proxy: bool) -> (&str, bool) {
        match (self.proxy_uri(), prefer_proxy) {
            (Some(proxy), true) => (proxy, true),
            _ => (self.path.as_str(), false),
        }
    }
}
