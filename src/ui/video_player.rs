use crate::ops::geometry::format_ms;
use crate::renderer::preview_sync::{MediaSource, PreviewSurface};
use crate::renderer::scheduler::FrameScheduler;
use eframe::egui;
use std::time::Instant;

/// Preview panel driven by the preview synchronizer.
///
/// Decoding lives outside this crate, so the panel shows which source is
/// loaded and where its own clock is, or black when nothing covers the
/// playhead.
#[derive(Debug, Default)]
pub struct VideoPlayer {
    source: Option<MediaSource>,
    position_secs: f64,
    clock: FrameScheduler,
}

impl VideoPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    /// Run the panel's own playback clock up to `now`.
    pub fn advance_clock(&mut self, now: Instant) {
        if let Some(elapsed) = self.clock.poll(now) {
            self.position_secs += elapsed.as_secs_f64();
        }
    }

    /// Show the video player panel in egui.
    pub fn show(&self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.heading("Preview");
            let width = ui.available_width().min(640.0);
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(width, width * 9.0 / 16.0), egui::Sense::hover());
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

            let Some(source) = &self.source else {
                return;
            };
            let proxy = if source.is_proxy { " (proxy)" } else { "" };
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("{}{}", source.path, proxy),
                egui::FontId::proportional(14.0),
                egui::Color32::LIGHT_GRAY,
            );
            painter.text(
                rect.left_bottom() + egui::vec2(8.0, -8.0),
                egui::Align2::LEFT_BOTTOM,
                format!(
                    "{} @ {}",
                    source.clip_id,
                    format_ms(self.position_secs * 1000.0)
                ),
                egui::FontId::monospace(12.0),
                egui::Color32::WHITE,
            );
        });
    }
}

impl PreviewSurface for VideoPlayer {
    fn show_blank(&mut self) {
        self.source = None;
        self.position_secs = 0.0;
    }

    fn load_source(&mut self, source: &MediaSource) {
        log::debug!("preview loads {}", source.path);
        self.source = Some(source.clone());
    }

    fn position_secs(&self) -> f64 {
        self.position_secs
    }

    fn seek(&mut self, secs: f64) {
        self.position_secs = secs.max(0.0);
    }

    fn set_playing(&mut self, playing: bool) {
        if playing {
            self.clock.start(Instant::now());
        } else {
            self.clock.stop();
        }
    }
}
