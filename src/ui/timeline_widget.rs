use crate::ops::clip_ops::ClipBounds;
use crate::ops::geometry::{format_ms, ms_to_pixels, pixels_to_ms};
use crate::types::selection::RangePick;
use crate::types::session::EditorSession;
use crate::types::track::TrackKind;
use crate::ui::gesture::{ContentPos, DragMode, HitTarget, Modifiers};
use eframe::egui::{self, StrokeKind};

// Layout constants
const TRACK_HEIGHT: f32 = 60.0;
const CLIP_HEIGHT: f32 = 40.0;
const RULER_HEIGHT: f32 = 30.0;
const TRACK_LABEL_WIDTH: f32 = 120.0;
const MIN_TRACK_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// The ruler was scrubbed to this time (ms).
    PlayheadMoved(f64),
}

/// Draws the timeline and routes pointer input into the session's gesture
/// controller. Clip geometry comes from the snapshot, except for the clip
/// being dragged, which is drawn at its provisional bounds.
pub struct TimelineWidget<'a> {
    session: &'a mut EditorSession,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(session: &'a mut EditorSession) -> Self {
        Self { session }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> Vec<TimelineEvent> {
        let mut events = Vec::new();

        let rows = self.session.timeline().tracks().len().max(MIN_TRACK_ROWS);
        let height = RULER_HEIGHT + rows as f32 * TRACK_HEIGHT;
        let (outer, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), height),
            egui::Sense::hover(),
        );
        let ruler_rect = egui::Rect::from_min_max(
            outer.left_top() + egui::vec2(TRACK_LABEL_WIDTH, 0.0),
            egui::pos2(outer.right(), outer.top() + RULER_HEIGHT),
        );
        let tracks_rect = egui::Rect::from_min_max(
            outer.left_top() + egui::vec2(TRACK_LABEL_WIDTH, RULER_HEIGHT),
            outer.right_bottom(),
        );
        let labels_rect = egui::Rect::from_min_max(
            outer.left_top() + egui::vec2(0.0, RULER_HEIGHT),
            egui::pos2(outer.left() + TRACK_LABEL_WIDTH, outer.bottom()),
        );

        // Wheel scrolls horizontally
        if let Some(hover) = ui.input(|i| i.pointer.hover_pos()) {
            if outer.contains(hover) {
                let delta = ui.input(|i| i.smooth_scroll_delta);
                if delta != egui::Vec2::ZERO {
                    self.session.view.scroll_by(-(delta.x + delta.y) as f64);
                }
            }
        }

        self.handle_ruler(ui, ruler_rect, &mut events);
        self.handle_tracks(ui, tracks_rect);

        let painter = ui.painter_at(outer);
        painter.rect_filled(outer, 0.0, ui.style().visuals.window_fill);
        self.draw_track_labels(&painter, labels_rect);
        self.draw_ruler(&painter, ruler_rect);
        self.draw_tracks(ui, &painter, tracks_rect);
        self.draw_range(&painter, ruler_rect, tracks_rect);
        self.draw_markers(&painter, ruler_rect, tracks_rect);
        self.draw_marquee(&painter, tracks_rect);
        self.draw_playhead(&painter, ruler_rect, tracks_rect);

        events
    }

    /// Screen x for a timeline time, given the left edge of the content area.
    fn time_to_x(&self, t_ms: f64, rect: egui::Rect) -> f32 {
        let px = ms_to_pixels(t_ms, self.session.view.zoom()) - self.session.view.scroll_x();
        rect.left() + px as f32
    }

    fn content_x(&self, screen_x: f32, rect: egui::Rect) -> f64 {
        self.session.view.content_x((screen_x - rect.left()) as f64)
    }

    fn content_pos(&self, pos: egui::Pos2, rect: egui::Rect) -> ContentPos {
        ContentPos::new(self.content_x(pos.x, rect), (pos.y - rect.top()) as f64)
    }

    fn track_id_at(&self, y: f32, rect: egui::Rect) -> Option<String> {
        if y < rect.top() {
            return None;
        }
        let row = ((y - rect.top()) / TRACK_HEIGHT).floor() as usize;
        self.session
            .timeline()
            .tracks()
            .get(row)
            .map(|t| t.track_id.clone())
    }

    fn hit_at(&self, pos: egui::Pos2, rect: egui::Rect) -> HitTarget {
        let track_id = self.track_id_at(pos.y, rect);
        self.session
            .hit_test(track_id.as_deref(), self.content_x(pos.x, rect))
    }

    fn handle_ruler(
        &mut self,
        ui: &mut egui::Ui,
        rect: egui::Rect,
        events: &mut Vec<TimelineEvent>,
    ) {
        let response = ui.interact(rect, ui.id().with("ruler"), egui::Sense::click_and_drag());
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let x = self.content_x(pos.x, rect);
                self.session.ruler_click(x);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let t_ms = pixels_to_ms(self.content_x(pos.x, rect), self.session.view.zoom());
                events.push(TimelineEvent::PlayheadMoved(t_ms.max(0.0)));
            }
        }
    }

    fn handle_tracks(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let response = ui.interact(rect, ui.id().with("tracks"), egui::Sense::click_and_drag());
        let modifiers = Modifiers {
            extend: ui.input(|i| i.modifiers.command || i.modifiers.shift),
        };

        if let Some(hover) = response.hover_pos() {
            if self.session.gesture().is_idle() {
                if let HitTarget::Clip {
                    mode: DragMode::TrimLeft | DragMode::TrimRight,
                    ..
                } = self.hit_at(hover, rect)
                {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                }
            }
        }

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                let target = self.hit_at(origin, rect);
                let pos = self.content_pos(origin, rect);
                self.session.pointer_down(pos, target, modifiers);
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let pos = self.content_pos(pos, rect);
                self.session.pointer_move(pos);
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if let Some(pos) = ui.input(|i| i.pointer.latest_pos()) {
                let pos = self.content_pos(pos, rect);
                self.session.pointer_up(pos);
            }
        }

        // A click is a gesture that never moved
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let target = self.hit_at(pos, rect);
                let pos = self.content_pos(pos, rect);
                self.session.pointer_down(pos, target, modifiers);
                self.session.pointer_up(pos);
            }
        }
    }

    fn draw_track_labels(&self, painter: &egui::Painter, rect: egui::Rect) {
        for (idx, track) in self.session.timeline().tracks().iter().enumerate() {
            let row = egui::Rect::from_min_size(
                egui::pos2(rect.left(), rect.top() + idx as f32 * TRACK_HEIGHT),
                egui::vec2(rect.width(), TRACK_HEIGHT),
            );
            painter.rect_filled(row, 0.0, egui::Color32::DARK_GRAY);
            painter.text(
                row.center(),
                egui::Align2::CENTER_CENTER,
                &track.name,
                egui::FontId::proportional(14.0),
                egui::Color32::WHITE,
            );
        }
    }

    fn draw_ruler(&self, painter: &egui::Painter, rect: egui::Rect) {
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));

        let zoom = self.session.view.zoom();
        let (major_ms, minor_ms): (i64, i64) = if zoom >= 200.0 {
            (1000, 100)
        } else if zoom >= 100.0 {
            (5000, 1000)
        } else {
            (10_000, 5000)
        };

        let start_ms = pixels_to_ms(self.session.view.scroll_x(), zoom);
        let end_ms = start_ms + pixels_to_ms(rect.width() as f64, zoom);

        let mut t = (start_ms as i64 / minor_ms) * minor_ms;
        while (t as f64) <= end_ms {
            let x = self.time_to_x(t as f64, rect);
            let major = t % major_ms == 0;
            let (len, stroke) = if major {
                (15.0, egui::Stroke::new(2.0, egui::Color32::WHITE))
            } else {
                (5.0, egui::Stroke::new(1.0, egui::Color32::from_gray(120)))
            };
            if x >= rect.left() {
                painter.line_segment(
                    [egui::pos2(x, rect.bottom() - len), egui::pos2(x, rect.bottom())],
                    stroke,
                );
                if major {
                    painter.text(
                        egui::pos2(x + 2.0, rect.center().y),
                        egui::Align2::LEFT_CENTER,
                        format_ms(t as f64),
                        egui::FontId::proportional(11.0),
                        egui::Color32::WHITE,
                    );
                }
            }
            t += minor_ms;
        }
    }

    fn draw_tracks(&self, ui: &egui::Ui, painter: &egui::Painter, rect: egui::Rect) {
        let timeline = self.session.timeline();
        let provisional = self.session.provisional();
        let selection = &self.session.view.selection;

        for (idx, track) in timeline.tracks().iter().enumerate() {
            let row = egui::Rect::from_min_size(
                egui::pos2(rect.left(), rect.top() + idx as f32 * TRACK_HEIGHT),
                egui::vec2(rect.width(), TRACK_HEIGHT),
            );
            painter.rect_filled(row, 0.0, ui.style().visuals.widgets.noninteractive.bg_fill);
            painter.line_segment(
                [row.left_bottom(), row.right_bottom()],
                egui::Stroke::new(1.0, ui.style().visuals.widgets.noninteractive.bg_stroke.color),
            );

            let base_color = match track.kind {
                TrackKind::Video => egui::Color32::from_rgb(100, 180, 255),
                TrackKind::Audio => egui::Color32::from_rgb(180, 255, 100),
                TrackKind::Text => egui::Color32::from_rgb(210, 160, 255),
            };

            for clip in timeline.clips_on_track(&track.track_id).unwrap_or_default() {
                let (bounds, dragging) = match provisional {
                    Some((id, bounds)) if id == clip.clip_id => (bounds, true),
                    _ => (ClipBounds::of(clip), false),
                };
                let left = self.time_to_x(bounds.start_ms as f64, rect);
                let right = self.time_to_x(bounds.end_ms() as f64, rect);
                if right < rect.left() || left > rect.right() {
                    continue;
                }
                let clip_rect = egui::Rect::from_min_max(
                    egui::pos2(left, row.top() + 10.0),
                    egui::pos2(right, row.top() + 10.0 + CLIP_HEIGHT),
                );

                let is_selected = selection.contains(&clip.clip_id);
                let mut color = if is_selected {
                    egui::Color32::from_rgb(255, 180, 100)
                } else {
                    base_color
                };
                if dragging {
                    color = color.gamma_multiply(0.7);
                }
                painter.rect_filled(clip_rect, 4.0, color);

                let border = if is_selected {
                    egui::Color32::WHITE
                } else {
                    egui::Color32::from_black_alpha(50)
                };
                painter.rect_stroke(
                    clip_rect,
                    4.0,
                    egui::Stroke::new(1.0, border),
                    StrokeKind::Inside,
                );

                if clip_rect.width() > 40.0 {
                    painter.text(
                        clip_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!(
                            "{} ({})",
                            clip.asset_id,
                            format_ms(bounds.duration_ms() as f64)
                        ),
                        egui::FontId::proportional(12.0),
                        egui::Color32::BLACK,
                    );
                }
            }
        }
    }

    fn draw_range(&self, painter: &egui::Painter, ruler: egui::Rect, tracks: egui::Rect) {
        let full = egui::Rect::from_min_max(ruler.left_top(), tracks.right_bottom());
        match self.session.view.selection.range_pick() {
            RangePick::None => {}
            RangePick::Pending { start_ms } => {
                let x = self.time_to_x(start_ms as f64, ruler);
                painter.line_segment(
                    [egui::pos2(x, full.top()), egui::pos2(x, full.bottom())],
                    egui::Stroke::new(1.0, egui::Color32::YELLOW),
                );
            }
            RangePick::Committed(range) => {
                let lo = self.time_to_x(range.lo() as f64, ruler).max(full.left());
                let hi = self.time_to_x(range.hi() as f64, ruler).min(full.right());
                if hi > lo {
                    let band = egui::Rect::from_x_y_ranges(lo..=hi, full.y_range());
                    let tint = egui::Color32::from_rgba_unmultiplied(255, 220, 0, 30);
                    painter.rect_filled(band, 0.0, tint);
                }
            }
        }
    }

    fn draw_markers(&self, painter: &egui::Painter, ruler: egui::Rect, tracks: egui::Rect) {
        let color = egui::Color32::from_rgb(255, 140, 0);
        for marker in self.session.timeline().markers() {
            let x = self.time_to_x(marker.t_ms as f64, ruler);
            if x < ruler.left() || x > ruler.right() {
                continue;
            }
            painter.line_segment(
                [egui::pos2(x, ruler.top()), egui::pos2(x, tracks.bottom())],
                egui::Stroke::new(1.0, color),
            );
            if !marker.label.is_empty() {
                painter.text(
                    egui::pos2(x + 3.0, ruler.top() + 2.0),
                    egui::Align2::LEFT_TOP,
                    &marker.label,
                    egui::FontId::proportional(10.0),
                    color,
                );
            }
        }
    }

    fn draw_marquee(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(marquee) = self.session.gesture().marquee() else {
            return;
        };
        let to_screen = |p: ContentPos| {
            egui::pos2(
                rect.left() + (p.x - self.session.view.scroll_x()) as f32,
                rect.top() + p.y as f32,
            )
        };
        let area = egui::Rect::from_two_pos(to_screen(marquee.origin), to_screen(marquee.current));
        painter.rect_filled(area, 0.0, egui::Color32::from_white_alpha(20));
        painter.rect_stroke(
            area,
            0.0,
            egui::Stroke::new(1.0, egui::Color32::WHITE),
            StrokeKind::Outside,
        );
    }

    fn draw_playhead(&self, painter: &egui::Painter, ruler: egui::Rect, tracks: egui::Rect) {
        let x = self.time_to_x(self.session.view.playback.playhead_ms, ruler);
        if x < ruler.left() || x > ruler.right() {
            return;
        }
        painter.line_segment(
            [egui::pos2(x, ruler.top()), egui::pos2(x, tracks.bottom())],
            egui::Stroke::new(2.0, egui::Color32::RED),
        );
        let handle = egui::Rect::from_center_size(
            egui::pos2(x, ruler.top() + 15.0),
            egui::vec2(12.0, 12.0),
        );
        painter.rect_filled(handle, 6.0, egui::Color32::RED);
    }
}
