use crate::backend::memory::InMemoryBackend;
use crate::ops::geometry::format_ms;
use crate::types::selection::RangePick;
use crate::types::session::EditorSession;
use crate::ui::gesture::KeyCommand;
use crate::ui::timeline_widget::{TimelineEvent, TimelineWidget};
use crate::ui::video_player::VideoPlayer;
use eframe::egui;
use serde_json::json;
use std::time::{Duration, Instant};

const NOTICE_TTL: Duration = Duration::from_secs(4);
/// How often the demo backend moves its task queue forward.
const TASK_STEP: Duration = Duration::from_millis(750);

pub struct AppState {
    pub session: EditorSession,
    pub backend: InMemoryBackend,
    pub video_player: VideoPlayer,
    pub notices: Vec<(String, Instant)>,
    pub prompt: String,
}

pub struct CutlineApp {
    pub state: AppState,
    last_task_step: Instant,
}

impl CutlineApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            last_task_step: Instant::now(),
        }
    }

    /// Ship queued requests to the backend and apply its replies in order.
    fn pump_backend(&mut self) {
        let state = &mut self.state;
        for envelope in state.session.drain_requests() {
            for event in state.backend.handle(envelope) {
                state.session.apply_event(event, &mut state.video_player);
            }
        }
        let now = Instant::now();
        if now.duration_since(self.last_task_step) >= TASK_STEP {
            self.last_task_step = now;
            if let Some(event) = state.backend.step_tasks() {
                state.session.apply_event(event, &mut state.video_player);
            }
        }
        for notice in state.session.drain_notices() {
            state.notices.push((notice.notice_text(), now));
        }
        state.notices.retain(|(_, at)| now.duration_since(*at) < NOTICE_TTL);
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let state = &mut self.state;
        let (space, delete, select_all, escape) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.modifiers.command && i.key_pressed(egui::Key::A),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if space {
            state
                .session
                .toggle_playback(Instant::now(), &mut state.video_player);
        }
        if delete {
            state.session.key(KeyCommand::DeleteSelection);
        }
        if select_all {
            state.session.key(KeyCommand::SelectAll);
        }
        if escape {
            state.session.cancel_gesture();
            state.session.key(KeyCommand::Escape);
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let state = &mut self.state;
        ui.horizontal(|ui| {
            let playing = state.session.view.playback.is_playing;
            if ui.button(if playing { "Pause" } else { "Play" }).clicked() {
                state
                    .session
                    .toggle_playback(Instant::now(), &mut state.video_player);
            }
            if ui.button("⏮").clicked() {
                state.session.seek(0.0, &mut state.video_player);
            }
            ui.label(format!(
                "{} / {}",
                format_ms(state.session.view.playback.playhead_ms),
                format_ms(state.session.timeline().duration_ms() as f64)
            ));
            ui.separator();

            if ui.button("−").clicked() {
                state.session.zoom_out();
            }
            ui.label(format!("{:.0} px/s", state.session.view.zoom()));
            if ui.button("+").clicked() {
                state.session.zoom_in();
            }
            ui.checkbox(&mut state.session.view.grid_snap, "Grid snap");
            ui.checkbox(&mut state.session.view.target_snap, "Edge snap");
            ui.separator();

            if ui.button("Add marker").clicked() {
                state.session.add_marker_at_playhead(None, None);
            }
            if ui.button("Capture frame").clicked() && state.session.capture_frame().is_none() {
                state
                    .notices
                    .push(("Nothing to capture at the playhead.".to_string(), Instant::now()));
            }
            ui.separator();

            ui.add(egui::TextEdit::singleline(&mut state.prompt).hint_text("Prompt"));
            if ui.button("Generate").clicked() {
                let mut input = serde_json::Map::new();
                input.insert("prompt".to_string(), json!(state.prompt));
                // Busy is reported through the notice list
                let _ = state.session.request_generation(input, Vec::new());
            }
        });
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        let session = &mut self.state.session;
        ui.heading(session.snapshot().name.as_str());
        ui.separator();

        ui.label(format!("Selected clips: {}", session.view.selection.len()));
        match session.view.selection.range_pick() {
            RangePick::None => {}
            RangePick::Pending { start_ms } => {
                ui.label(format!("Range from {}…", format_ms(start_ms as f64)));
            }
            RangePick::Committed(range) => {
                ui.label(format!(
                    "Range {} – {}",
                    format_ms(range.lo() as f64),
                    format_ms(range.hi() as f64)
                ));
            }
        }
        ui.separator();

        ui.label("Markers");
        let mut remove = None;
        for marker in session.timeline().markers() {
            ui.horizontal(|ui| {
                ui.label(format!("{} {}", format_ms(marker.t_ms as f64), marker.label));
                if ui.small_button("✕").clicked() {
                    remove = Some(marker.marker_id.clone());
                }
            });
        }
        if let Some(marker_id) = remove {
            let _ = session.remove_marker(&marker_id);
        }
        ui.separator();

        ui.label("Tasks");
        for task in session.tasks().tasks() {
            ui.label(format!("{} {} {:?}", task.task_id, task.kind, task.state));
        }
        if session.in_flight_count() > 0 {
            ui.label(format!("{} edits pending", session.in_flight_count()));
        }
    }
}

impl eframe::App for CutlineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.state.video_player.advance_clock(now);
        self.state
            .session
            .tick(now, &mut self.state.video_player);

        self.handle_keys(ctx);

        egui::TopBottomPanel::top("toolbar_panel").show(ctx, |ui| self.toolbar(ui));

        egui::SidePanel::right("project_panel").show(ctx, |ui| self.side_panel(ui));

        egui::TopBottomPanel::bottom("timeline_area_panel")
            .resizable(true)
            .min_height(250.0)
            .show(ctx, |ui| {
                let state = &mut self.state;
                let events = TimelineWidget::new(&mut state.session).show(ui);
                for event in events {
                    match event {
                        TimelineEvent::PlayheadMoved(t_ms) => {
                            state.session.seek(t_ms, &mut state.video_player);
                        }
                    }
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.state.video_player.show(ui);
            for (text, _) in &self.state.notices {
                ui.colored_label(egui::Color32::from_rgb(255, 160, 80), text.as_str());
            }
        });

        self.pump_backend();

        let session = &self.state.session;
        let tasks_pending = session.tasks().tasks().iter().any(|t| t.state.is_active());
        if session.view.playback.is_playing || !session.gesture().is_idle() {
            ctx.request_repaint();
        } else if !self.state.notices.is_empty() || tasks_pending {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
