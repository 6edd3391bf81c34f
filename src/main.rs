use cutline::backend::memory::InMemoryBackend;
use cutline::config::TimelineConfig;
use cutline::types::session::EditorSession;
use cutline::ui::app::{AppState, CutlineApp};
use cutline::ui::video_player::VideoPlayer;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "CUTLINE_CONFIG";

fn load_config() -> TimelineConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return TimelineConfig::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| TimelineConfig::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            log::info!("loaded config from {path}");
            config
        }
        Err(err) => {
            log::error!("ignoring config {path}: {err}");
            TimelineConfig::default()
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = load_config();
    let backend = InMemoryBackend::demo();
    let session = EditorSession::new(backend.snapshot().clone(), config);

    let app = CutlineApp::new(AppState {
        session,
        backend,
        video_player: VideoPlayer::new(),
        notices: Vec::new(),
        prompt: String::new(),
    });

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Cutline",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )?;
    Ok(())
}
