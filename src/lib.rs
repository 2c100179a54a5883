pub mod canvas;
pub mod config;
pub mod demo;
pub mod feedback;
pub mod game;
pub mod prompts;
pub mod rng;
pub mod settings;
mod utils;

use std::{env, path::PathBuf};

use anyhow::{Context, Result};

pub use canvas::{CanvasController, DrawingSurface, Evaluation, InputOutcome, Verdict};
pub use config::GameConfig;
pub use game::{Difficulty, GameEvent, GameSnapshot, GameStatus, RoundController};
pub use prompts::Vocabulary;
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};

use settings::SettingsStore;

const CONFIG_ENV: &str = "QUICKSKETCH_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "quicksketch.json";

/// Entry point of the demo binary: loads settings and autoplays one session.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    let level = if settings::debug_mode() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Quick Sketch starting up...");

    let settings_path = env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    let store = SettingsStore::new(settings_path)?;
    let config = store.effective_config()?;
    log::info!(
        "{} rounds on {}, {}x{} canvas",
        config.total_rounds,
        config.difficulty,
        config.canvas.width,
        config.canvas.height
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let results = runtime.block_on(demo::autoplay(config, None))?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
