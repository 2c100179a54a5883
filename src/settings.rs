use anyhow::{Context, Result};
use log::warn;
use std::{
    env, fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::{config::GameConfig, game::Difficulty};

pub const DIFFICULTY_ENV: &str = "QUICKSKETCH_DIFFICULTY";
pub const ROUNDS_ENV: &str = "QUICKSKETCH_ROUNDS";
pub const DEBUG_ENV: &str = "QUICKSKETCH_DEBUG";

/// Game configuration backed by an optional JSON file.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<GameConfig>,
}

impl SettingsStore {
    /// Loads `path` if it exists. A malformed file falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings in {}: {}", path.display(), err);
                GameConfig::default()
            })
        } else {
            GameConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn config(&self) -> GameConfig {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validates and persists `config`.
    pub fn update(&self, config: GameConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&config)?;
        *guard = config;
        Ok(())
    }

    /// Current config with `QUICKSKETCH_*` environment overrides applied.
    pub fn effective_config(&self) -> Result<GameConfig> {
        let mut config = self.config();
        apply_env_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn persist(&self, data: &GameConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// Applies overrides read through `lookup`.
pub fn apply_env_overrides(
    config: &mut GameConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(value) = lookup(DIFFICULTY_ENV) {
        config.difficulty = value
            .parse::<Difficulty>()
            .with_context(|| format!("invalid {DIFFICULTY_ENV}"))?;
    }
    if let Some(value) = lookup(ROUNDS_ENV) {
        config.total_rounds = value
            .trim()
            .parse()
            .with_context(|| format!("invalid {ROUNDS_ENV}: {value:?}"))?;
    }
    Ok(())
}

/// `QUICKSKETCH_DEBUG=1` or `true` turns on debug logging.
pub fn debug_mode() -> bool {
    env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
