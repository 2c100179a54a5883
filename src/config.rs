use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::game::Difficulty;

/// Configuration for a game with tunable timings and heuristic thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Rounds per session
    pub total_rounds: usize,

    /// Tier used by the next `start_game`
    pub difficulty: Difficulty,

    /// Prompt reused once every category has been drawn
    pub fallback_prompt: String,

    /// Replaces the built-in category list when set
    pub categories: Option<Vec<String>>,

    pub timing: TimingConfig,
    pub canvas: CanvasConfig,
    pub heuristic: HeuristicConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 6,
            difficulty: Difficulty::Medium,
            fallback_prompt: "pencil".into(),
            categories: None,
            timing: TimingConfig::default(),
            canvas: CanvasConfig::default(),
            heuristic: HeuristicConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.total_rounds == 0 {
            bail!("totalRounds must be at least 1");
        }
        if self.fallback_prompt.trim().is_empty() {
            bail!("fallbackPrompt must not be empty");
        }
        if let Some(categories) = &self.categories {
            if categories.is_empty() {
                bail!("categories must not be empty when provided");
            }
        }
        if self.timing.tick_ms == 0 {
            bail!("timing.tickMs must be greater than zero");
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            bail!(
                "canvas must have a non-zero size, got {}x{}",
                self.canvas.width,
                self.canvas.height
            );
        }
        let h = &self.heuristic;
        if h.min_coverage_pct < 0.0 || h.match_coverage_pct < h.min_coverage_pct {
            bail!(
                "heuristic thresholds out of order: min {} / match {}",
                h.min_coverage_pct,
                h.match_coverage_pct
            );
        }
        if !(0.0..=1.0).contains(&h.base_match_probability) || h.match_probability_ramp < 0.0 {
            bail!("heuristic match probability must stay within [0, 1]");
        }
        Ok(())
    }
}

/// Timer periods, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// One countdown step (one second of round time)
    pub tick_ms: u64,
    /// Quiet period after the last pointer move before evaluating
    pub debounce_ms: u64,
    /// Delay between a matching guess and the success signal
    pub success_delay_ms: u64,
    /// Pause between a finished round and the next
    pub intermission_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            debounce_ms: 500,
            success_delay_ms: 1000,
            intermission_ms: 1500,
        }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }

    pub fn intermission(&self) -> Duration {
        Duration::from_millis(self.intermission_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub line_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            line_width: 8.0,
        }
    }
}

/// Thresholds of the guess heuristic. Coverage values are percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeuristicConfig {
    /// Below this the placeholder guesses are shown
    pub min_coverage_pct: f64,
    /// The prompt is only ever guessed strictly above this
    pub match_coverage_pct: f64,
    pub base_match_probability: f64,
    /// Added to the base probability in proportion to session progress
    pub match_probability_ramp: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            min_coverage_pct: 1.5,
            match_coverage_pct: 2.0,
            base_match_probability: 0.3,
            match_probability_ramp: 0.4,
        }
    }
}
