use serde::Serialize;

use super::snapshot::FinalResults;
use super::state::RoundSummary;

/// Broadcast by the round controller; the view and feedback layers subscribe.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    RoundStarted {
        round_id: u64,
        index: usize,
        prompt: String,
        time_budget_secs: u32,
    },
    #[serde(rename_all = "camelCase")]
    Tick { round_id: u64, remaining_secs: u32 },
    /// Emitted on ticks taken with little time left.
    #[serde(rename_all = "camelCase")]
    LowTime { round_id: u64, remaining_secs: u32 },
    #[serde(rename_all = "camelCase")]
    PredictionsUpdated {
        round_id: u64,
        predictions: Vec<String>,
        coverage_pct: f64,
    },
    RoundEnded(RoundSummary),
    GameOver(FinalResults),
    Reset,
}
