use serde::Serialize;

use super::state::{Difficulty, GameState, GameStatus, RoundOutcome};

/// Colour band of the countdown bar.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimeUrgency {
    Calm,
    Warning,
    Critical,
}

impl TimeUrgency {
    pub fn from_remaining(remaining_secs: u32) -> Self {
        if remaining_secs < 5 {
            TimeUrgency::Critical
        } else if remaining_secs < 10 {
            TimeUrgency::Warning
        } else {
            TimeUrgency::Calm
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionView {
    pub label: String,
    pub is_match: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinalResults {
    pub score: u32,
    pub total_rounds: usize,
    pub completed_prompts: Vec<String>,
    /// Star rating, 1 to 5.
    pub rating: u8,
}

impl FinalResults {
    pub fn new(score: u32, total_rounds: usize, completed_prompts: Vec<String>) -> Self {
        Self {
            rating: rating_for(score, total_rounds),
            score,
            total_rounds,
            completed_prompts,
        }
    }
}

/// Star rating from the average score per round.
pub fn rating_for(score: u32, total_rounds: usize) -> u8 {
    let average = score as f64 / total_rounds.max(1) as f64;
    if average > 25.0 {
        5
    } else if average > 20.0 {
        4
    } else if average > 15.0 {
        3
    } else if average > 10.0 {
        2
    } else {
        1
    }
}

/// Everything a view layer needs to render one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub prompt: Option<String>,
    pub remaining_secs: u32,
    pub time_budget_secs: u32,
    pub progress_percent: f64,
    pub urgency: TimeUrgency,
    pub score: u32,
    pub round_index: usize,
    pub total_rounds: usize,
    pub predictions: Vec<PredictionView>,
    pub last_outcome: Option<RoundOutcome>,
    pub is_drawing: bool,
    pub game_over: bool,
    pub results: Option<FinalResults>,
}

impl GameSnapshot {
    /// `difficulty` and `total_rounds` describe the next game when no session
    /// is active.
    pub fn from_state(state: &GameState, difficulty: Difficulty, total_rounds: usize) -> Self {
        let session = state.session.as_ref();
        let round = state.round.as_ref();

        let difficulty = session.map(|s| s.difficulty).unwrap_or(difficulty);
        let total_rounds = session.map(|s| s.total_rounds).unwrap_or(total_rounds);
        let time_budget_secs = round
            .map(|r| r.time_budget_secs)
            .unwrap_or_else(|| difficulty.time_budget_secs());
        let remaining_secs = round.map(|r| r.remaining_secs).unwrap_or(time_budget_secs);

        let predictions = round
            .map(|r| {
                r.predictions
                    .iter()
                    .map(|label| PredictionView {
                        is_match: *label == r.prompt,
                        label: label.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let game_over = state.status == GameStatus::Finished;
        let results = session.filter(|_| game_over).map(|s| {
            FinalResults::new(s.score, s.total_rounds, s.completed_prompts.clone())
        });

        Self {
            status: state.status,
            difficulty,
            prompt: round.map(|r| r.prompt.clone()),
            remaining_secs,
            time_budget_secs,
            progress_percent: if time_budget_secs == 0 {
                0.0
            } else {
                remaining_secs as f64 / time_budget_secs as f64 * 100.0
            },
            urgency: TimeUrgency::from_remaining(remaining_secs),
            score: session.map(|s| s.score).unwrap_or(0),
            round_index: session.map(|s| s.round_index).unwrap_or(0),
            total_rounds,
            predictions,
            last_outcome: round
                .map(|r| r.outcome)
                .filter(|outcome| *outcome != RoundOutcome::Pending),
            is_drawing: state.is_drawing(),
            game_over,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn rating_bands_follow_average_score() {
        assert_eq!(rating_for(0, 6), 1);
        assert_eq!(rating_for(60, 6), 1);
        assert_eq!(rating_for(61, 6), 2);
        assert_eq!(rating_for(121, 6), 4);
        assert_eq!(rating_for(180, 6), 5);
        assert_eq!(rating_for(10, 0), 1);
    }

    #[test]
    fn urgency_bands() {
        assert_eq!(TimeUrgency::from_remaining(20), TimeUrgency::Calm);
        assert_eq!(TimeUrgency::from_remaining(10), TimeUrgency::Calm);
        assert_eq!(TimeUrgency::from_remaining(9), TimeUrgency::Warning);
        assert_eq!(TimeUrgency::from_remaining(4), TimeUrgency::Critical);
    }

    #[test]
    fn idle_snapshot_describes_next_game() {
        let snapshot = GameSnapshot::from_state(&GameState::new(), Difficulty::Hard, 4);
        assert_eq!(snapshot.status, GameStatus::NotStarted);
        assert_eq!(snapshot.time_budget_secs, 15);
        assert_eq!(snapshot.total_rounds, 4);
        assert!(snapshot.prompt.is_none());
        assert!(!snapshot.is_drawing);
        assert!(snapshot.results.is_none());
    }

    #[test]
    fn predictions_flag_the_prompt() {
        let mut state = GameState::new();
        state.begin_session(Difficulty::Medium, 6, Utc::now());
        let id = state.begin_round("cat".into()).unwrap().id;
        state.set_predictions(id, vec!["dog".into(), "cat".into(), "sun".into()]);

        let snapshot = GameSnapshot::from_state(&state, Difficulty::Easy, 1);
        assert_eq!(snapshot.difficulty, Difficulty::Medium);
        assert_eq!(snapshot.prompt.as_deref(), Some("cat"));
        let matches: Vec<bool> = snapshot.predictions.iter().map(|p| p.is_match).collect();
        assert_eq!(matches, vec![false, true, false]);
        assert_eq!(snapshot.progress_percent, 100.0);
    }

    #[test]
    fn finished_snapshot_carries_results() {
        let mut state = GameState::new();
        state.begin_session(Difficulty::Hard, 1, Utc::now());
        state.begin_round("cat".into());
        state.finish_round(None, true, Utc::now());

        let snapshot = GameSnapshot::from_state(&state, Difficulty::Easy, 6);
        assert!(snapshot.game_over);
        let results = snapshot.results.unwrap();
        assert_eq!(results.score, 30);
        assert_eq!(results.completed_prompts, vec!["cat".to_string()]);
        assert_eq!(results.rating, 5);

        let json = serde_json::to_value(&snapshot.last_outcome).unwrap();
        assert_eq!(json, serde_json::json!("success"));
    }
}
