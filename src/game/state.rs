use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Remaining time at or below which each tick raises the low-time cue.
pub const LOW_TIME_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Seconds on the clock at round start.
    pub fn time_budget_secs(&self) -> u32 {
        match self {
            Difficulty::Easy => 30,
            Difficulty::Medium => 20,
            Difficulty::Hard => 15,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }

    /// Points for a successful round finished with `remaining_secs` left.
    pub fn points_for(&self, remaining_secs: u32) -> u32 {
        (remaining_secs as f64 * self.multiplier()).ceil() as u32
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| anyhow!("unknown difficulty {value:?}, expected easy, medium or hard"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    NotStarted,
    Playing,
    /// Between a finished round and the next one.
    Intermission,
    Finished,
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::NotStarted
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoundOutcome {
    Pending,
    Success,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Generation number; timer callbacks carrying an older id are stale.
    pub id: u64,
    pub index: usize,
    pub prompt: String,
    pub time_budget_secs: u32,
    pub remaining_secs: u32,
    pub outcome: RoundOutcome,
    pub predictions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub difficulty: Difficulty,
    pub total_rounds: usize,
    pub score: u32,
    pub round_index: usize,
    pub completed_prompts: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// What a finished round contributed, returned by [`GameState::finish_round`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub round_id: u64,
    pub index: usize,
    pub prompt: String,
    pub success: bool,
    pub points: u32,
    pub score: u32,
    pub game_over: bool,
}

/// The slice of round state the guess heuristic reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundContext {
    pub round_id: u64,
    pub prompt: String,
    pub round_index: usize,
    pub total_rounds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a round that is no longer running.
    Stale,
    Continue { remaining_secs: u32, low_time: bool },
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub status: GameStatus,
    pub session: Option<GameSession>,
    pub round: Option<Round>,
    next_round_id: u64,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Id of the round currently accepting input.
    pub fn active_round_id(&self) -> Option<u64> {
        match (self.status, &self.round) {
            (GameStatus::Playing, Some(round)) => Some(round.id),
            _ => None,
        }
    }

    pub fn round_context(&self) -> Option<RoundContext> {
        self.active_round_id()?;
        let round = self.round.as_ref()?;
        let session = self.session.as_ref()?;
        Some(RoundContext {
            round_id: round.id,
            prompt: round.prompt.clone(),
            round_index: round.index,
            total_rounds: session.total_rounds,
        })
    }

    /// Replaces any previous session. The first round still has to be begun.
    pub fn begin_session(&mut self, difficulty: Difficulty, total_rounds: usize, now: DateTime<Utc>) {
        let next_round_id = self.next_round_id;
        *self = Self {
            status: GameStatus::Intermission,
            session: Some(GameSession {
                id: Uuid::new_v4().to_string(),
                difficulty,
                total_rounds: total_rounds.max(1),
                score: 0,
                round_index: 0,
                completed_prompts: Vec::new(),
                started_at: now,
                finished_at: None,
            }),
            round: None,
            next_round_id,
        };
    }

    /// Starts the round at the session's current index. Only valid between
    /// rounds.
    pub fn begin_round(&mut self, prompt: String) -> Option<&Round> {
        if self.status != GameStatus::Intermission {
            return None;
        }
        let session = self.session.as_ref()?;
        let budget = session.difficulty.time_budget_secs();

        self.next_round_id += 1;
        self.round = Some(Round {
            id: self.next_round_id,
            index: session.round_index,
            prompt,
            time_budget_secs: budget,
            remaining_secs: budget,
            outcome: RoundOutcome::Pending,
            predictions: Vec::new(),
        });
        self.status = GameStatus::Playing;
        self.round.as_ref()
    }

    /// Advances the countdown of round `round_id` by one second.
    pub fn tick(&mut self, round_id: u64) -> TickOutcome {
        if self.active_round_id() != Some(round_id) {
            return TickOutcome::Stale;
        }
        let Some(round) = self.round.as_mut() else {
            return TickOutcome::Stale;
        };

        if round.remaining_secs <= 1 {
            round.remaining_secs = 0;
            return TickOutcome::Expired;
        }

        let low_time = round.remaining_secs <= LOW_TIME_SECS;
        round.remaining_secs -= 1;
        TickOutcome::Continue {
            remaining_secs: round.remaining_secs,
            low_time,
        }
    }

    /// Replaces the guess list of the running round.
    pub fn set_predictions(&mut self, round_id: u64, predictions: Vec<String>) -> bool {
        if self.active_round_id() != Some(round_id) {
            return false;
        }
        match self.round.as_mut() {
            Some(round) => {
                round.predictions = predictions;
                true
            }
            None => false,
        }
    }

    /// Ends the running round. `round_id` pins the call to one round; `None`
    /// targets whichever round is running. Returns `None` when no matching
    /// round is running.
    pub fn finish_round(
        &mut self,
        round_id: Option<u64>,
        success: bool,
        now: DateTime<Utc>,
    ) -> Option<RoundSummary> {
        let active = self.active_round_id()?;
        if round_id.is_some_and(|id| id != active) {
            return None;
        }

        let round = self.round.as_mut()?;
        let session = self.session.as_mut()?;

        let points = if success {
            session.difficulty.points_for(round.remaining_secs)
        } else {
            0
        };
        round.outcome = if success {
            RoundOutcome::Success
        } else {
            RoundOutcome::Timeout
        };
        session.score += points;
        session.completed_prompts.push(round.prompt.clone());

        let game_over = round.index + 1 >= session.total_rounds;
        if game_over {
            session.finished_at = Some(now);
            self.status = GameStatus::Finished;
        } else {
            session.round_index += 1;
            self.status = GameStatus::Intermission;
        }

        Some(RoundSummary {
            round_id: round.id,
            index: round.index,
            prompt: round.prompt.clone(),
            success,
            points,
            score: session.score,
            game_over,
        })
    }

    /// Back to the pre-start state. Round ids keep increasing.
    pub fn reset(&mut self) {
        let next_round_id = self.next_round_id;
        *self = Self {
            next_round_id,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(difficulty: Difficulty, rounds: usize) -> GameState {
        let mut state = GameState::new();
        state.begin_session(difficulty, rounds, Utc::now());
        state
    }

    #[test]
    fn difficulty_table_matches_rules() {
        let table: Vec<_> = Difficulty::ALL
            .iter()
            .map(|d| (d.time_budget_secs(), d.multiplier()))
            .collect();
        assert_eq!(table, vec![(30, 1.0), (20, 1.5), (15, 2.0)]);
    }

    #[test]
    fn points_round_up() {
        assert_eq!(Difficulty::Medium.points_for(20), 30);
        assert_eq!(Difficulty::Medium.points_for(19), 29);
        assert_eq!(Difficulty::Medium.points_for(7), 11);
        assert_eq!(Difficulty::Hard.points_for(15), 30);
        assert_eq!(Difficulty::Easy.points_for(0), 0);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("nightmare".parse::<Difficulty>().is_err());
    }

    #[test]
    fn begin_round_only_between_rounds() {
        let mut fresh = GameState::new();
        assert!(fresh.begin_round("cat".into()).is_none());

        let mut state = started(Difficulty::Hard, 2);
        let round = state.begin_round("cat".into()).unwrap();
        assert_eq!(round.remaining_secs, 15);
        assert_eq!(round.index, 0);
        assert!(state.is_drawing());
        assert!(state.begin_round("dog".into()).is_none());
    }

    #[test]
    fn countdown_expires_after_budget_ticks() {
        let mut state = started(Difficulty::Hard, 1);
        let id = state.begin_round("cat".into()).unwrap().id;

        let mut low_ticks = 0;
        for step in 1..15 {
            match state.tick(id) {
                TickOutcome::Continue {
                    remaining_secs,
                    low_time,
                } => {
                    assert_eq!(remaining_secs, 15 - step);
                    if low_time {
                        low_ticks += 1;
                    }
                }
                other => panic!("unexpected {other:?} at step {step}"),
            }
        }
        assert_eq!(state.tick(id), TickOutcome::Expired);
        // remaining 5, 4, 3, 2 before decrement
        assert_eq!(low_ticks, 4);
        assert_eq!(state.tick(id + 1), TickOutcome::Stale);
    }

    #[test]
    fn success_awards_points_and_advances() {
        let mut state = started(Difficulty::Medium, 3);
        let id = state.begin_round("cat".into()).unwrap().id;
        state.tick(id);

        let summary = state.finish_round(Some(id), true, Utc::now()).unwrap();
        assert_eq!(summary.points, 29);
        assert_eq!(summary.score, 29);
        assert!(!summary.game_over);
        assert_eq!(state.status, GameStatus::Intermission);

        let session = state.session.as_ref().unwrap();
        assert_eq!(session.round_index, 1);
        assert_eq!(session.completed_prompts, vec!["cat".to_string()]);
        assert_eq!(state.round.as_ref().unwrap().outcome, RoundOutcome::Success);
    }

    #[test]
    fn finish_is_noop_outside_active_round() {
        let mut state = started(Difficulty::Easy, 2);
        assert!(state.finish_round(None, true, Utc::now()).is_none());

        let id = state.begin_round("cat".into()).unwrap().id;
        assert!(state.finish_round(Some(id + 7), true, Utc::now()).is_none());
        assert!(state.finish_round(Some(id), false, Utc::now()).is_some());
        assert!(state.finish_round(Some(id), true, Utc::now()).is_none());
        assert_eq!(state.session.as_ref().unwrap().score, 0);
    }

    #[test]
    fn last_round_finishes_session() {
        let mut state = started(Difficulty::Easy, 2);
        for (i, prompt) in ["cat", "dog"].into_iter().enumerate() {
            state.begin_round(prompt.into()).unwrap();
            let summary = state.finish_round(None, false, Utc::now()).unwrap();
            assert_eq!(summary.game_over, i == 1);
        }
        assert_eq!(state.status, GameStatus::Finished);
        let session = state.session.as_ref().unwrap();
        assert!(session.finished_at.is_some());
        assert_eq!(session.completed_prompts.len(), 2);
        assert!(state.begin_round("sun".into()).is_none());
    }

    #[test]
    fn predictions_only_land_on_running_round() {
        let mut state = started(Difficulty::Easy, 2);
        let id = state.begin_round("cat".into()).unwrap().id;
        assert!(state.set_predictions(id, vec!["dog".into()]));
        assert!(!state.set_predictions(id + 1, vec!["sun".into()]));
        assert_eq!(state.round.as_ref().unwrap().predictions, vec!["dog".to_string()]);
    }

    #[test]
    fn reset_keeps_round_ids_increasing() {
        let mut state = started(Difficulty::Easy, 2);
        let first = state.begin_round("cat".into()).unwrap().id;
        state.reset();
        assert_eq!(state.status, GameStatus::NotStarted);
        assert!(state.session.is_none());

        state.begin_session(Difficulty::Easy, 2, Utc::now());
        let second = state.begin_round("cat".into()).unwrap().id;
        assert!(second > first);
    }
}
