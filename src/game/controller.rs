use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    canvas::DrawingSurface,
    config::GameConfig,
    prompts::Vocabulary,
    rng::{BoxedRandom, RandomSource, SeededRandom},
};

use super::{
    events::GameEvent,
    snapshot::{FinalResults, GameSnapshot},
    state::{Difficulty, GameState, GameStatus, RoundContext, RoundSummary, TickOutcome},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const EVENT_CAPACITY: usize = 256;

/// Timers owned by the running session.
struct SessionTasks {
    session_token: CancellationToken,
    round_token: Option<CancellationToken>,
    ticker: Option<JoinHandle<()>>,
    intermission: Option<JoinHandle<()>>,
}

impl SessionTasks {
    fn new(parent: &CancellationToken) -> Self {
        Self {
            session_token: parent.child_token(),
            round_token: None,
            ticker: None,
            intermission: None,
        }
    }

    fn stop_round(&mut self) {
        if let Some(token) = self.round_token.take() {
            token.cancel();
        }
        // The ticker may be the caller, so it is never aborted; it observes
        // the cancelled token and exits on its own.
        self.ticker.take();
    }

    fn cancel_all(&mut self) {
        self.stop_round();
        self.session_token.cancel();
        self.intermission.take();
    }
}

/// Owns one game session end to end: prompt selection, countdown, scoring and
/// round transitions. Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct RoundController {
    state: Arc<Mutex<GameState>>,
    surface: Arc<Mutex<DrawingSurface>>,
    vocabulary: Arc<Vocabulary>,
    rng: Arc<Mutex<BoxedRandom>>,
    config: Arc<GameConfig>,
    selected_difficulty: Arc<Mutex<Difficulty>>,
    tasks: Arc<Mutex<SessionTasks>>,
    events: broadcast::Sender<GameEvent>,
    disposed: CancellationToken,
}

impl RoundController {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_random(config, Box::new(SeededRandom::from_entropy()))
    }

    /// Builds a controller drawing every random decision from `rng`.
    pub fn with_random(config: GameConfig, rng: BoxedRandom) -> Result<Self> {
        config.validate()?;

        let vocabulary = match &config.categories {
            Some(labels) => Vocabulary::new(labels.iter().cloned()),
            None => Vocabulary::default(),
        };
        let surface = DrawingSurface::new(
            config.canvas.width,
            config.canvas.height,
            config.canvas.line_width,
        );
        let disposed = CancellationToken::new();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            state: Arc::new(Mutex::new(GameState::new())),
            surface: Arc::new(Mutex::new(surface)),
            vocabulary: Arc::new(vocabulary),
            rng: Arc::new(Mutex::new(rng)),
            selected_difficulty: Arc::new(Mutex::new(config.difficulty)),
            tasks: Arc::new(Mutex::new(SessionTasks::new(&disposed))),
            config: Arc::new(config),
            events,
            disposed,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub(crate) fn surface(&self) -> Arc<Mutex<DrawingSurface>> {
        self.surface.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.is_cancelled()
    }

    pub async fn is_drawing(&self) -> bool {
        !self.is_disposed() && self.state.lock().await.is_drawing()
    }

    pub async fn active_round_id(&self) -> Option<u64> {
        if self.is_disposed() {
            return None;
        }
        self.state.lock().await.active_round_id()
    }

    pub async fn round_context(&self) -> Option<RoundContext> {
        if self.is_disposed() {
            return None;
        }
        self.state.lock().await.round_context()
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        let difficulty = *self.selected_difficulty.lock().await;
        let state = self.state.lock().await;
        GameSnapshot::from_state(&state, difficulty, self.config.total_rounds)
    }

    /// Picks the tier for the next `start_game`. A running session keeps its
    /// own tier.
    pub async fn set_difficulty(&self, difficulty: Difficulty) {
        *self.selected_difficulty.lock().await = difficulty;
    }

    /// Starts a fresh session at round 0, discarding any session in progress.
    pub async fn start_game(&self) {
        if self.is_disposed() {
            return;
        }

        let difficulty = *self.selected_difficulty.lock().await;
        {
            let mut tasks = self.tasks.lock().await;
            tasks.cancel_all();
            *tasks = SessionTasks::new(&self.disposed);
        }
        {
            let mut state = self.state.lock().await;
            state.begin_session(difficulty, self.config.total_rounds, Utc::now());
            if let Some(session) = &state.session {
                log_info!(
                    "session {} started: {} rounds on {}",
                    session.id,
                    session.total_rounds,
                    difficulty
                );
            }
        }

        self.start_round().await;
    }

    /// Begins the round at the current index with an unused prompt. Returns
    /// false unless the session is between rounds.
    pub async fn start_round(&self) -> bool {
        if self.is_disposed() {
            return false;
        }

        let round = {
            let mut state = self.state.lock().await;
            if state.status != GameStatus::Intermission {
                return false;
            }

            let used = state
                .session
                .as_ref()
                .map(|s| s.completed_prompts.clone())
                .unwrap_or_default();
            let prompt = {
                let mut rng = self.rng.lock().await;
                self.vocabulary.pick_unused(&used, &mut **rng)
            }
            .unwrap_or_else(|| {
                log_info!(
                    "prompt pool exhausted, falling back to {:?}",
                    self.config.fallback_prompt
                );
                self.config.fallback_prompt.clone()
            });

            let Some(round) = state.begin_round(prompt).cloned() else {
                return false;
            };
            // Cleared under the state lock so no stroke lands between the
            // round starting and the wipe.
            self.surface.lock().await.clear();
            round
        };

        {
            let mut tasks = self.tasks.lock().await;
            tasks.stop_round();
            tasks.intermission.take();
            let token = tasks.session_token.child_token();
            tasks.round_token = Some(token.clone());
            tasks.ticker = Some(self.spawn_ticker(round.id, token));
        }

        log_info!(
            "round {} ({}/{}) started: draw {:?} in {}s",
            round.id,
            round.index + 1,
            self.config.total_rounds,
            round.prompt,
            round.time_budget_secs
        );
        let _ = self.events.send(GameEvent::RoundStarted {
            round_id: round.id,
            index: round.index,
            prompt: round.prompt,
            time_budget_secs: round.time_budget_secs,
        });
        true
    }

    /// Ends the running round. No-op (returns `None`) outside an active round.
    pub async fn end_round(&self, success: bool) -> Option<RoundSummary> {
        self.finish(None, success).await
    }

    /// Ends round `round_id` only if it is still the running one. Used by
    /// delayed callbacks that may outlive their round.
    pub async fn end_round_for(&self, round_id: u64, success: bool) -> Option<RoundSummary> {
        self.finish(Some(round_id), success).await
    }

    /// Cancels every pending timer and returns to the pre-start state.
    pub async fn reset_game(&self) {
        {
            let mut tasks = self.tasks.lock().await;
            tasks.cancel_all();
            *tasks = SessionTasks::new(&self.disposed);
        }
        self.state.lock().await.reset();
        self.surface.lock().await.clear();

        log_info!("game reset");
        let _ = self.events.send(GameEvent::Reset);
    }

    /// Teardown: cancels all timers. Every later operation is a no-op.
    pub async fn shutdown(&self) {
        self.disposed.cancel();
        self.tasks.lock().await.cancel_all();
        log_info!("round controller shut down");
    }

    /// Records a fresh guess list for `round_id`.
    pub async fn publish_predictions(
        &self,
        round_id: u64,
        predictions: Vec<String>,
        coverage_pct: f64,
    ) -> bool {
        if self.is_disposed() {
            return false;
        }
        let accepted = self
            .state
            .lock()
            .await
            .set_predictions(round_id, predictions.clone());
        if accepted {
            let _ = self.events.send(GameEvent::PredictionsUpdated {
                round_id,
                predictions,
                coverage_pct,
            });
        }
        accepted
    }

    /// Runs `f` against the shared random source.
    pub async fn draw_random<T>(&self, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
        let mut rng = self.rng.lock().await;
        f(&mut **rng)
    }

    async fn finish(&self, round_id: Option<u64>, success: bool) -> Option<RoundSummary> {
        if self.is_disposed() {
            return None;
        }

        let (summary, results) = {
            let mut state = self.state.lock().await;
            let summary = state.finish_round(round_id, success, Utc::now())?;
            let results = state
                .session
                .as_ref()
                .filter(|_| summary.game_over)
                .map(|s| FinalResults::new(s.score, s.total_rounds, s.completed_prompts.clone()));
            (summary, results)
        };

        self.tasks.lock().await.stop_round();

        log_info!(
            "round {} ended ({}): {:?} +{} points, score {}",
            summary.round_id,
            if summary.success { "success" } else { "timeout" },
            summary.prompt,
            summary.points,
            summary.score
        );
        let _ = self.events.send(GameEvent::RoundEnded(summary.clone()));

        match results {
            Some(results) => {
                log_info!("game over: {} points, rating {}", results.score, results.rating);
                let _ = self.events.send(GameEvent::GameOver(results));
            }
            None => self.schedule_next_round().await,
        }

        Some(summary)
    }

    async fn schedule_next_round(&self) {
        let mut tasks = self.tasks.lock().await;
        let token = tasks.session_token.clone();
        let controller = self.clone();
        let delay = self.config.timing.intermission();

        tasks.intermission = Some(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep(delay) => {
                    if !token.is_cancelled() {
                        controller.start_round().await;
                    }
                }
            }
        }));
    }

    fn spawn_ticker(&self, round_id: u64, token: CancellationToken) -> JoinHandle<()> {
        let controller = self.clone();
        let tick = self.config.timing.tick();

        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if !controller.on_tick(round_id).await {
                            break;
                        }
                    }
                }
            }
        })
    }

    // Returns false once the countdown for `round_id` is over.
    async fn on_tick(&self, round_id: u64) -> bool {
        let outcome = self.state.lock().await.tick(round_id);
        match outcome {
            TickOutcome::Continue {
                remaining_secs,
                low_time,
            } => {
                log_debug!("round {} tick: {}s left", round_id, remaining_secs);
                let _ = self.events.send(GameEvent::Tick {
                    round_id,
                    remaining_secs,
                });
                if low_time {
                    let _ = self.events.send(GameEvent::LowTime {
                        round_id,
                        remaining_secs,
                    });
                }
                true
            }
            TickOutcome::Expired => {
                self.finish(Some(round_id), false).await;
                false
            }
            TickOutcome::Stale => false,
        }
    }
}
