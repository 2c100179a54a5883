use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::{sync::Mutex, time};
use tokio_util::sync::CancellationToken;

use crate::game::RoundController;

use super::{
    coverage::coverage_pct,
    heuristic::{self, Evaluation},
    surface::DrawingSurface,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// What happened to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Drawing is disabled (between rounds, or torn down), no stroke is open,
    /// or the point is not finite.
    Ignored,
    Captured,
}

impl InputOutcome {
    pub fn is_captured(&self) -> bool {
        *self == InputOutcome::Captured
    }
}

/// Turns pointer input into strokes on the shared surface and feeds debounced
/// evaluations to the round controller.
#[derive(Clone)]
pub struct CanvasController {
    game: RoundController,
    surface: Arc<Mutex<DrawingSurface>>,
    debounce: Arc<Mutex<Option<CancellationToken>>>,
    torn_down: CancellationToken,
}

impl CanvasController {
    pub fn new(game: RoundController) -> Self {
        Self {
            surface: game.surface(),
            game,
            debounce: Arc::new(Mutex::new(None)),
            torn_down: CancellationToken::new(),
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.is_cancelled()
    }

    /// Whether the surface accepts input right now.
    pub async fn is_enabled(&self) -> bool {
        !self.is_torn_down() && self.game.is_drawing().await
    }

    /// Hosts should block default touch scrolling while this is true.
    pub async fn suppress_touch_scroll(&self) -> bool {
        self.is_enabled().await
    }

    pub async fn coverage_pct(&self) -> f64 {
        self.surface.lock().await.coverage_pct()
    }

    pub async fn pointer_down(&self, x: f32, y: f32) -> InputOutcome {
        if !self.is_enabled().await {
            return InputOutcome::Ignored;
        }
        if !self.surface.lock().await.begin_stroke(x, y) {
            return InputOutcome::Ignored;
        }
        InputOutcome::Captured
    }

    /// Extends the open stroke and restarts the debounce window.
    pub async fn pointer_move(&self, x: f32, y: f32) -> InputOutcome {
        if self.is_torn_down() {
            return InputOutcome::Ignored;
        }
        let Some(round_id) = self.game.active_round_id().await else {
            return InputOutcome::Ignored;
        };
        if !self.surface.lock().await.extend_stroke(x, y) {
            return InputOutcome::Ignored;
        }
        self.schedule_debounce(round_id).await;
        InputOutcome::Captured
    }

    /// Closes the stroke and evaluates immediately, superseding any pending
    /// debounced evaluation.
    pub async fn pointer_up(&self) -> InputOutcome {
        if self.is_torn_down() {
            return InputOutcome::Ignored;
        }
        let was_stroking = self.surface.lock().await.end_stroke();
        if !was_stroking {
            return InputOutcome::Ignored;
        }
        self.cancel_debounce().await;
        match self.evaluate_now().await {
            Some(_) => InputOutcome::Captured,
            None => InputOutcome::Ignored,
        }
    }

    /// The pointer left the drawing area; treated as a release.
    pub async fn pointer_leave(&self) -> InputOutcome {
        self.pointer_up().await
    }

    /// Wipes the drawing. Only allowed while drawing is enabled.
    pub async fn clear(&self) -> bool {
        if !self.is_enabled().await {
            return false;
        }
        self.cancel_debounce().await;
        self.surface.lock().await.clear();
        true
    }

    /// Replaces the raster with one rendered by the host.
    pub async fn load_rgba(&self, width: u32, height: u32, pixels: Vec<u8>) -> Result<()> {
        if !self.is_enabled().await {
            bail!("drawing surface is disabled");
        }
        self.surface.lock().await.load_rgba(width, height, pixels)
    }

    /// Evaluates the current raster against the running round and publishes
    /// the guesses. Returns `None` when no round is running.
    pub async fn evaluate_now(&self) -> Option<Evaluation> {
        let round_id = self.game.active_round_id().await?;
        self.evaluate_for(round_id, &self.torn_down).await
    }

    /// Cancels every pending timer. Later input is ignored.
    pub async fn teardown(&self) {
        self.torn_down.cancel();
        self.cancel_debounce().await;
        self.surface.lock().await.end_stroke();
        log_info!("drawing surface torn down");
    }

    /// `guard` is the token of whoever asked for the evaluation; once it is
    /// cancelled nothing is published.
    async fn evaluate_for(&self, round_id: u64, guard: &CancellationToken) -> Option<Evaluation> {
        if guard.is_cancelled() {
            return None;
        }
        let round = self.game.round_context().await?;
        if round.round_id != round_id {
            return None;
        }

        let raster = self.surface.lock().await.snapshot();
        let coverage = coverage_pct(&raster);
        let config = &self.game.config().heuristic;
        let vocabulary = self.game.vocabulary();
        let evaluation = self
            .game
            .draw_random(|rng| heuristic::evaluate(coverage, &round, vocabulary, config, rng))
            .await;

        log_debug!(
            "round {} evaluated at {:.2}% coverage: {:?} {:?}",
            round_id,
            coverage,
            evaluation.verdict,
            evaluation.guesses
        );

        if guard.is_cancelled() {
            log_debug!("round {} evaluation superseded before publishing", round_id);
            return None;
        }
        if !self
            .game
            .publish_predictions(round_id, evaluation.guesses.clone(), coverage)
            .await
        {
            return None;
        }
        if evaluation.is_match() {
            self.schedule_success(round_id);
        }
        Some(evaluation)
    }

    async fn schedule_debounce(&self, round_id: u64) {
        let token = self.torn_down.child_token();
        if let Some(previous) = self.debounce.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        let canvas = self.clone();
        let delay = self.game.config().timing.debounce();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep(delay) => {
                    canvas.evaluate_for(round_id, &token).await;
                }
            }
        });
    }

    async fn cancel_debounce(&self) {
        if let Some(token) = self.debounce.lock().await.take() {
            token.cancel();
        }
    }

    fn schedule_success(&self, round_id: u64) {
        let token = self.torn_down.clone();
        let game = self.game.clone();
        let delay = self.game.config().timing.success_delay();
        log_info!("round {} matched, announcing in {:?}", round_id, delay);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep(delay) => {
                    if !token.is_cancelled() {
                        game.end_round_for(round_id, true).await;
                    }
                }
            }
        });
    }
}
