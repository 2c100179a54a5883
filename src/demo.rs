//! Headless autoplay: a bot scribbles on the canvas until the session ends.

use std::time::Duration;

use anyhow::{bail, Result};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{sync::broadcast::error::RecvError, time};

use crate::{
    canvas::CanvasController,
    config::GameConfig,
    feedback::{FeedbackListener, LogSink},
    game::{FinalResults, GameEvent, RoundController},
    rng::{BoxedRandom, SeededRandom},
};

const STROKE_PAUSE: Duration = Duration::from_millis(700);
const MOVES_PER_STROKE: std::ops::RangeInclusive<u32> = 6..=14;

/// Plays one full session. `seed` makes prompts, guesses and strokes
/// reproducible.
pub async fn autoplay(config: GameConfig, seed: Option<u64>) -> Result<FinalResults> {
    let (game_rng, mut bot): (BoxedRandom, StdRng) = match seed {
        Some(seed) => (
            Box::new(SeededRandom::with_seed(seed)),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (Box::new(SeededRandom::from_entropy()), StdRng::from_entropy()),
    };

    let game = RoundController::with_random(config, game_rng)?;
    let canvas = CanvasController::new(game.clone());
    let cues = FeedbackListener::new().spawn(game.subscribe(), LogSink);
    let mut events = game.subscribe();

    game.start_game().await;

    let results = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(GameEvent::RoundStarted { index, prompt, time_budget_secs, .. }) => {
                    info!("round {}: drawing {:?} with {}s on the clock", index + 1, prompt, time_budget_secs);
                }
                Ok(GameEvent::PredictionsUpdated { predictions, coverage_pct, .. }) => {
                    info!("guesses at {:.1}% coverage: {}", coverage_pct, predictions.join(", "));
                }
                Ok(GameEvent::GameOver(results)) => break results,
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => bail!("game event stream closed before the session ended"),
            },
            _ = time::sleep(STROKE_PAUSE) => {
                if canvas.is_enabled().await {
                    scribble(&canvas, &mut bot, &game).await;
                }
            }
        }
    };

    canvas.teardown().await;
    game.shutdown().await;
    cues.abort();
    Ok(results)
}

async fn scribble(canvas: &CanvasController, bot: &mut StdRng, game: &RoundController) {
    let width = game.config().canvas.width as f32;
    let height = game.config().canvas.height as f32;

    let (mut x, mut y) = (bot.gen_range(0.0..width), bot.gen_range(0.0..height));
    if !canvas.pointer_down(x, y).await.is_captured() {
        return;
    }
    for _ in 0..bot.gen_range(MOVES_PER_STROKE) {
        x = (x + bot.gen_range(-80.0..80.0)).clamp(0.0, width);
        y = (y + bot.gen_range(-80.0..80.0)).clamp(0.0, height);
        canvas.pointer_move(x, y).await;
    }
    canvas.pointer_up().await;
}
