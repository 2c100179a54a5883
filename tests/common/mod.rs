#![allow(dead_code)]

use quicksketch_lib::{
    game::GameEvent, CanvasController, Difficulty, GameConfig, RoundController, ScriptedRandom,
};
use tokio::sync::broadcast::{error::TryRecvError, Receiver};

pub const WIDTH: u32 = 600;
pub const HEIGHT: u32 = 400;

pub fn config(difficulty: Difficulty, rounds: usize) -> GameConfig {
    let mut config = GameConfig::default();
    config.difficulty = difficulty;
    config.total_rounds = rounds;
    config
}

pub fn controller(config: GameConfig, rng: ScriptedRandom) -> RoundController {
    RoundController::with_random(config, Box::new(rng)).unwrap()
}

pub fn pair(config: GameConfig, rng: ScriptedRandom) -> (RoundController, CanvasController) {
    let game = controller(config, rng);
    let canvas = CanvasController::new(game.clone());
    (game, canvas)
}

/// White 600x400 RGBA buffer with the first `percent` of pixels inked.
pub fn raster_with_coverage(percent: f64) -> Vec<u8> {
    let total = (WIDTH * HEIGHT) as usize;
    let inked = (total as f64 * percent / 100.0).round() as usize;
    let mut pixels = vec![255u8; total * 4];
    for pixel in pixels.chunks_exact_mut(4).take(inked) {
        pixel.copy_from_slice(&[0, 0, 0, 255]);
    }
    pixels
}

pub async fn next_event(events: &mut Receiver<GameEvent>, pred: impl Fn(&GameEvent) -> bool) -> GameEvent {
    loop {
        let event = events.recv().await.unwrap();
        if pred(&event) {
            return event;
        }
    }
}

/// Events already queued, without waiting.
pub fn drain(events: &mut Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut out = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return out,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
}
