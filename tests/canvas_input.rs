mod common;

use std::time::Duration;

use quicksketch_lib::{game::GameEvent, Difficulty, GameStatus, InputOutcome, ScriptedRandom};
use tokio::time::sleep;

use common::*;

fn prediction_updates(events: Vec<GameEvent>) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::PredictionsUpdated { .. }))
        .count()
}

#[tokio::test(start_paused = true)]
async fn input_is_ignored_outside_a_round() {
    let (game, canvas) = pair(config(Difficulty::Easy, 2), ScriptedRandom::constant(0.99));

    assert!(!canvas.suppress_touch_scroll().await);
    assert_eq!(canvas.pointer_down(10.0, 10.0).await, InputOutcome::Ignored);
    assert_eq!(canvas.pointer_move(50.0, 50.0).await, InputOutcome::Ignored);
    assert!(!canvas.clear().await);
    assert!(canvas.load_rgba(WIDTH, HEIGHT, raster_with_coverage(5.0)).await.is_err());

    game.start_game().await;
    assert!(canvas.suppress_touch_scroll().await);
    assert!(canvas.pointer_down(10.0, 10.0).await.is_captured());

    game.end_round(false).await.unwrap();
    assert_eq!(game.snapshot().await.status, GameStatus::Intermission);
    assert!(!canvas.is_enabled().await);
    assert_eq!(canvas.pointer_move(80.0, 80.0).await, InputOutcome::Ignored);
    assert_eq!(canvas.pointer_up().await, InputOutcome::Ignored);
}

#[tokio::test(start_paused = true)]
async fn moves_without_a_press_are_ignored() {
    let (game, canvas) = pair(config(Difficulty::Easy, 1), ScriptedRandom::constant(0.99));
    game.start_game().await;

    assert_eq!(canvas.pointer_move(50.0, 50.0).await, InputOutcome::Ignored);
    assert_eq!(canvas.pointer_up().await, InputOutcome::Ignored);
    assert_eq!(canvas.coverage_pct().await, 0.0);
}

#[tokio::test(start_paused = true)]
async fn burst_of_moves_evaluates_once_after_quiet_period() {
    let (game, canvas) = pair(config(Difficulty::Easy, 1), ScriptedRandom::constant(0.99));
    let mut events = game.subscribe();
    game.start_game().await;

    canvas.pointer_down(100.0, 100.0).await;
    for step in 1..=3 {
        let x = 100.0 + step as f32 * 60.0;
        assert!(canvas.pointer_move(x, 100.0).await.is_captured());
        sleep(Duration::from_millis(200)).await;
    }
    assert_eq!(prediction_updates(drain(&mut events)), 0);

    // 500ms after the last move
    sleep(Duration::from_millis(301)).await;
    assert_eq!(prediction_updates(drain(&mut events)), 1);
    assert_eq!(game.snapshot().await.predictions.len(), 3);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(prediction_updates(drain(&mut events)), 0);
}

#[tokio::test(start_paused = true)]
async fn release_evaluates_immediately_and_supersedes_debounce() {
    let (game, canvas) = pair(config(Difficulty::Easy, 1), ScriptedRandom::constant(0.99));
    let mut events = game.subscribe();
    game.start_game().await;

    canvas.pointer_down(50.0, 200.0).await;
    canvas.pointer_move(300.0, 200.0).await;
    assert!(canvas.pointer_up().await.is_captured());

    assert_eq!(prediction_updates(drain(&mut events)), 1);
    assert!(!game.snapshot().await.predictions.is_empty());

    sleep(Duration::from_secs(2)).await;
    assert_eq!(prediction_updates(drain(&mut events)), 0);
}

#[tokio::test(start_paused = true)]
async fn leaving_the_canvas_acts_as_release() {
    let (game, canvas) = pair(config(Difficulty::Easy, 1), ScriptedRandom::constant(0.99));
    game.start_game().await;

    canvas.pointer_down(50.0, 200.0).await;
    canvas.pointer_move(60.0, 200.0).await;
    assert!(canvas.pointer_leave().await.is_captured());
    // a short dash is far below the detail threshold
    let labels: Vec<String> = game
        .snapshot()
        .await
        .predictions
        .into_iter()
        .map(|p| p.label)
        .collect();
    assert_eq!(labels, vec!["Need more detail", "Try drawing more", "Keep going"]);
}

#[tokio::test(start_paused = true)]
async fn teardown_mid_debounce_fires_nothing() {
    let (game, canvas) = pair(config(Difficulty::Easy, 1), ScriptedRandom::constant(0.0));
    let mut events = game.subscribe();
    game.start_game().await;

    canvas.pointer_down(10.0, 200.0).await;
    canvas.pointer_move(590.0, 200.0).await;
    sleep(Duration::from_millis(250)).await;
    canvas.teardown().await;

    sleep(Duration::from_secs(3)).await;
    assert_eq!(prediction_updates(drain(&mut events)), 0);
    assert!(game.snapshot().await.predictions.is_empty());
    assert_eq!(canvas.pointer_down(10.0, 10.0).await, InputOutcome::Ignored);
    assert!(canvas.evaluate_now().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_pending_success_announcement() {
    let (game, canvas) = pair(config(Difficulty::Easy, 1), ScriptedRandom::constant(0.0));
    game.start_game().await;

    canvas.load_rgba(WIDTH, HEIGHT, raster_with_coverage(5.0)).await.unwrap();
    assert!(canvas.evaluate_now().await.unwrap().is_match());
    canvas.teardown().await;

    sleep(Duration::from_secs(3)).await;
    let snapshot = game.snapshot().await;
    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.score, 0);
}

#[tokio::test(start_paused = true)]
async fn new_round_starts_on_a_blank_canvas() {
    let (game, canvas) = pair(config(Difficulty::Easy, 2), ScriptedRandom::constant(0.99));
    game.start_game().await;

    canvas.pointer_down(10.0, 10.0).await;
    canvas.pointer_move(300.0, 300.0).await;
    assert!(canvas.coverage_pct().await > 0.0);

    game.end_round(false).await.unwrap();
    sleep(Duration::from_secs(2)).await;
    assert!(canvas.is_enabled().await);
    assert_eq!(canvas.coverage_pct().await, 0.0);
    assert_eq!(canvas.pointer_up().await, InputOutcome::Ignored);
}

#[tokio::test(start_paused = true)]
async fn clear_wipes_the_drawing() {
    let (game, canvas) = pair(config(Difficulty::Easy, 1), ScriptedRandom::constant(0.99));
    game.start_game().await;

    canvas.pointer_down(10.0, 10.0).await;
    canvas.pointer_move(300.0, 300.0).await;
    canvas.pointer_up().await;
    assert!(canvas.clear().await);
    assert_eq!(canvas.coverage_pct().await, 0.0);
}
