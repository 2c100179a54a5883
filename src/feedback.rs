use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::broadcast::{error::RecvError, Receiver},
    task::JoinHandle,
};

use crate::game::GameEvent;

/// Sounds an audio layer plays in response to game events.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackCue {
    Tick,
    Success,
    GameOver,
}

impl FeedbackCue {
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::LowTime { .. } => Some(FeedbackCue::Tick),
            GameEvent::RoundEnded(summary) if summary.success => Some(FeedbackCue::Success),
            GameEvent::GameOver(_) => Some(FeedbackCue::GameOver),
            _ => None,
        }
    }

    /// Playback volume in `0.0..=1.0`.
    pub fn volume(&self) -> f32 {
        match self {
            FeedbackCue::Tick => 0.3,
            FeedbackCue::Success | FeedbackCue::GameOver => 0.5,
        }
    }
}

/// Whatever actually makes the noise.
pub trait FeedbackSink: Send + 'static {
    fn play(&mut self, cue: FeedbackCue);
}

/// Sink that only logs; used by the demo runner.
#[derive(Debug, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn play(&mut self, cue: FeedbackCue) {
        info!("cue {:?} at volume {:.1}", cue, cue.volume());
    }
}

/// Forwards cues from the event stream to a sink unless muted.
#[derive(Clone, Default)]
pub struct FeedbackListener {
    muted: Arc<AtomicBool>,
}

impl FeedbackListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    /// Toggles mute; returns the new state.
    pub fn toggle_muted(&self) -> bool {
        !self.muted.fetch_xor(true, Ordering::SeqCst)
    }

    /// Runs until the controller's event channel closes.
    pub fn spawn<S: FeedbackSink>(&self, mut events: Receiver<GameEvent>, mut sink: S) -> JoinHandle<()> {
        let muted = Arc::clone(&self.muted);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Some(cue) = FeedbackCue::from_event(&event) {
                            if !muted.load(Ordering::SeqCst) {
                                sink.play(cue);
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("feedback listener lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
