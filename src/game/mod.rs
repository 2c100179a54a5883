pub mod controller;
pub mod events;
pub mod snapshot;
pub mod state;

pub use controller::RoundController;
pub use events::GameEvent;
pub use snapshot::{FinalResults, GameSnapshot, PredictionView, TimeUrgency};
pub use state::{Difficulty, GameStatus, RoundContext, RoundOutcome, RoundSummary};
