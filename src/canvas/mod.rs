pub mod controller;
pub mod coverage;
pub mod heuristic;
pub mod surface;

pub use controller::{CanvasController, InputOutcome};
pub use heuristic::{Evaluation, Verdict};
pub use surface::DrawingSurface;
