//! Synthetic recognizer. There is no model: guesses are random labels, and the
//! prompt shows up with a probability that grows as the session progresses,
//! provided enough of the canvas is inked.

use serde::Serialize;

use crate::{
    config::HeuristicConfig, game::RoundContext, prompts::Vocabulary, rng::RandomSource,
};

/// Shown while the drawing is too sparse to guess at.
pub const PLACEHOLDER_GUESSES: [&str; 3] = ["Need more detail", "Try drawing more", "Keep going"];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    /// Coverage under the minimum; placeholder guesses.
    NeedsDetail,
    /// Random guesses without the prompt.
    Withheld,
    /// The prompt is among the guesses; the round should end in success.
    Match,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub coverage_pct: f64,
    pub match_probability: f64,
    pub guesses: Vec<String>,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn is_match(&self) -> bool {
        self.verdict == Verdict::Match
    }
}

/// `base + (round_index / total_rounds) * ramp`.
pub fn match_probability(round_index: usize, total_rounds: usize, config: &HeuristicConfig) -> f64 {
    let progress = round_index as f64 / total_rounds.max(1) as f64;
    config.base_match_probability + progress * config.match_probability_ramp
}

/// Produces the guess list for a drawing with `coverage_pct` inked.
///
/// Draw order from `rng`: two picks for the decoys, one match draw, then either
/// the insert position (match) or one more decoy pick. The match draw is taken
/// even when coverage is too low to match, so the sequence does not depend on
/// coverage once past the placeholder threshold.
pub fn evaluate(
    coverage_pct: f64,
    round: &RoundContext,
    vocabulary: &Vocabulary,
    config: &HeuristicConfig,
    rng: &mut dyn RandomSource,
) -> Evaluation {
    let probability = match_probability(round.round_index, round.total_rounds, config);

    if coverage_pct < config.min_coverage_pct {
        return Evaluation {
            coverage_pct,
            match_probability: probability,
            guesses: PLACEHOLDER_GUESSES.iter().map(|s| s.to_string()).collect(),
            verdict: Verdict::NeedsDetail,
        };
    }

    let mut guesses = vocabulary.sample_excluding(2, &round.prompt, rng);
    let draw = rng.next_f64();

    // Between the two thresholds the prompt is never guessed, whatever the draw.
    if draw < probability && coverage_pct > config.match_coverage_pct {
        let position = rng.next_index(2).min(guesses.len());
        guesses.insert(position, round.prompt.clone());
        return Evaluation {
            coverage_pct,
            match_probability: probability,
            guesses,
            verdict: Verdict::Match,
        };
    }

    if let Some(extra) = vocabulary.any_excluding(&round.prompt, rng) {
        guesses.push(extra);
    }
    Evaluation {
        coverage_pct,
        match_probability: probability,
        guesses,
        verdict: Verdict::Withheld,
    }
}
