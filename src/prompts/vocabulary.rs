use std::collections::HashSet;

use crate::rng::RandomSource;

// -----------------------------------------------------------------------------
// Built-in prompt vocabulary
// -----------------------------------------------------------------------------

pub const CATEGORIES: &[&str] = &[
    "apple", "banana", "bicycle", "bird", "book", "butterfly", "cactus", "car",
    "cat", "chair", "clock", "cloud", "cup", "dog", "door", "eye",
    "fish", "flower", "guitar", "hat", "house", "key", "ladder", "lightbulb",
    "moon", "mountain", "mushroom", "pencil", "pizza", "rainbow", "scissors", "snowman",
    "star", "sun", "sword", "table", "tree", "umbrella", "violin", "whale",
];

/// Finite set of prompt labels, in a stable order.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(CATEGORIES.iter().copied())
    }
}

impl Vocabulary {
    /// Builds a vocabulary, dropping blanks and duplicates while keeping order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let labels = labels
            .into_iter()
            .map(Into::into)
            .map(|label: String| label.trim().to_string())
            .filter(|label| !label.is_empty() && seen.insert(label.clone()))
            .collect();
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[cfg(test)]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Uniform pick among labels not in `used`, or `None` once the pool is
    /// exhausted.
    pub fn pick_unused(&self, used: &[String], rng: &mut dyn RandomSource) -> Option<String> {
        let pool: Vec<&String> = self
            .labels
            .iter()
            .filter(|label| !used.contains(label))
            .collect();
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.next_index(pool.len())].clone())
    }

    /// Up to `count` distinct labels other than `excluded`, drawn without
    /// replacement.
    pub fn sample_excluding(
        &self,
        count: usize,
        excluded: &str,
        rng: &mut dyn RandomSource,
    ) -> Vec<String> {
        let mut pool: Vec<&String> = self.labels.iter().filter(|l| *l != excluded).collect();
        let mut picked = Vec::with_capacity(count.min(pool.len()));
        while picked.len() < count && !pool.is_empty() {
            let idx = rng.next_index(pool.len());
            picked.push(pool.swap_remove(idx).clone());
        }
        picked
    }

    /// One label other than `excluded`; may repeat earlier samples.
    pub fn any_excluding(&self, excluded: &str, rng: &mut dyn RandomSource) -> Option<String> {
        let pool: Vec<&String> = self.labels.iter().filter(|l| *l != excluded).collect();
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.next_index(pool.len())].clone())
    }
}
