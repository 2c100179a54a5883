pub mod vocabulary;

pub use vocabulary::{Vocabulary, CATEGORIES};
