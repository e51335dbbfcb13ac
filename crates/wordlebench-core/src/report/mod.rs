pub mod console;
pub mod json;
pub mod standings;

pub use standings::{failed_words, standings, FailedWord, ModelStanding};
