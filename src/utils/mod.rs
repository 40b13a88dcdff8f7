//! Utility functions shared by the loader, tag ranking and the binary.
//!
//! - [`progress`] - spinners and bars, no-ops without the `progress` feature
//! - [`words`] - word cleaning and stop words for autocomplete tags

pub mod progress;
pub mod words;

pub use words::{clean_word, clean_words, is_stop_word};

#[cfg(test)]
pub(crate) mod capture;
