//! Word cleaning for autocomplete tags.

use regex::Regex;
use std::sync::OnceLock;

/// Characters left in place by [`clean_word`]
pub const PUNCTUATION_LEFT: &[char] = &['-', '+', '/', '%', '_'];

/// Common English words never offered as tags
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does",
    "doesn't", "doing", "don't", "down", "during", "each", "few", "for", "from", "further",
    "had", "hadn't", "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll",
    "he's", "her", "here", "here's", "hers", "herself", "him", "himself", "his", "how",
    "how's", "i", "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it",
    "it's", "its", "itself", "let's", "me", "more", "most", "mustn't", "my", "myself", "no",
    "nor", "not", "of", "off", "on", "once", "only", "or", "other", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "same", "shan't", "she", "she'd", "she'll", "she's",
    "should", "shouldn't", "so", "some", "such", "than", "that", "that's", "the", "their",
    "theirs", "them", "themselves", "then", "there", "there's", "these", "they", "they'd",
    "they'll", "they're", "they've", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were",
    "weren't", "what", "what's", "when", "when's", "where", "where's", "which", "while",
    "who", "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "you",
    "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

fn removed_chars() -> &'static Regex {
    static REMOVED: OnceLock<Regex> = OnceLock::new();
    // Almost all punctuation except -+/%_
    REMOVED.get_or_init(|| {
        Regex::new(r#"[\s!"'#$&()*,.:;<=>?@\[\\\]^`{|}~]"#).expect("constant character class")
    })
}

/// Remove every punctuation character except [`PUNCTUATION_LEFT`]
pub fn clean_word(word: &str) -> String {
    removed_chars().replace_all(word, "").into_owned()
}

pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

/// Cleaned words of `text` worth offering as tags: not empty, not a
/// number, not only leftover punctuation, not a stop word. Casing is kept.
pub fn clean_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(clean_word)
        .filter(|word| !word.is_empty())
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .filter(|word| !word.chars().all(|c| PUNCTUATION_LEFT.contains(&c)))
        .filter(|word| !is_stop_word(word))
}
