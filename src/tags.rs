//! Autocomplete tags: every keyword token plus the most frequent words of
//! family paths, aliases and item titles.

use crate::tree::PathTree;
use crate::utils::words::clean_words;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Word frequencies, case-insensitive. A word keeps the casing it was
/// first seen with; counts keep first-seen order for stable ties.
#[derive(Debug, Default)]
pub struct WordCounter {
    words: Vec<(String, usize)>,
    positions: FxHashMap<String, usize>,
}

impl WordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of `word`, inserted at zero on first access
    pub fn entry(&mut self, word: &str) -> &mut usize {
        let key = word.to_lowercase();
        let position = match self.positions.get(&key) {
            Some(&position) => position,
            None => {
                self.words.push((word.to_string(), 0));
                self.positions.insert(key, self.words.len() - 1);
                self.words.len() - 1
            }
        };
        &mut self.words[position].1
    }

    pub fn add_text(&mut self, text: &str) {
        for word in clean_words(text) {
            *self.entry(&word) += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The `count` most frequent words
    pub fn most_frequent(&self, count: usize) -> Vec<&str> {
        let mut by_count: Vec<&(String, usize)> = self.words.iter().collect();
        by_count.sort_by_key(|(_, n)| *n);
        let skip = by_count.len().saturating_sub(count);
        by_count
            .into_iter()
            .skip(skip)
            .map(|(word, _)| word.as_str())
            .collect()
    }
}

/// Tags sorted case-insensitively, ignoring a leading `#`.
///
/// `keep` is the share (clamped to `[0, 1]`) of distinct words kept, most
/// frequent first; keyword tokens are always kept.
pub fn rank_tags(tree: &PathTree, keep: f64) -> Vec<String> {
    let mut keywords: BTreeSet<&str> = BTreeSet::new();
    let mut counter = WordCounter::new();

    for (family, id) in tree.iter_all_nodes() {
        counter.add_text(&family.join(" "));
        counter.add_text(tree[id].attrs.alias_or_empty());

        for item in tree[id].items() {
            counter.add_text(&item.title);
            keywords.extend(item.index.iter().map(String::as_str));
        }
    }

    let kept = (keep.clamp(0.0, 1.0) * counter.len() as f64).round() as usize;

    let mut tags: Vec<String> = keywords.into_iter().map(str::to_string).collect();
    for word in counter.most_frequent(kept) {
        if !tags.iter().any(|tag| tag == word) {
            tags.push(word.to_string());
        }
    }

    tags.sort_by_cached_key(|tag| (tag.trim_start_matches('#').to_lowercase(), tag.clone()));
    tags
}
