//! Word-frequency extraction for page text
//!
//! Tokens are maximal runs of alphanumeric characters (apostrophes inside a word
//! are kept), lowercased. The resulting map is stored alongside each page and is
//! used by the search index for term scoring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from token to occurrence count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordFrequency(BTreeMap<String, u32>);

impl WordFrequency {
    /// Counts the tokens of `text`
    pub fn from_text(text: &str) -> Self {
        let mut counts = BTreeMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        Self(counts)
    }

    /// Occurrences of `token` (already lowercased)
    pub fn get(&self, token: &str) -> u32 {
        self.0.get(token).copied().unwrap_or(0)
    }

    /// Total number of tokens counted
    pub fn total(&self) -> u64 {
        self.0.values().map(|&c| u64::from(c)).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Splits text into lowercase tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\''))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_are_case_insensitive() {
        let freq = WordFrequency::from_text("Apple apple APPLE banana");
        assert_eq!(freq.get("apple"), 3);
        assert_eq!(freq.get("banana"), 1);
        assert_eq!(freq.len(), 2);
        assert_eq!(freq.total(), 4);
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let freq = WordFrequency::from_text("game, games; (gaming) don't 'quoted'");
        assert_eq!(freq.get("game"), 1);
        assert_eq!(freq.get("games"), 1);
        assert_eq!(freq.get("gaming"), 1);
        assert_eq!(freq.get("don't"), 1);
        assert_eq!(freq.get("quoted"), 1);
    }

    #[test]
    fn test_empty_text() {
        let freq = WordFrequency::from_text("  ... ");
        assert!(freq.is_empty());
        assert_eq!(freq.total(), 0);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let freq = WordFrequency::from_text("b a b");
        let json = serde_json::to_string(&freq).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2}"#);
        let back: WordFrequency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, freq);
    }
}
