//! Keyword tag extraction from note content.
//!
//! Tags are recomputed on demand and never persisted. The algorithm is a plain
//! frequency count over word tokens with a small stop-word list removed.
//!
//! # Ordering
//!
//! Tokens are ranked by descending frequency. Ties keep the order in which the
//! tokens first appeared in the text: counts are collected in first-occurrence
//! order and then sorted with a stable sort, so equal counts never swap.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::defaults::MAX_TAGS;

/// Words never returned as tags.
pub const STOP_WORDS: &[&str] = &["the", "a", "an", "and", "or", "but", "in", "on", "at", "to"];

/// A word is a run of letters, optionally joined by inner apostrophes or hyphens
/// (`don't`, `well-known`).
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}+(?:['-]\p{L}+)*").expect("word pattern is valid"));

/// Split lowercased text into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract up to [`MAX_TAGS`] keyword tags from `text`.
///
/// # Examples
///
/// ```
/// use quill_core::extract_tags;
///
/// let tags = extract_tags("Cats sleep. Cats play. Dogs sleep.");
/// assert_eq!(tags, vec!["cats", "sleep", "play", "dogs"]);
/// assert!(extract_tags("the a an").is_empty());
/// ```
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for token in tokenize(text) {
        if STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        match positions.get(&token) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(token.clone(), counts.len());
                counts.push((token, 1));
            }
        }
    }

    // Stable: ties stay in first-occurrence order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(MAX_TAGS)
        .map(|(token, _)| token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_tags() {
        assert!(extract_tags("").is_empty());
        assert!(extract_tags("   \n\t ").is_empty());
    }

    #[test]
    fn test_only_stop_words_yields_no_tags() {
        assert!(extract_tags("the a an").is_empty());
        assert!(extract_tags("The AND or, but IN on at to").is_empty());
    }

    #[test]
    fn test_frequency_order_with_first_occurrence_ties() {
        let tags = extract_tags("Cats sleep. Cats play. Dogs sleep.");
        assert_eq!(tags, vec!["cats", "sleep", "play", "dogs"]);
    }

    #[test]
    fn test_at_most_five_tags() {
        let tags = extract_tags("one two three four five six seven");
        assert_eq!(tags, vec!["one", "two", "three", "four", "five"]);
    }

    #[test]
    fn test_higher_frequency_beats_earlier_occurrence() {
        let tags = extract_tags("alpha beta beta gamma gamma gamma");
        assert_eq!(tags, vec!["gamma", "beta", "alpha"]);
    }

    #[test]
    fn test_lowercases_and_dedups() {
        let tags = extract_tags("Rust rust RUST");
        assert_eq!(tags, vec!["rust"]);
    }

    #[test]
    fn test_punctuation_and_digits_are_not_words() {
        let tags = extract_tags("v2 release: 2024!! ship-it, don't");
        assert_eq!(tags, vec!["v", "release", "ship-it", "don't"]);
    }

    #[test]
    fn test_deterministic() {
        let text = "b a c b c d e f g c";
        assert_eq!(extract_tags(text), extract_tags(text));
    }

    #[test]
    fn test_unicode_letters() {
        let tags = extract_tags("Café café crème");
        assert_eq!(tags, vec!["café", "crème"]);
    }

    #[test]
    fn test_tokenize_splits_on_non_letters() {
        assert_eq!(tokenize("Hello, World"), vec!["hello", "world"]);
    }
}
