//! Word list filtering and selection

use super::Word;
use serde::Serialize;
use std::collections::BTreeSet;

/// Substring plus inclusive count-range filter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WordFilter {
    pub text: String,
    pub min_count: u64,
    /// `None` is unbounded; a negative bound matches nothing
    pub max_count: Option<i64>,
}

impl WordFilter {
    pub fn new(text: impl Into<String>, min_count: u64, max_count: Option<u64>) -> Self {
        Self {
            text: text.into(),
            min_count,
            max_count: max_count.map(|max| i64::try_from(max).unwrap_or(i64::MAX)),
        }
    }

    pub fn matches_text(&self, word: &Word) -> bool {
        word.word
            .to_lowercase()
            .contains(&self.text.to_lowercase())
    }

    pub fn matches_count(&self, word: &Word) -> bool {
        word.count >= self.min_count
            && self
                .max_count
                .map_or(true, |max| i64::try_from(word.count).is_ok_and(|count| count <= max))
    }

    pub fn matches(&self, word: &Word) -> bool {
        self.matches_text(word) && self.matches_count(word)
    }

    /// Matching words, in input order
    pub fn apply<'a>(&self, words: &'a [Word]) -> Vec<&'a Word> {
        words.iter().filter(|w| self.matches(w)).collect()
    }

    /// Update one field from raw form input.
    ///
    /// Count fields that don't parse become 0; an empty `maxCount` clears
    /// the upper bound.
    pub fn set_field(&mut self, name: &str, raw: &str) {
        match name {
            "word" => self.text = raw.to_string(),
            "minCount" => {
                self.min_count = parse_number(raw).map_or(0, |v| v.ceil().max(0.0) as u64)
            }
            "maxCount" if raw.trim().is_empty() => self.max_count = None,
            "maxCount" => {
                self.max_count = Some(parse_number(raw).map_or(0, |v| v.floor() as i64))
            }
            _ => {}
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Selected words, toggled independently of the active filter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    words: BTreeSet<String>,
}

impl Selection {
    /// Add the word if absent, remove it if present
    pub fn toggle(&mut self, word: &str) {
        if !self.words.remove(word) {
            self.words.insert(word.to_string());
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.words.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}
