//! Keyword set with precompiled whole-word match patterns.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A case-insensitively deduplicated set of keywords.
///
/// Each keyword matches as a whole word: "Russia" matches "Russia is..."
/// but never "Russian". Patterns are compiled lazily on first use and
/// cached per keyword; removing a keyword drops its cached pattern.
///
/// Serializes as a plain list of strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<String>,
    #[serde(skip)]
    cache: HashMap<String, Regex>,
}

impl KeywordSet {
    /// Creates an empty keyword set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyword, returning `false` if it is blank or already
    /// present (case-insensitively).
    pub fn add(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.contains(keyword) {
            return false;
        }
        self.keywords.push(keyword.to_owned());
        true
    }

    /// Removes a keyword by case-insensitive match, returning `true` if
    /// it was present. Articles already reported are unaffected.
    pub fn remove(&mut self, keyword: &str) -> bool {
        let target = keyword.trim().to_lowercase();
        let Some(index) = self
            .keywords
            .iter()
            .position(|k| k.to_lowercase() == target)
        else {
            return false;
        };
        let removed = self.keywords.remove(index);
        self.cache.remove(&removed);
        true
    }

    /// Checks whether a keyword is present (case-insensitively).
    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        let target = keyword.trim().to_lowercase();
        self.keywords.iter().any(|k| k.to_lowercase() == target)
    }

    /// Iterates over keywords in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Returns the number of keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Checks if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Returns the first keyword whose whole-word pattern matches any of
    /// the given texts, in insertion order.
    pub fn first_match(&mut self, texts: &[&str]) -> Option<String> {
        for index in 0..self.keywords.len() {
            let keyword = self.keywords[index].clone();
            let Some(pattern) = self.pattern(&keyword) else {
                continue;
            };
            if texts.iter().any(|text| pattern.is_match(text)) {
                return Some(keyword);
            }
        }
        None
    }

    /// Returns the cached pattern for a keyword, compiling it on first use.
    fn pattern(&mut self, keyword: &str) -> Option<&Regex> {
        if !self.cache.contains_key(keyword) {
            let compiled = compile_pattern(keyword)?;
            self.cache.insert(keyword.to_owned(), compiled);
        }
        self.cache.get(keyword)
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(keywords: Vec<String>) -> Self {
        let mut set = Self::new();
        for keyword in &keywords {
            set.add(keyword);
        }
        set
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.keywords
    }
}

/// Builds a case-insensitive, whole-word pattern for a keyword.
fn compile_pattern(keyword: &str) -> Option<Regex> {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
    match Regex::new(&pattern) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            warn!("Unusable keyword pattern for {:?}: {}", keyword, e);
            None
        }
    }
}
