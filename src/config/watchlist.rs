//! Watchlist configuration and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DEFAULT_SCAN_INTERVAL_SECS;
use crate::feed::{KeywordSet, TimeWindow};

/// Errors that can occur during watchlist validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No feed sources configured")]
    NoSources,

    #[error("No keywords configured")]
    NoKeywords,

    #[error("Feed source at index {index} is blank")]
    BlankSource { index: usize },

    #[error("Feed source at index {index} is not an http(s) URL: {url}")]
    InvalidSource { index: usize, url: String },

    #[error("Duplicate feed source: {url}")]
    DuplicateSource { url: String },

    #[error("Scan interval must be greater than 0 seconds")]
    InvalidInterval,

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Configuration for what to scan: feed sources, keywords, the default
/// time window, and the recurring scan interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Feed source URLs.
    pub sources: Vec<String>,

    /// Keywords matched against feed entries.
    pub keywords: KeywordSet,

    /// Time window applied to scheduled scans.
    #[serde(default)]
    pub scan_window: TimeWindow,

    /// Interval between scheduled scans in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

impl WatchConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ValidationError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the whole watchlist.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sources.is_empty() {
            return Err(ValidationError::NoSources);
        }
        if self.keywords.is_empty() {
            return Err(ValidationError::NoKeywords);
        }
        if self.scan_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval);
        }

        for result in self.validate_sources() {
            result?;
        }

        Ok(())
    }

    /// Returns detailed validation results, one per source.
    #[must_use]
    pub fn validate_sources(&self) -> Vec<Result<(), ValidationError>> {
        let mut results = Vec::new();
        let mut seen_urls = std::collections::HashSet::new();

        if self.sources.is_empty() {
            results.push(Err(ValidationError::NoSources));
            return results;
        }

        for (index, url) in self.sources.iter().enumerate() {
            if url.trim().is_empty() {
                results.push(Err(ValidationError::BlankSource { index }));
                continue;
            }

            if !url.starts_with("http://") && !url.starts_with("https://") {
                results.push(Err(ValidationError::InvalidSource {
                    index,
                    url: url.clone(),
                }));
                continue;
            }

            if !seen_urls.insert(url.as_str()) {
                results.push(Err(ValidationError::DuplicateSource { url: url.clone() }));
                continue;
            }

            results.push(Ok(()));
        }

        results
    }

    /// Returns the number of configured sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Returns the number of configured keywords.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Creates an example configuration for users to reference.
    #[must_use]
    pub fn example() -> Self {
        Self {
            sources: vec![
                "https://feeds.bloomberg.com/politics/news.rss".to_owned(),
                "https://feeds.bbci.co.uk/news/world/rss.xml".to_owned(),
                "https://www.theguardian.com/world/rss".to_owned(),
                "https://www.france24.com/en/rss".to_owned(),
                "http://rss.nytimes.com/services/xml/rss/nyt/World.xml".to_owned(),
            ],
            keywords: KeywordSet::from(vec![
                "Russia".to_owned(),
                "Putin".to_owned(),
                "Kremlin".to_owned(),
                "Russie".to_owned(),
                "Poutine".to_owned(),
            ]),
            scan_window: TimeWindow::Today,
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            keywords: KeywordSet::new(),
            scan_window: TimeWindow::default(),
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
        }
    }
}
