//! Core data types for feed scanning.

use chrono::{DateTime, Utc};

/// A single entry extracted from a parsed feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry title.
    pub title: String,

    /// Link to the full article. Falls back to the entry id when the
    /// feed provides no link.
    pub link: String,

    /// Short summary or description, if present.
    pub summary: Option<String>,

    /// Full body content, if present.
    pub body: Option<String>,

    /// Publication time normalized to UTC. `None` when the feed
    /// provides no parseable timestamp.
    pub published: Option<DateTime<Utc>>,
}

/// A parsed feed with its entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Feed title, if present.
    pub title: Option<String>,

    /// Entries in the order they appear in the feed.
    pub entries: Vec<FeedEntry>,
}

/// An article that matched a keyword and passed the time-window and
/// seen-link checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCandidate {
    /// Article title.
    pub title: String,

    /// Article link, also used as the deduplication key.
    pub link: String,

    /// Publication time, when known.
    pub published: Option<DateTime<Utc>>,
}

impl ArticleCandidate {
    /// Creates a candidate from a feed entry.
    #[must_use]
    pub fn from_entry(entry: &FeedEntry) -> Self {
        Self {
            title: entry.title.clone(),
            link: entry.link.clone(),
            published: entry.published,
        }
    }
}
