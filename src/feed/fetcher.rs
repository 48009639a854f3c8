//! Feed fetch capability.
//!
//! The scan engine consumes feeds through the [`FeedFetcher`] trait so
//! tests can inject deterministic feeds. The production implementation
//! fetches over HTTP with `reqwest` and parses RSS/Atom with `feed-rs`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::types::{FeedEntry, ParsedFeed};

/// Errors that can occur while fetching or parsing a single feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status code: {0}")]
    HttpStatus(u16),

    #[error("feed payload is empty")]
    EmptyPayload,

    #[error("feed parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

/// Capability to fetch and parse one feed by URL.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetches the feed at `url` and parses it into entries.
    async fn fetch(&self, url: &str) -> Result<ParsedFeed, FetchError>;
}

/// HTTP fetcher backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client (30s timeout, versioned
    /// user agent).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("news_alert_bot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    /// Creates a fetcher from an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed, FetchError> {
        debug!("Fetching feed: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_feed_bytes(&body)
    }
}

/// Parses raw RSS/Atom bytes into a [`ParsedFeed`].
///
/// # Errors
///
/// Returns an error if the payload is empty or not a parseable feed.
pub fn parse_feed_bytes(raw: &[u8]) -> Result<ParsedFeed, FetchError> {
    let trimmed = trim_leading_ascii_whitespace(raw);
    if trimmed.is_empty() {
        return Err(FetchError::EmptyPayload);
    }

    let feed = feed_rs::parser::parse(trimmed)?;

    let title = feed.title.as_ref().map(|text| text.content.clone());
    let entries = feed.entries.iter().map(entry_from_feed).collect();

    Ok(ParsedFeed { title, entries })
}

fn entry_from_feed(entry: &feed_rs::model::Entry) -> FeedEntry {
    let title = entry
        .title
        .as_ref()
        .map_or_else(|| "(untitled)".to_owned(), |text| text.content.clone());
    let link = entry
        .links
        .first()
        .map_or_else(|| entry.id.clone(), |link| link.href.clone());
    let summary = entry.summary.as_ref().map(|text| text.content.clone());
    let body = entry
        .content
        .as_ref()
        .and_then(|content| content.body.clone());
    // Feeds without a timezone are parsed as UTC by feed-rs; updated
    // stands in when no published timestamp exists.
    let published = entry.published.or(entry.updated);

    FeedEntry {
        title,
        link,
        summary,
        body,
        published,
    }
}

fn trim_leading_ascii_whitespace(raw: &[u8]) -> &[u8] {
    let mut index = 0;
    while index < raw.len() && raw[index].is_ascii_whitespace() {
        index += 1;
    }
    &raw[index..]
}
