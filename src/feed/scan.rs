//! Feed scan engine.
//!
//! One scan walks the configured sources, matches entries against the
//! keyword set within the requested time window, and reports each
//! matching article exactly once per session via the seen-link set.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fetcher::FeedFetcher;
use super::keywords::KeywordSet;
use super::seen::SeenLinks;
use super::types::ArticleCandidate;
use super::window::TimeWindow;

/// Structural errors that make a scan invocation impossible.
///
/// Per-source fetch and parse failures are never errors here; they are
/// surfaced as diagnostics on the [`ScanOutcome`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("no keywords configured for this scan")]
    NoKeywords,

    #[error("no feed sources configured for this scan")]
    NoSources,
}

/// Result of one scan: matched articles plus per-source diagnostics,
/// both in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Newly matched articles, in source-iteration then entry-iteration
    /// order.
    pub articles: Vec<ArticleCandidate>,

    /// One human-readable diagnostic per failed source.
    pub diagnostics: Vec<String>,
}

/// Scans all sources for keyword matches within the time window.
///
/// Sources are deduplicated up front (first occurrence wins). An entry
/// is reported when it matches at least one keyword, its link has not
/// been reported before, and it falls inside the window; its link is
/// recorded in `seen` immediately so no scan reports the same link
/// twice. Entries without a known publication time are excluded
/// whenever a cutoff is active.
///
/// Re-running with an unchanged `seen` set and unchanged feed content
/// yields an empty result.
///
/// # Errors
///
/// Returns an error only when the keyword or source set is empty.
pub async fn scan(
    fetcher: &dyn FeedFetcher,
    sources: &[String],
    keywords: &mut KeywordSet,
    window: TimeWindow,
    seen: &mut SeenLinks,
    now: DateTime<Utc>,
) -> Result<ScanOutcome, ScanError> {
    if keywords.is_empty() {
        return Err(ScanError::NoKeywords);
    }
    if sources.is_empty() {
        return Err(ScanError::NoSources);
    }

    let cutoff = window.cutoff(now);
    debug!("Scanning {} sources, window: {}", sources.len(), window);

    let mut visited = HashSet::new();
    let mut outcome = ScanOutcome::default();

    for source in sources {
        if !visited.insert(source.as_str()) {
            continue;
        }

        let feed = match fetcher.fetch(source).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Error processing feed {}: {}", source, e);
                outcome
                    .diagnostics
                    .push(format!("Error processing feed {source}: {e}"));
                continue;
            }
        };

        let mut matched = 0_usize;
        for entry in &feed.entries {
            let texts: Vec<&str> = [
                Some(entry.title.as_str()),
                entry.summary.as_deref(),
                entry.body.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();

            // First keyword match wins; the entry is examined once.
            let Some(keyword) = keywords.first_match(&texts) else {
                continue;
            };

            if seen.contains(&entry.link) {
                continue;
            }

            if let Some(cutoff) = cutoff {
                match entry.published {
                    Some(published) if published >= cutoff => {}
                    _ => continue,
                }
            }

            seen.insert_if_new(&entry.link);
            debug!("Matched keyword {:?}: {}", keyword, entry.link);
            outcome.articles.push(ArticleCandidate::from_entry(entry));
            matched += 1;
        }

        info!("Found {} new articles in feed {}", matched, source);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fetcher::FetchError;
    use crate::feed::types::{FeedEntry, ParsedFeed};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;

    /// Fetcher serving canned feeds; unknown URLs fail like a network
    /// error would.
    #[derive(Default)]
    struct CannedFetcher {
        feeds: HashMap<String, ParsedFeed>,
    }

    impl CannedFetcher {
        fn with_feed(mut self, url: &str, feed: ParsedFeed) -> Self {
            self.feeds.insert(url.to_owned(), feed);
            self
        }
    }

    #[async_trait]
    impl FeedFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<ParsedFeed, FetchError> {
            self.feeds
                .get(url)
                .cloned()
                .ok_or(FetchError::HttpStatus(500))
        }
    }

    fn entry(title: &str, link: &str, published: Option<DateTime<Utc>>) -> FeedEntry {
        FeedEntry {
            title: title.to_owned(),
            link: link.to_owned(),
            summary: None,
            body: None,
            published,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()
    }

    fn sources(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|&u| u.to_owned()).collect()
    }

    fn keywords(words: &[&str]) -> KeywordSet {
        KeywordSet::from(words.iter().map(|&w| w.to_owned()).collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn test_second_scan_reports_nothing() {
        let feed = ParsedFeed {
            title: None,
            entries: vec![
                entry("Putin speaks", "https://n.example/l1", Some(now())),
                entry("Putin travels", "https://n.example/l2", Some(now())),
            ],
        };
        let fetcher = CannedFetcher::default().with_feed("https://n.example/feed", feed);
        let srcs = sources(&["https://n.example/feed"]);
        let mut kw = keywords(&["Putin"]);
        let mut seen = SeenLinks::new();

        let first = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert_eq!(first.articles.len(), 2);
        assert_eq!(seen.len(), 2);

        let second = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert!(second.articles.is_empty());
        assert!(second.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_whole_word_matching() {
        let feed = ParsedFeed {
            title: None,
            entries: vec![
                entry("Russia in focus", "https://n.example/a", Some(now())),
                entry("Russian markets", "https://n.example/b", Some(now())),
            ],
        };
        let fetcher = CannedFetcher::default().with_feed("https://n.example/feed", feed);
        let srcs = sources(&["https://n.example/feed"]);
        let mut kw = keywords(&["Russia"]);
        let mut seen = SeenLinks::new();

        let outcome = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert_eq!(outcome.articles.len(), 1);
        assert_eq!(outcome.articles[0].link, "https://n.example/a");
    }

    #[tokio::test]
    async fn test_window_excludes_stale_and_undated_entries() {
        let stale = Utc.with_ymd_and_hms(2024, 3, 4, 23, 59, 0).unwrap();
        let fresh = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 1).unwrap();
        let feed = ParsedFeed {
            title: None,
            entries: vec![
                entry("Putin stale", "https://n.example/stale", Some(stale)),
                entry("Putin fresh", "https://n.example/fresh", Some(fresh)),
                entry("Putin undated", "https://n.example/undated", None),
            ],
        };
        let fetcher = CannedFetcher::default().with_feed("https://n.example/feed", feed);
        let srcs = sources(&["https://n.example/feed"]);
        let mut kw = keywords(&["Putin"]);
        let mut seen = SeenLinks::new();

        let outcome = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert_eq!(outcome.articles.len(), 1);
        assert_eq!(outcome.articles[0].link, "https://n.example/fresh");
        // Excluded entries are not marked seen; a wider window may still
        // report them later.
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn test_unbounded_window_includes_undated_entries() {
        let feed = ParsedFeed {
            title: None,
            entries: vec![entry("Putin undated", "https://n.example/undated", None)],
        };
        let fetcher = CannedFetcher::default().with_feed("https://n.example/feed", feed);
        let srcs = sources(&["https://n.example/feed"]);
        let mut kw = keywords(&["Putin"]);
        let mut seen = SeenLinks::new();

        let outcome = scan(
            &fetcher,
            &srcs,
            &mut kw,
            TimeWindow::Unbounded,
            &mut seen,
            now(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_source_does_not_abort_scan() {
        let feed = ParsedFeed {
            title: None,
            entries: vec![entry("Putin report", "https://n.example/ok", Some(now()))],
        };
        let fetcher = CannedFetcher::default().with_feed("https://good.example/feed", feed);
        let srcs = sources(&["https://bad.example/feed", "https://good.example/feed"]);
        let mut kw = keywords(&["Putin"]);
        let mut seen = SeenLinks::new();

        let outcome = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].contains("https://bad.example/feed"));
        assert_eq!(outcome.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sources_scanned_once() {
        let feed = ParsedFeed {
            title: None,
            entries: vec![entry("Putin report", "https://n.example/a", Some(now()))],
        };
        let fetcher = CannedFetcher::default().with_feed("https://n.example/feed", feed);
        let srcs = sources(&["https://n.example/feed", "https://n.example/feed"]);
        let mut kw = keywords(&["Putin"]);
        let mut seen = SeenLinks::new();

        let outcome = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert_eq!(outcome.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_matching_multiple_keywords_reported_once() {
        let feed = ParsedFeed {
            title: None,
            entries: vec![entry(
                "Putin visits the Kremlin",
                "https://n.example/a",
                Some(now()),
            )],
        };
        let fetcher = CannedFetcher::default().with_feed("https://n.example/feed", feed);
        let srcs = sources(&["https://n.example/feed"]);
        let mut kw = keywords(&["Putin", "Kremlin"]);
        let mut seen = SeenLinks::new();

        let outcome = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert_eq!(outcome.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_matches_in_summary_and_body() {
        let mut summary_entry = entry("Plain title", "https://n.example/s", Some(now()));
        summary_entry.summary = Some("Kremlin statement issued".to_owned());
        let mut body_entry = entry("Another title", "https://n.example/b", Some(now()));
        body_entry.body = Some("Full text mentions the Kremlin today.".to_owned());

        let feed = ParsedFeed {
            title: None,
            entries: vec![summary_entry, body_entry],
        };
        let fetcher = CannedFetcher::default().with_feed("https://n.example/feed", feed);
        let srcs = sources(&["https://n.example/feed"]);
        let mut kw = keywords(&["Kremlin"]);
        let mut seen = SeenLinks::new();

        let outcome = scan(&fetcher, &srcs, &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap();
        assert_eq!(outcome.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_inputs_are_fatal() {
        let fetcher = CannedFetcher::default();
        let mut seen = SeenLinks::new();

        let mut kw = keywords(&[]);
        let err = scan(
            &fetcher,
            &sources(&["https://n.example/feed"]),
            &mut kw,
            TimeWindow::Today,
            &mut seen,
            now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, ScanError::NoKeywords);

        let mut kw = keywords(&["Putin"]);
        let err = scan(&fetcher, &[], &mut kw, TimeWindow::Today, &mut seen, now())
            .await
            .unwrap_err();
        assert_eq!(err, ScanError::NoSources);
    }
}
