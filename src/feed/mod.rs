//! Feed scanning module.
//!
//! Fetches syndication feeds, matches entries against a keyword set
//! within a time window, and deduplicates reported articles through a
//! session-scoped seen-link set.

mod fetcher;
mod keywords;
mod scan;
mod seen;
mod types;
mod window;

pub use fetcher::{FeedFetcher, FetchError, HttpFetcher, parse_feed_bytes};
pub use keywords::KeywordSet;
pub use scan::{ScanError, ScanOutcome, scan};
pub use seen::SeenLinks;
pub use types::{ArticleCandidate, FeedEntry, ParsedFeed};
pub use window::TimeWindow;
