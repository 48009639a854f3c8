//! Configuration module for the news alert bot.
//!
//! Handles loading, validation, and management of the watchlist
//! (feed sources and keywords) and environment-driven settings.

mod settings;
mod watchlist;

pub use settings::BotSettings;
pub use watchlist::{ValidationError, WatchConfig};

/// Maximum length of a single outgoing message in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Default interval between scheduled scans (15 minutes).
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 900;
