//! Application settings loaded from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Bot-level settings, all optional with sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Path to the watchlist JSON file.
    pub watchlist_path: PathBuf,

    /// Command prefix for bot commands.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Default interval between scheduled scans in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// Log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_watchlist_path() -> PathBuf {
    PathBuf::from("watchlist.json")
}

fn default_command_prefix() -> String {
    "/".to_owned()
}

fn default_scan_interval() -> u64 {
    super::DEFAULT_SCAN_INTERVAL_SECS
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            watchlist_path: default_watchlist_path(),
            command_prefix: default_command_prefix(),
            scan_interval_secs: default_scan_interval(),
            log_level: default_log_level(),
        }
    }
}

impl BotSettings {
    /// Creates settings from environment variables with defaults.
    ///
    /// Recognized variables: `WATCHLIST_PATH`, `COMMAND_PREFIX`,
    /// `SCAN_INTERVAL_SECS`, `RUST_LOG`.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            watchlist_path: std::env::var("WATCHLIST_PATH")
                .map_or_else(|_| default_watchlist_path(), PathBuf::from),
            command_prefix: std::env::var("COMMAND_PREFIX")
                .unwrap_or_else(|_| default_command_prefix()),
            scan_interval_secs: std::env::var("SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_scan_interval),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_level()),
        }
    }
}
