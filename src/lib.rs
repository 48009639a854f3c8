//! News Alert Bot Library
//!
//! A feed-watching bot that scans RSS/Atom sources for keyword matches
//! and reports newly found articles.
//!
//! This crate provides the core functionality for:
//! - Loading and validating the watchlist (sources and keywords)
//! - Fetching and parsing feeds over HTTP
//! - Scanning entries against whole-word keyword patterns with
//!   time-window filtering and seen-link deduplication
//! - Splitting long reports into message-sized chunks
//! - Running recurring per-session scans and handling user commands

pub mod commands;
pub mod config;
pub mod feed;
pub mod format;
pub mod scheduler;
