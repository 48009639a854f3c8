//! Command handler implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use super::types::{BotCommand, CommandResult, FetchArgs};
use crate::config::WatchConfig;
use crate::scheduler::{SchedulerCommand, SessionId, SessionRegistry};

/// Handles bot commands and manages the watchlist.
pub struct CommandHandler {
    /// Command prefix (e.g., "/").
    prefix: String,

    /// Watchlist configuration.
    config: Arc<RwLock<WatchConfig>>,

    /// Path to the watchlist file (for saving changes).
    config_path: PathBuf,

    /// Running scan sessions.
    sessions: Arc<RwLock<SessionRegistry>>,

    /// Channel to the scan scheduler.
    scheduler_tx: mpsc::Sender<SchedulerCommand>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(
        prefix: String,
        config: Arc<RwLock<WatchConfig>>,
        config_path: PathBuf,
        sessions: Arc<RwLock<SessionRegistry>>,
        scheduler_tx: mpsc::Sender<SchedulerCommand>,
    ) -> Self {
        Self {
            prefix,
            config,
            config_path,
            sessions,
            scheduler_tx,
        }
    }

    /// Tries to parse and execute a command from a message.
    ///
    /// Returns `None` if the message is not a command.
    pub async fn try_handle(&self, session: SessionId, message_text: &str) -> Option<CommandResult> {
        let command = BotCommand::parse(message_text, &self.prefix)?;

        debug!("Handling command for session {}: {}", session, command);
        let result = self.execute(session, command).await;
        info!("Command result: success={}", result.success);

        Some(result)
    }

    /// Executes a parsed command.
    async fn execute(&self, session: SessionId, command: BotCommand) -> CommandResult {
        match command {
            BotCommand::Start => self.handle_start(session).await,
            BotCommand::Stop => self.handle_stop(session).await,
            BotCommand::Status => self.handle_status(session).await,
            BotCommand::Fetch(args) => self.handle_fetch(session, args).await,
            BotCommand::AddKeywords(words) => self.handle_add_keywords(&words).await,
            BotCommand::RemoveKeyword(word) => self.handle_remove_keyword(&word).await,
            BotCommand::ListKeywords => self.handle_list_keywords().await,
            BotCommand::AddSources(urls) => self.handle_add_sources(&urls).await,
            BotCommand::RemoveSource(url) => self.handle_remove_source(&url).await,
            BotCommand::ListSources => self.handle_list_sources().await,
            BotCommand::Interval(minutes) => self.handle_interval(session, minutes).await,
            BotCommand::Help => self.handle_help(),
            BotCommand::Info => self.handle_info(),
        }
    }

    async fn handle_start(&self, session: SessionId) -> CommandResult {
        if self.sessions.read().await.contains(session) {
            return CommandResult::error("Bot is already running.");
        }

        {
            let config = self.config.read().await;
            if let Err(e) = config.validate() {
                return CommandResult::error(format!("Cannot start: {e}"));
            }
        }

        match self
            .scheduler_tx
            .send(SchedulerCommand::StartSession(session))
            .await
        {
            Ok(()) => CommandResult::success("Starting scheduled feed scans..."),
            Err(_) => CommandResult::error("Scheduler is not running."),
        }
    }

    async fn handle_stop(&self, session: SessionId) -> CommandResult {
        if !self.sessions.read().await.contains(session) {
            return CommandResult::error("Bot is not running.");
        }

        match self
            .scheduler_tx
            .send(SchedulerCommand::StopSession(session))
            .await
        {
            Ok(()) => CommandResult::success("Stopping scheduled scans..."),
            Err(_) => CommandResult::error("Scheduler is not running."),
        }
    }

    async fn handle_status(&self, session: SessionId) -> CommandResult {
        let sessions = self.sessions.read().await;
        let config = self.config.read().await;

        let status = match sessions.period_of(session) {
            Some(period) => format!("▶ Running (every {})", format_duration(period.as_secs())),
            None => "⏹ Stopped".to_owned(),
        };

        let keywords = if config.keywords.is_empty() {
            "None".to_owned()
        } else {
            truncate(&config.keywords.iter().collect::<Vec<_>>().join(", "), 60)
        };

        let message = format!(
            "Status: {status}\n\
             Window: {}\n\
             Sources: {}\n\
             Keywords: {keywords}",
            config.scan_window,
            config.source_count(),
        );

        CommandResult::success(message)
    }

    async fn handle_fetch(&self, session: SessionId, args: FetchArgs) -> CommandResult {
        if args.keywords.is_empty() {
            return CommandResult::error("Usage: fetch <keyword>... [window]");
        }

        let summary = args.keywords.join(", ");
        let command = SchedulerCommand::TriggerScan {
            session,
            keywords: Some(args.keywords),
            window: args.window,
        };

        match self.scheduler_tx.send(command).await {
            Ok(()) => CommandResult::success(format!("Fetching articles for: {summary}...")),
            Err(_) => CommandResult::error("Scheduler is not running."),
        }
    }

    async fn handle_add_keywords(&self, words: &[String]) -> CommandResult {
        let mut config = self.config.write().await;

        let previous = config.keywords.clone();
        let added: Vec<&str> = words
            .iter()
            .filter(|word| config.keywords.add(word))
            .map(String::as_str)
            .collect();

        if added.is_empty() {
            return CommandResult::error("No new keywords added (already present or blank).");
        }

        if let Err(e) = config.save_to_file(&self.config_path) {
            config.keywords = previous; // Rollback
            warn!("Failed to save config: {}", e);
            return CommandResult::error(format!("Failed to save: {e}"));
        }

        CommandResult::success(format!("Added keywords: {}", added.join(", ")))
    }

    async fn handle_remove_keyword(&self, word: &str) -> CommandResult {
        let mut config = self.config.write().await;

        let previous = config.keywords.clone();
        if !config.keywords.remove(word) {
            return CommandResult::error(format!(
                "Keyword not found: '{word}'. Use 'list_keywords' to see configured keywords."
            ));
        }

        if let Err(e) = config.save_to_file(&self.config_path) {
            config.keywords = previous; // Rollback
            warn!("Failed to save config: {}", e);
            return CommandResult::error(format!("Failed to save: {e}"));
        }

        CommandResult::success(format!("Removed keyword: {word}"))
    }

    async fn handle_list_keywords(&self) -> CommandResult {
        let config = self.config.read().await;

        if config.keywords.is_empty() {
            return CommandResult::error("No keywords configured.");
        }

        let mut lines = vec!["Configured keywords:".to_owned()];
        for keyword in config.keywords.iter() {
            lines.push(format!("  {keyword}"));
        }

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_add_sources(&self, urls: &[String]) -> CommandResult {
        let mut config = self.config.write().await;

        for url in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return CommandResult::error(format!("Not an http(s) URL: {url}"));
            }
        }

        let previous = config.sources.clone();
        let mut added = Vec::new();
        for url in urls {
            if !config.sources.iter().any(|existing| existing == url) {
                config.sources.push(url.clone());
                added.push(url.as_str());
            }
        }

        if added.is_empty() {
            return CommandResult::error("No new sources added (already present).");
        }

        if let Err(e) = config.save_to_file(&self.config_path) {
            config.sources = previous; // Rollback
            warn!("Failed to save config: {}", e);
            return CommandResult::error(format!("Failed to save: {e}"));
        }

        CommandResult::success(format!("Added sources:\n  {}", added.join("\n  ")))
    }

    async fn handle_remove_source(&self, url: &str) -> CommandResult {
        let mut config = self.config.write().await;

        let Some(index) = config.sources.iter().position(|existing| existing == url) else {
            return CommandResult::error(format!(
                "Source not found: '{url}'. Use 'list_rss' to see configured sources."
            ));
        };

        let removed = config.sources.remove(index);

        if let Err(e) = config.save_to_file(&self.config_path) {
            config.sources.insert(index, removed); // Rollback
            warn!("Failed to save config: {}", e);
            return CommandResult::error(format!("Failed to save: {e}"));
        }

        CommandResult::success(format!("Removed source: {url}"))
    }

    async fn handle_list_sources(&self) -> CommandResult {
        let config = self.config.read().await;

        if config.sources.is_empty() {
            return CommandResult::error("No feed sources configured.");
        }

        let mut lines = vec!["Configured feed sources:".to_owned()];
        for (i, url) in config.sources.iter().enumerate() {
            lines.push(format!("  {}. {url}", i + 1));
        }

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_interval(&self, session: SessionId, minutes: u64) -> CommandResult {
        if minutes == 0 {
            return CommandResult::error("Interval must be at least 1 minute.");
        }

        let secs = minutes * 60;
        {
            let mut config = self.config.write().await;
            let previous = config.scan_interval_secs;
            config.scan_interval_secs = secs;

            if let Err(e) = config.save_to_file(&self.config_path) {
                config.scan_interval_secs = previous; // Rollback
                warn!("Failed to save config: {}", e);
                return CommandResult::error(format!("Failed to save: {e}"));
            }
        }

        // Re-arm the running session, if any; stopped sessions pick the
        // new interval up on their next start.
        let command = SchedulerCommand::SetInterval {
            session,
            period: Duration::from_secs(secs),
        };
        match self.scheduler_tx.send(command).await {
            Ok(()) => {
                CommandResult::success(format!("Scan interval set to {}.", format_duration(secs)))
            }
            Err(_) => CommandResult::error("Saved, but the scheduler is not running."),
        }
    }

    fn handle_help(&self) -> CommandResult {
        let mut lines = vec![
            format!("News Alert Bot Commands (prefix: {})", self.prefix),
            String::new(),
        ];

        for (cmd, aliases, desc) in BotCommand::all_commands() {
            let alias_str = if aliases.is_empty() {
                String::new()
            } else {
                format!(" {aliases}")
            };
            lines.push(format!("  {cmd}{alias_str} - {desc}"));
        }

        CommandResult::success(lines.join("\n"))
    }

    #[allow(clippy::unused_self)]
    fn handle_info(&self) -> CommandResult {
        let version = env!("CARGO_PKG_VERSION");
        let message = format!(
            "News Alert Bot v{version}\n\
             Scans RSS/Atom feeds for keyword matches and reports new articles.\n\
             Repository: https://github.com/user/news_alert_bot"
        );
        CommandResult::success(message)
    }
}

/// Truncates a string to a maximum length, adding "..." if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", chars[..max_len].iter().collect::<String>())
    }
}

/// Formats a duration in seconds to a human-readable string.
fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h {mins}m")
        }
    }
}
