//! Command types and definitions.

use std::fmt;

use crate::feed::TimeWindow;

/// Arguments for an on-demand fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchArgs {
    /// Keywords to search for, replacing the configured set for this
    /// fetch only.
    pub keywords: Vec<String>,

    /// Time window to search in, `None` for the configured default.
    pub window: Option<TimeWindow>,
}

/// Available bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Start recurring feed scans for this session.
    Start,

    /// Stop recurring feed scans for this session.
    Stop,

    /// Show the current status (running state, sources, keywords).
    Status,

    /// Run one fetch now with the given keywords and optional window.
    Fetch(FetchArgs),

    /// Add keywords to the watchlist.
    AddKeywords(Vec<String>),

    /// Remove a keyword from the watchlist.
    RemoveKeyword(String),

    /// List configured keywords.
    ListKeywords,

    /// Add feed source URLs to the watchlist.
    AddSources(Vec<String>),

    /// Remove a feed source URL from the watchlist.
    RemoveSource(String),

    /// List configured feed sources.
    ListSources,

    /// Change the recurring scan interval, in minutes.
    Interval(u64),

    /// Show help information.
    Help,

    /// Show information about the bot.
    Info,
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Returns `None` if the message is not a valid command.
    #[must_use]
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let text = text.trim();

        // Check if message starts with the command prefix
        if !text.starts_with(prefix) {
            return None;
        }

        // Extract the command part after the prefix
        let after_prefix = text[prefix.len()..].trim_start();

        // Handle commands with arguments
        let (cmd, args) = match after_prefix.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd.to_lowercase(), Some(args.trim())),
            None => (after_prefix.to_lowercase(), None),
        };

        match cmd.as_str() {
            "start" | "run" => Some(Self::Start),
            "stop" | "halt" => Some(Self::Stop),
            "status" | "stat" | "s" => Some(Self::Status),
            "f" | "fetch" => Self::parse_fetch(args?),
            "add_keywords" | "add_keyword" | "ak" => args
                .filter(|a| !a.is_empty())
                .map(|a| Self::AddKeywords(split_words(a))),
            "remove_keyword" | "rk" => args
                .filter(|a| !a.is_empty())
                .map(|a| Self::RemoveKeyword(a.to_owned())),
            "list_keywords" | "lk" => Some(Self::ListKeywords),
            "add_rss" | "ar" => args
                .filter(|a| !a.is_empty())
                .map(|a| Self::AddSources(split_words(a))),
            "remove_rss" | "rr" => args
                .filter(|a| !a.is_empty())
                .map(|a| Self::RemoveSource(a.to_owned())),
            "list_rss" | "lr" => Some(Self::ListSources),
            "interval" | "every" => args?.split_whitespace().next()?.parse().ok().map(Self::Interval),
            "help" | "h" | "?" => Some(Self::Help),
            "info" | "about" | "version" => Some(Self::Info),
            _ => None,
        }
    }

    /// Parses fetch arguments: `<keyword>... [window]`
    ///
    /// The window is recognized as a trailing run of up to three tokens
    /// naming a time window ("today", "last hour", "last 3 hours").
    /// At least one keyword must remain before it.
    fn parse_fetch(args: &str) -> Option<Self> {
        let tokens: Vec<&str> = args.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }

        for suffix_len in (1..=3.min(tokens.len().saturating_sub(1))).rev() {
            let split_at = tokens.len() - suffix_len;
            let candidate = tokens[split_at..].join(" ");
            if let Some(window) = TimeWindow::from_name(&candidate) {
                return Some(Self::Fetch(FetchArgs {
                    keywords: tokens[..split_at].iter().map(|&t| t.to_owned()).collect(),
                    window: Some(window),
                }));
            }
        }

        Some(Self::Fetch(FetchArgs {
            keywords: tokens.iter().map(|&t| t.to_owned()).collect(),
            window: None,
        }))
    }

    /// Returns the command name as it appears in help.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
            Self::Fetch(_) => "fetch",
            Self::AddKeywords(_) => "add_keywords",
            Self::RemoveKeyword(_) => "remove_keyword",
            Self::ListKeywords => "list_keywords",
            Self::AddSources(_) => "add_rss",
            Self::RemoveSource(_) => "remove_rss",
            Self::ListSources => "list_rss",
            Self::Interval(_) => "interval",
            Self::Help => "help",
            Self::Info => "info",
        }
    }

    /// Returns all available commands with their descriptions.
    #[must_use]
    pub fn all_commands() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("start", "", "Start recurring feed scans"),
            ("stop", "", "Stop recurring feed scans"),
            ("status", "(s)", "Show running state, sources, and keywords"),
            (
                "fetch <keyword>... [window]",
                "(f)",
                "Fetch now; window: today, yesterday, last hour, last 3 hours",
            ),
            ("add_keywords <word>...", "(ak)", "Add keywords to the watchlist"),
            ("remove_keyword <word>", "(rk)", "Remove a keyword"),
            ("list_keywords", "(lk)", "List configured keywords"),
            ("add_rss <url>...", "(ar)", "Add feed source URLs"),
            ("remove_rss <url>", "(rr)", "Remove a feed source URL"),
            ("list_rss", "(lr)", "List configured feed sources"),
            ("interval <minutes>", "", "Set the scan interval in minutes"),
            ("info", "", "Show bot information"),
            ("help", "(h, ?)", "Show this help message"),
        ]
    }
}

/// Splits an argument string into whitespace-separated words.
fn split_words(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_owned).collect()
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(args) => match args.window {
                Some(window) => write!(f, "fetch {} {}", args.keywords.join(" "), window),
                None => write!(f, "fetch {}", args.keywords.join(" ")),
            },
            Self::AddKeywords(words) => write!(f, "add_keywords {}", words.join(" ")),
            Self::RemoveKeyword(word) => write!(f, "remove_keyword {word}"),
            Self::AddSources(urls) => write!(f, "add_rss {}", urls.join(" ")),
            Self::RemoveSource(url) => write!(f, "remove_rss {url}"),
            Self::Interval(minutes) => write!(f, "interval {minutes}"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Result of command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command was successful.
    pub success: bool,

    /// Response message to show the user.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
