//! News Alert Bot - Main Entry Point
//!
//! Watches RSS/Atom feeds for keyword matches and reports new articles.
//! Commands are read from stdin; scan results are printed to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use news_alert_bot::commands::CommandHandler;
use news_alert_bot::config::{BotSettings, MAX_MESSAGE_LENGTH, WatchConfig};
use news_alert_bot::feed::{HttpFetcher, SeenLinks, TimeWindow, scan};
use news_alert_bot::format::split_message;
use news_alert_bot::scheduler::{
    OutboundReport, ScanScheduler, SchedulerCommand, SessionId, SessionRegistry,
};

/// The single session driven by the local console.
const CONSOLE_SESSION: SessionId = 0;

/// Feed-watching bot that reports keyword matches from RSS/Atom sources.
#[derive(Parser, Debug)]
#[command(name = "news_alert_bot")]
#[command(about = "Scan RSS/Atom feeds for keyword matches")]
#[command(version)]
struct Args {
    /// Path to the watchlist JSON file (defaults to WATCHLIST_PATH or watchlist.json).
    #[arg(short, long)]
    config: Option<String>,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Generate an example watchlist file and exit.
    #[arg(long)]
    generate_config: bool,

    /// Run a single scan, print the results, and exit.
    #[arg(long)]
    once: bool,

    /// Time window for --once (today, yesterday, last hour, last 3 hours).
    #[arg(short, long)]
    window: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Handle example config generation
    if args.generate_config {
        return generate_example_config();
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let settings = BotSettings::from_env_with_defaults();
    let config_path = args
        .config
        .as_ref()
        .map_or_else(|| settings.watchlist_path.clone(), PathBuf::from);

    let mut watch_config = WatchConfig::load_from_file(&config_path)
        .with_context(|| format!("Failed to load watchlist from {}", config_path.display()))?;

    watch_config
        .validate()
        .context("Watchlist validation failed")?;

    // SCAN_INTERVAL_SECS overrides the interval from the watchlist file
    if std::env::var("SCAN_INTERVAL_SECS").is_ok() && settings.scan_interval_secs > 0 {
        watch_config.scan_interval_secs = settings.scan_interval_secs;
    }

    info!(
        "Loaded watchlist: {} sources, {} keywords, window: {}",
        watch_config.source_count(),
        watch_config.keyword_count(),
        watch_config.scan_window
    );

    if args.once {
        return run_once(watch_config, args.window.as_deref()).await;
    }

    run_bot(watch_config, config_path, settings).await
}

/// Runs a single scan against a fresh seen-link set and prints the
/// results.
async fn run_once(mut config: WatchConfig, window: Option<&str>) -> Result<()> {
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let window = window.map_or(config.scan_window, TimeWindow::parse);
    let mut seen = SeenLinks::new();
    let sources = config.sources.clone();

    let outcome = scan(
        &fetcher,
        &sources,
        &mut config.keywords,
        window,
        &mut seen,
        chrono::Utc::now(),
    )
    .await
    .context("Scan failed")?;

    for diagnostic in &outcome.diagnostics {
        eprintln!("{diagnostic}");
    }

    if outcome.articles.is_empty() {
        println!("No articles found with the specified keywords.");
    } else {
        for article in &outcome.articles {
            println!("Found article: {}\nLink: {}", article.title, article.link);
        }
    }

    Ok(())
}

/// Runs the interactive bot: scheduler, report printer, and a stdin
/// command loop for the console session.
async fn run_bot(
    watch_config: WatchConfig,
    config_path: PathBuf,
    settings: BotSettings,
) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new().context("Failed to build HTTP client")?);
    let config = Arc::new(RwLock::new(watch_config));
    let seen = Arc::new(Mutex::new(SeenLinks::new()));
    let sessions = Arc::new(RwLock::new(SessionRegistry::new()));

    let (scheduler_tx, scheduler_rx) = mpsc::channel::<SchedulerCommand>(32);
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<OutboundReport>(64);

    let scheduler = ScanScheduler::new(
        fetcher,
        Arc::clone(&config),
        seen,
        Arc::clone(&sessions),
        outbound_tx,
    );

    let handler = CommandHandler::new(
        settings.command_prefix.clone(),
        Arc::clone(&config),
        config_path,
        sessions,
        scheduler_tx.clone(),
    );

    info!("Starting news alert bot...");
    info!("Command prefix: {}", settings.command_prefix);

    // Spawn scheduler task
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_rx).await;
    });

    // Spawn report printer
    let printer_handle = tokio::spawn(async move {
        while let Some(report) = outbound_rx.recv().await {
            println!("{}", report.text);
        }
    });

    println!(
        "Bot is running. Type {}help for commands, Ctrl+C to stop.",
        settings.command_prefix
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => handle_line(&handler, &settings.command_prefix, &line).await,
                    Ok(None) => {
                        info!("Stdin closed, shutting down...");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    // Cleanup
    info!("Shutting down...");
    let _ = scheduler_tx.send(SchedulerCommand::Shutdown).await;
    let _ = scheduler_handle.await;
    let _ = printer_handle.await;

    Ok(())
}

/// Handles one console input line.
async fn handle_line(handler: &CommandHandler, prefix: &str, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match handler.try_handle(CONSOLE_SESSION, line).await {
        Some(result) => {
            for chunk in split_message(&result.message, MAX_MESSAGE_LENGTH) {
                println!("{chunk}");
            }
        }
        None => println!("Unknown command. Type {prefix}help for a list of commands."),
    }
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates an example watchlist file.
fn generate_example_config() -> Result<()> {
    let example = WatchConfig::example();
    example.save_to_file("watchlist.example.json")?;

    println!("✓ Example watchlist written to: watchlist.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy watchlist.example.json to watchlist.json");
    println!("2. Edit the sources and keywords to your liking");
    println!("3. Run: news_alert_bot");

    Ok(())
}
