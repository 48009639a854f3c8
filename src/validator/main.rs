//! Standalone validator for watchlist files.
//!
//! This tool validates JSON watchlist files for the news alert bot,
//! checking for proper structure, valid source URLs, and other
//! requirements.

use std::process::ExitCode;

use clap::Parser;

// Import from the main crate
use news_alert_bot::config::WatchConfig;

/// Watchlist validator.
#[derive(Parser, Debug)]
#[command(name = "validate_watchlist")]
#[command(about = "Validates watchlist files for the news alert bot")]
#[command(version)]
struct Args {
    /// Path to the JSON watchlist file to validate.
    #[arg(short, long, default_value = "watchlist.json")]
    file: String,

    /// Generate an example watchlist file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show detailed information for each source.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Handle example generation
    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    // Validate the watchlist file
    validate_watchlist(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = WatchConfig::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example watchlist written to: {output_path}");
            println!(
                "\nThe file contains {} example sources and {} keywords.",
                example.source_count(),
                example.keyword_count()
            );
            println!("Edit the sources and keywords to match what you want to watch.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_watchlist(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    // Load the watchlist
    let config = match WatchConfig::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load watchlist: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.keywords.is_empty() {
        println!("✗ Error: no keywords configured");
        return ExitCode::FAILURE;
    }

    if config.scan_interval_secs == 0 {
        println!("✗ Error: scan interval must be greater than 0 seconds");
        return ExitCode::FAILURE;
    }

    // Validate all sources
    let results = config.validate_sources();

    let mut errors = 0;

    for (i, result) in results.iter().enumerate() {
        let url = config.sources.get(i).map_or("", String::as_str);

        if verbose {
            println!("[{}] {url}", i + 1);
        }

        match result {
            Ok(()) => {
                if verbose {
                    println!("  ✓ OK");
                }
            }
            Err(e) => {
                errors += 1;
                println!("  ✗ Error: {e}");
            }
        }
    }

    println!();

    // Summary
    let total = config.source_count();
    let valid = total.saturating_sub(errors);

    if errors == 0 && total > 0 {
        println!("✓ All {total} sources are valid!");
        println!("\nWatchlist summary:");
        println!("  Keywords: {}", config.keyword_count());
        println!("  Window:   {}", config.scan_window);
        println!("  Interval: {}s", config.scan_interval_secs);

        ExitCode::SUCCESS
    } else {
        println!("✗ Validation failed: {errors} error(s) in {total} sources");
        println!("  Valid: {valid}/{total}");

        ExitCode::FAILURE
    }
}
