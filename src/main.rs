mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{formatters, CacheCommands, Cli, Commands};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pricewatch::config::Settings;
use pricewatch::fetcher::FetchMode;
use pricewatch::store::{FilePriceStore, PriceStore};

fn main() -> Result<()> {
    // .env first so RUST_LOG and PRICEWATCH_* from it are visible below
    let dotenv = dotenvy::dotenv();

    // Logs go to stderr; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv {
        debug!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Check { url, mode, cache } => {
            handle_check(&settings, &url, &mode, cache, cli.json)
        }
        Commands::Cache { action } => match action {
            CacheCommands::Show { cache } => handle_cache_show(&settings, cache, cli.json),
        },
    }
}

fn resolve_cache_path(settings: &Settings, cache: Option<PathBuf>) -> Result<PathBuf> {
    match cache {
        Some(path) => Ok(path),
        None => settings
            .cache_path()
            .context("Failed to determine price cache location"),
    }
}

/// Handle check command
fn handle_check(
    settings: &Settings,
    url: &str,
    mode: &str,
    cache: Option<PathBuf>,
    json_output: bool,
) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        bail!("Please enter a product URL.");
    }
    let mode: FetchMode = mode.parse().context("Invalid source mode")?;
    let cache_path = resolve_cache_path(settings, cache)?;

    info!("Checking {} (cache: {})", url, cache_path.display());
    let record = pricewatch::check_price(url, mode, &cache_path, settings)
        .context("Unable to fetch or parse the product information")?;

    if json_output {
        println!("{}", formatters::format_record_json(&record));
    } else {
        println!("{}", formatters::format_record_text(&record));
    }
    Ok(())
}

/// Handle cache show command
fn handle_cache_show(settings: &Settings, cache: Option<PathBuf>, json_output: bool) -> Result<()> {
    let cache_path = resolve_cache_path(settings, cache)?;
    let prices = FilePriceStore::new(&cache_path)
        .load()
        .with_context(|| format!("Failed to read price cache {}", cache_path.display()))?;

    if json_output {
        println!("{}", formatters::format_cache_json(&prices));
    } else {
        println!("{}", formatters::format_cache_table(&prices));
    }
    Ok(())
}
