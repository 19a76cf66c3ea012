use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "pricewatch")]
#[command(version, about = "Track a product's price and get an email when it changes")]
#[command(
    long_about = "Fetch a product page (or a JSON test fixture), compare its price with the last one seen, send an email alert on change and remember the new price."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the current price of a product once
    Check {
        /// Product page URL (or JSON fixture URL in test mode)
        url: String,

        /// Source mode: primary (HTML product page) or test (JSON fixture)
        #[arg(short, long, default_value = "primary")]
        mode: String,

        /// Price cache file (overrides config)
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Price cache inspection
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// List the last known price of every tracked product
    Show {
        /// Price cache file (overrides config)
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}
