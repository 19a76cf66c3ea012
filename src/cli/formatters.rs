//! Output formatting module for CLI display
//!
//! Keeps presentation of check results and the price cache apart from the
//! tracking logic.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use pricewatch::fetcher::ProductRecord;
use pricewatch::store::PriceCache;
use pricewatch::utils::format_price;

/// Format a check result for JSON output
pub fn format_record_json(record: &ProductRecord) -> String {
    serde_json::to_string_pretty(record)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a check result for the terminal
pub fn format_record_text(record: &ProductRecord) -> String {
    let price = record
        .price
        .map(format_price)
        .unwrap_or_else(|| "not available".to_string());
    let stock = if record.in_stock {
        "In stock".green().to_string()
    } else {
        "Out of stock".red().to_string()
    };

    format!(
        "{} {}\n  Price: {}\n  Stock: {}",
        "✓".green().bold(),
        record.name.bold(),
        price,
        stock
    )
}

/// Format the price cache for JSON output
pub fn format_cache_json(cache: &PriceCache) -> String {
    #[derive(Serialize)]
    struct JsonEntry<'a> {
        name: &'a str,
        price: Option<String>,
    }

    let entries: Vec<JsonEntry> = cache
        .iter()
        .map(|(name, price)| JsonEntry {
            name,
            price: price.map(|p| p.to_string()),
        })
        .collect();

    serde_json::to_string_pretty(&entries)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the price cache as a table
pub fn format_cache_table(cache: &PriceCache) -> String {
    if cache.is_empty() {
        return "No prices tracked yet".to_string();
    }

    #[derive(Tabled)]
    struct CacheRow {
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Last Price")]
        price: String,
    }

    let rows: Vec<CacheRow> = cache
        .iter()
        .map(|(name, price)| CacheRow {
            name: name.clone(),
            price: price
                .map(format_price)
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}
