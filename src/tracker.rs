//! Price tracker: fetch -> compare -> notify -> persist
//!
//! A check is stateless apart from the price store. Fetch and parse errors
//! abort before anything is written; an unreadable cache counts as empty and
//! a failed notification is only logged.

use std::path::Path;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{Result, TrackerError};
use crate::fetcher::{FetchMode, Fetcher, ProductRecord};
use crate::notifier::{notifier_for, Notifier, PriceChange};
use crate::store::{FilePriceStore, PriceCache, PriceStore};
use crate::utils::format_price;

pub struct PriceTracker<S, N> {
    fetcher: Fetcher,
    store: S,
    notifier: N,
}

impl<S: PriceStore, N: Notifier> PriceTracker<S, N> {
    pub fn new(fetcher: Fetcher, store: S, notifier: N) -> Self {
        Self {
            fetcher,
            store,
            notifier,
        }
    }

    /// Run one check for `url` and return the freshly fetched record
    pub fn check_price(&self, url: &str, mode: FetchMode) -> Result<ProductRecord> {
        let record = self.fetcher.fetch(url, mode).map_err(|e| {
            warn!("Failed to fetch current product info from {}: {}", url, e);
            e
        })?;
        if record.name.trim().is_empty() {
            warn!("Product at {} has no usable name", url);
            return Err(TrackerError::Parse(format!("no product name at {}", url)));
        }

        let mut cache = self.load_cache();

        if let Some(change) = detect_change(&cache, &record) {
            info!(
                "Price change detected for {}: {} -> {}",
                change.name,
                change.old_price,
                change
                    .new_price
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            if let Err(e) = self.notifier.notify(&change) {
                warn!("Failed to send price alert for {}: {}", change.name, e);
            }
        } else {
            info!("{}", status_line(&record));
        }

        cache.insert(record.name.clone(), record.price);
        self.store.save(&cache)?;

        Ok(record)
    }

    fn load_cache(&self) -> PriceCache {
        match self.store.load() {
            Ok(cache) => cache,
            Err(e) => {
                warn!(
                    "Ignoring unreadable price cache, all cached prices are discarded: {}",
                    e
                );
                PriceCache::new()
            }
        }
    }
}

/// Compare the cached price for the record's name with the fetched one.
///
/// Only a present, different cached price counts as a change. The comparison
/// is exact.
pub fn detect_change(cache: &PriceCache, record: &ProductRecord) -> Option<PriceChange> {
    let last = cache.get(&record.name).copied().flatten()?;
    if Some(last) == record.price {
        return None;
    }
    Some(PriceChange {
        name: record.name.clone(),
        old_price: last,
        new_price: record.price,
    })
}

/// `name | $price | In stock` summary used for unchanged checks
pub fn status_line(record: &ProductRecord) -> String {
    let price = record
        .price
        .map(format_price)
        .unwrap_or_else(|| "n/a".to_string());
    let stock = if record.in_stock {
        "In stock"
    } else {
        "Out of stock"
    };
    format!("{} | {} | {}", record.name, price, stock)
}

/// One-shot check wired from settings: file store at `cache_location`,
/// email alerts when mail is configured and usable, log output otherwise.
pub fn check_price(
    url: &str,
    mode: FetchMode,
    cache_location: &Path,
    settings: &Settings,
) -> Result<ProductRecord> {
    let fetcher = Fetcher::new(settings.http_timeout())?;
    let mail = settings.mail_settings().unwrap_or_else(|e| {
        warn!("Ignoring mail settings: {}", e);
        None
    });
    let notifier = notifier_for(mail.as_ref(), settings.http_timeout());
    let tracker = PriceTracker::new(fetcher, FilePriceStore::new(cache_location), notifier);
    tracker.check_price(url, mode)
}
