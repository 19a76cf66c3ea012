//! Pricewatch - product price tracker
//!
//! Fetches a product's name, price and stock status, compares the price with
//! the last one seen for that product name, sends an email alert when it
//! changed and persists the new price.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod notifier;
pub mod store;
pub mod tracker;
pub mod utils;

pub use error::{Result, TrackerError};
pub use fetcher::{FetchMode, Fetcher, ProductRecord};
pub use notifier::{EmailNotifier, LogNotifier, Notifier, PriceChange};
pub use store::{FilePriceStore, MemoryPriceStore, PriceCache, PriceStore};
pub use tracker::{check_price, PriceTracker};
