//! Error handling for pricewatch
//!
//! Defines the error taxonomy of a price check. The library returns
//! `TrackerError` directly; the binary wraps it with anyhow context.

use thiserror::Error;

/// Everything that can go wrong during a single price check
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("cache read error: {0}")]
    CacheRead(String),

    #[error("cache write error: {0}")]
    CacheWrite(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for price check operations
pub type Result<T> = std::result::Result<T, TrackerError>;
