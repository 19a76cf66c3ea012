// Fetcher module - retrieves product data from a product page or a JSON fixture
//
// Two source modes are supported: `primary` scrapes an HTML product page,
// `test` reads a JSON document. Both produce the same `ProductRecord`.

pub mod fixture;
pub mod html;

use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, TrackerError};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
const CACHE_BUSTER_PARAM: &str = "_t";

/// Normalized product data produced by every fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub name: String,
    /// `None` when the page carried no price
    pub price: Option<Decimal>,
    pub in_stock: bool,
}

/// Upstream data source/format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// HTML product page scrape
    Primary,
    /// JSON fixture
    Test,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Primary => "primary",
            FetchMode::Test => "test",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchMode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "amazon" => Ok(FetchMode::Primary),
            "test" => Ok(FetchMode::Test),
            other => Err(TrackerError::UnsupportedMode(other.to_string())),
        }
    }
}

/// Blocking HTTP fetcher with a fixed per-request timeout
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetch and parse the product behind `url` using the given source mode
    pub fn fetch(&self, url: &str, mode: FetchMode) -> Result<ProductRecord> {
        info!("Fetching {} ({} mode)", url, mode);
        let record = match mode {
            FetchMode::Primary => self.fetch_product_page(url)?,
            FetchMode::Test => self.fetch_fixture(url)?,
        };
        debug!("name: {}", record.name);
        debug!("price: {:?}", record.price);
        Ok(record)
    }

    fn fetch_product_page(&self, url: &str) -> Result<ProductRecord> {
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(REFERER, "https://www.google.com/")
            .header("DNT", "1");
        let body = read_body(request, url)?;
        html::parse_product_page(&body)
    }

    fn fetch_fixture(&self, url: &str) -> Result<ProductRecord> {
        let busted = cache_bust_url(url, Utc::now().timestamp())?;
        let body = read_body(self.client.get(busted), url)?;
        fixture::parse_fixture(&body)
    }
}

fn read_body(request: RequestBuilder, url: &str) -> Result<String> {
    let response = request
        .send()
        .map_err(|e| TrackerError::Fetch(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TrackerError::Fetch(format!(
            "{} returned error status: {}",
            url, status
        )));
    }

    response
        .text()
        .map_err(|e| TrackerError::Fetch(format!("failed to read body from {}: {}", url, e)))
}

/// Append the `_t=<timestamp>` cache-busting parameter to `url`, keeping any
/// query it already has.
pub fn cache_bust_url(url: &str, timestamp: i64) -> Result<Url> {
    let mut parsed =
        Url::parse(url).map_err(|e| TrackerError::Fetch(format!("invalid URL {}: {}", url, e)))?;
    parsed
        .query_pairs_mut()
        .append_pair(CACHE_BUSTER_PARAM, &timestamp.to_string());
    Ok(parsed)
}
