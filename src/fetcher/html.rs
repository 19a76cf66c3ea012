// Product page scraper
//
// Extraction is tied to the product page markup: the title lives in
// `#productTitle`, the price is split across `span.a-price-whole` and
// `span.a-price-fraction`. Stock status is not present in a form we parse,
// so records from this path always report `in_stock = true`.

use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;

use super::ProductRecord;
use crate::error::{Result, TrackerError};

const TITLE_SELECTOR: &str = "#productTitle";
const PRICE_WHOLE_SELECTOR: &str = "span.a-price-whole";
const PRICE_FRACTION_SELECTOR: &str = "span.a-price-fraction";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TrackerError::Parse(format!("bad selector {}: {:?}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse a product page into a record.
///
/// A missing title is fatal; a missing price yields `price = None`.
pub fn parse_product_page(html: &str) -> Result<ProductRecord> {
    let document = Html::parse_document(html);
    let title_sel = selector(TITLE_SELECTOR)?;
    let whole_sel = selector(PRICE_WHOLE_SELECTOR)?;
    let fraction_sel = selector(PRICE_FRACTION_SELECTOR)?;

    let name = document
        .select(&title_sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TrackerError::Parse(format!("no {} element on page", TITLE_SELECTOR)))?;

    let whole = document.select(&whole_sel).next().map(element_text);
    let fraction = document.select(&fraction_sel).next().map(element_text);

    let price = match whole {
        Some(whole) => Some(parse_split_price(&whole, fraction.as_deref())?),
        None => None,
    };

    Ok(ProductRecord {
        name,
        price,
        in_stock: true,
    })
}

/// Join the whole and fractional price parts, e.g. `"1,299."` + `"99"` -> 1299.99
pub fn parse_split_price(whole: &str, fraction: Option<&str>) -> Result<Decimal> {
    let whole_digits: String = whole
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let whole_digits = whole_digits.trim_end_matches('.');

    let text = match fraction.map(str::trim).filter(|f| !f.is_empty()) {
        Some(fraction) => format!("{}.{}", whole_digits, fraction),
        None => whole_digits.to_string(),
    };

    Decimal::from_str(&text)
        .map_err(|e| TrackerError::Parse(format!("unreadable price {:?}: {}", text, e)))
}
