// JSON fixture parser (test mode)
//
// Expected shape:
//   { "product_name": "...", "current_price": 10.0, "in_stock": true }
// Every field is optional; see the defaults below.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use super::ProductRecord;
use crate::error::{Result, TrackerError};

const DEFAULT_PRODUCT_NAME: &str = "Unknown Product";

/// Parse a JSON fixture body into a record
pub fn parse_fixture(body: &str) -> Result<ProductRecord> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| TrackerError::Parse(format!("fixture is not valid JSON: {}", e)))?;
    let object = json
        .as_object()
        .ok_or_else(|| TrackerError::Parse("fixture is not a JSON object".to_string()))?;

    let name = match object.get("product_name") {
        None | Some(Value::Null) => DEFAULT_PRODUCT_NAME.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };

    let price = match object.get("current_price") {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(Value::Number(n)) => parse_decimal(&n.to_string())?,
        Some(Value::String(s)) => parse_decimal(s.trim())?,
        Some(other) => {
            return Err(TrackerError::Parse(format!(
                "current_price is not a number: {}",
                other
            )))
        }
    };

    let in_stock = match object.get("in_stock") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(TrackerError::Parse(format!(
                "in_stock is not a boolean: {}",
                other
            )))
        }
    };

    Ok(ProductRecord {
        name,
        price: Some(price),
        in_stock,
    })
}

fn parse_decimal(text: &str) -> Result<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| TrackerError::Parse(format!("unreadable price {:?}: {}", text, e)))
}
