//! Index quote and market breadth extraction
//!
//! Both upstream documents change shape between site releases; lookups go
//! through the alias-tolerant helpers in [`market_data::extract`].

use market_data::candles::true_range;
use market_data::extract::{self, Object};
use serde::Serialize;
use serde_json::Value;

use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexQuote {
    #[serde(rename = "indexName")]
    pub index_name: String,
    pub last: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub prev_close: f64,
    /// `max(H - L, |H - pc|, |L - pc|)`
    pub momentum: Option<f64>,
    pub avg_val: Option<f64>,
}

/// Locate `index_name` anywhere in the payload and read its OHLC
pub fn parse_index_quote(payload: &Value, index_name: &str) -> Result<IndexQuote> {
    let entry = extract::find_object(payload, &|o: &Object| {
        o.get("indexName").and_then(Value::as_str) == Some(index_name)
    })
    .ok_or_else(|| DashboardError::NotFound(index_name.to_string()))?;

    let high = extract::f64_field(entry, &["high"]);
    let low = extract::f64_field(entry, &["low"]);
    let prev_close = extract::f64_field(entry, &["previousClose", "prevClose"]);

    let momentum = (prev_close != 0.0 && high != 0.0 && low != 0.0)
        .then(|| true_range(high, low, prev_close));

    Ok(IndexQuote {
        index_name: index_name.to_string(),
        last: extract::f64_field(entry, &["last", "lastPrice"]),
        open: extract::f64_field(entry, &["open"]),
        high,
        low,
        prev_close,
        momentum,
        avg_val: momentum.map(|m| m / 2.0),
    })
}

/// Advancing and declining issue counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarketBreadth {
    pub advance: Option<u64>,
    pub decline: Option<u64>,
}

const BREADTH_KEYS: &[&str] = &["advances", "advance", "declines", "decline"];

/// First object naming advances or declines wins; otherwise fall back to
/// the first key that merely contains `adv` / `dec`.
pub fn parse_market_breadth(payload: &Value) -> MarketBreadth {
    let mut breadth = MarketBreadth::default();

    if let Some(obj) = extract::find_object(payload, &|o: &Object| {
        BREADTH_KEYS.iter().any(|k| o.contains_key(*k))
    }) {
        breadth.advance = count(extract::first_of(obj, &["advances", "advance", "adv"]));
        breadth.decline = count(extract::first_of(obj, &["declines", "decline", "dec"]));
    }

    if breadth.advance.is_none() {
        breadth.advance = count(extract::find_key_containing(payload, &["adv"]).map(|(_, v)| v));
    }
    if breadth.decline.is_none() {
        breadth.decline = count(extract::find_key_containing(payload, &["dec"]).map(|(_, v)| v));
    }
    breadth
}

fn count(value: Option<&Value>) -> Option<u64> {
    value
        .and_then(extract::as_f64)
        .filter(|v| *v >= 0.0)
        .map(|v| v.trunc() as u64)
}
