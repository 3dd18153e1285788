//! Upstream option-chain payload to [`ContractTable`]
//!
//! Accepted shapes under `records` (or at the top level when `records` is
//! absent):
//!
//! - `data: [ {strikePrice, expiryDate, CE: {..}, PE: {..}}, .. ]`
//! - `data: { "<expiry>": [ {strikePrice, CE: {..}, PE: {..}}, .. ], .. }`

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::error::MarketDataError;
use crate::extract::{self, Object};
use crate::types::{ContractRow, ContractTable, OptionSide};
use crate::Result;

/// Field names the feed has used for the open-interest change, in priority order
pub const OI_CHANGE_ALIASES: &[&str] = &[
    "changeinOpenInterest",
    "changeInOpenInterest",
    "chngInOpenInterest",
    "oiChange",
    "OI_change",
    "OI_chng",
];

const STRIKE_ALIASES: &[&str] = &["strikePrice", "strike"];
const EXPIRY_ALIASES: &[&str] = &["expiryDate", "expiry"];
const UNDERLYING_ALIASES: &[&str] = &["underlyingValue", "underlyingPrice"];

const EXPIRY_FORMATS: &[&str] = &["%d-%b-%Y", "%d-%B-%Y", "%d-%m-%Y", "%Y-%m-%d", "%d %b %Y"];

/// Parse an expiry date; `None` when no known format matches
pub fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    EXPIRY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Build a table from a raw upstream payload.
///
/// Missing numeric fields become zero, rows whose strike cannot be parsed
/// are dropped, and an unparseable expiry leaves the row with no expiry.
/// Only a payload without any `data` collection is an error.
pub fn normalize_chain(payload: &Value) -> Result<ContractTable> {
    let records = payload.get("records").unwrap_or(payload);
    let records = records
        .as_object()
        .ok_or_else(|| MarketDataError::MalformedPayload("records is not an object".into()))?;

    let fallback_spot = records
        .get("underlyingValue")
        .and_then(extract::as_f64)
        .unwrap_or(0.0);

    let data = records
        .get("data")
        .ok_or_else(|| MarketDataError::MissingField("records.data".into()))?;

    let mut rows = Vec::new();
    match data {
        Value::Array(items) => {
            for item in items {
                push_strike_record(&mut rows, item, None, fallback_spot);
            }
        }
        Value::Object(by_expiry) => {
            for (expiry, items) in by_expiry {
                let Some(items) = items.as_array() else {
                    debug!(%expiry, "Skipping non-list expiry bucket");
                    continue;
                };
                for item in items {
                    push_strike_record(&mut rows, item, Some(expiry.as_str()), fallback_spot);
                }
            }
        }
        _ => {
            return Err(MarketDataError::MalformedPayload(
                "records.data is neither a list nor a map".into(),
            ))
        }
    }

    debug!(rows = rows.len(), "Option chain normalized");
    Ok(ContractTable::new(rows))
}

fn push_strike_record(
    rows: &mut Vec<ContractRow>,
    item: &Value,
    bucket_expiry: Option<&str>,
    fallback_spot: f64,
) {
    let Some(record) = item.as_object() else {
        return;
    };

    let Some(strike) = extract::first_of(record, STRIKE_ALIASES).and_then(extract::as_f64) else {
        debug!(?record, "Dropping record with unparseable strike");
        return;
    };

    let expiry_raw = extract::str_field(record, EXPIRY_ALIASES);
    let expiry = expiry_raw
        .as_deref()
        .or(bucket_expiry)
        .and_then(parse_expiry);

    for side in OptionSide::ALL {
        if let Some(leg) = record.get(side.code()).and_then(Value::as_object) {
            rows.push(leg_to_row(leg, strike, side, expiry, fallback_spot));
        }
    }
}

fn leg_to_row(
    leg: &Object,
    strike: f64,
    side: OptionSide,
    expiry: Option<NaiveDate>,
    fallback_spot: f64,
) -> ContractRow {
    let underlying = extract::first_of(leg, UNDERLYING_ALIASES)
        .and_then(extract::as_f64)
        .unwrap_or(fallback_spot);

    ContractRow {
        expiry,
        strike,
        side,
        open_interest: extract::u64_field(leg, &["openInterest"]),
        open_interest_change: extract::i64_field(leg, OI_CHANGE_ALIASES),
        volume: extract::u64_field(leg, &["totalTradedVolume", "volume"]),
        last_price: extract::f64_field(leg, &["lastPrice", "ltp"]).max(0.0),
        last_price_change: extract::f64_field(leg, &["change"]),
        implied_volatility: extract::f64_field(leg, &["impliedVolatility", "iv"]).max(0.0),
        bid_qty: extract::u64_field(leg, &["bidQty"]),
        bid_price: extract::f64_field(leg, &["bidprice", "bidPrice"]).max(0.0),
        ask_qty: extract::u64_field(leg, &["askQty"]),
        ask_price: extract::f64_field(leg, &["askPrice", "askprice"]).max(0.0),
        underlying_price: underlying,
    }
}
