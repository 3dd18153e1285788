//! Shared types for the option-chain table

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strike price used as a grouping key
pub type StrikeKey = OrderedFloat<f64>;

/// Option side (Call or Put), serialized with the exchange codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionSide {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionSide {
    pub const ALL: [OptionSide; 2] = [OptionSide::Call, OptionSide::Put];

    /// Exchange code used by the upstream feed and the dashboard
    pub fn code(&self) -> &'static str {
        match self {
            OptionSide::Call => "CE",
            OptionSide::Put => "PE",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CE" | "CALL" => Some(OptionSide::Call),
            "PE" | "PUT" => Some(OptionSide::Put),
            _ => None,
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which per-row quantity a ratio is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    OpenInterest,
    Volume,
}

impl Metric {
    pub fn of(&self, row: &ContractRow) -> u64 {
        match self {
            Metric::OpenInterest => row.open_interest,
            Metric::Volume => row.volume,
        }
    }
}

/// One leg (call or put) of one strike of one expiry.
///
/// Field names on the wire match what the dashboard already consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRow {
    pub expiry: Option<NaiveDate>,
    pub strike: f64,
    #[serde(rename = "optionType")]
    pub side: OptionSide,
    #[serde(rename = "OI")]
    pub open_interest: u64,
    #[serde(rename = "OI_change")]
    pub open_interest_change: i64,
    pub volume: u64,
    #[serde(rename = "lastPrice")]
    pub last_price: f64,
    #[serde(rename = "LTP_change")]
    pub last_price_change: f64,
    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: f64,
    #[serde(rename = "bidQty")]
    pub bid_qty: u64,
    #[serde(rename = "bidPrice")]
    pub bid_price: f64,
    #[serde(rename = "askQty")]
    pub ask_qty: u64,
    #[serde(rename = "askPrice")]
    pub ask_price: f64,
    #[serde(rename = "underlyingPrice")]
    pub underlying_price: f64,
}

impl ContractRow {
    /// A row with every numeric field zeroed
    pub fn new(strike: f64, side: OptionSide) -> Self {
        Self {
            expiry: None,
            strike,
            side,
            open_interest: 0,
            open_interest_change: 0,
            volume: 0,
            last_price: 0.0,
            last_price_change: 0.0,
            implied_volatility: 0.0,
            bid_qty: 0,
            bid_price: 0.0,
            ask_qty: 0,
            ask_price: 0.0,
            underlying_price: 0.0,
        }
    }

    pub fn with_open_interest(mut self, oi: u64) -> Self {
        self.open_interest = oi;
        self
    }

    pub fn with_oi_change(mut self, change: i64) -> Self {
        self.open_interest_change = change;
        self
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_last_price(mut self, price: f64) -> Self {
        self.last_price = price;
        self
    }

    pub fn with_iv(mut self, iv: f64) -> Self {
        self.implied_volatility = iv;
        self
    }

    pub fn with_underlying(mut self, spot: f64) -> Self {
        self.underlying_price = spot;
        self
    }

    pub fn with_expiry(mut self, expiry: NaiveDate) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn strike_key(&self) -> StrikeKey {
        OrderedFloat(self.strike)
    }
}

/// Per-strike CALL and PUT totals of one metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTotals {
    pub call: u64,
    pub put: u64,
}

impl SideTotals {
    pub fn add(&mut self, side: OptionSide, value: u64) {
        match side {
            OptionSide::Call => self.call += value,
            OptionSide::Put => self.put += value,
        }
    }

    /// Both sides carry liquidity at this strike
    pub fn is_live(&self) -> bool {
        self.call > 0 && self.put > 0
    }
}

/// Inclusive strike filter; either end may be open
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrikeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl StrikeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, strike: f64) -> bool {
        self.min.map_or(true, |lo| strike >= lo) && self.max.map_or(true, |hi| strike <= hi)
    }
}

/// Normalized option chain: one row per (strike, side) leg as delivered.
///
/// Rows are not sorted and may repeat a (strike, side) pair; every
/// aggregation sums duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractTable {
    rows: Vec<ContractRow>,
}

impl ContractTable {
    pub fn new(rows: Vec<ContractRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ContractRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ContractRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContractRow> {
        self.rows.iter()
    }

    pub fn side(&self, side: OptionSide) -> impl Iterator<Item = &ContractRow> {
        self.rows.iter().filter(move |r| r.side == side)
    }

    /// Rows whose strike passes the filter
    pub fn filtered(&self, filter: StrikeFilter) -> ContractTable {
        Self::new(
            self.rows
                .iter()
                .filter(|r| filter.contains(r.strike))
                .cloned()
                .collect(),
        )
    }

    /// Distinct strikes in ascending order
    pub fn strikes(&self) -> Vec<f64> {
        let mut keys: Vec<StrikeKey> = self.rows.iter().map(ContractRow::strike_key).collect();
        keys.sort();
        keys.dedup();
        keys.into_iter().map(|k| k.0).collect()
    }

    /// Group a metric by strike; a strike seen on one side only gets zero on the other
    pub fn totals_by_strike(&self, metric: Metric) -> BTreeMap<StrikeKey, SideTotals> {
        let mut grouped: BTreeMap<StrikeKey, SideTotals> = BTreeMap::new();
        for row in &self.rows {
            grouped
                .entry(row.strike_key())
                .or_default()
                .add(row.side, metric.of(row));
        }
        grouped
    }

    /// Spot price: median of the per-row underlying prices that are set
    pub fn spot(&self) -> Option<f64> {
        let prices: Vec<f64> = self
            .rows
            .iter()
            .map(|r| r.underlying_price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();
        median(prices)
    }

    /// Underlying price quoted on the first row
    pub fn first_underlying(&self) -> Option<f64> {
        self.rows.first().map(|r| r.underlying_price)
    }

    pub fn total_volume(&self) -> u64 {
        self.rows.iter().map(|r| r.volume).sum()
    }
}

impl FromIterator<ContractRow> for ContractTable {
    fn from_iter<I: IntoIterator<Item = ContractRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Median of a sample; even-sized samples average the middle pair
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
