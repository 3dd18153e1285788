//! Spot snapshots and their OHLCV candle fold

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MarketDataError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    #[default]
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
}

impl CandleInterval {
    pub fn as_seconds(&self) -> i64 {
        match self {
            CandleInterval::OneMinute => 60,
            CandleInterval::FiveMinutes => 300,
            CandleInterval::FifteenMinutes => 900,
            CandleInterval::OneHour => 3600,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandleInterval::OneMinute => "1m",
            CandleInterval::FiveMinutes => "5m",
            CandleInterval::FifteenMinutes => "15m",
            CandleInterval::OneHour => "1h",
        }
    }

    /// Start of the interval containing `ts`
    pub fn open_time(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let interval = self.as_seconds();
        let open = ts.timestamp().div_euclid(interval) * interval;
        Utc.timestamp_opt(open, 0).single().unwrap_or(ts)
    }
}

impl std::str::FromStr for CandleInterval {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(CandleInterval::OneMinute),
            "5m" => Ok(CandleInterval::FiveMinutes),
            "15m" => Ok(CandleInterval::FifteenMinutes),
            "1h" => Ok(CandleInterval::OneHour),
            other => Err(MarketDataError::DataNotAvailable(format!(
                "unsupported candle interval '{other}'"
            ))),
        }
    }
}

/// Point-in-time record appended once per analytics request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ts: DateTime<Utc>,
    #[serde(rename = "underlyingPrice")]
    pub underlying_price: Option<f64>,
    #[serde(default)]
    pub volume_sum: u64,
}

impl Snapshot {
    pub fn new(ts: DateTime<Utc>, underlying_price: Option<f64>, volume_sum: u64) -> Self {
        Self {
            ts,
            underlying_price,
            volume_sum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Interval open time
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    pub fn with_price(ts: DateTime<Utc>, price: f64, volume: u64) -> Self {
        Self {
            ts,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    pub fn update(&mut self, price: f64, volume: u64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += volume;
    }

    /// `max(H - L, |H - prev_close|, |L - prev_close|)`
    pub fn true_range(&self, prev_close: f64) -> f64 {
        true_range(self.high, self.low, prev_close)
    }
}

pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Fold snapshots into candles in ascending time order.
///
/// Input order does not matter; within an interval, open and close follow
/// the log order of the snapshots. Snapshots without a price contribute
/// nothing, not even volume.
pub fn build_candles(snapshots: &[Snapshot], interval: CandleInterval) -> Vec<Candle> {
    let mut by_open: BTreeMap<DateTime<Utc>, Candle> = BTreeMap::new();

    for snap in snapshots {
        let Some(price) = snap.underlying_price.filter(|p| p.is_finite()) else {
            continue;
        };
        let open_time = interval.open_time(snap.ts);
        by_open
            .entry(open_time)
            .and_modify(|c| c.update(price, snap.volume_sum))
            .or_insert_with(|| Candle::with_price(open_time, price, snap.volume_sum));
    }

    by_open.into_values().collect()
}
