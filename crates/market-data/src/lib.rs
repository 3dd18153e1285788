//! Option-chain data model and analytics for ChainScope
//!
//! # Core Components
//!
//! - [`normalize`] - Upstream payload to [`ContractTable`]
//! - [`extract`] - Schema-tolerant JSON lookups
//! - [`analytics`] - PCR, VWAP, max pain, skew, ATM window and bucketing
//! - [`greeks`] - Black-Scholes Greeks per chain row
//! - [`candles`] - Snapshot to OHLCV candle fold
//!
//! # Key Invariants
//!
//! - Analytics never mutate the table and never write state
//! - A zero denominator is an explicit [`Undefined`], never `0.0`
//! - Duplicated (strike, side) rows are summed, not deduplicated

pub mod analytics;
pub mod candles;
pub mod error;
pub mod extract;
pub mod greeks;
pub mod normalize;
pub mod types;

pub use candles::{build_candles, Candle, CandleInterval, Snapshot};
pub use error::{MarketDataError, Undefined};
pub use normalize::normalize_chain;
pub use types::{ContractRow, ContractTable, Metric, OptionSide, StrikeFilter};

pub type Result<T> = std::result::Result<T, MarketDataError>;
