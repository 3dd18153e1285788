//! Stateless analytics over a [`ContractTable`](crate::types::ContractTable).
//!
//! Every function returns an [`Outcome`]: either a value or the reason it is
//! undefined. An empty table is always valid input.

pub mod buckets;
pub mod max_pain;
pub mod pcr;
pub mod skew;
pub mod vwap;
pub mod window;

pub use buckets::{
    bucket_by_moneyness, classify, Bucket, BucketReport, Buckets, BucketsReport, Moneyness, StrikeSpan,
    NO_DATA,
};
pub use max_pain::{max_pain, MaxPain};
pub use pcr::{live_strike_totals, pcr_change, pcr_excluding_zero, pcr_global, LiveStrikeTotals, PcrChange};
pub use skew::skew;
pub use vwap::vwap;
pub use window::{
    resolve_window, round_to_strike, AtmWindow, WindowPolicy, DEFAULT_STRIKE_STEP,
    FIXED_WINDOW_ABOVE, FIXED_WINDOW_BELOW,
};

use crate::error::Undefined;

/// Result of an analytics function
pub type Outcome<T> = std::result::Result<T, Undefined>;
