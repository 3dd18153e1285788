//! Market data error types

use crate::types::OptionSide;
use thiserror::Error;

/// Errors that can occur while turning an upstream payload into a table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Payload does not have the option-chain shape at all
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Required structural field is absent
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Data not available
    #[error("Data not available: {0}")]
    DataNotAvailable(String),
}

/// Why an analytics result has no value.
///
/// This is not a failure: callers render it as `null`, never as zero.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undefined {
    /// Nothing left in scope after filtering
    #[error("no rows in scope")]
    EmptyInput,

    /// The CALL-side denominator summed to zero
    #[error("call-side denominator is zero")]
    ZeroCallSide,

    /// One side has no rows at all
    #[error("no {0} rows in scope")]
    MissingSide(OptionSide),

    /// Exclusion mode dropped every strike
    #[error("no strike has both sides live")]
    NoLiveStrikes,

    /// Spot price could not be derived
    #[error("spot price unavailable")]
    NoSpot,

    /// Strike step is zero, negative or not finite
    #[error("invalid strike step")]
    InvalidStep,
}
