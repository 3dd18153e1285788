//! Upstream data feed
//!
//! [`OptionChainSource`] is the seam between the dashboard and the exchange
//! site. [`NseClient`] talks to the real site through a cookie session;
//! [`StaticSource`] serves canned payloads in tests.

pub mod client;
pub mod error;
pub mod retry;
pub mod source;

pub use client::NseClient;
pub use error::{FeedError, Result};
pub use retry::RetryPolicy;
pub use source::{OptionChainSource, StaticSource};
