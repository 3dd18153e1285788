//! ChainScope dashboard service
//!
//! Every request runs the same pipeline: fetch the upstream chain,
//! normalize it, pick the strike window, run the analytics, record a
//! snapshot, respond. [`Dashboard`] owns that pipeline; [`api`] exposes it
//! over HTTP.

pub mod api;
pub mod error;
pub mod orchestrator;
pub mod quotes;
pub mod report;

pub use api::dashboard_router;
pub use error::{DashboardError, Result};
pub use orchestrator::{Dashboard, WindowMode, WindowQuery};
pub use quotes::{parse_index_quote, parse_market_breadth, IndexQuote, MarketBreadth};
pub use report::{GreeksReport, GreeksRow, MaxPainReport, PcrChangeReport, WindowStats};
