//! Upstream source trait and a canned implementation for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{FeedError, Result};

/// Raw JSON documents from the exchange site
#[async_trait]
pub trait OptionChainSource: Send + Sync {
    /// Option chain for the configured symbol
    async fn fetch_chain(&self) -> Result<Value>;

    /// Index quotes (open/high/low/last/previous close)
    async fn fetch_index(&self) -> Result<Value>;

    /// Market breadth statistics
    async fn fetch_market_stats(&self) -> Result<Value>;

    /// Endpoint label for health reporting
    fn describe(&self) -> String {
        "upstream".to_string()
    }
}

/// Serves fixed payloads; a missing payload fails like an unreachable site
#[derive(Default)]
pub struct StaticSource {
    chain: Mutex<Option<Value>>,
    index: Mutex<Option<Value>>,
    market_stats: Mutex<Option<Value>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(self, payload: Value) -> Self {
        *self.chain.lock() = Some(payload);
        self
    }

    pub fn with_index(self, payload: Value) -> Self {
        *self.index.lock() = Some(payload);
        self
    }

    pub fn with_market_stats(self, payload: Value) -> Self {
        *self.market_stats.lock() = Some(payload);
        self
    }

    /// Swap the chain payload; `None` makes later fetches fail
    pub fn set_chain(&self, payload: Option<Value>) {
        *self.chain.lock() = payload;
    }

    fn serve(slot: &Mutex<Option<Value>>, what: &str) -> Result<Value> {
        slot.lock()
            .clone()
            .ok_or_else(|| FeedError::Unavailable(format!("no {what} payload configured")))
    }
}

#[async_trait]
impl OptionChainSource for StaticSource {
    async fn fetch_chain(&self) -> Result<Value> {
        Self::serve(&self.chain, "option chain")
    }

    async fn fetch_index(&self) -> Result<Value> {
        Self::serve(&self.index, "index")
    }

    async fn fetch_market_stats(&self) -> Result<Value> {
        Self::serve(&self.market_stats, "market statistics")
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_source_serves_and_fails() {
        let source = StaticSource::new().with_chain(json!({"records": {"data": []}}));
        assert!(source.fetch_chain().await.is_ok());
        assert_matches!(source.fetch_index().await, Err(FeedError::Unavailable(_)));

        source.set_chain(None);
        assert_matches!(source.fetch_chain().await, Err(FeedError::Unavailable(_)));
    }
}
