//! Request pipeline: fetch, normalize, analyze, record

use chrono::{NaiveDate, Utc};
use config::{AnalyticsConfig, DashboardConfig};
use feed::{NseClient, OptionChainSource};
use market_data::analytics::{
    bucket_by_moneyness, live_strike_totals, max_pain, pcr_change, pcr_excluding_zero, pcr_global,
    resolve_window, skew, vwap, WindowPolicy,
};
use market_data::greeks::{row_greeks, DAYS_PER_YEAR};
use market_data::{
    normalize_chain, Candle, CandleInterval, ContractTable, Metric, Snapshot, StrikeFilter,
};
use observability::PipelineMetrics;
use serde_json::Value;
use server::HealthState;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use storage::SnapshotStore;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::quotes::{parse_index_quote, parse_market_breadth, IndexQuote, MarketBreadth};
use crate::report::{GreeksReport, GreeksRow, MaxPainReport, PcrChangeReport, WindowStats};

/// Name under which upstream calls are reported to [`HealthState`]
pub const UPSTREAM_SERVICE: &str = "upstream";

/// How the analysis window is sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    #[default]
    Fixed,
    Count,
}

impl WindowMode {
    /// `FIXED` in any case selects the fixed window; anything else counts strikes
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("fixed") {
            WindowMode::Fixed
        } else {
            WindowMode::Count
        }
    }
}

/// `/window_stats` parameters after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowQuery {
    pub mode: WindowMode,
    /// Strikes either side of ATM in count mode
    pub atm_window: Option<u32>,
}

impl WindowQuery {
    pub fn policy(&self, analytics: &AnalyticsConfig) -> WindowPolicy {
        match self.mode {
            WindowMode::Fixed => WindowPolicy::Fixed {
                below: analytics.fixed_window_below,
                above: analytics.fixed_window_above,
            },
            WindowMode::Count => {
                WindowPolicy::StrikeCount(self.atm_window.unwrap_or(analytics.default_atm_window))
            }
        }
    }
}

pub struct Dashboard {
    source: Arc<dyn OptionChainSource>,
    store: Arc<SnapshotStore>,
    analytics: AnalyticsConfig,
    index_name: String,
    health: Arc<HealthState>,
    metrics: PipelineMetrics,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn OptionChainSource>,
        store: Arc<SnapshotStore>,
        analytics: AnalyticsConfig,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            analytics,
            index_name: index_name.into(),
            health: Arc::new(HealthState::new("chainscope")),
            metrics: PipelineMetrics::new(),
        }
    }

    /// Wire the real upstream client and on-disk store from configuration
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let client = NseClient::from_config(&config.upstream)?;
        let store = SnapshotStore::new(
            &config.storage.data_dir,
            &config.storage.snapshot_file,
            &config.storage.candle_file,
        );

        info!(
            chain_url = client.chain_url(),
            data_dir = %config.storage.data_dir,
            "Dashboard pipeline configured"
        );

        Ok(Self::new(
            Arc::new(client),
            Arc::new(store),
            config.analytics.clone(),
            config.upstream.index_name.clone(),
        )
        .with_health(Arc::new(HealthState::new(config.service.name.clone()))))
    }

    pub fn with_health(mut self, health: Arc<HealthState>) -> Self {
        self.health = health;
        self
    }

    pub fn health(&self) -> Arc<HealthState> {
        Arc::clone(&self.health)
    }

    pub fn analytics(&self) -> &AnalyticsConfig {
        &self.analytics
    }

    /// Times the call, reports it to health and metrics
    async fn observe<F>(&self, what: &'static str, call: F) -> Result<Value>
    where
        F: Future<Output = feed::Result<Value>>,
    {
        let started = Instant::now();
        let result = call.await;
        let elapsed = started.elapsed();
        let address = self.source.describe();

        match &result {
            Ok(_) => {
                self.metrics.upstream_fetched(elapsed);
                self.health
                    .record_success(UPSTREAM_SERVICE, &address, elapsed)
                    .await;
                debug!(what, ?elapsed, "Upstream fetch ok");
            }
            Err(e) => {
                self.metrics.upstream_failed();
                self.health
                    .record_failure(UPSTREAM_SERVICE, &address, e)
                    .await;
                warn!(what, error = %e, "Upstream fetch failed");
            }
        }
        Ok(result?)
    }

    /// Fetch and normalize; an unreadable payload is an empty table
    async fn fetch_table(&self) -> Result<ContractTable> {
        let payload = self.observe("option_chain", self.source.fetch_chain()).await?;
        Ok(normalize_chain(&payload).unwrap_or_else(|e| {
            warn!(error = %e, "Option chain payload not understood, using empty table");
            ContractTable::default()
        }))
    }

    pub async fn option_chain(&self) -> Result<ContractTable> {
        self.fetch_table().await
    }

    /// Never fails: a fetch error comes back as [`WindowStats::unavailable`]
    pub async fn window_stats(&self, query: WindowQuery) -> WindowStats {
        let table = match self.fetch_table().await {
            Ok(table) => table,
            Err(e) => return WindowStats::unavailable(e),
        };

        let last_candle = match self.read_candles(CandleInterval::OneMinute).await {
            Ok(candles) => candles.last().copied(),
            Err(e) => {
                warn!(error = %e, "Candle file unreadable, avg_val left empty");
                None
            }
        };

        let stats = analyze_window(&table, query.policy(&self.analytics), self.analytics.strike_step, last_candle);

        let snapshot = Snapshot::new(Utc::now(), table.spot(), table.total_volume());
        self.record_snapshot(snapshot).await;

        stats
    }

    /// Persist a snapshot and rebuild candles; failures are logged only
    async fn record_snapshot(&self, snapshot: Snapshot) {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || store.record(&snapshot)).await;

        match outcome {
            Ok(Ok(candles)) => {
                self.metrics.snapshot_recorded();
                debug!(candles = candles.len(), "Snapshot recorded");
            }
            Ok(Err(e)) => {
                self.metrics.persistence_failed();
                warn!(error = %e, "Snapshot persistence failed");
            }
            Err(e) => {
                self.metrics.persistence_failed();
                warn!(error = %e, "Snapshot persistence task failed");
            }
        }
    }

    async fn read_candles(&self, interval: CandleInterval) -> Result<Vec<Candle>> {
        let store = Arc::clone(&self.store);
        Ok(tokio::task::spawn_blocking(move || store.candles(interval)).await??)
    }

    pub async fn candles(&self, interval: CandleInterval) -> Result<Vec<Candle>> {
        self.read_candles(interval).await
    }

    pub async fn index_ohlc(&self) -> Result<IndexQuote> {
        let payload = self.observe("index", self.source.fetch_index()).await?;
        parse_index_quote(&payload, &self.index_name)
    }

    pub async fn market_stats(&self) -> Result<MarketBreadth> {
        let payload = self
            .observe("market_stats", self.source.fetch_market_stats())
            .await?;
        Ok(parse_market_breadth(&payload))
    }

    pub async fn greeks(&self) -> Result<GreeksReport> {
        let table = self.fetch_table().await?;
        Ok(chain_greeks(&table, Utc::now().date_naive(), &self.analytics))
    }
}

/// Every window metric for one table.
///
/// Window metrics run over the rows inside `[low, high]`; when no spot can
/// be derived the whole table is the window. `pcr_overall` and
/// `prev_close` always use the whole table.
pub fn analyze_window(
    table: &ContractTable,
    policy: WindowPolicy,
    strike_step: f64,
    last_candle: Option<Candle>,
) -> WindowStats {
    let window = resolve_window(table.spot(), strike_step, policy).ok();
    let scoped = match window {
        Some(w) => table.filtered(StrikeFilter::between(w.low, w.high)),
        None => table.clone(),
    };

    let prev_close = table.first_underlying();
    let avg_val = match (last_candle, prev_close) {
        (Some(candle), Some(pc)) => Some(candle.true_range(pc)),
        _ => None,
    };

    WindowStats {
        atm: window.map(|w| w.atm),
        low: window.map(|w| w.low),
        high: window.map(|w| w.high),
        pcr_window: pcr_excluding_zero(&scoped, Metric::OpenInterest, StrikeFilter::all()).ok(),
        pcr_window_volume: pcr_excluding_zero(&scoped, Metric::Volume, StrikeFilter::all()).ok(),
        pcr_window_details: live_strike_totals(&scoped, StrikeFilter::all()),
        pcr_buckets: window.map(|w| bucket_by_moneyness(&scoped, w.atm).report()),
        pcr_window_change: Some(PcrChangeReport::from(pcr_change(&scoped))),
        pcr_overall: pcr_global(table, Metric::OpenInterest, StrikeFilter::all()).ok(),
        vwap: vwap(&scoped)
            .into_iter()
            .map(|(side, value)| (side, value.ok()))
            .collect(),
        max_pain: max_pain(&scoped).ok().map(MaxPainReport::from),
        skew: skew(&scoped).ok(),
        prev_close,
        avg_val,
        error: None,
    }
}

/// Greeks for every row with a known expiry, priced off the table spot
pub fn chain_greeks(table: &ContractTable, today: NaiveDate, analytics: &AnalyticsConfig) -> GreeksReport {
    let spot = table.spot();
    let rows = match spot {
        Some(spot) => table
            .iter()
            .filter_map(|row| {
                let expiry = row.expiry?;
                let days = (expiry - today).num_days();
                let time = days as f64 / DAYS_PER_YEAR;
                Some(GreeksRow {
                    expiry,
                    strike: row.strike,
                    side: row.side,
                    implied_volatility: row.implied_volatility,
                    last_price: row.last_price,
                    days_to_expiry: days,
                    greeks: row_greeks(row, spot, time, analytics.risk_free_rate, analytics.dividend_yield),
                })
            })
            .collect(),
        None => Vec::new(),
    };

    GreeksReport {
        spot,
        risk_free_rate: analytics.risk_free_rate,
        dividend_yield: analytics.dividend_yield,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed::StaticSource;
    use market_data::{ContractRow, OptionSide};
    use serde_json::json;

    fn scenario() -> ContractTable {
        ContractTable::new(vec![
            ContractRow::new(100.0, OptionSide::Call).with_open_interest(50).with_underlying(105.0),
            ContractRow::new(100.0, OptionSide::Put).with_open_interest(30).with_underlying(105.0),
            ContractRow::new(150.0, OptionSide::Call).with_open_interest(0).with_underlying(105.0),
            ContractRow::new(150.0, OptionSide::Put).with_open_interest(20).with_underlying(105.0),
        ])
    }

    fn chain_payload() -> Value {
        json!({
            "records": {
                "underlyingValue": 105.0,
                "data": [
                    {"strikePrice": 100, "expiryDate": "30-Dec-2099",
                     "CE": {"openInterest": 50, "totalTradedVolume": 10, "lastPrice": 8.0, "impliedVolatility": 12.0, "underlyingValue": 105.0},
                     "PE": {"openInterest": 30, "totalTradedVolume": 20, "lastPrice": 3.0, "impliedVolatility": 15.0, "underlyingValue": 105.0}},
                    {"strikePrice": 150, "expiryDate": "30-Dec-2099",
                     "CE": {"openInterest": 0, "underlyingValue": 105.0},
                     "PE": {"openInterest": 20, "underlyingValue": 105.0}}
                ]
            }
        })
    }

    fn dashboard(source: StaticSource, dir: &std::path::Path) -> Dashboard {
        Dashboard::new(
            Arc::new(source),
            Arc::new(SnapshotStore::new(dir, "snapshots.jsonl", "candles_1m.json")),
            AnalyticsConfig::default(),
            "NIFTY 50",
        )
    }

    #[test]
    fn test_window_mode_parse() {
        assert_eq!(WindowMode::parse("FIXED"), WindowMode::Fixed);
        assert_eq!(WindowMode::parse("fixed"), WindowMode::Fixed);
        assert_eq!(WindowMode::parse("COUNT"), WindowMode::Count);
        assert_eq!(WindowMode::parse("anything"), WindowMode::Count);
    }

    #[test]
    fn test_query_policy_uses_config_defaults() {
        let analytics = AnalyticsConfig::default();
        let count = WindowQuery {
            mode: WindowMode::Count,
            atm_window: None,
        };
        assert_eq!(count.policy(&analytics), WindowPolicy::StrikeCount(3));
        assert_eq!(
            WindowQuery::default().policy(&analytics),
            WindowPolicy::Fixed {
                below: 500.0,
                above: 550.0
            }
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let stats = analyze_window(&scenario(), WindowPolicy::fixed(), 50.0, None);

        assert_eq!(stats.atm, Some(100.0));
        assert_eq!(stats.low, Some(-400.0));
        assert_eq!(stats.high, Some(650.0));
        assert!((stats.pcr_overall.unwrap() - 1.0).abs() < 1e-12);
        assert!((stats.pcr_window.unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(stats.pcr_window_details.call_oi, 50);
        assert_eq!(stats.pcr_window_details.put_oi, 30);
        assert_eq!(stats.prev_close, Some(105.0));
        assert_eq!(stats.avg_val, None);

        let buckets = stats.pcr_buckets.unwrap();
        assert_eq!(buckets.atm.call_oi, 50);
        assert_eq!(buckets.atm.put_oi, 30);
        assert_eq!(buckets.itm.put_oi, 20);
        assert_eq!(buckets.total.put_oi, 50);
    }

    #[test]
    fn test_max_pain_carries_pain_map() {
        let stats = analyze_window(&scenario(), WindowPolicy::fixed(), 50.0, None);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["max_pain"]["max_pain_strike"], 100.0);
        let pain_map = json["max_pain"]["pain_map"].as_object().unwrap();
        assert_eq!(pain_map.len(), 2);
        assert_eq!(pain_map["100"], 1000.0);
        assert_eq!(pain_map["150"], 2500.0);
    }

    #[test]
    fn test_avg_val_from_last_candle() {
        let candle = Candle::with_price(Utc::now(), 110.0, 0);
        let mut candle = candle;
        candle.update(100.0, 0);
        let stats = analyze_window(&scenario(), WindowPolicy::fixed(), 50.0, Some(candle));
        assert_eq!(stats.avg_val, Some(10.0));
    }

    #[test]
    fn test_no_spot_uses_whole_table() {
        let table = ContractTable::new(vec![
            ContractRow::new(100.0, OptionSide::Call).with_open_interest(10),
            ContractRow::new(9000.0, OptionSide::Put).with_open_interest(5),
        ]);
        let stats = analyze_window(&table, WindowPolicy::fixed(), 50.0, None);
        assert_eq!(stats.atm, None);
        assert!(stats.pcr_buckets.is_none());
        assert!((stats.pcr_overall.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(stats.pcr_window, None);
        assert_eq!(stats.max_pain.map(|mp| mp.max_pain_strike), Some(100.0));
    }

    #[test]
    fn test_empty_table_is_all_null() {
        let stats = analyze_window(&ContractTable::default(), WindowPolicy::fixed(), 50.0, None);
        assert_eq!(stats.pcr_overall, None);
        assert_eq!(stats.skew, None);
        assert_eq!(stats.max_pain, None);
        assert!(stats.vwap.is_empty());
        assert_eq!(stats.prev_close, None);
    }

    #[tokio::test]
    async fn test_window_stats_records_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(StaticSource::new().with_chain(chain_payload()), dir.path());

        let stats = dash.window_stats(WindowQuery::default()).await;
        assert!(stats.error.is_none());
        assert_eq!(stats.atm, Some(100.0));
        assert_eq!(stats.vwap.get(&OptionSide::Call), Some(&Some(8.0)));

        let candles = dash.candles(CandleInterval::OneMinute).await.unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[0].volume, 30);
        assert!(dash.health().is_healthy().await);
    }

    #[tokio::test]
    async fn test_concurrent_requests_each_record_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let dash = Arc::new(dashboard(StaticSource::new().with_chain(chain_payload()), dir.path()));

        let requests = (0..8).map(|_| {
            let dash = Arc::clone(&dash);
            async move { dash.window_stats(WindowQuery::default()).await }
        });
        let results = futures::future::join_all(requests).await;
        assert!(results.iter().all(|s| s.error.is_none()));

        let store = SnapshotStore::new(dir.path(), "snapshots.jsonl", "candles_1m.json");
        assert_eq!(store.read_snapshots().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_window_stats_absorbs_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(StaticSource::new(), dir.path());

        let stats = dash.window_stats(WindowQuery::default()).await;
        assert!(stats.error.is_some());
        assert_eq!(stats.atm, None);
        assert!(!dash.health().is_healthy().await);
        assert!(dash.candles(CandleInterval::OneMinute).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let dash = dashboard(StaticSource::new().with_chain(chain_payload()), &blocker);
        let stats = dash.window_stats(WindowQuery::default()).await;
        assert!(stats.error.is_none());
        assert!(stats.pcr_overall.is_some());
    }

    #[tokio::test]
    async fn test_unreadable_chain_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(StaticSource::new().with_chain(json!("maintenance")), dir.path());
        assert!(dash.option_chain().await.unwrap().is_empty());
    }

    #[test]
    fn test_chain_greeks_skip_rows_without_expiry() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();
        let table = ContractTable::new(vec![
            ContractRow::new(100.0, OptionSide::Call)
                .with_underlying(100.0)
                .with_iv(20.0)
                .with_expiry(expiry),
            ContractRow::new(100.0, OptionSide::Put).with_underlying(100.0),
        ]);

        let report = chain_greeks(&table, today, &AnalyticsConfig::default());
        assert_eq!(report.spot, Some(100.0));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].days_to_expiry, 30);
        assert!(report.rows[0].greeks.delta > 0.5);
        assert!(report.rows[0].greeks.theta < 0.0);
    }
}
