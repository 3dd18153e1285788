use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Root of `chainscope.yaml`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

/// Upstream option-chain site
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Landing page visited first so the site sets its session cookies
    #[serde(default = "default_home_url")]
    pub home_url: String,
    #[serde(default = "default_option_chain_url")]
    pub option_chain_url: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_index_url")]
    pub index_url: String,
    #[serde(default = "default_market_stats_url")]
    pub market_stats_url: String,
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base pause between attempts; attempt `n` waits `n * backoff_ms`
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            option_chain_url: default_option_chain_url(),
            symbol: default_symbol(),
            index_url: default_index_url(),
            market_stats_url: default_market_stats_url(),
            index_name: default_index_name(),
            user_agent: default_user_agent(),
            referer: default_referer(),
            timeout_seconds: default_timeout_seconds(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_strike_step")]
    pub strike_step: f64,
    #[serde(default = "default_fixed_window_below")]
    pub fixed_window_below: f64,
    #[serde(default = "default_fixed_window_above")]
    pub fixed_window_above: f64,
    /// Strikes either side of ATM for `mode=COUNT` when the request gives none
    #[serde(default = "default_atm_window")]
    pub default_atm_window: u32,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    #[serde(default)]
    pub dividend_yield: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            strike_step: default_strike_step(),
            fixed_window_below: default_fixed_window_below(),
            fixed_window_above: default_fixed_window_above(),
            default_atm_window: default_atm_window(),
            risk_free_rate: default_risk_free_rate(),
            dividend_yield: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
    #[serde(default = "default_candle_file")]
    pub candle_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_file: default_snapshot_file(),
            candle_file: default_candle_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_prefix")]
    pub prefix: String,
    #[serde(default = "default_enabled")]
    pub cors_allow_any: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: default_api_prefix(),
            cors_allow_any: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let yaml = "service:\n  name: chainscope\n";
        let cfg: DashboardConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.service.http_port, 8000);
        assert_eq!(cfg.service.host, "0.0.0.0");
        assert_eq!(cfg.upstream.index_name, "NIFTY 50");
        assert_eq!(cfg.upstream.timeout_seconds, 6);
        assert_eq!(cfg.upstream.max_attempts, 3);
        assert_eq!(cfg.analytics.strike_step, 50.0);
        assert_eq!(cfg.analytics.fixed_window_below, 500.0);
        assert_eq!(cfg.analytics.fixed_window_above, 550.0);
        assert_eq!(cfg.analytics.default_atm_window, 3);
        assert_eq!(cfg.storage.snapshot_file, "snapshots.jsonl");
        assert_eq!(cfg.api.prefix, "/api/nifty");
        assert!(cfg.api.cors_allow_any);
        assert_eq!(cfg.logging.format, "pretty");
        assert!(cfg.monitoring.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let yaml = r#"
service:
  name: chainscope
  http_port: 9000
upstream:
  symbol: BANKNIFTY
  max_attempts: 5
analytics:
  strike_step: 100
monitoring:
  metrics_port: 9090
"#;
        let cfg: DashboardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.service.http_port, 9000);
        assert_eq!(cfg.upstream.symbol, "BANKNIFTY");
        assert_eq!(cfg.upstream.max_attempts, 5);
        assert_eq!(cfg.upstream.backoff_ms, 500);
        assert_eq!(cfg.analytics.strike_step, 100.0);
        assert_eq!(cfg.analytics.risk_free_rate, 0.07);
        assert_eq!(cfg.monitoring.and_then(|m| m.metrics_port), Some(9090));
    }

    #[test]
    fn test_missing_service_is_rejected() {
        assert!(serde_yaml::from_str::<DashboardConfig>("api:\n  prefix: /x\n").is_err());
    }
}
