pub fn default_enabled() -> bool {
    true
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8000
}

// === Upstream ===

pub fn default_home_url() -> String {
    "https://www.nseindia.com".to_string()
}

pub fn default_option_chain_url() -> String {
    "https://www.nseindia.com/api/option-chain-indices".to_string()
}

pub fn default_symbol() -> String {
    "NIFTY".to_string()
}

pub fn default_index_url() -> String {
    "https://www.nseindia.com/api/NextApi/apiClient?functionName=getIndexData".to_string()
}

pub fn default_market_stats_url() -> String {
    "https://www.nseindia.com/api/NextApi/apiClient?functionName=getMarketStatistics".to_string()
}

pub fn default_index_name() -> String {
    "NIFTY 50".to_string()
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

pub fn default_referer() -> String {
    "https://www.nseindia.com/option-chain".to_string()
}

pub fn default_timeout_seconds() -> u64 {
    6
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_ms() -> u64 {
    500
}

// === Analytics ===

pub fn default_strike_step() -> f64 {
    50.0
}

pub fn default_fixed_window_below() -> f64 {
    500.0
}

pub fn default_fixed_window_above() -> f64 {
    550.0
}

pub fn default_atm_window() -> u32 {
    3
}

pub fn default_risk_free_rate() -> f64 {
    0.07
}

// === Storage / API / Logging ===

pub fn default_data_dir() -> String {
    "data".to_string()
}

pub fn default_snapshot_file() -> String {
    "snapshots.jsonl".to_string()
}

pub fn default_candle_file() -> String {
    "candles_1m.json".to_string()
}

pub fn default_api_prefix() -> String {
    "/api/nifty".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}
