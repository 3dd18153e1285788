use crate::*;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("{field} must be a non-zero port")]
    InvalidPort { field: String },

    #[error("{field}: invalid URL '{value}': {message}")]
    InvalidUrl {
        field: String,
        value: String,
        message: String,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: u64,
        max: u64,
        value: u64,
    },

    #[error("{field} must be a positive number")]
    InvalidPositiveFloat { field: String },

    #[error("{field} must not be negative")]
    NegativeValue { field: String },

    #[error("API prefix '{0}' must start with '/'")]
    InvalidApiPrefix(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("{field} is empty")]
    EmptyField { field: String },

    #[error("Environment variable placeholder left unresolved in {field}: '{value}'")]
    UnresolvedEnvVar { field: String, value: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

pub fn validate_config(config: &DashboardConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_upstream(&config.upstream, &mut report);
    validate_analytics(&config.analytics, &mut report);
    validate_storage(&config.storage, &mut report);
    validate_api(&config.api, &mut report);
    validate_logging(&config.logging, &mut report);

    match config.monitoring.as_ref().and_then(|m| m.metrics_port) {
        Some(0) => report.add_error(ValidationError::InvalidPort {
            field: "monitoring.metrics_port".to_string(),
        }),
        Some(port) if port == config.service.http_port => report.add_error(ValidationError::InvalidPort {
            field: "monitoring.metrics_port (same as service.http_port)".to_string(),
        }),
        Some(_) => {}
        None => report.add_default("monitoring.metrics_port", "disabled"),
    }

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.trim().is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }
    check_resolved("service.name", &service.name, report);

    if service.http_port == 0 {
        report.add_error(ValidationError::InvalidPort {
            field: "service.http_port".to_string(),
        });
    }
    if service.http_port == default_http_port() {
        report.add_default("service.http_port", &service.http_port.to_string());
    }
}

fn validate_upstream(upstream: &UpstreamConfig, report: &mut ValidationReport) {
    for (field, value) in [
        ("upstream.home_url", &upstream.home_url),
        ("upstream.option_chain_url", &upstream.option_chain_url),
        ("upstream.index_url", &upstream.index_url),
        ("upstream.market_stats_url", &upstream.market_stats_url),
        ("upstream.referer", &upstream.referer),
    ] {
        if !check_resolved(field, value, report) {
            continue;
        }
        if let Err(e) = Url::parse(value) {
            report.add_error(ValidationError::InvalidUrl {
                field: field.to_string(),
                value: value.clone(),
                message: e.to_string(),
            });
        }
    }

    for (field, value) in [
        ("upstream.symbol", &upstream.symbol),
        ("upstream.index_name", &upstream.index_name),
    ] {
        if value.trim().is_empty() {
            report.add_error(ValidationError::EmptyField {
                field: field.to_string(),
            });
        }
        check_resolved(field, value, report);
    }

    if upstream.user_agent.trim().is_empty() {
        report.add_warning(
            "upstream.user_agent",
            "An empty User-Agent is usually rejected by the upstream site",
        );
    }

    if upstream.timeout_seconds == 0 {
        report.add_error(ValidationError::OutOfRange {
            field: "upstream.timeout_seconds".to_string(),
            min: 1,
            max: 9,
            value: 0,
        });
    } else if upstream.timeout_seconds > 9 {
        report.add_warning(
            "upstream.timeout_seconds",
            &format!(
                "{}s is above the single-digit timeout the upstream tolerates",
                upstream.timeout_seconds
            ),
        );
    }

    if !(1..=10).contains(&upstream.max_attempts) {
        report.add_error(ValidationError::OutOfRange {
            field: "upstream.max_attempts".to_string(),
            min: 1,
            max: 10,
            value: upstream.max_attempts as u64,
        });
    }

    if upstream.backoff_ms == 0 {
        report.add_warning(
            "upstream.backoff_ms",
            "Retries will hit the upstream back to back",
        );
    }
}

fn validate_analytics(analytics: &AnalyticsConfig, report: &mut ValidationReport) {
    if !(analytics.strike_step.is_finite() && analytics.strike_step > 0.0) {
        report.add_error(ValidationError::InvalidPositiveFloat {
            field: "analytics.strike_step".to_string(),
        });
    }

    for (field, value) in [
        ("analytics.fixed_window_below", analytics.fixed_window_below),
        ("analytics.fixed_window_above", analytics.fixed_window_above),
        ("analytics.dividend_yield", analytics.dividend_yield),
    ] {
        if !value.is_finite() || value < 0.0 {
            report.add_error(ValidationError::NegativeValue {
                field: field.to_string(),
            });
        }
    }

    if analytics.fixed_window_below != analytics.fixed_window_above {
        report.add_warning(
            "analytics.fixed_window_above",
            &format!(
                "Fixed window is asymmetric: {} below ATM, {} above",
                analytics.fixed_window_below, analytics.fixed_window_above
            ),
        );
    }

    if analytics.default_atm_window == 0 {
        report.add_warning(
            "analytics.default_atm_window",
            "COUNT windows will contain the ATM strike only",
        );
    }

    if !analytics.risk_free_rate.is_finite() {
        report.add_error(ValidationError::InvalidPositiveFloat {
            field: "analytics.risk_free_rate".to_string(),
        });
    } else if analytics.risk_free_rate > 1.0 {
        report.add_warning(
            "analytics.risk_free_rate",
            "Rate looks like a percentage; expected a fraction such as 0.07",
        );
    }
}

fn validate_storage(storage: &StorageConfig, report: &mut ValidationReport) {
    for (field, value) in [
        ("storage.data_dir", &storage.data_dir),
        ("storage.snapshot_file", &storage.snapshot_file),
        ("storage.candle_file", &storage.candle_file),
    ] {
        if value.trim().is_empty() {
            report.add_error(ValidationError::EmptyField {
                field: field.to_string(),
            });
        }
        check_resolved(field, value, report);
    }

    if storage.snapshot_file == storage.candle_file {
        report.add_error(ValidationError::EmptyField {
            field: "storage.candle_file (must differ from snapshot_file)".to_string(),
        });
    }
}

fn validate_api(api: &ApiConfig, report: &mut ValidationReport) {
    if !api.prefix.starts_with('/') {
        report.add_error(ValidationError::InvalidApiPrefix(api.prefix.clone()));
    }
    if !api.cors_allow_any {
        report.add_warning("api.cors_allow_any", "Browser dashboards on another origin will be blocked");
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if !LOG_FORMATS.contains(&logging.format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}

/// Records an error and returns `false` when `value` still holds a `${VAR}` placeholder
fn check_resolved(field: &str, value: &str, report: &mut ValidationReport) -> bool {
    if has_unresolved_env_vars(value) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: field.to_string(),
            value: value.to_string(),
        });
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DashboardConfig {
        generate_default_config()
    }

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_config(&config());
        assert!(report.is_valid(), "{:?}", report.errors);
        // the shipped fixed window is deliberately asymmetric
        assert!(report
            .warnings
            .iter()
            .any(|w| w.field == "analytics.fixed_window_above"));
    }

    #[test]
    fn test_invalid_fields_are_reported() {
        let mut cfg = config();
        cfg.service.name = String::new();
        cfg.service.http_port = 0;
        cfg.upstream.option_chain_url = "not a url".to_string();
        cfg.upstream.max_attempts = 0;
        cfg.analytics.strike_step = 0.0;
        cfg.api.prefix = "api".to_string();
        cfg.logging.format = "xml".to_string();

        let report = validate_config(&cfg);
        assert!(!report.is_valid());
        assert!(report.errors.contains(&ValidationError::MissingServiceName));
        assert!(report.errors.contains(&ValidationError::InvalidApiPrefix("api".to_string())));
        assert!(report.errors.contains(&ValidationError::InvalidLogFormat("xml".to_string())));
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl { field, .. } if field == "upstream.option_chain_url")));
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::OutOfRange { field, .. } if field == "upstream.max_attempts")));
        assert_eq!(report.errors.len(), 7);
    }

    #[test]
    fn test_long_timeout_is_a_warning() {
        let mut cfg = config();
        cfg.upstream.timeout_seconds = 30;
        let report = validate_config(&cfg);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.field == "upstream.timeout_seconds"));

        cfg.upstream.timeout_seconds = 0;
        assert!(!validate_config(&cfg).is_valid());
    }

    #[test]
    fn test_unresolved_placeholder_is_an_error() {
        let mut cfg = config();
        cfg.upstream.home_url = "${CHAINSCOPE_UPSTREAM}".to_string();
        let report = validate_config(&cfg);
        assert_eq!(
            report.errors,
            vec![ValidationError::UnresolvedEnvVar {
                field: "upstream.home_url".to_string(),
                value: "${CHAINSCOPE_UPSTREAM}".to_string(),
            }]
        );
    }

    #[test]
    fn test_metrics_port_collision() {
        let mut cfg = config();
        cfg.monitoring = Some(MonitoringConfig {
            metrics_port: Some(cfg.service.http_port),
        });
        assert!(!validate_config(&cfg).is_valid());
    }
}
