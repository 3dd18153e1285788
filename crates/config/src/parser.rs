use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DashboardConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());
    parse_config(&content)
}

/// Parse YAML text after environment substitution
pub fn parse_config(content: &str) -> Result<DashboardConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    debug!("Environment variable substitution completed");

    let config: DashboardConfig =
        serde_yaml::from_str(&substituted).with_context(|| "Failed to parse YAML configuration")?;

    info!(service = %config.service.name, "Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> DashboardConfig {
    DashboardConfig {
        service: ServiceConfig {
            name: "chainscope".to_string(),
            host: default_host(),
            http_port: default_http_port(),
        },
        upstream: UpstreamConfig::default(),
        analytics: AnalyticsConfig::default(),
        storage: StorageConfig::default(),
        api: ApiConfig::default(),
        logging: LoggingConfig::default(),
        monitoring: None,
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &DashboardConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chainscope.yaml");

        let mut config = generate_default_config();
        config.upstream.symbol = "FINNIFTY".to_string();
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.service.name, "chainscope");
        assert_eq!(loaded.upstream.symbol, "FINNIFTY");
        assert_eq!(loaded.analytics.fixed_window_above, 550.0);
    }

    #[test]
    fn test_env_substitution_before_parse() {
        std::env::set_var("CHAINSCOPE_TEST_SYMBOL", "BANKNIFTY");
        let cfg = parse_config("service:\n  name: x\nupstream:\n  symbol: ${CHAINSCOPE_TEST_SYMBOL}\n").unwrap();
        assert_eq!(cfg.upstream.symbol, "BANKNIFTY");
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config("/definitely/not/here.yaml").is_err());
    }
}
