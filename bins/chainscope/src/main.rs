//! ChainScope CLI and Server Binary
//!
//! Entry point for the option-chain dashboard backend. Provides commands
//! for writing a default configuration, validating one, and serving the
//! dashboard API.

use anyhow::{Context, Result};
use cli::{Cli, Commands, LogFormatArg};
use config::{
    generate_default_config, load_config, save_config, validate_config, DashboardConfig,
    ValidationReport,
};
use dashboard::{dashboard_router, Dashboard};
use observability::{init_logging, init_metrics, LogFormat};
use server::{
    ports, validate_port_available, validate_port_range, HttpServer, ServerConfig, ServerExt,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start {
            config,
            http,
            data_dir,
            log_format,
        } => start_dashboard(config, http, data_dir, log_format).await,
        Commands::Validate { config } => {
            init_logging("chainscope", LogFormat::Pretty, "info")?;
            info!("Executing 'validate' command");
            validate_command(config)
        }
        Commands::Init { output, force } => {
            init_logging("chainscope", LogFormat::Pretty, "info")?;
            info!("Executing 'init' command");
            init_command(output, force)
        }
    }
}

fn log_warnings(report: &ValidationReport) {
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
}

async fn start_dashboard(
    config_path: PathBuf,
    http_override: Option<u16>,
    data_dir_override: Option<PathBuf>,
    log_format_override: Option<LogFormatArg>,
) -> Result<()> {
    let mut config = load_config(&config_path)?;

    let format = match log_format_override {
        Some(arg) => LogFormat::parse(arg.as_str()),
        None => LogFormat::parse(&config.logging.format),
    }
    .unwrap_or_default();
    init_logging(&config.service.name, format, &config.logging.level)?;

    info!(path = ?config_path, "ChainScope starting...");

    apply_overrides(&mut config, http_override, data_dir_override);

    let report = validate_config(&config);
    log_warnings(&report);
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start dashboard due to configuration errors");
    }

    if let Some(monitoring) = &config.monitoring {
        let port = monitoring.metrics_port.unwrap_or(ports::METRICS);
        init_metrics(port).context("Failed to start metrics exporter")?;
    }

    let server_config = ServerConfig::new(config.service.host.clone(), config.service.http_port);
    validate_port_range(server_config.http_port)?;
    validate_port_available(&server_config).await?;

    let dashboard = Arc::new(Dashboard::from_config(&config)?);
    let router = dashboard_router(dashboard, &config.api);

    info!(
        service = %config.service.name,
        host = %server_config.host,
        http_port = server_config.http_port,
        prefix = %config.api.prefix,
        "Starting dashboard server"
    );

    HttpServer::new(server_config, router).run_with_ctrl_c().await?;

    info!("ChainScope stopped");
    Ok(())
}

fn apply_overrides(
    config: &mut DashboardConfig,
    http_override: Option<u16>,
    data_dir_override: Option<PathBuf>,
) {
    if let Some(port) = http_override {
        debug!(port, "HTTP port overridden from command line");
        config.service.http_port = port;
    }
    if let Some(dir) = data_dir_override {
        debug!(dir = ?dir, "Data directory overridden from command line");
        config.storage.data_dir = dir.to_string_lossy().into_owned();
    }
}

fn print_section<T>(title: &str, items: &[T], line: impl Fn(&T) -> String) {
    if items.is_empty() {
        return;
    }
    println!("{title} ({}):", items.len());
    for item in items {
        println!("  {}", line(item));
    }
    println!();
}

fn validate_command(config_path: PathBuf) -> Result<()> {
    info!(path = ?config_path, "Checking dashboard configuration");

    let config = load_config(&config_path)
        .with_context(|| format!("Cannot load {}", config_path.display()))?;
    let report = validate_config(&config);

    println!("ChainScope configuration: {}\n", config_path.display());
    print_section("Defaults", &report.defaults_applied, |d| {
        format!("{} -> {}", d.field, d.value)
    });
    print_section("Warnings", &report.warnings, |w| {
        format!("{}: {}", w.field, w.message)
    });
    print_section("Errors", &report.errors, |e| e.to_string());

    if !report.is_valid() {
        anyhow::bail!("{} configuration error(s)", report.errors.len());
    }

    let analytics = &config.analytics;
    println!("OK");
    println!("  listen       {}:{}", config.service.host, config.service.http_port);
    println!("  upstream     {} ({})", config.upstream.option_chain_url, config.upstream.symbol);
    println!(
        "  window       step {} / -{} / +{} / {} strikes",
        analytics.strike_step,
        analytics.fixed_window_below,
        analytics.fixed_window_above,
        analytics.default_atm_window
    );
    println!("  data dir     {}", config.storage.data_dir);

    Ok(())
}

fn init_command(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite it", output.display());
    }

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;
    }
    save_config(&generate_default_config(), &output)?;
    info!(path = ?output, "Default configuration written");

    println!("Wrote {}", output.display());
    println!("  chainscope validate --config {}", output.display());
    println!("  chainscope start --config {}", output.display());

    Ok(())
}
