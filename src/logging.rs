//! # Structured Logging Module
//!
//! Environment-aware structured logging for the template gateway and the
//! statistics engine. Console output is human readable by default and switches
//! to JSON lines when configured.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process.
///
/// `RUST_LOG` takes precedence over the configured level. An already
/// installed global subscriber is left in place.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
        };

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter())
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter())
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %get_environment(),
            level = %config.level,
            json = config.json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
pub fn get_environment() -> String {
    std::env::var("CMDB_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
pub fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for process template mutations
pub fn log_template_operation(
    operation: &str,
    bk_biz_id: i64,
    service_template_id: Option<i64>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        bk_biz_id = bk_biz_id,
        service_template_id = service_template_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "PROCESS_TEMPLATE_OPERATION"
    );
}

/// Log structured data for report aggregation
pub fn log_report_operation(
    report_type: &str,
    field: &str,
    status: &str,
    groups: Option<usize>,
    details: Option<&str>,
) {
    tracing::info!(
        report_type = %report_type,
        field = %field,
        status = %status,
        groups = groups,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REPORT_OPERATION"
    );
}
