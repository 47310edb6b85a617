//! # Structured Logging Module
//!
//! Environment-aware structured logging for transport construction and
//! message dispatch.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` wins over the environment-derived level when set. Safe to call
/// more than once; only the first call installs a subscriber.
pub fn init_structured_logging(json: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // Host applications often install their own subscriber first
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("ODM_TRANSPORT_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for transport operations
pub fn log_transport_operation(
    operation: &str,
    transport_name: Option<&str>,
    connection_name: Option<&str>,
    executor_id: Option<&str>,
    status: &str,
) {
    tracing::info!(
        operation = %operation,
        transport_name = transport_name,
        connection_name = connection_name,
        executor_id = executor_id,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "TRANSPORT_OPERATION"
    );
}

/// Log structured data for registry operations
pub fn log_registry_operation(operation: &str, executor_id: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        executor_id = %executor_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REGISTRY_OPERATION"
    );
}
