//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the PartyGate application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "partygate.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let plain_stdout = (!config.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stdout));
    let json_stdout = config.json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(plain_stdout)
        .with(json_stdout)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log registration lifecycle actions with structured data
pub fn log_registration_action(registration_id: i64, action: &str, user_id: i64, event_id: i64) {
    info!(
        registration_id = registration_id,
        action = action,
        user_id = user_id,
        event_id = event_id,
        "Registration action performed"
    );
}

/// Log event ledger changes
pub fn log_ledger_change(event_id: i64, action: &str, user_id: i64, applied: bool) {
    if applied {
        info!(
            event_id = event_id,
            action = action,
            user_id = user_id,
            "Event ledger updated"
        );
    } else {
        debug!(
            event_id = event_id,
            action = action,
            user_id = user_id,
            "Event ledger unchanged"
        );
    }
}

/// Log admin actions
pub fn log_admin_action(action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log payment events
pub fn log_payment_event(order_id: &str, amount: i64, status: &str, details: Option<&str>) {
    info!(
        order_id = order_id,
        amount = amount,
        status = status,
        details = details,
        "Payment event"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
