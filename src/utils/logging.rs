//! Logging setup and batch summary helpers

use crate::models::BatchResult;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. `RUST_LOG` overrides the
/// default level. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn log_batch_start(file: &str, destinations: &[String]) {
    info!("{}", "=".repeat(60));
    info!("🚀 upload batch: {} -> {} destination(s)", file, destinations.len());
    info!("📋 order: {}", destinations.join(", "));
    info!("{}", "=".repeat(60));
}

pub fn log_batch_result(result: &BatchResult) {
    info!("{}", "─".repeat(60));
    for outcome in &result.outcomes {
        if outcome.success {
            match &outcome.result_url {
                Some(url) => info!("✅ {}: {}", outcome.destination_key, url),
                None => info!("✅ {}", outcome.destination_key),
            }
        } else {
            error!(
                "❌ {}",
                outcome.error.as_deref().unwrap_or(&outcome.destination_key)
            );
        }
    }
    let succeeded = result.outcomes.iter().filter(|o| o.success).count();
    info!("{}", "─".repeat(60));
    info!(
        "📊 {}/{} destinations succeeded ({})",
        succeeded,
        result.outcomes.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
}
