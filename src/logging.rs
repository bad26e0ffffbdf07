//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the configured filter. When a log directory is set,
//! events are also written to a daily rolling file through a non-blocking
//! writer; keep the returned guard alive until exit so buffered lines flush.

use crate::config::LoggingConfig;
use crate::error::{ForceFieldError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| {
            ForceFieldError::Config(format!("Invalid log filter {:?}: {}", config.filter, e))
        })?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                ForceFieldError::Config(format!("Failed to create log directory {:?}: {}", dir, e))
            })?;
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| ForceFieldError::Config(format!("Failed to install logger: {}", e)))?;

    if let Some(dir) = &config.log_dir {
        tracing::debug!("Logging to {:?}", dir);
    }
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        // Only reached when RUST_LOG is unset or itself invalid
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "forcefield_rs=notalevel".to_string(),
            ..Default::default()
        };
        assert!(matches!(init(&config), Err(ForceFieldError::Config(_))));
    }
}
