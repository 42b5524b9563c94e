//! Logging initialization for binaries embedding the engine
//!
//! Sets up `tracing` with an `EnvFilter` and either human-readable or JSON
//! output. `RUST_LOG` overrides the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    tracing::info!(json = config.json, "Logging initialized");

    Ok(())
}
