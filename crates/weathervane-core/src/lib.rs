//! Shared foundations for Weathervane: configuration, typed errors and
//! logging setup.

pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, SearchConfig, StorageConfig, ValidationResult};
pub use error::{
    AppError, ConfigError, DatabaseError, NetworkError, ReqwestErrorExt, RusqliteErrorExt,
};

use anyhow::Result;

/// Initialize logging.
///
/// Safe to call more than once; later calls leave the installed subscriber
/// in place.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Weathervane core initialized");
    }
    Ok(())
}
