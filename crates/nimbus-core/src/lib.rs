pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::{
    Appearance, Config, LocationConfig, LocationPermission, LocationProvider, UiConfig,
    ValidationResult, WeatherConfig,
};
pub use error::{AppError, NetworkError, ReqwestErrorExt, WeatherError};

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Initialize tracing/logging.
///
/// The terminal belongs to the weather screen, so log lines go to `log_path`.
/// If the file cannot be opened logging is discarded rather than drawn over
/// the screen.
pub fn init(log_path: &Path) -> Result<()> {
    let writer = match open_log_file(log_path) {
        Ok(file) => BoxMakeWriter::new(std::sync::Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Nimbus core initialized, logging to {}", log_path.display());
    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
