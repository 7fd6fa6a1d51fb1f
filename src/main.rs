use anyhow::{Context, Result};

fn main() -> Result<()> {
    let config = nimbus_core::Config::load()?;

    // Initialize core
    nimbus_core::init(&config.log_path())?;

    // Create and initialize application
    let mut app = nimbus_core::App::with_config(config);
    app.initialize()?;

    tracing::info!("Nimbus started");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("nimbus-tokio")
        .build()
        .context("Failed to create tokio runtime")?;

    let result = nimbus_ui::run(app.config(), runtime.handle());
    if let Err(e) = &result {
        tracing::error!("Screen exited with error: {:#}", e);
    }

    // Graceful shutdown
    app.shutdown()?;
    runtime.shutdown_timeout(std::time::Duration::from_secs(1));

    result
}
