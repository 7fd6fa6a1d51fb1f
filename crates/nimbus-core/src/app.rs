use anyhow::Result;

use crate::Config;

/// Main application state and lifecycle manager
pub struct App {
    config: Config,
    initialized: bool,
}

impl App {
    /// Create an application instance around an already loaded configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            initialized: false,
        }
    }

    /// Validate configuration before anything touches the network.
    ///
    /// Warnings are logged; errors abort startup.
    pub fn initialize(&mut self) -> Result<()> {
        tracing::info!("Initializing application");

        let validation = self.config.validate();
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        self.initialized = true;
        tracing::info!("Application initialized successfully");
        Ok(())
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        self.initialized = false;
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::config::LocationProvider;

    #[test]
    fn test_initialize_accepts_default_config() {
        let mut app = App::with_config(Config::default());
        app.initialize().unwrap();
        assert!(app.is_initialized());

        app.shutdown().unwrap();
        assert!(!app.is_initialized());
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let mut config = Config::default();
        config.location.provider = LocationProvider::Fixed;
        let mut app = App::with_config(config);

        let err = app.initialize().unwrap_err();
        assert!(err.to_string().contains("location.latitude"));
        assert!(!app.is_initialized());
    }
}
