use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// OpenWeatherMap key baked in at build time. Empty when the build did not
/// provide one, in which case `weather.api_key` must be set in the config file.
const EMBEDDED_API_KEY: &str = match option_env!("NIMBUS_OWM_API_KEY") {
    Some(key) => key,
    None => "",
};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Where the current position comes from
    #[serde(default)]
    pub location: LocationConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL of the OpenWeatherMap API
    pub api_url: String,

    /// API key sent as `appid`
    pub api_key: String,

    /// HTTP timeout for the weather request, in seconds
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: "http://api.openweathermap.org".to_string(),
            api_key: EMBEDDED_API_KEY.to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Position source used once permission is granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    /// Geolocate by public IP address
    #[default]
    Ip,
    /// Use `location.latitude` / `location.longitude`
    Fixed,
}

/// How the location permission question is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationPermission {
    /// Ask on screen at startup
    #[default]
    Prompt,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub provider: LocationProvider,
    pub permission: LocationPermission,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Base URL of an ip-api compatible geolocation service
    pub ip_api_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: LocationProvider::Ip,
            permission: LocationPermission::Prompt,
            latitude: None,
            longitude: None,
            ip_api_url: "http://ip-api.com".to_string(),
        }
    }
}

/// Colour scheme preference at launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    /// Follow the terminal's reported background
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial colour scheme
    pub appearance: Appearance,

    /// Show an error message when the weather request fails. When false the
    /// screen stays empty after a failed fetch.
    pub surface_fetch_errors: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            appearance: Appearance::System,
            surface_fetch_errors: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nimbus");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            location: LocationConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_url, "weather.api_url", &mut result);

        if self.weather.api_key.trim().is_empty() {
            result.add_warning(
                "weather.api_key",
                "No API key configured - weather requests will be rejected",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        match self.location.provider {
            LocationProvider::Ip => {
                self.validate_url(&self.location.ip_api_url, "location.ip_api_url", &mut result);
            }
            LocationProvider::Fixed => {
                match self.location.latitude {
                    None => result.add_error(
                        "location.latitude",
                        "Fixed location provider requires a latitude",
                    ),
                    Some(lat) if !(-90.0..=90.0).contains(&lat) => result.add_error(
                        "location.latitude",
                        format!("Latitude must be within -90..=90, got {}", lat),
                    ),
                    Some(_) => {}
                }
                match self.location.longitude {
                    None => result.add_error(
                        "location.longitude",
                        "Fixed location provider requires a longitude",
                    ),
                    Some(lon) if !(-180.0..=180.0).contains(&lon) => result.add_error(
                        "location.longitude",
                        format!("Longitude must be within -180..=180, got {}", lon),
                    ),
                    Some(_) => {}
                }
            }
        }

        if self.location.permission == LocationPermission::Denied {
            result.add_warning(
                "location.permission",
                "Location access is denied - weather will not be shown",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Path of the log file inside the config directory
    pub fn log_path(&self) -> PathBuf {
        self.config_dir.join("nimbus.log")
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("nimbus");

        Ok(config_dir.join("config.toml"))
    }
}
