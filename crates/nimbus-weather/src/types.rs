use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of asking the user for foreground location access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// A single position read. Taken once per session and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }
}

/// OpenWeatherMap icon identifier, e.g. `10d`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherIcon(String);

impl WeatherIcon {
    /// Icon shown for every snapshot. The provider does not derive the icon
    /// from the reported conditions.
    pub const PLACEHOLDER: &'static str = "10d";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn placeholder() -> Self {
        Self::new(Self::PLACEHOLDER)
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Night variants end in `n`
    pub fn is_night(&self) -> bool {
        self.0.ends_with('n')
    }

    /// Terminal glyph for the icon family (the two leading digits)
    pub fn glyph(&self) -> &'static str {
        match self.0.get(..2).unwrap_or_default() {
            "01" if self.is_night() => "☾",
            "01" => "☀",
            "02" => "⛅",
            "03" | "04" => "☁",
            "09" | "10" => "☂",
            "11" => "⚡",
            "13" => "❄",
            "50" => "≋",
            _ => "?",
        }
    }
}

impl Default for WeatherIcon {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Current weather at a location, as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place_name: String,
    /// Degrees Celsius, exactly as reported
    pub temperature: f64,
    pub icon: WeatherIcon,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API rejected the API key")]
    InvalidApiKey,
    #[error("Weather API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}
