//! OpenWeatherMap current-weather client.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::types::{FetchError, WeatherIcon, WeatherSnapshot};

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
/// Temperatures come back in Celsius; nothing downstream converts units
const UNITS: &str = "metric";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("nimbus/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch current weather for the given coordinates. One request, no retry.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::InvalidApiKey);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned status {}", status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: CurrentWeatherResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(snapshot_from_response(parsed))
    }
}

fn snapshot_from_response(response: CurrentWeatherResponse) -> WeatherSnapshot {
    let icon = WeatherIcon::placeholder();

    if let Some(reported) = response.weather.first().and_then(|c| c.icon.as_deref()) {
        if reported != icon.id() {
            tracing::debug!(
                "Provider reported icon {} but {} is shown",
                reported,
                icon.id()
            );
        }
    }

    WeatherSnapshot {
        place_name: response.name,
        temperature: response.main.temp,
        icon,
    }
}
