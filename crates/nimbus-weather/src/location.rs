//! Permission & location gateway.
//!
//! One permission request, then one best-effort position read. There is no
//! tracking and no retry: callers get a single `LocationFix` or an error.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::types::{LocationError, LocationFix, PermissionStatus};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const IP_API_FIELDS: &str = "status,message,lat,lon";

/// Asks for foreground location access
pub trait PermissionRequester: Send + Sync {
    fn request(&self) -> impl Future<Output = PermissionStatus> + Send;
}

/// A remembered answer: no prompt is shown
impl PermissionRequester for PermissionStatus {
    async fn request(&self) -> PermissionStatus {
        *self
    }
}

/// Produces a single position fix
pub trait PositionSource: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<LocationFix, LocationError>> + Send;
}

/// Gateway combining a permission requester with a position source
#[derive(Debug, Clone)]
pub struct LocationGateway<P, S> {
    permission: P,
    source: S,
}

impl<P: PermissionRequester, S: PositionSource> LocationGateway<P, S> {
    pub fn new(permission: P, source: S) -> Self {
        Self { permission, source }
    }

    /// Request permission and, if granted, read the current position once.
    ///
    /// The position source is never consulted when permission is denied.
    pub async fn acquire_location(&self) -> Result<LocationFix, LocationError> {
        let status = self.permission.request().await;
        if !status.is_granted() {
            tracing::info!("Location permission denied");
            return Err(LocationError::PermissionDenied);
        }

        let fix = self.source.current_position().await?;
        tracing::info!("Got location: {}, {}", fix.latitude, fix.longitude);
        Ok(fix)
    }
}

/// Coordinates taken from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<LocationFix, LocationError> {
        Ok(LocationFix::new(self.latitude, self.longitude, Utc::now()))
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate position from the public IP address (ip-api.com format)
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    client: Client,
    base_url: String,
}

impl IpGeolocation {
    pub fn new(base_url: &str) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                tracing::warn!("Failed to create geolocation client: {}", e);
                LocationError::ServiceUnavailable
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl PositionSource for IpGeolocation {
    #[tracing::instrument(skip(self), level = "info")]
    async fn current_position(&self) -> Result<LocationFix, LocationError> {
        let url = format!("{}/json/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("fields", IP_API_FIELDS)])
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("IP geolocation request failed: {}", e);
                if e.is_timeout() {
                    LocationError::Timeout
                } else {
                    LocationError::ServiceUnavailable
                }
            })?;

        if !response.status().is_success() {
            tracing::debug!("IP geolocation returned status {}", response.status());
            return Err(LocationError::ServiceUnavailable);
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::PositionUnavailable(e.to_string()))?;

        if body.status != "success" {
            return Err(LocationError::PositionUnavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => {
                Ok(LocationFix::new(latitude, longitude, Utc::now()))
            }
            _ => Err(LocationError::PositionUnavailable(
                "response is missing coordinates".to_string(),
            )),
        }
    }
}

/// Position source chosen at runtime from configuration
#[derive(Debug, Clone)]
pub enum ConfiguredPosition {
    Fixed(FixedPosition),
    Ip(IpGeolocation),
}

impl PositionSource for ConfiguredPosition {
    async fn current_position(&self) -> Result<LocationFix, LocationError> {
        match self {
            Self::Fixed(source) => source.current_position().await,
            Self::Ip(source) => source.current_position().await,
        }
    }
}
