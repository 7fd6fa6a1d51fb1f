//! Weather backend: the location-then-fetch sequence.
//! All network work runs off the UI thread; results sent via mpsc.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use nimbus_core::AppError;
use nimbus_weather::{
    LocationFix, LocationGateway, PermissionRequester, PermissionStatus, PositionSource,
    WeatherProvider, WeatherSnapshot,
};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error_mapping;

/// Messages sent from the sequence back to the UI thread
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// The user must answer the location question; reply on the sender
    PermissionRequested(oneshot::Sender<PermissionStatus>),
    LocationAcquired(LocationFix),
    LocationFailed(AppError),
    FetchStarted,
    FetchDone(Result<WeatherSnapshot, AppError>),
}

/// Asks the user on screen. A prompt that is never answered (the session
/// went away) counts as denied.
#[derive(Debug, Clone)]
pub struct PromptPermission {
    tx: Sender<WeatherServiceMessage>,
}

impl PromptPermission {
    pub fn new(tx: Sender<WeatherServiceMessage>) -> Self {
        Self { tx }
    }
}

impl PermissionRequester for PromptPermission {
    async fn request(&self) -> PermissionStatus {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .tx
            .send(WeatherServiceMessage::PermissionRequested(reply_tx))
            .is_err()
        {
            return PermissionStatus::Denied;
        }
        reply_rx.await.unwrap_or(PermissionStatus::Denied)
    }
}

/// Permission requester chosen from configuration
#[derive(Debug, Clone)]
pub enum ConfiguredPermission {
    Fixed(PermissionStatus),
    Prompt(PromptPermission),
}

impl PermissionRequester for ConfiguredPermission {
    async fn request(&self) -> PermissionStatus {
        match self {
            Self::Fixed(status) => status.request().await,
            Self::Prompt(prompt) => prompt.request().await,
        }
    }
}

/// Spawn the permission -> position -> weather sequence.
///
/// The task stops at its next suspension point once `cancel` fires, and never
/// sends after cancellation.
pub fn request_fetch<P, S>(
    runtime: &Handle,
    tx: &Sender<WeatherServiceMessage>,
    cancel: CancellationToken,
    gateway: LocationGateway<P, S>,
    provider: Arc<WeatherProvider>,
) -> JoinHandle<()>
where
    P: PermissionRequester + 'static,
    S: PositionSource + 'static,
{
    let tx = tx.clone();

    runtime.spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Weather sequence cancelled");
            }
            _ = run_sequence(&tx, &cancel, &gateway, &provider) => {}
        }
    })
}

async fn run_sequence<P, S>(
    tx: &Sender<WeatherServiceMessage>,
    cancel: &CancellationToken,
    gateway: &LocationGateway<P, S>,
    provider: &WeatherProvider,
) where
    P: PermissionRequester,
    S: PositionSource,
{
    let fix = match gateway.acquire_location().await {
        Ok(fix) => fix,
        Err(e) => {
            let err = error_mapping::location_error(e);
            tracing::warn!("Failed to acquire location: {}", err);
            deliver(tx, cancel, WeatherServiceMessage::LocationFailed(err));
            return;
        }
    };

    deliver(tx, cancel, WeatherServiceMessage::LocationAcquired(fix.clone()));
    deliver(tx, cancel, WeatherServiceMessage::FetchStarted);

    let result = provider
        .fetch(fix.latitude, fix.longitude)
        .await
        .map_err(error_mapping::fetch_error);
    match &result {
        Ok(snapshot) => tracing::info!(
            "Weather data fetched for {}: {}°C",
            snapshot.place_name,
            snapshot.temperature
        ),
        Err(e) => tracing::error!("Failed to fetch weather: {}", e),
    }
    deliver(tx, cancel, WeatherServiceMessage::FetchDone(result));
}

fn deliver(
    tx: &Sender<WeatherServiceMessage>,
    cancel: &CancellationToken,
    message: WeatherServiceMessage,
) {
    if cancel.is_cancelled() {
        tracing::debug!("Dropping {:?} after cancellation", message);
        return;
    }
    // The receiver only disappears with the session
    let _ = tx.send(message);
}
