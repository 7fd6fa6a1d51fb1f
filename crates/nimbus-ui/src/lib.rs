//! Terminal front end for Nimbus: theme store, session state, screen
//! rendering and the background weather sequence.

pub mod error_mapping;
pub mod screen;
pub mod services;
pub mod session;
pub mod state;
pub mod terminal;
pub mod theme;

pub use screen::{render, Body, Screen, ScreenInput};
pub use session::Session;
pub use state::{FetchFailurePolicy, Phase, SessionState};
pub use theme::{ThemePalette, ThemeSelection, ThemeStore};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use nimbus_core::{Config, LocationConfig, LocationPermission, LocationProvider};
use nimbus_weather::{
    ConfiguredPosition, FixedPosition, IpGeolocation, LocationGateway, PermissionStatus,
    WeatherProvider,
};
use tokio::runtime::Handle;

use crate::services::ConfiguredPermission;

/// Build a session from configuration, mount it and run the screen until the
/// user quits.
pub fn run(config: &Config, runtime: &Handle) -> Result<()> {
    let mut session = Session::new(
        ThemeStore::from_appearance(config.ui.appearance),
        FetchFailurePolicy::from_config(config.ui.surface_fetch_errors),
    );
    tracing::info!(
        "Initial theme: {}",
        session.theme().current_palette().name
    );

    let provider = Arc::new(WeatherProvider::with_timeout(
        &config.weather.api_url,
        &config.weather.api_key,
        Duration::from_secs(config.weather.request_timeout_secs),
    )?);
    let permission = permission_requester(config.location.permission, &session);
    let gateway = LocationGateway::new(permission, position_source(&config.location)?);

    session.mount(runtime, gateway, provider);
    let result = terminal::run(&mut session);
    session.teardown();
    result
}

fn permission_requester(permission: LocationPermission, session: &Session) -> ConfiguredPermission {
    match permission {
        LocationPermission::Prompt => ConfiguredPermission::Prompt(session.permission_prompt()),
        LocationPermission::Granted => ConfiguredPermission::Fixed(PermissionStatus::Granted),
        LocationPermission::Denied => ConfiguredPermission::Fixed(PermissionStatus::Denied),
    }
}

/// Position source for the configured provider
pub fn position_source(config: &LocationConfig) -> Result<ConfiguredPosition> {
    match config.provider {
        LocationProvider::Fixed => {
            let (Some(latitude), Some(longitude)) = (config.latitude, config.longitude) else {
                anyhow::bail!("Fixed location provider needs location.latitude and location.longitude");
            };
            Ok(ConfiguredPosition::Fixed(FixedPosition::new(latitude, longitude)))
        }
        LocationProvider::Ip => Ok(ConfiguredPosition::Ip(IpGeolocation::new(
            &config.ip_api_url,
        )?)),
    }
}
