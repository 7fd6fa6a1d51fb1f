//! Weather service for Nimbus
//!
//! Provides the location gateway (permission + one-shot position fix) and
//! current weather from the OpenWeatherMap API.

pub mod types;
pub mod location;
pub mod provider;

pub use types::*;
pub use location::{
    ConfiguredPosition, FixedPosition, IpGeolocation, LocationGateway, PermissionRequester,
    PositionSource,
};
pub use provider::WeatherProvider;
