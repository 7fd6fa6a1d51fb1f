//! Session state container.
//!
//! The screen's four pieces of state live here and change only through the
//! transition methods below. The phase graph is linear:
//!
//! ```text
//! Init -> RequestingPermission -> PermissionDenied
//!                              -> LocationUnavailable
//!                              -> LocationAcquired -> FetchingWeather -> WeatherDisplayed
//!                                                                     -> FetchFailed
//! ```

use nimbus_core::AppError;
use nimbus_weather::{LocationFix, WeatherSnapshot};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Init,
    RequestingPermission,
    PermissionDenied,
    LocationUnavailable,
    LocationAcquired,
    FetchingWeather,
    WeatherDisplayed,
    FetchFailed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::LocationUnavailable
                | Self::WeatherDisplayed
                | Self::FetchFailed
        )
    }

    fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Init, RequestingPermission)
                | (RequestingPermission, PermissionDenied)
                | (RequestingPermission, LocationUnavailable)
                | (RequestingPermission, LocationAcquired)
                | (LocationAcquired, FetchingWeather)
                | (FetchingWeather, WeatherDisplayed)
                | (FetchingWeather, FetchFailed)
        )
    }
}

/// What a failed weather request does to the screen
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FetchFailurePolicy {
    /// Show the error's user message
    #[default]
    Surface,
    /// Leave the screen empty: no weather and no message
    Silent,
}

impl FetchFailurePolicy {
    pub fn from_config(surface_fetch_errors: bool) -> Self {
        if surface_fetch_errors {
            Self::Surface
        } else {
            Self::Silent
        }
    }
}

#[derive(Debug)]
pub struct SessionState {
    phase: Phase,
    location: Option<LocationFix>,
    weather: Option<WeatherSnapshot>,
    error: Option<String>,
    fetch_failure: FetchFailurePolicy,
}

impl SessionState {
    pub fn new(fetch_failure: FetchFailurePolicy) -> Self {
        Self {
            phase: Phase::Init,
            location: None,
            weather: None,
            error: None,
            fetch_failure,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn location(&self) -> Option<&LocationFix> {
        self.location.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Error as it should appear on screen: hidden whenever weather is held
    pub fn displayed_error(&self) -> Option<&str> {
        match self.weather {
            Some(_) => None,
            None => self.error(),
        }
    }

    /// Move to `next` if the graph allows it. Out-of-order events are logged
    /// and dropped.
    fn transition(&mut self, next: Phase) -> bool {
        if self.phase.can_transition_to(next) {
            tracing::debug!("Session phase {:?} -> {:?}", self.phase, next);
            self.phase = next;
            true
        } else {
            tracing::warn!("Ignoring session transition {:?} -> {:?}", self.phase, next);
            false
        }
    }

    /// The location sequence has started
    pub fn begin(&mut self) -> bool {
        self.transition(Phase::RequestingPermission)
    }

    /// Permission was refused or no position could be read
    pub fn location_failed(&mut self, err: &AppError) -> bool {
        let next = if err.is_permission_denied() {
            Phase::PermissionDenied
        } else {
            Phase::LocationUnavailable
        };
        if !self.transition(next) {
            return false;
        }
        self.error = Some(err.user_message().to_string());
        true
    }

    pub fn location_acquired(&mut self, fix: LocationFix) -> bool {
        if !self.transition(Phase::LocationAcquired) {
            return false;
        }
        self.location = Some(fix);
        true
    }

    pub fn fetch_started(&mut self) -> bool {
        self.transition(Phase::FetchingWeather)
    }

    pub fn weather_loaded(&mut self, snapshot: WeatherSnapshot) -> bool {
        if !self.transition(Phase::WeatherDisplayed) {
            return false;
        }
        self.weather = Some(snapshot);
        true
    }

    pub fn fetch_failed(&mut self, err: &AppError) -> bool {
        if !self.transition(Phase::FetchFailed) {
            return false;
        }
        if self.fetch_failure == FetchFailurePolicy::Surface {
            self.error = Some(err.user_message().to_string());
        }
        true
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(FetchFailurePolicy::default())
    }
}
