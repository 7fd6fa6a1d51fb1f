//! Screen description built from session state.
//!
//! `render` is a pure function: it decides what appears, and the terminal
//! module decides where it is drawn.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use nimbus_weather::{LocationFix, WeatherIcon, WeatherSnapshot};

use crate::theme::{ThemePalette, ThemeSelection};

pub const TITLE: &str = "Weather App";
pub const PERMISSION_QUESTION: &str = "Allow Nimbus to use your location?";

// DD.MM.YYYY HH:mm
const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Everything the screen depends on
#[derive(Debug, Clone, Copy)]
pub struct ScreenInput<'a> {
    pub theme: ThemeSelection,
    pub location: Option<&'a LocationFix>,
    pub weather: Option<&'a WeatherSnapshot>,
    pub error: Option<&'a str>,
    pub permission_pending: bool,
}

#[derive(Debug, PartialEq)]
pub struct Screen {
    pub palette: &'static ThemePalette,
    pub header: Header,
    pub body: Body,
}

#[derive(Debug, PartialEq)]
pub struct Header {
    pub title: &'static str,
    pub toggle: ToggleIcon,
}

/// Icon on the theme switcher, showing the active scheme
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ToggleIcon {
    Moon,
    Sun,
}

impl ToggleIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Moon => "☾",
            Self::Sun => "☀",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Body {
    Weather(WeatherCard),
    Error(String),
    PermissionPrompt,
    Empty,
}

#[derive(Debug, PartialEq)]
pub struct WeatherCard {
    pub icon: WeatherIcon,
    /// `"<place>, <temperature>°C"`
    pub headline: String,
    /// When the location fix was taken, in local time
    pub timestamp: Option<String>,
}

pub fn render(input: &ScreenInput<'_>) -> Screen {
    let toggle = match input.theme {
        ThemeSelection::Dark => ToggleIcon::Moon,
        ThemeSelection::Light => ToggleIcon::Sun,
    };

    let body = if let Some(weather) = input.weather {
        Body::Weather(WeatherCard {
            icon: weather.icon.clone(),
            headline: headline(weather),
            timestamp: input
                .location
                .map(|fix| format_timestamp(&fix.timestamp, &Local)),
        })
    } else if let Some(message) = input.error {
        Body::Error(message.to_string())
    } else if input.permission_pending {
        Body::PermissionPrompt
    } else {
        Body::Empty
    };

    Screen {
        palette: input.theme.palette(),
        header: Header {
            title: TITLE,
            toggle,
        },
        body,
    }
}

/// Place name and temperature exactly as the provider reported them
pub fn headline(weather: &WeatherSnapshot) -> String {
    format!("{}, {}°C", weather.place_name, weather.temperature)
}

pub fn format_timestamp<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .with_timezone(tz)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
