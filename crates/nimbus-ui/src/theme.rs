//! Light and dark palettes plus the user's current selection.

use std::fmt::{self, Display};

use nimbus_core::Appearance;

/// 24-bit RGB colour
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Build from `0xRRGGBB`. Bits above 24 are ignored.
    pub const fn from_hex(value: u32) -> Self {
        Self {
            red: (value >> 16) as u8,
            green: (value >> 8) as u8,
            blue: value as u8,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:0>2x}{:0>2x}{:0>2x}", self.red, self.green, self.blue)
    }
}

/// Named set of style tokens. Only the two static instances exist.
#[derive(Debug, PartialEq, Eq)]
pub struct ThemePalette {
    pub name: &'static str,
    pub surface: Color,
    pub surface_accent: Color,
    pub text_main: Color,
    pub text_accent: Color,
    pub text_error: Color,
    pub switcher_background: Color,
    pub switcher_border: Color,
    pub icon_border: Color,
}

impl ThemePalette {
    pub const LIGHT: Self = Self {
        name: "light",
        surface: Color::from_hex(0xE4E4E7),
        surface_accent: Color::from_hex(0xF4F4F5),
        text_main: Color::from_hex(0x27272A),
        text_accent: Color::from_hex(0xE17553),
        text_error: Color::from_hex(0xF43F5E),
        switcher_background: Color::from_hex(0xE4E4E7),
        switcher_border: Color::from_hex(0xFAFAFA),
        icon_border: Color::from_hex(0xFAFAFA),
    };

    pub const DARK: Self = Self {
        name: "dark",
        surface: Color::from_hex(0x18181B),
        surface_accent: Color::from_hex(0x27272A),
        text_main: Color::from_hex(0xD4D4D8),
        text_accent: Color::from_hex(0xE17553),
        text_error: Color::from_hex(0xFB7185),
        switcher_background: Color::from_hex(0x18181B),
        switcher_border: Color::from_hex(0x27272A),
        icon_border: Color::from_hex(0x27272A),
    };
}

static LIGHT: ThemePalette = ThemePalette::LIGHT;
static DARK: ThemePalette = ThemePalette::DARK;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ThemeSelection {
    Light,
    Dark,
}

impl ThemeSelection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn palette(self) -> &'static ThemePalette {
        match self {
            Self::Light => &LIGHT,
            Self::Dark => &DARK,
        }
    }

    /// Resolve the configured appearance. `System` consults the terminal and
    /// falls back to dark when the scheme can't be determined.
    pub fn from_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::Light,
            Appearance::Dark => Self::Dark,
            Appearance::System => system_scheme().unwrap_or(Self::Dark),
        }
    }
}

/// Colour scheme reported by the terminal through `COLORFGBG`
pub fn system_scheme() -> Option<ThemeSelection> {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| scheme_from_colorfgbg(&value))
}

/// Parse `COLORFGBG` (`fg;bg` or `fg;extra;bg`). The background is an ANSI
/// colour index: 0-6 and 8 are dark, 7 and 9-15 are light.
pub fn scheme_from_colorfgbg(value: &str) -> Option<ThemeSelection> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(ThemeSelection::Dark),
        7 | 9..=15 => Some(ThemeSelection::Light),
        _ => None,
    }
}

/// Holds the active selection. Changes only through `toggle`.
#[derive(Debug)]
pub struct ThemeStore {
    selection: ThemeSelection,
}

impl ThemeStore {
    pub fn new(initial: ThemeSelection) -> Self {
        Self { selection: initial }
    }

    pub fn from_appearance(appearance: Appearance) -> Self {
        Self::new(ThemeSelection::from_appearance(appearance))
    }

    pub fn selection(&self) -> ThemeSelection {
        self.selection
    }

    pub fn current_palette(&self) -> &'static ThemePalette {
        self.selection.palette()
    }

    /// Flip between light and dark, returning the new selection
    pub fn toggle(&mut self) -> ThemeSelection {
        self.selection = self.selection.toggled();
        tracing::debug!("Theme switched to {}", self.current_palette().name);
        self.selection
    }
}
