//! View and theme state with pure transitions.

use serde::{Deserialize, Serialize};

use crate::color::{Rgb, WHITE};

/// Which page the foreground card describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Samples,
}

/// Navigation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Samples,
    /// Move to the other page.
    Next,
}

impl View {
    pub fn navigate(self, nav: Nav) -> View {
        match nav {
            Nav::Home => View::Home,
            Nav::Samples => View::Samples,
            Nav::Next => match self {
                View::Home => View::Samples,
                View::Samples => View::Home,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Samples => "Samples",
        }
    }
}

/// Light or dark presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    /// Page background the layers are blended against.
    pub fn background(self) -> Rgb {
        match self {
            Theme::Light => WHITE,
            Theme::Dark => Rgb::from_hex(0x0a0f0d),
        }
    }

    /// Foreground text color.
    pub fn text(self) -> Rgb {
        match self {
            Theme::Light => Rgb::from_hex(0x1f2933),
            Theme::Dark => Rgb::from_hex(0xd1d5db),
        }
    }

    /// Opacity of the rain layer; the rain is subtler on light pages.
    pub fn rain_opacity(self) -> f32 {
        match self {
            Theme::Light => 0.2,
            Theme::Dark => 0.4,
        }
    }
}
