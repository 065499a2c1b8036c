//! Theme preference model.
//!
//! A visitor's stored choice is a [`ThemePreference`]; the theme actually on
//! screen is a [`Theme`]. `Auto` defers to the platform colour scheme and is
//! never written to the `data-theme` attribute.

#[cfg(test)]
#[path = "preference_test.rs"]
mod preference_test;

/// Concrete theme applied to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Attribute value written to `<html data-theme>`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Theme reported by a `(prefers-color-scheme: dark)` query result.
    #[must_use]
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }
}

/// What the visitor asked for. Persisted under the configured storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    /// Follow the platform colour scheme.
    #[default]
    Auto,
}

impl ThemePreference {
    /// Parse a stored or `data-theme` value. Unknown values are `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }

    /// The concrete theme for an explicit choice, `None` for `Auto`.
    #[must_use]
    pub fn explicit(self) -> Option<Theme> {
        match self {
            Self::Light => Some(Theme::Light),
            Self::Dark => Some(Theme::Dark),
            Self::Auto => None,
        }
    }

    /// Effective theme given the platform's current scheme.
    #[must_use]
    pub fn resolve(self, system: Theme) -> Theme {
        self.explicit().unwrap_or(system)
    }
}

impl From<Theme> for ThemePreference {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::Light,
            Theme::Dark => Self::Dark,
        }
    }
}
