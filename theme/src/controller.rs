//! Theme state machine.
//!
//! DESIGN
//! ======
//! States are the three [`ThemePreference`] values. Only visitor actions move
//! between them; platform colour-scheme changes merely re-resolve `Auto`.
//! Every transition runs the same `apply` step so the attribute, the toggle
//! controls and the browser chrome colour can never disagree.
//!
//! TRADE-OFFS
//! ==========
//! A failed storage write is logged and otherwise ignored: the chosen theme
//! still holds for the rest of the page lifetime through `current`, it just
//! will not survive a reload.

use crate::host::{ColorScheme, PreferenceStore, ThemeDocument};
use crate::preference::{Theme, ThemePreference};

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

pub const DEFAULT_STORAGE_KEY: &str = "np-theme-preference";
pub const DEFAULT_DARK_META_COLOR: &str = "#0D1520";
pub const DEFAULT_LIGHT_META_COLOR: &str = "#1B2838";

/// Names and colours the controller writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Storage key holding the persisted preference.
    pub storage_key: String,
    /// `theme-color` meta value while the effective theme is dark.
    pub dark_meta_color: String,
    /// `theme-color` meta value while the effective theme is light.
    pub light_meta_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            dark_meta_color: DEFAULT_DARK_META_COLOR.to_owned(),
            light_meta_color: DEFAULT_LIGHT_META_COLOR.to_owned(),
        }
    }
}

/// Drives one page's theme through injected host interfaces.
pub struct ThemeController<S, D, C> {
    store: S,
    document: D,
    scheme: C,
    config: ThemeConfig,
    current: ThemePreference,
}

impl<S, D, C> ThemeController<S, D, C>
where
    S: PreferenceStore,
    D: ThemeDocument,
    C: ColorScheme,
{
    #[must_use]
    pub fn new(store: S, document: D, scheme: C) -> Self {
        Self::with_config(store, document, scheme, ThemeConfig::default())
    }

    #[must_use]
    pub fn with_config(store: S, document: D, scheme: C, config: ThemeConfig) -> Self {
        Self { store, document, scheme, config, current: ThemePreference::Auto }
    }

    // --- Lifecycle ---

    /// Pre-paint apply: set `data-theme` for an explicit stored choice.
    ///
    /// Runs while the document is still parsing, so it touches nothing but the
    /// root attribute. `auto`, absent and unrecognised values leave the page
    /// to the stylesheet's `prefers-color-scheme` rules.
    pub fn apply_stored(&mut self) -> Option<Theme> {
        let explicit = self.stored_preference().explicit();
        if let Some(theme) = explicit {
            self.document.set_theme_attribute(Some(theme));
        }
        explicit
    }

    /// Full initialization once the DOM is ready.
    pub fn initialize(&mut self) -> Theme {
        self.current = self.stored_preference();
        log::debug!("theme initialized from stored preference {}", self.current.as_str());
        self.apply(self.current)
    }

    /// Platform colour scheme changed. Re-applies only while following `Auto`.
    ///
    /// Returns `true` when the page was updated.
    pub fn system_scheme_changed(&mut self) -> bool {
        if self.current != ThemePreference::Auto {
            return false;
        }
        self.apply(ThemePreference::Auto);
        true
    }

    // --- Visitor actions ---

    /// Explicit choice from a multi-state toggle button.
    pub fn select(&mut self, preference: ThemePreference) -> Theme {
        self.persist(preference);
        self.apply(preference)
    }

    /// Two-state control: switch to the opposite of what is on screen.
    pub fn flip(&mut self) -> Theme {
        let next = self.effective_theme().opposite();
        self.select(next.into())
    }

    // --- Queries ---

    /// Preference in force for this page.
    #[must_use]
    pub fn preference(&self) -> ThemePreference {
        self.current
    }

    /// Theme on screen right now; recomputed on every call.
    #[must_use]
    pub fn effective_theme(&self) -> Theme {
        self.current.resolve(self.system_theme())
    }

    #[must_use]
    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the platform query, for hosts that cache its answer.
    pub fn scheme_mut(&mut self) -> &mut C {
        &mut self.scheme
    }

    // --- Internals ---

    fn system_theme(&self) -> Theme {
        Theme::from_prefers_dark(self.scheme.prefers_dark())
    }

    fn stored_preference(&self) -> ThemePreference {
        self.store
            .read(&self.config.storage_key)
            .as_deref()
            .and_then(ThemePreference::parse)
            .unwrap_or_default()
    }

    fn persist(&mut self, preference: ThemePreference) {
        self.current = preference;
        if let Err(e) = self.store.write(&self.config.storage_key, preference.as_str()) {
            log::warn!("theme preference not persisted: {e}");
        }
    }

    fn apply(&mut self, preference: ThemePreference) -> Theme {
        let effective = preference.resolve(self.system_theme());
        self.document.set_theme_attribute(preference.explicit());
        self.document.sync_controls(preference, effective);

        let color = match effective {
            Theme::Dark => &self.config.dark_meta_color,
            Theme::Light => &self.config.light_meta_color,
        };
        self.document.set_meta_theme_color(color);
        effective
    }
}
