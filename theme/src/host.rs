//! Host interfaces the controller runs against.
//!
//! DESIGN
//! ======
//! The controller never reaches for `window`, `localStorage` or `document`
//! directly. The browser binding implements these traits over `web-sys`; the
//! in-memory implementations below back native tests and headless use.
//! Absent DOM elements are the host's concern and must be silent no-ops.

use std::collections::HashMap;

use crate::preference::{Theme, ThemePreference};

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

/// Errors surfaced by a host while persisting the preference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// No durable storage is available (disabled cookies, private mode).
    #[error("preference storage unavailable")]
    StorageUnavailable,
    /// Storage exists but refused the write (quota, security policy).
    #[error("preference write rejected: {0}")]
    StorageWrite(String),
}

/// Durable string key-value storage (`localStorage` in the browser).
pub trait PreferenceStore {
    fn read(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns a [`HostError`] when the value cannot be persisted.
    fn write(&mut self, key: &str, value: &str) -> Result<(), HostError>;
}

/// The parts of the page the controller mutates.
pub trait ThemeDocument {
    /// Set `<html data-theme>`, or remove it for `None`.
    fn set_theme_attribute(&mut self, theme: Option<Theme>);

    /// Bring every toggle control in line with the current state: the
    /// matching multi-state button is active, two-state icons show `effective`.
    fn sync_controls(&mut self, preference: ThemePreference, effective: Theme);

    /// Update `<meta name="theme-color">` for browser chrome.
    fn set_meta_theme_color(&mut self, color: &str);
}

/// Platform colour-scheme query (`prefers-color-scheme: dark`).
pub trait ColorScheme {
    fn prefers_dark(&self) -> bool;
}

// =============================================================================
// IN-MEMORY HOSTS
// =============================================================================

/// `HashMap`-backed store. `fail_writes` simulates a storage that rejects writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a single entry, as if persisted on a previous visit.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_owned(), value.to_owned());
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), HostError> {
        if self.fail_writes {
            return Err(HostError::StorageWrite(format!("write to {key} refused")));
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Document stand-in that records the last value of each mutation.
#[derive(Debug, Default, Clone)]
pub struct RecordingDocument {
    /// Current `data-theme` value; `None` means the attribute is absent.
    pub theme_attribute: Option<Theme>,
    /// Last state pushed to the toggle controls.
    pub controls: Option<(ThemePreference, Theme)>,
    /// Last meta colour, `None` until written or when the page has no meta tag.
    pub meta_color: Option<String>,
    /// Whether the page carries `<meta name="theme-color">`.
    pub has_meta: bool,
    /// Number of attribute writes, used to check the pre-paint path.
    pub attribute_writes: usize,
}

impl RecordingDocument {
    #[must_use]
    pub fn new() -> Self {
        Self { has_meta: true, ..Self::default() }
    }

    /// A page without the theme-color meta tag.
    #[must_use]
    pub fn without_meta() -> Self {
        Self::default()
    }
}

impl ThemeDocument for RecordingDocument {
    fn set_theme_attribute(&mut self, theme: Option<Theme>) {
        self.theme_attribute = theme;
        self.attribute_writes += 1;
    }

    fn sync_controls(&mut self, preference: ThemePreference, effective: Theme) {
        self.controls = Some((preference, effective));
    }

    fn set_meta_theme_color(&mut self, color: &str) {
        if self.has_meta {
            self.meta_color = Some(color.to_owned());
        }
    }
}

/// Colour scheme with a settable answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedScheme {
    pub dark: bool,
}

impl FixedScheme {
    #[must_use]
    pub fn dark() -> Self {
        Self { dark: true }
    }

    #[must_use]
    pub fn light() -> Self {
        Self { dark: false }
    }
}

impl ColorScheme for FixedScheme {
    fn prefers_dark(&self) -> bool {
        self.dark
    }
}
