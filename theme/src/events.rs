//! Event dispatch.
//!
//! The browser binding translates DOM events into [`ThemeEvent`]s and feeds
//! them to [`ThemeController::handle`]. Whatever the DOM must do in return
//! (suppress the default action, move focus) comes back as an
//! [`EventResponse`], so every handler is a plain function of controller state.

use crate::controller::ThemeController;
use crate::host::{ColorScheme, PreferenceStore, ThemeDocument};
use crate::preference::ThemePreference;

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

/// Keyboard intent on a focused toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Previous,
    Activate,
}

impl NavKey {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "ArrowDown" => Some(Self::Next),
            "ArrowLeft" | "ArrowUp" => Some(Self::Previous),
            "Enter" | " " | "Spacebar" => Some(Self::Activate),
            _ => None,
        }
    }
}

/// The sibling buttons of one `.theme-toggle` container, in DOM order.
///
/// Each entry is the parsed `data-theme` of that button; `None` marks a button
/// whose attribute is missing or unrecognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleGroup {
    pub buttons: Vec<Option<ThemePreference>>,
    /// Index of the button that received the key press.
    pub focused: usize,
}

impl ToggleGroup {
    /// Index reached by moving one step in `key`'s direction, wrapping at both ends.
    #[must_use]
    pub fn step(&self, key: NavKey) -> Option<usize> {
        let len = self.buttons.len();
        if self.focused >= len {
            return None;
        }
        match key {
            NavKey::Next => Some((self.focused + 1) % len),
            NavKey::Previous => Some((self.focused + len - 1) % len),
            NavKey::Activate => Some(self.focused),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeEvent {
    /// `DOMContentLoaded`, or script evaluation after the document was parsed.
    Ready,
    /// Click on a multi-state button carrying `data-theme`.
    Activate { preference: ThemePreference },
    /// Click on the two-state control.
    Flip,
    /// Key press while a multi-state button has focus.
    Key { group: ToggleGroup, key: NavKey },
    /// The `prefers-color-scheme` media query changed.
    SystemSchemeChanged,
}

/// What the host must do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    pub prevent_default: bool,
    /// Button index within the event's group that should receive focus.
    pub focus: Option<usize>,
}

impl<S, D, C> ThemeController<S, D, C>
where
    S: PreferenceStore,
    D: ThemeDocument,
    C: ColorScheme,
{
    /// Route one event to its handler.
    pub fn handle(&mut self, event: ThemeEvent) -> EventResponse {
        match event {
            ThemeEvent::Ready => {
                self.initialize();
                EventResponse::default()
            }
            ThemeEvent::Activate { preference } => {
                self.select(preference);
                EventResponse::default()
            }
            ThemeEvent::Flip => {
                self.flip();
                EventResponse::default()
            }
            ThemeEvent::Key { group, key } => self.navigate(&group, key),
            ThemeEvent::SystemSchemeChanged => {
                self.system_scheme_changed();
                EventResponse::default()
            }
        }
    }

    /// Keyboard navigation and activation inside one toggle group.
    ///
    /// Arrow keys select the neighbouring button (wrapping) and ask the host to
    /// focus it. A target without a recognised `data-theme` still takes focus
    /// but changes nothing.
    pub fn navigate(&mut self, group: &ToggleGroup, key: NavKey) -> EventResponse {
        let Some(target) = group.step(key) else {
            return EventResponse::default();
        };
        if let Some(Some(preference)) = group.buttons.get(target).copied() {
            self.select(preference);
        }
        let focus = (key != NavKey::Activate).then_some(target);
        EventResponse { prevent_default: true, focus }
    }
}
