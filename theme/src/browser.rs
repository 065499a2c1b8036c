//! Browser binding over `web-sys`.
//!
//! SYSTEM CONTEXT
//! ==============
//! The wasm module is loaded from the page head. [`start`] applies the stored
//! theme immediately, before first paint, then wires document-level click and
//! keydown delegation plus one `prefers-color-scheme` listener. Every listener
//! lives for the page lifetime, so the closures are leaked deliberately with
//! `Closure::forget`.
//!
//! DOM contract:
//! - `.theme-toggle` groups of `.theme-btn[data-theme]` buttons (multi-state)
//! - `.theme-flip` buttons holding `.icon-sun` and `.icon-moon` (two-state)
//! - `<html data-theme>` and `<meta name="theme-color">`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, MediaQueryList, NodeList, Storage};

use crate::controller::ThemeController;
use crate::events::{NavKey, ThemeEvent, ToggleGroup};
use crate::host::{ColorScheme, HostError, PreferenceStore, ThemeDocument};
use crate::preference::{Theme, ThemePreference};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";
const BUTTON_SELECTOR: &str = ".theme-btn";
const GROUP_SELECTOR: &str = ".theme-toggle";
const FLIP_SELECTOR: &str = ".theme-flip";
const META_SELECTOR: &str = "meta[name=\"theme-color\"]";

type BrowserController = ThemeController<LocalStorage, DomDocument, MediaQuery>;

// =============================================================================
// HOSTS
// =============================================================================

/// `window.localStorage`, absent when the browser refuses access.
pub struct LocalStorage(Option<Storage>);

impl LocalStorage {
    #[must_use]
    pub fn from_window(window: &web_sys::Window) -> Self {
        Self(window.local_storage().unwrap_or(None))
    }
}

impl PreferenceStore for LocalStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.0.as_ref().and_then(|s| s.get_item(key).unwrap_or(None))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), HostError> {
        let storage = self.0.as_ref().ok_or(HostError::StorageUnavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| HostError::StorageWrite(format!("{e:?}")))
    }
}

pub struct DomDocument(Document);

impl DomDocument {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self(document)
    }

    fn select_all(&self, selector: &str) -> Vec<Element> {
        self.0.query_selector_all(selector).map(elements).unwrap_or_default()
    }
}

impl ThemeDocument for DomDocument {
    fn set_theme_attribute(&mut self, theme: Option<Theme>) {
        let Some(root) = self.0.document_element() else {
            return;
        };
        let result = match theme {
            Some(theme) => root.set_attribute("data-theme", theme.as_str()),
            None => root.remove_attribute("data-theme"),
        };
        if let Err(e) = result {
            log::debug!("data-theme update failed: {e:?}");
        }
    }

    fn sync_controls(&mut self, preference: ThemePreference, effective: Theme) {
        for button in self.select_all(BUTTON_SELECTOR) {
            let active = button.get_attribute("data-theme").as_deref() == Some(preference.as_str());
            if let Err(e) = button.class_list().toggle_with_force("active", active) {
                log::debug!("theme button class update failed: {e:?}");
            }
            if let Err(e) = button.set_attribute("aria-pressed", if active { "true" } else { "false" }) {
                log::debug!("theme button aria update failed: {e:?}");
            }
        }

        for control in self.select_all(FLIP_SELECTOR) {
            let dark = effective == Theme::Dark;
            if let Err(e) = control.set_attribute("aria-pressed", if dark { "true" } else { "false" }) {
                log::debug!("theme flip aria update failed: {e:?}");
            }
            set_icon_hidden(&control, ".icon-sun", !dark);
            set_icon_hidden(&control, ".icon-moon", dark);
        }
    }

    fn set_meta_theme_color(&mut self, color: &str) {
        if let Ok(Some(meta)) = self.0.query_selector(META_SELECTOR) {
            if let Err(e) = meta.set_attribute("content", color) {
                log::debug!("theme-color meta update failed: {e:?}");
            }
        }
    }
}

fn set_icon_hidden(control: &Element, selector: &str, hidden: bool) {
    if let Ok(Some(icon)) = control.query_selector(selector) {
        if let Some(icon) = icon.dyn_ref::<HtmlElement>() {
            icon.set_hidden(hidden);
        }
    }
}

/// `matchMedia("(prefers-color-scheme: dark)")`; light when unsupported.
pub struct MediaQuery(Option<MediaQueryList>);

impl MediaQuery {
    #[must_use]
    pub fn from_window(window: &web_sys::Window) -> Self {
        Self(window.match_media(DARK_QUERY).unwrap_or(None))
    }
}

impl ColorScheme for MediaQuery {
    fn prefers_dark(&self) -> bool {
        self.0.as_ref().map_or(false, MediaQueryList::matches)
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Wasm entry point. Safe to run before `DOMContentLoaded`.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).unwrap_or_default();

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let controller: Rc<RefCell<BrowserController>> = Rc::new(RefCell::new(ThemeController::new(
        LocalStorage::from_window(&window),
        DomDocument::new(document.clone()),
        MediaQuery::from_window(&window),
    )));

    controller.borrow_mut().apply_stored();

    if document.ready_state() == "loading" {
        let ready = Rc::clone(&controller);
        listen(&document, "DOMContentLoaded", move |_| {
            ready.borrow_mut().handle(ThemeEvent::Ready);
        });
    } else {
        controller.borrow_mut().handle(ThemeEvent::Ready);
    }

    let on_click = Rc::clone(&controller);
    listen(&document, "click", move |event| {
        if let Some(theme_event) = click_event(&event) {
            on_click.borrow_mut().handle(theme_event);
        }
    });

    let on_key = Rc::clone(&controller);
    listen(&document, "keydown", move |event| {
        let Some((group, key, buttons)) = key_event(&event) else {
            return;
        };
        let response = on_key.borrow_mut().handle(ThemeEvent::Key { group, key });
        if response.prevent_default {
            event.prevent_default();
        }
        if let Some(target) = response.focus.and_then(|i| buttons.get(i)) {
            if let Some(target) = target.dyn_ref::<HtmlElement>() {
                if let Err(e) = target.focus() {
                    log::debug!("theme button focus failed: {e:?}");
                }
            }
        }
    });

    if let Ok(Some(query)) = window.match_media(DARK_QUERY) {
        let on_change = Rc::clone(&controller);
        listen(&query, "change", move |_| {
            on_change.borrow_mut().handle(ThemeEvent::SystemSchemeChanged);
        });
    }
}

fn listen(target: &web_sys::EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    match target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()) {
        Ok(()) => closure.forget(),
        Err(e) => log::warn!("failed to subscribe to {name}: {e:?}"),
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn closest(event: &Event, selector: &str) -> Option<Element> {
    let target = event.target()?;
    target.dyn_ref::<Element>()?.closest(selector).unwrap_or(None)
}

fn click_event(event: &Event) -> Option<ThemeEvent> {
    if let Some(button) = closest(event, BUTTON_SELECTOR) {
        let preference = button.get_attribute("data-theme").as_deref().and_then(ThemePreference::parse)?;
        return Some(ThemeEvent::Activate { preference });
    }
    closest(event, FLIP_SELECTOR).map(|_| ThemeEvent::Flip)
}

/// Build the focused button's group. Returns the group's elements too so the
/// caller can move focus to the index the controller picks.
fn key_event(event: &Event) -> Option<(ToggleGroup, NavKey, Vec<Element>)> {
    let key = NavKey::from_key(&event.dyn_ref::<KeyboardEvent>()?.key())?;
    let button = closest(event, BUTTON_SELECTOR)?;
    let container = button.closest(GROUP_SELECTOR).unwrap_or(None)?;

    let elements = container.query_selector_all(BUTTON_SELECTOR).map(elements).ok()?;
    let focused = elements.iter().position(|el| *el == button)?;
    let buttons = elements
        .iter()
        .map(|el| el.get_attribute("data-theme").as_deref().and_then(ThemePreference::parse))
        .collect();

    Some((ToggleGroup { buttons, focused }, key, elements))
}
