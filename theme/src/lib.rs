//! Light/dark theme controller for the marketing site.
//!
//! This crate is compiled to WebAssembly and loaded as early as possible in
//! the page head. It keeps the `data-theme` attribute on `<html>` in step with
//! the visitor's stored choice and, when they have not chosen, with the
//! operating system's colour scheme. All decisions live in
//! [`controller::ThemeController`], which talks to the browser only through the
//! traits in [`host`], so the whole state machine is testable natively.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`preference`] | Stored preference and effective theme types |
//! | [`host`] | Storage, document and colour-scheme traits plus in-memory hosts |
//! | [`controller`] | Pre-paint apply, initialization, selection, flip, keyboard navigation |
//! | [`events`] | Event enum and dispatch used by the browser binding |
//! | `browser` | `web-sys` host implementations and the wasm entry point (`hydrate` only) |

pub mod controller;
pub mod events;
pub mod host;
pub mod preference;

#[cfg(feature = "hydrate")]
pub mod browser;

pub use controller::{ThemeConfig, ThemeController};
pub use events::{EventResponse, NavKey, ThemeEvent, ToggleGroup};
pub use preference::{Theme, ThemePreference};
