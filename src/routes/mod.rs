//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The static site is served by the hosting platform; this router only owns
//! the contact endpoint plus a health probe. Every response carries
//! `Access-Control-Allow-Origin: *` so the form can post from any origin.

pub mod contact;

use axum::Router;
use axum::http::{HeaderValue, StatusCode, header};
use axum::routing::{get, post};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/contact", post(contact::submit).options(contact::preflight))
        .route("/healthz", get(healthz))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
