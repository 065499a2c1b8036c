//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It is
//! read-only after startup: submissions share nothing with each other, so
//! there is no lock anywhere in the request path.

use std::sync::Arc;

use time::UtcOffset;

use crate::config::ContactConfig;
use crate::services::mail::MailSend;

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ContactConfig>,
    pub mailer: Arc<dyn MailSend>,
    /// Offset used for the timestamp in notification footers.
    pub utc_offset: UtcOffset,
}

impl AppState {
    #[must_use]
    pub fn new(config: ContactConfig, mailer: Arc<dyn MailSend>, utc_offset: UtcOffset) -> Self {
        Self { config: Arc::new(config), mailer, utc_offset }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
