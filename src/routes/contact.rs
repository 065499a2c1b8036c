//! Contact routes: form submission and CORS preflight.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DEFAULT_CONTACT_EMAIL;
use crate::services::mail::{self, MailError};
use crate::services::submission::{RawSubmission, SubmissionError};
use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str = "Your consultation request has been received. We'll be in touch within 24 hours.";
pub const HONEYPOT_MESSAGE: &str = "Form received";

// =============================================================================
// RESPONSE BODY
// =============================================================================

/// JSON body of every contact response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ContactReply {
    fn success(message: &str) -> Self {
        Self { ok: true, message: Some(message.to_owned()), errors: None }
    }

    fn failure(message: String) -> Self {
        Self { ok: false, message: Some(message), errors: None }
    }
}

// =============================================================================
// ERROR
// =============================================================================

/// Everything that can end a submission unsuccessfully. All terminal.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// User-correctable problems, reported field by field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The mail API answered with a non-success status.
    #[error("mail API rejected submission: status {status}")]
    Delivery { status: u16, body: String },

    /// The request body could not be decoded.
    #[error(transparent)]
    Parse(#[from] SubmissionError),

    /// The mail API could not be reached or the client failed.
    #[error(transparent)]
    Mail(MailError),
}

impl From<MailError> for ContactError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::Rejected { status, body } => Self::Delivery { status, body },
            other => Self::Mail(other),
        }
    }
}

impl ContactError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Delivery { .. } | Self::Parse(_) | Self::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing body. `public_email` is quoted as the manual fallback.
    #[must_use]
    pub fn reply(&self, public_email: &str) -> ContactReply {
        match self {
            Self::Validation(errors) => ContactReply { ok: false, message: None, errors: Some(errors.clone()) },
            Self::Delivery { .. } => ContactReply::failure(format!(
                "We received your request but had trouble sending the notification. \
                 Please email us directly at {public_email}"
            )),
            Self::Parse(_) | Self::Mail(_) => ContactReply::failure(format!(
                "Something went wrong. Please try again or email {public_email}"
            )),
        }
    }
}

/// Used when the error escapes without state, as an extractor rejection.
/// The configured public address is unknown here, so the default is quoted.
impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.reply(DEFAULT_CONTACT_EMAIL))).into_response()
    }
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Submission decoded from a JSON, url-encoded or multipart body.
pub struct ContactForm(pub RawSubmission);

impl<S> FromRequest<S> for ContactForm
where
    S: Send + Sync,
{
    type Rejection = ContactError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.contains("application/json") {
            let body = read_body(req, state).await?;
            return Ok(Self(RawSubmission::from_json(&body)?));
        }

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| SubmissionError::Multipart(e.body_text()))?;
            let mut pairs = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| SubmissionError::Multipart(e.body_text()))?
            {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| SubmissionError::Multipart(e.body_text()))?;
                pairs.push((name, value));
            }
            return Ok(Self(RawSubmission::from_pairs(pairs)));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let body = read_body(req, state).await?;
            return Ok(Self(RawSubmission::from_urlencoded(&body)));
        }

        Err(SubmissionError::UnsupportedContentType(content_type).into())
    }
}

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<Bytes, SubmissionError> {
    Bytes::from_request(req, state)
        .await
        .map_err(|e| SubmissionError::Body(e.body_text()))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/contact`: validate and relay one consultation request.
pub async fn submit(State(state): State<AppState>, form: Result<ContactForm, ContactError>) -> Response {
    let submission_id = Uuid::new_v4();
    match process(&state, submission_id, form).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => {
            match &err {
                ContactError::Validation(errors) => {
                    tracing::info!(%submission_id, ?errors, "submission failed validation");
                }
                ContactError::Delivery { status, body } => {
                    tracing::error!(%submission_id, status, %body, "mail API rejected submission");
                }
                ContactError::Parse(e) => {
                    tracing::error!(%submission_id, error = %e, "contact form handler failed");
                }
                ContactError::Mail(e) => {
                    tracing::error!(%submission_id, error = %e, "contact form handler failed");
                }
            }
            (err.status(), Json(err.reply(&state.config.public_email))).into_response()
        }
    }
}

async fn process(
    state: &AppState,
    submission_id: Uuid,
    form: Result<ContactForm, ContactError>,
) -> Result<ContactReply, ContactError> {
    let ContactForm(raw) = form?;

    // Bots see success and stop retrying; nothing is validated or sent.
    if raw.honeypot {
        tracing::info!(%submission_id, "honeypot filled; discarding submission");
        return Ok(ContactReply::success(HONEYPOT_MESSAGE));
    }

    let record = raw.validate().map_err(ContactError::Validation)?;
    let payload = mail::build_payload(&record, &state.config, &mail::submitted_at(state.utc_offset));
    state.mailer.send(&payload).await?;

    tracing::info!(%submission_id, company = %record.company_name, "consultation request delivered");
    Ok(ContactReply::success(SUCCESS_MESSAGE))
}

/// `OPTIONS /api/contact`: CORS preflight, no body.
pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS")),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type")),
        ],
    )
        .into_response()
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
