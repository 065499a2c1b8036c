//! Notification mail: payload construction and delivery.
//!
//! DESIGN
//! ======
//! [`build_payload`] is pure: a validated record plus config in, the
//! MailChannels send envelope out. Delivery sits behind [`MailSend`] so route
//! tests can swap in a recording mock. [`MailChannelsClient`] makes exactly one
//! POST per submission and never retries.

use std::time::Duration;

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use crate::config::ContactConfig;
use crate::services::submission::SubmissionRecord;

#[cfg(test)]
#[path = "mail_test.rs"]
mod tests;

const CONTACT_EMAIL_TEMPLATE: &str = include_str!("../../templates/contact_email.html");
const NOT_PROVIDED: &str = "Not provided";
const NO_SERVICES: &str = "None selected";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum MailError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("mail API request failed: {0}")]
    Request(String),

    /// The mail API answered with something other than 200 or 202.
    #[error("mail API rejected message: status {status}")]
    Rejected { status: u16, body: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Personalization {
    pub to: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

/// MailChannels `/tx/v1/send` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailPayload {
    pub personalizations: Vec<Personalization>,
    pub from: Address,
    pub reply_to: Address,
    pub subject: String,
    pub content: Vec<Content>,
}

impl MailPayload {
    /// The HTML body, if present.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.content_type == "text/html")
            .map(|c| c.value.as_str())
    }
}

// =============================================================================
// BUILDING
// =============================================================================

/// Map a validated submission onto the mail envelope.
#[must_use]
pub fn build_payload(record: &SubmissionRecord, config: &ContactConfig, submitted_at: &str) -> MailPayload {
    MailPayload {
        personalizations: vec![Personalization {
            to: vec![Address { email: config.recipient_email.clone(), name: config.recipient_name.clone() }],
        }],
        from: Address { email: config.from_email.clone(), name: config.from_name.clone() },
        reply_to: Address { email: record.email.clone(), name: record.full_name() },
        subject: format!("New Consultation: {} \u{2014} {}", record.full_name(), record.company_name),
        content: vec![Content {
            content_type: "text/html".to_owned(),
            value: render_html(record, &config.site_name, submitted_at),
        }],
    }
}

/// Render the notification body. Every interpolated value is escaped.
#[must_use]
pub fn render_html(record: &SubmissionRecord, site_name: &str, submitted_at: &str) -> String {
    let services = if record.services.is_empty() {
        NO_SERVICES.to_owned()
    } else {
        record.services.join(", ")
    };
    let notes = record.notes.as_deref().map_or_else(String::new, |notes| {
        format!(
            "<div style=\"background: #f8f7f4; padding: 16px; border-left: 3px solid #8B6914; margin: 20px 0;\">\n    \
             <strong>Additional Notes:</strong><br>{}\n  </div>",
            escape_html(notes).replace('\n', "<br>")
        )
    });

    render_template(CONTACT_EMAIL_TEMPLATE, |key| {
        Some(match key {
            "NAME" => escape_html(&record.full_name()),
            "EMAIL" => escape_html(&record.email),
            "PHONE" => escape_html(&record.phone),
            "COMPANY" => escape_html(&record.company_name),
            "REVENUE" => escape_html(record.company_revenue.as_deref().unwrap_or(NOT_PROVIDED)),
            "INDUSTRY" => escape_html(record.industry.as_deref().unwrap_or(NOT_PROVIDED)),
            "SERVICES" => escape_html(&services),
            "NOTES" => notes.clone(),
            "SITE" => escape_html(site_name),
            "SUBMITTED_AT" => escape_html(submitted_at),
            _ => return None,
        })
    })
}

/// Replace `{{KEY}}` placeholders in one pass. Substituted text is never
/// rescanned; unknown keys are left verbatim.
fn render_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}").and_then(|end| lookup(&after[..end]).map(|v| (end, v))) {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Server-local wall-clock time, formatted for the mail footer.
#[must_use]
pub fn submitted_at(offset: UtcOffset) -> String {
    format_timestamp(OffsetDateTime::now_utc().to_offset(offset))
}

#[must_use]
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = time::macros::format_description!(
        "[day]/[month]/[year], [hour repr:12 padding:none]:[minute]:[second] [period case:lower]"
    );
    at.format(&format).unwrap_or_else(|_| at.to_string())
}

// =============================================================================
// DELIVERY
// =============================================================================

#[async_trait::async_trait]
pub trait MailSend: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Rejected`] for any status other than 200/202 and
    /// [`MailError::Request`] when no response arrives.
    async fn send(&self, payload: &MailPayload) -> Result<(), MailError>;
}

/// reqwest-backed MailChannels client.
pub struct MailChannelsClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl MailChannelsClient {
    /// # Errors
    ///
    /// Returns [`MailError::HttpClientBuild`] if the TLS backend fails to initialise.
    pub fn new(config: &ContactConfig) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| MailError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: config.mail_api_url.clone(), api_key: config.mail_api_key.clone() })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl MailSend for MailChannelsClient {
    async fn send(&self, payload: &MailPayload) -> Result<(), MailError> {
        let mut request = self.http.post(&self.url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if is_accepted(status) {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        Err(MailError::Rejected { status, body })
    }
}

/// MailChannels answers 202 on acceptance; some relays answer 200.
#[must_use]
pub fn is_accepted(status: u16) -> bool {
    matches!(status, 200 | 202)
}
