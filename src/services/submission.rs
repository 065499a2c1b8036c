//! Contact form submissions: body decoding, honeypot, validation.
//!
//! DESIGN
//! ======
//! Every body encoding funnels into [`RawSubmission`], a loose bag of optional
//! strings. [`RawSubmission::validate`] is the only way to obtain a
//! [`SubmissionRecord`], so mail is never built from partially valid input.

use serde::Deserialize;

#[cfg(test)]
#[path = "submission_test.rs"]
mod tests;

/// Required fields, in the order their errors are reported.
pub const REQUIRED_FIELDS: [&str; 5] = ["firstName", "lastName", "email", "phone", "companyName"];
pub const HONEYPOT_FIELD: &str = "_gotcha";
pub const SERVICES_FIELD: &str = "services";

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unreadable request body: {0}")]
    Body(String),
    #[error("invalid multipart body: {0}")]
    Multipart(String),
    #[error("unsupported content type: {0:?}")]
    UnsupportedContentType(String),
}

// =============================================================================
// RAW SUBMISSION
// =============================================================================

/// Form fields exactly as received, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSubmission {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub company_revenue: Option<String>,
    pub industry: Option<String>,
    /// Every selected service, in submission order.
    pub services: Vec<String>,
    pub notes: Option<String>,
    /// The hidden trap field was filled in.
    pub honeypot: bool,
}

impl RawSubmission {
    /// Decode an `application/json` body.
    ///
    /// `services` may be a single string or an array of strings. The honeypot
    /// counts as filled for any truthy JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Json`] for malformed JSON or mistyped fields.
    pub fn from_json(body: &[u8]) -> Result<Self, SubmissionError> {
        let wire: JsonSubmission = serde_json::from_slice(body)?;
        let services = match wire.services {
            Some(ServicesField::One(service)) => vec![service],
            Some(ServicesField::Many(services)) => services,
            None => Vec::new(),
        };
        Ok(Self {
            first_name: wire.first_name,
            last_name: wire.last_name,
            email: wire.email,
            phone: wire.phone,
            company_name: wire.company_name,
            company_revenue: wire.company_revenue,
            industry: wire.industry,
            services,
            notes: wire.notes,
            honeypot: wire.gotcha.as_ref().is_some_and(is_truthy),
        })
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn from_urlencoded(body: &[u8]) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(body))
    }

    /// Collect name/value pairs from a form body.
    ///
    /// Scalar fields keep their last value; every `services` value is kept.
    /// Unknown names are ignored.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut raw = Self::default();
        for (name, value) in pairs {
            let value = value.into();
            let slot = match name.as_ref() {
                "firstName" => &mut raw.first_name,
                "lastName" => &mut raw.last_name,
                "email" => &mut raw.email,
                "phone" => &mut raw.phone,
                "companyName" => &mut raw.company_name,
                "companyRevenue" => &mut raw.company_revenue,
                "industry" => &mut raw.industry,
                "notes" => &mut raw.notes,
                SERVICES_FIELD => {
                    raw.services.push(value);
                    continue;
                }
                HONEYPOT_FIELD => {
                    raw.honeypot = !value.is_empty();
                    continue;
                }
                _ => continue,
            };
            *slot = Some(value);
        }
        raw
    }

    /// Check required fields and the email shape.
    ///
    /// # Errors
    ///
    /// Returns every human-readable problem found, required fields first.
    pub fn validate(self) -> Result<SubmissionRecord, Vec<String>> {
        let required = [
            present(self.first_name),
            present(self.last_name),
            present(self.email),
            present(self.phone),
            present(self.company_name),
        ];

        let mut errors: Vec<String> = REQUIRED_FIELDS
            .iter()
            .zip(&required)
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| format!("{field} is required"))
            .collect();

        if let Some(email) = &required[2] {
            if !is_valid_email(email) {
                errors.push("Invalid email address".to_owned());
            }
        }

        let [Some(first_name), Some(last_name), Some(email), Some(phone), Some(company_name)] = required else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SubmissionRecord {
            first_name,
            last_name,
            email,
            phone,
            company_name,
            company_revenue: present(self.company_revenue),
            industry: present(self.industry),
            services: self.services.into_iter().filter_map(|s| present(Some(s))).collect(),
            notes: present(self.notes),
        })
    }
}

// =============================================================================
// VALIDATED RECORD
// =============================================================================

/// A submission that passed validation. All values are trimmed and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub company_revenue: Option<String>,
    pub industry: Option<String>,
    pub services: Vec<String>,
    pub notes: Option<String>,
}

impl SubmissionRecord {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// `local@domain.tld` shape: no whitespace, exactly one `@`, and a dot inside
/// the domain with at least one character on each side.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// JSON WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSubmission {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    company_name: Option<String>,
    company_revenue: Option<String>,
    industry: Option<String>,
    services: Option<ServicesField>,
    notes: Option<String>,
    #[serde(rename = "_gotcha")]
    gotcha: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServicesField {
    One(String),
    Many(Vec<String>),
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
