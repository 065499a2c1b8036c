use super::*;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request as HttpRequest;
use tower::ServiceExt;

use crate::services::mail::MailError;
use crate::state::test_helpers::{RecordingMailer, test_app_state};

const VALID_JSON: &str = r#"{
    "firstName": "Ada",
    "lastName": "Lovelace",
    "email": "ada@example.com",
    "phone": "0400 000 000",
    "companyName": "Analytical Engines",
    "notes": "<script>alert(1)</script>"
}"#;

// =============================================================================
// HELPERS
// =============================================================================

async fn send(mailer: Arc<RecordingMailer>, content_type: Option<&str>, body: impl Into<Body>) -> (StatusCode, Response) {
    let app = crate::routes::app(test_app_state(mailer));
    let mut builder = HttpRequest::builder().method("POST").uri("/api/contact");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let response = app.oneshot(builder.body(body.into()).unwrap()).await.unwrap();
    (response.status(), response)
}

async fn reply_of(response: Response) -> ContactReply {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(mailer: Arc<RecordingMailer>, body: &str) -> (StatusCode, ContactReply) {
    let (status, response) = send(mailer, Some("application/json"), body.to_owned()).await;
    (status, reply_of(response).await)
}

fn json_without(field: &str) -> String {
    let mut value: serde_json::Value = serde_json::from_str(VALID_JSON).unwrap();
    value.as_object_mut().unwrap().remove(field);
    value.to_string()
}

// =============================================================================
// SUCCESS
// =============================================================================

#[tokio::test]
async fn valid_json_is_delivered_once() {
    let mailer = RecordingMailer::accepting();
    let (status, reply) = post_json(Arc::clone(&mailer), VALID_JSON).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, ContactReply { ok: true, message: Some(SUCCESS_MESSAGE.into()), errors: None });
    assert_eq!(mailer.sent_count(), 1);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent[0].reply_to.email, "ada@example.com");
    assert_eq!(sent[0].personalizations[0].to[0].email, "hello@newportpembury.com.au");
}

#[tokio::test]
async fn script_in_notes_is_escaped_in_sent_mail() {
    let mailer = RecordingMailer::accepting();
    post_json(Arc::clone(&mailer), VALID_JSON).await;

    let sent = mailer.sent.lock().unwrap();
    let html = sent[0].html().unwrap();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn urlencoded_services_are_all_in_mail_body() {
    let mailer = RecordingMailer::accepting();
    let body = "firstName=Ada&lastName=Lovelace&email=ada%40example.com&phone=123&companyName=AE\
                &services=Advisory&services=Tax+Planning";
    let (status, _) = send(Arc::clone(&mailer), Some("application/x-www-form-urlencoded"), body).await;

    assert_eq!(status, StatusCode::OK);
    let sent = mailer.sent.lock().unwrap();
    assert!(sent[0].html().unwrap().contains("Advisory, Tax Planning"));
}

#[tokio::test]
async fn multipart_checkboxes_are_all_in_mail_body() {
    let mailer = RecordingMailer::accepting();
    let fields = [
        ("firstName", "Ada"),
        ("lastName", "Lovelace"),
        ("email", "ada@example.com"),
        ("phone", "123"),
        ("companyName", "AE"),
        ("services", "Advisory"),
        ("services", "Succession"),
    ];
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!("--XBOUNDARY\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"));
    }
    body.push_str("--XBOUNDARY--\r\n");

    let (status, response) = send(Arc::clone(&mailer), Some("multipart/form-data; boundary=XBOUNDARY"), body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply_of(response).await.ok);

    let sent = mailer.sent.lock().unwrap();
    assert!(sent[0].html().unwrap().contains("Advisory, Succession"));
}

#[tokio::test]
async fn json_content_type_with_charset_is_accepted() {
    let mailer = RecordingMailer::accepting();
    let (status, _) = send(Arc::clone(&mailer), Some("application/json; charset=utf-8"), VALID_JSON).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mailer.sent_count(), 1);
}

// =============================================================================
// HONEYPOT
// =============================================================================

#[tokio::test]
async fn filled_honeypot_succeeds_without_sending() {
    let mailer = RecordingMailer::accepting();
    let (status, reply) = post_json(Arc::clone(&mailer), r#"{"_gotcha":"http://spam.example"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, ContactReply { ok: true, message: Some(HONEYPOT_MESSAGE.into()), errors: None });
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn filled_honeypot_in_form_body_succeeds_without_sending() {
    let mailer = RecordingMailer::failing(MailError::Request("must not be called".into()));
    let (status, _) = send(Arc::clone(&mailer), Some("application/x-www-form-urlencoded"), "_gotcha=1&email=bad").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mailer.sent_count(), 0);
}

// =============================================================================
// VALIDATION
// =============================================================================

#[tokio::test]
async fn missing_phone_is_rejected_without_sending() {
    let mailer = RecordingMailer::accepting();
    let (status, reply) = post_json(Arc::clone(&mailer), &json_without("phone")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!reply.ok);
    assert_eq!(reply.message, None);
    let errors = reply.errors.unwrap();
    assert!(errors.iter().any(|e| e.contains("phone")), "errors: {errors:?}");
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let mailer = RecordingMailer::accepting();
    let body = VALID_JSON.replace("ada@example.com", "ada-at-example");
    let (status, reply) = post_json(Arc::clone(&mailer), &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.errors, Some(vec!["Invalid email address".to_owned()]));
    assert_eq!(mailer.sent_count(), 0);
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn upstream_500_maps_to_fallback_message() {
    let mailer = RecordingMailer::failing(MailError::Rejected { status: 500, body: "relay down".into() });
    let (status, reply) = post_json(Arc::clone(&mailer), VALID_JSON).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!reply.ok);
    let message = reply.message.unwrap();
    assert!(message.starts_with("We received your request but had trouble sending the notification."));
    assert!(message.contains("hello@newportpembury.com.au"));
    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn transport_failure_maps_to_generic_message() {
    let mailer = RecordingMailer::failing(MailError::Request("connection reset".into()));
    let (status, reply) = post_json(Arc::clone(&mailer), VALID_JSON).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        reply.message.as_deref(),
        Some("Something went wrong. Please try again or email hello@newportpembury.com.au")
    );
}

#[tokio::test]
async fn malformed_json_maps_to_generic_failure() {
    let mailer = RecordingMailer::accepting();
    let (status, reply) = post_json(Arc::clone(&mailer), "{broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!reply.ok);
    assert!(reply.message.unwrap().starts_with("Something went wrong."));
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn unsupported_content_type_maps_to_generic_failure() {
    let mailer = RecordingMailer::accepting();
    let (status, response) = send(Arc::clone(&mailer), Some("text/plain"), "hello").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!reply_of(response).await.ok);

    let (status, _) = send(Arc::clone(&mailer), None, "hello").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(mailer.sent_count(), 0);
}

// =============================================================================
// CORS / ROUTING
// =============================================================================

#[tokio::test]
async fn responses_allow_any_origin() {
    let (_, response) = send(RecordingMailer::accepting(), Some("application/json"), VALID_JSON).await;
    assert_eq!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");

    let (status, response) = send(RecordingMailer::accepting(), Some("application/json"), "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
}

#[tokio::test]
async fn preflight_returns_204_with_cors_headers() {
    let app = crate::routes::app(test_app_state(RecordingMailer::accepting()));
    let request = HttpRequest::builder()
        .method("OPTIONS")
        .uri("/api/contact")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "POST, OPTIONS");
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), "Content-Type");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = crate::routes::app(test_app_state(RecordingMailer::accepting()));
    let request = HttpRequest::builder().uri("/healthz").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

#[test]
fn mail_rejection_becomes_delivery_error() {
    let err = ContactError::from(MailError::Rejected { status: 503, body: "busy".into() });
    assert!(matches!(err, ContactError::Delivery { status: 503, .. }));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn validation_reply_lists_errors_only() {
    let err = ContactError::Validation(vec!["phone is required".into()]);
    let reply = err.reply("x@example.com");
    assert_eq!(reply, ContactReply { ok: false, message: None, errors: Some(vec!["phone is required".into()]) });
    assert_eq!(serde_json::to_value(&reply).unwrap(), serde_json::json!({"ok": false, "errors": ["phone is required"]}));
}

#[test]
fn failure_replies_quote_configured_public_email() {
    let delivery = ContactError::Delivery { status: 500, body: String::new() };
    assert!(delivery.reply("help@example.org").message.unwrap().ends_with("help@example.org"));
}

#[tokio::test]
async fn rejection_response_quotes_default_address() {
    let response = ContactError::Parse(SubmissionError::UnsupportedContentType("text/plain".into())).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let reply = reply_of(response).await;
    assert!(!reply.ok);
    assert_eq!(
        reply.message.as_deref(),
        Some("Something went wrong. Please try again or email hello@newportpembury.com.au")
    );
}

#[tokio::test]
async fn validation_error_responds_400_with_field_list() {
    let response = ContactError::Validation(vec!["email is required".into()]).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(reply_of(response).await.errors, Some(vec!["email is required".to_owned()]));
}
