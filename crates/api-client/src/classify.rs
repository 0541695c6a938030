//! Response classification
//!
//! Pure functions that turn what came back from the transport into either a
//! payload or a `ClassifiedError`. No I/O happens here.
//!
//! Backend error bodies look like `{"message": "...", "errorCode": "...",
//! "details": {...}}`. Older endpoints send `{"error": "..."}` instead, so the
//! message falls back to that field.

use std::time::Duration;

use serde_json::Value;

use crate::error::{ClassifiedError, ErrorKind, codes};

/// Classify a non-success HTTP response.
///
/// The code is taken from `errorCode` (or `code` on legacy bodies) and is
/// never invented: a body without one yields `code() == None`.
pub fn classify(status: u16, payload: Value) -> ClassifiedError {
    let message = extract_message(&payload)
        .unwrap_or_else(|| format!("Request failed with status {status}"));
    let code = extract_code(&payload);

    let kind = match code.as_deref() {
        Some(c) if status == 401 && is_step_up_code(c) => ErrorKind::StepUpRejected,
        _ => ErrorKind::Http,
    };

    ClassifiedError::http(kind, status, code, message, payload)
}

/// Classify a transport fault raised by reqwest.
///
/// `deadline` is the call's configured deadline, reported in the timeout
/// message.
pub fn classify_transport(err: &reqwest::Error, deadline: Duration) -> ClassifiedError {
    if err.is_timeout() {
        ClassifiedError::timeout(deadline)
    } else {
        ClassifiedError::network(err)
    }
}

/// Whether a response is an HTML document served in place of the API.
///
/// Both the declared content type and the body must agree; a JSON body that
/// happens to mention `<html>` is not the fallback shell.
pub fn is_html_document(content_type: Option<&str>, body: &str) -> bool {
    let declared_html = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false);
    if !declared_html {
        return false;
    }

    let head: String = body
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Parse a response body best-effort.
///
/// Empty bodies become `Null`; anything that is not JSON is kept as a string.
pub fn parse_payload(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_owned()))
}

pub fn is_step_up_code(code: &str) -> bool {
    codes::STEP_UP_REJECTED.contains(&code)
}

fn extract_message(payload: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|field| payload.get(field).and_then(Value::as_str))
        .find(|m| !m.is_empty())
        .map(str::to_owned)
}

fn extract_code(payload: &Value) -> Option<String> {
    ["errorCode", "code"]
        .iter()
        .filter_map(|field| payload.get(field).and_then(Value::as_str))
        .find(|c| !c.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_prefers_message_field() {
        let err = classify(400, json!({"message": "Name is required", "error": "Bad Request"}));
        assert_eq!(err.message(), "Name is required");
    }

    #[test]
    fn message_falls_back_to_legacy_error_field() {
        let err = classify(400, json!({"error": "Invalid filter"}));
        assert_eq!(err.message(), "Invalid filter");
    }

    #[test]
    fn message_falls_back_to_status_template() {
        let err = classify(500, json!({}));
        assert_eq!(err.message(), "Request failed with status 500");

        let err = classify(502, Value::String("upstream exploded".into()));
        assert_eq!(err.message(), "Request failed with status 502");
    }

    #[test]
    fn code_is_read_from_error_code() {
        let err = classify(401, json!({"errorCode": "INVALID_TOKEN"}));
        assert_eq!(err.code(), Some("INVALID_TOKEN"));
        assert_eq!(err.status(), 401);
        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[test]
    fn legacy_code_field_is_accepted() {
        let err = classify(403, json!({"code": "TRIAL_EXPIRED"}));
        assert_eq!(err.code(), Some("TRIAL_EXPIRED"));
    }

    #[test]
    fn code_is_never_invented() {
        let err = classify(401, json!({"message": "Unauthorized"}));
        assert!(err.code().is_none());

        let err = classify(404, Value::Null);
        assert!(err.code().is_none());
    }

    #[test]
    fn step_up_401_gets_its_own_kind() {
        let err = classify(401, json!({"errorCode": "INVALID_OTP_CODE", "message": "Wrong code"}));
        assert_eq!(err.kind(), ErrorKind::StepUpRejected);
        assert_eq!(err.message(), "Wrong code");
    }

    #[test]
    fn step_up_code_on_other_status_is_plain_http() {
        let err = classify(400, json!({"errorCode": "INVALID_OTP_CODE"}));
        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[test]
    fn raw_payload_is_kept() {
        let body = json!({"message": "bad", "details": [{"field": "email"}]});
        let err = classify(422, body.clone());
        assert_eq!(err.payload(), Some(&body));
        assert!(!err.is_network_error());
    }

    #[test]
    fn html_requires_both_header_and_body() {
        let shell = "<!DOCTYPE html><html><body>app</body></html>";
        assert!(is_html_document(Some("text/html; charset=utf-8"), shell));
        assert!(is_html_document(Some("TEXT/HTML"), "\n  <html lang=\"en\">"));
        assert!(!is_html_document(Some("application/json"), shell));
        assert!(!is_html_document(None, shell));
        assert!(!is_html_document(Some("text/html"), r#"{"ok":true}"#));
    }

    #[test]
    fn parse_payload_is_best_effort() {
        assert_eq!(parse_payload(r#"{"id":1}"#), json!({"id": 1}));
        assert_eq!(parse_payload(""), Value::Null);
        assert_eq!(parse_payload("  \n"), Value::Null);
        assert_eq!(parse_payload("plain text"), Value::String("plain text".into()));
    }
}
