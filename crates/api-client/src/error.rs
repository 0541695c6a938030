//! The normalized failure type every caller receives

use serde_json::Value;

/// Symbolic codes the client itself assigns. Backend-supplied codes are
/// passed through untouched.
pub mod codes {
    pub const TRANSPORT_TIMEOUT: &str = "TRANSPORT_TIMEOUT";
    pub const TRANSPORT_NETWORK_ERROR: &str = "TRANSPORT_NETWORK_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";

    /// Backend code meaning the bearer credential is no longer valid.
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";

    /// Backend codes for a rejected step-up challenge. A 401 carrying one of
    /// these says nothing about the session.
    pub const STEP_UP_REJECTED: &[&str] = &["INVALID_OTP", "INVALID_OTP_CODE", "INVALID_TOTP_CODE"];

    /// Backend codes for a lapsed trial or subscription (sent with 403).
    pub const SUBSCRIPTION_LAPSED: &[&str] = &["TRIAL_EXPIRED", "SUBSCRIPTION_REQUIRED"];
}

/// Failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Deadline elapsed before a response arrived.
    Timeout,
    /// DNS, connection refused, reset, or any other fault before a response.
    Network,
    /// An HTML document came back where JSON was expected (proxy or static
    /// hosting fallback in front of the API).
    ServiceUnavailable,
    /// Real 4xx/5xx response from the backend.
    Http,
    /// 401 with a known step-up code.
    StepUpRejected,
    /// Successful response whose payload did not have the expected shape.
    Decode,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => codes::TRANSPORT_TIMEOUT,
            ErrorKind::Network => codes::TRANSPORT_NETWORK_ERROR,
            ErrorKind::ServiceUnavailable => codes::SERVICE_UNAVAILABLE,
            ErrorKind::Http => "HTTP_ERROR",
            ErrorKind::StepUpRejected => "AUTH_STEPUP_REJECTED",
            ErrorKind::Decode => codes::INVALID_RESPONSE,
        }
    }

    /// Transport-class kinds: no usable response from the backend.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Network | ErrorKind::ServiceUnavailable
        )
    }
}

/// A classified request failure.
///
/// Constructed only through the functions in this module and `classify`, so
/// a transport failure always has status 0 (or 503 for the HTML fallback)
/// and a client-assigned code, and an HTTP failure always carries the real
/// status and whatever code the backend sent.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    status: u16,
    code: Option<String>,
    message: String,
    payload: Option<Value>,
}

impl ClassifiedError {
    pub fn timeout(after: std::time::Duration) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            status: 0,
            code: Some(codes::TRANSPORT_TIMEOUT.into()),
            message: format!("Request timed out after {}ms", after.as_millis()),
            payload: None,
        }
    }

    pub fn network(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Network,
            status: 0,
            code: Some(codes::TRANSPORT_NETWORK_ERROR.into()),
            message: format!("Could not connect to the server: {detail}"),
            payload: None,
        }
    }

    pub fn service_unavailable() -> Self {
        Self {
            kind: ErrorKind::ServiceUnavailable,
            status: 503,
            code: Some(codes::SERVICE_UNAVAILABLE.into()),
            message: "Service temporarily unavailable".into(),
            payload: None,
        }
    }

    pub fn invalid_response(status: u16, detail: impl std::fmt::Display, payload: Value) -> Self {
        Self {
            kind: ErrorKind::Decode,
            status,
            code: Some(codes::INVALID_RESPONSE.into()),
            message: format!("Unexpected response from the server: {detail}"),
            payload: Some(payload),
        }
    }

    pub(crate) fn http(
        kind: ErrorKind,
        status: u16,
        code: Option<String>,
        message: String,
        payload: Value,
    ) -> Self {
        Self {
            kind,
            status,
            code,
            message,
            payload: Some(payload),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status, or 0 for failures that never got a response.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw response payload, when a response was received.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Structured validation details from the backend error body, if any.
    pub fn details(&self) -> Option<&Value> {
        self.payload.as_ref()?.get("details")
    }

    pub fn is_network_error(&self) -> bool {
        self.kind.is_transport()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    /// Text suitable for showing to the operator.
    ///
    /// Transport failures get "try again" wording; backend errors surface the
    /// backend message verbatim.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Timeout => "The server took too long to respond. Please try again.".into(),
            ErrorKind::Network => {
                "Could not connect to the server. Check your connection and try again.".into()
            }
            ErrorKind::ServiceUnavailable => {
                "The service is temporarily unavailable. Please try again in a moment.".into()
            }
            ErrorKind::Http | ErrorKind::StepUpRejected | ErrorKind::Decode => {
                self.message.clone()
            }
        }
    }
}
