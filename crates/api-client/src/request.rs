//! Per-call configuration

use std::time::Duration;

use common::Secret;
use reqwest::Method;
use serde_json::Value;

/// Deadline applied when a call does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Configuration for one API call.
///
/// There is always a deadline: `timeout` defaults to `DEFAULT_TIMEOUT`.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub path: String,
    pub method: Method,
    pub body: Option<Value>,
    /// Credential to use instead of the token store's.
    pub token: Option<Secret<String>>,
    pub timeout: Duration,
    /// When set, a 401 from this call never triggers global logout.
    pub suppress_auto_logout: bool,
}

impl RequestConfig {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            suppress_auto_logout: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_token(mut self, token: Secret<String>) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn suppress_auto_logout(mut self) -> Self {
        self.suppress_auto_logout = true;
        self
    }
}

/// Retry settings for `ApiClient::execute_with_retry`.
///
/// Total attempts are `retries + 1`. The delay between attempts is fixed.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, retry_delay: Duration) -> Self {
        Self {
            retries,
            retry_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_carry_a_deadline() {
        let config = RequestConfig::get("/api/customers");
        assert_eq!(config.timeout, Duration::from_millis(15_000));
        assert_eq!(config.method, Method::GET);
        assert!(!config.suppress_auto_logout);
        assert!(config.body.is_none());
        assert!(config.token.is_none());
    }

    #[test]
    fn builders_compose() {
        let config = RequestConfig::patch("/api/users/7")
            .with_body(json!({"role": "admin"}))
            .with_token(Secret::from("tok_override"))
            .with_timeout(Duration::from_millis(250))
            .suppress_auto_logout();
        assert_eq!(config.method, Method::PATCH);
        assert_eq!(config.body.unwrap()["role"], "admin");
        assert_eq!(config.token.unwrap().expose(), "tok_override");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert!(config.suppress_auto_logout);
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let config = RequestConfig::get("/api/me").with_token(Secret::from("tok_secret"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("tok_secret"), "got: {debug}");
    }

    #[test]
    fn attempts_are_retries_plus_one() {
        assert_eq!(RetryPolicy::new(2, Duration::ZERO).max_attempts(), 3);
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
        assert_eq!(RetryPolicy::default().max_attempts(), 4);
    }
}
