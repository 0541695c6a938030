//! Request executor
//!
//! Sends one call inside a deadline envelope, normalizes the outcome, and on
//! failure runs the redirect and logout rules before handing the error back.
//! The executor itself never touches the token store beyond reading it; the
//! only side effects on the error path go through `SubscriptionRedirect` and
//! the injected `LogoutHandler`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use session::{SessionState, TokenStore};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::classify::{classify, classify_transport, is_html_document, parse_payload};
use crate::error::ClassifiedError;
use crate::logout::{LogoutHandler, LogoutOrchestrator};
use crate::navigator::Navigator;
use crate::policy::{SESSION_EXPIRED, should_logout};
use crate::redirect::SubscriptionRedirect;
use crate::request::{RequestConfig, RetryPolicy};
use crate::retry::retry_transport;

/// Correlation header sent with every call.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Backend origin and the fixed destinations the client needs.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub login_path: String,
    pub upsell_path: String,
    pub revoke_path: String,
    /// Deadline for the logout revocation call. Shorter than any request
    /// deadline so logout never lingers.
    pub revoke_timeout: Duration,
    pub refresh_path: String,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: "/login".into(),
            upsell_path: "/upgrade".into(),
            revoke_path: "/api/auth/logout".into(),
            revoke_timeout: Duration::from_millis(2000),
            refresh_path: "/api/auth/refresh".into(),
        }
    }

    /// Absolute URL for an API path on the backend origin.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    options: ClientOptions,
    tokens: Arc<TokenStore>,
    session: SessionState,
    logout: Arc<dyn LogoutHandler>,
    redirect: SubscriptionRedirect,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        options: ClientOptions,
        tokens: Arc<TokenStore>,
        session: SessionState,
        logout: Arc<dyn LogoutHandler>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let redirect = SubscriptionRedirect::new(options.upsell_path.clone(), navigator);
        Self {
            http,
            options,
            tokens,
            session,
            logout,
            redirect,
        }
    }

    /// Wire the client with the standard `LogoutOrchestrator`.
    pub fn with_orchestrator(
        http: reqwest::Client,
        options: ClientOptions,
        tokens: Arc<TokenStore>,
        session: SessionState,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let logout = Arc::new(LogoutOrchestrator::new(
            http.clone(),
            &options,
            tokens.clone(),
            session.clone(),
            navigator.clone(),
        ));
        Self::new(http, options, tokens, session, logout, navigator)
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Issue one call and return the payload or the classified failure.
    pub async fn execute(&self, config: &RequestConfig) -> Result<Value, ClassifiedError> {
        self.execute_with_status(config)
            .await
            .map(|(_, payload)| payload)
    }

    /// `execute`, retrying transport failures per `policy`.
    pub async fn execute_with_retry(
        &self,
        config: &RequestConfig,
        policy: &RetryPolicy,
    ) -> Result<Value, ClassifiedError> {
        retry_transport(policy, move |attempt| {
            debug!(attempt, path = %config.path, "executing request attempt");
            self.execute(config)
        })
        .await
    }

    /// `execute`, then decode the payload into `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        config: &RequestConfig,
    ) -> Result<T, ClassifiedError> {
        let (status, payload) = self.execute_with_status(config).await?;
        serde_json::from_value(payload.clone())
            .map_err(|e| ClassifiedError::invalid_response(status, e, payload))
    }

    pub(crate) async fn execute_with_status(
        &self,
        config: &RequestConfig,
    ) -> Result<(u16, Value), ClassifiedError> {
        let request_id = Uuid::new_v4();
        let result = self.send(config, request_id).await;

        match &result {
            Ok((status, _)) => {
                debug!(%request_id, status, "request succeeded");
                crate::metrics::record_request(config.method.as_str(), "ok");
            }
            Err(err) => {
                crate::metrics::record_request(config.method.as_str(), "error");
                crate::metrics::record_error(err.kind().as_str());
                self.dispatch(err, config);
            }
        }
        result
    }

    /// Run the global side-effect rules for a failed call.
    ///
    /// Redirect first, then logout. The error itself is left untouched for
    /// the caller.
    fn dispatch(&self, error: &ClassifiedError, config: &RequestConfig) {
        self.redirect.maybe_redirect(error);

        if should_logout(error, config) {
            info!(
                status = error.status(),
                code = error.code().unwrap_or("none"),
                path = %config.path,
                "session rejected by backend, logging out"
            );
            self.logout.logout(Some(SESSION_EXPIRED));
        }
    }

    #[instrument(skip_all, fields(request_id = %request_id, method = %config.method, path = %config.path))]
    async fn send(
        &self,
        config: &RequestConfig,
        request_id: Uuid,
    ) -> Result<(u16, Value), ClassifiedError> {
        let url = self.options.url(&config.path);
        let mut request = self
            .http
            .request(config.method.clone(), url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());

        let token = config.token.clone().or_else(|| self.tokens.read());
        if let Some(token) = &token {
            request = request.bearer_auth(token.expose());
        }
        if let Some(body) = &config.body {
            request = request.body(body.to_string());
        }

        // Dropping the exchange future on deadline cancels the in-flight call.
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, content_type, text))
        };

        let (status, content_type, text) =
            match tokio::time::timeout(config.timeout, exchange).await {
                Ok(Ok(parts)) => parts,
                Ok(Err(e)) => {
                    warn!(error = %e, "transport failure");
                    return Err(classify_transport(&e, config.timeout));
                }
                Err(_) => {
                    warn!(
                        timeout_ms = config.timeout.as_millis() as u64,
                        "request deadline elapsed"
                    );
                    return Err(ClassifiedError::timeout(config.timeout));
                }
            };

        if is_html_document(content_type.as_deref(), &text) {
            warn!(
                status = status.as_u16(),
                "received HTML document instead of API response"
            );
            return Err(ClassifiedError::service_unavailable());
        }

        let payload = parse_payload(&text);
        if status.is_success() {
            return Ok((status.as_u16(), payload));
        }

        let err = classify(status.as_u16(), payload);
        warn!(
            status = err.status(),
            kind = err.kind().as_str(),
            code = err.code().unwrap_or("none"),
            "backend returned error"
        );
        Err(err)
    }
}
