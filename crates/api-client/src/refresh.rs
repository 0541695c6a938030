//! Silent credential refresh and session establishment
//!
//! Refresh is the one place that writes a credential without the user
//! asking. It must back off whenever a logout is under way: the logout flag
//! is checked right before the refresh call, and the new credential is
//! stored through `TokenStore::write_unless_logging_out`, which re-checks the
//! flag under the store's lock since a logout can start while the call is in
//! flight.

use common::Secret;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::ClassifiedError;
use crate::request::RequestConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new credential was stored.
    Refreshed,
    /// A logout was in progress; nothing was stored.
    Aborted,
}

impl ApiClient {
    /// Exchange the current credential for a fresh one.
    ///
    /// A failed refresh call is returned as-is and never triggers auto-logout.
    pub async fn refresh_session(&self) -> Result<RefreshOutcome, ClassifiedError> {
        if self.session().is_logout_in_progress() {
            debug!("logout in progress, skipping refresh");
            return Ok(RefreshOutcome::Aborted);
        }

        let config = RequestConfig::post(self.options().refresh_path.clone()).suppress_auto_logout();
        let (status, payload) = self.execute_with_status(&config).await?;

        let Some(token) = extract_token(&payload) else {
            return Err(ClassifiedError::invalid_response(
                status,
                "refresh response carried no token",
                payload,
            ));
        };

        if !self
            .tokens()
            .write_unless_logging_out(Secret::new(token.to_owned()))
        {
            info!("logout started during refresh, discarding new credential");
            return Ok(RefreshOutcome::Aborted);
        }

        debug!("credential refreshed");
        Ok(RefreshOutcome::Refreshed)
    }

    /// Record a credential obtained by interactive sign-in.
    ///
    /// Clears the logout flag so later refreshes are allowed again. The
    /// return URL is left for the caller to `take`.
    pub fn establish_session(&self, token: Secret<String>) {
        self.session().clear_logout_flag();
        self.tokens().write(token);
        info!("session established");
    }
}

fn extract_token(payload: &Value) -> Option<&str> {
    payload
        .get("token")
        .or_else(|| payload.get("accessToken"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::harness;
    use crate::error::ErrorKind;
    use axum::Json;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::json;
    use session::SessionState;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Refresh endpoint answering with `body` and `status` after `delay`.
    async fn start_refresh_server(
        status: StatusCode,
        body: Value,
        delay: Duration,
    ) -> (String, Arc<AtomicU32>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicU32::new(0));

        let hits_srv = hits.clone();
        let app = axum::Router::new().route(
            "/api/auth/refresh",
            post(move |_headers: HeaderMap| {
                let (hits, body) = (hits_srv.clone(), body.clone());
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    (status, Json(body))
                }
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (url, hits)
    }

    #[tokio::test]
    async fn refresh_stores_the_new_credential() {
        let (url, hits) =
            start_refresh_server(StatusCode::OK, json!({"token": "tok_new"}), Duration::ZERO)
                .await;
        let h = harness(&url);
        h.tokens.write(Secret::from("tok_old"));

        let outcome = h.client.refresh_session().await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(h.tokens.read().unwrap().expose(), "tok_new");
    }

    #[tokio::test]
    async fn refresh_accepts_legacy_field_name() {
        let (url, _) = start_refresh_server(
            StatusCode::OK,
            json!({"accessToken": "tok_legacy"}),
            Duration::ZERO,
        )
        .await;
        let h = harness(&url);

        assert_eq!(
            h.client.refresh_session().await.unwrap(),
            RefreshOutcome::Refreshed
        );
        assert_eq!(h.tokens.read().unwrap().expose(), "tok_legacy");
    }

    #[tokio::test]
    async fn refresh_is_skipped_while_logging_out() {
        let (url, hits) =
            start_refresh_server(StatusCode::OK, json!({"token": "tok_new"}), Duration::ZERO)
                .await;
        let h = harness(&url);
        h.session.begin_logout();

        let outcome = h.client.refresh_session().await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Aborted);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(h.tokens.read().is_none());
    }

    #[tokio::test]
    async fn logout_during_refresh_discards_the_result() {
        let (url, hits) = start_refresh_server(
            StatusCode::OK,
            json!({"token": "tok_new"}),
            Duration::from_millis(200),
        )
        .await;
        let h = harness(&url);
        let session: SessionState = h.session.clone();

        let logout = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.begin_logout();
        });
        let outcome = h.client.refresh_session().await.unwrap();
        logout.await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Aborted);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(h.tokens.read().is_none());
    }

    #[tokio::test]
    async fn rejected_refresh_reports_error_without_logout() {
        let (url, _) = start_refresh_server(
            StatusCode::UNAUTHORIZED,
            json!({"errorCode": "INVALID_TOKEN", "message": "Token revoked"}),
            Duration::ZERO,
        )
        .await;
        let h = harness(&url);
        h.tokens.write(Secret::from("tok_old"));

        let err = h.client.refresh_session().await.unwrap_err();

        assert_eq!(err.status(), 401);
        assert_eq!(err.code(), Some("INVALID_TOKEN"));
        assert!(h.logout.calls().is_empty());
        assert_eq!(h.tokens.read().unwrap().expose(), "tok_old");
    }

    #[tokio::test]
    async fn refresh_without_token_is_a_decode_error() {
        let (url, _) =
            start_refresh_server(StatusCode::OK, json!({"ok": true}), Duration::ZERO).await;
        let h = harness(&url);
        h.tokens.write(Secret::from("tok_old"));

        let err = h.client.refresh_session().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.status(), 200);
        assert_eq!(h.tokens.read().unwrap().expose(), "tok_old");
    }

    #[tokio::test]
    async fn establish_session_clears_flag_and_stores_credential() {
        let h = harness("http://127.0.0.1:1");
        h.session.begin_logout();
        h.session.set_return_url("/customers/42");

        h.client.establish_session(Secret::from("tok_fresh"));

        assert!(!h.session.is_logout_in_progress());
        assert_eq!(h.tokens.read().unwrap().expose(), "tok_fresh");
        assert_eq!(h.session.take_return_url().as_deref(), Some("/customers/42"));
    }
}
