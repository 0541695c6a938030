//! Logout orchestration
//!
//! Step order is fixed:
//! 1. Set the logout flag, before anything else, so a silent refresh racing
//!    this logout sees it and backs off
//! 2. Clear the token store
//! 3. Revoke the credential server-side, best effort, with a short deadline
//! 4. Navigate to the login page, with the reason if one was given
//!
//! `begin` returns after steps 1-2. Steps 3-4 run on a spawned task; the
//! local sign-out never depends on the backend answering.

use std::sync::Arc;
use std::time::Duration;

use common::Secret;
use session::{SessionState, TokenStore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::ClientOptions;
use crate::navigator::Navigator;

/// Receiver of auto-logout decisions.
///
/// Implementations must return promptly; anything slow belongs on a
/// spawned task.
pub trait LogoutHandler: Send + Sync {
    fn logout(&self, reason: Option<&str>);
}

pub struct LogoutOrchestrator {
    http: reqwest::Client,
    revoke_url: String,
    revoke_timeout: Duration,
    login_path: String,
    tokens: Arc<TokenStore>,
    session: SessionState,
    navigator: Arc<dyn Navigator>,
}

impl LogoutOrchestrator {
    pub fn new(
        http: reqwest::Client,
        options: &ClientOptions,
        tokens: Arc<TokenStore>,
        session: SessionState,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            revoke_url: options.url(&options.revoke_path),
            revoke_timeout: options.revoke_timeout,
            login_path: options.login_path.clone(),
            tokens,
            session,
            navigator,
        }
    }

    /// Sign out locally and start the revocation + navigation tail.
    ///
    /// Must be called from within a Tokio runtime. The returned handle
    /// completes once the user has been sent to the login page; callers are
    /// free to drop it.
    pub fn begin(&self, reason: Option<&str>) -> JoinHandle<()> {
        self.session.begin_logout();
        let token = self.tokens.read();
        self.tokens.clear();

        info!(reason = reason.unwrap_or("none"), "signed out locally");
        crate::metrics::record_logout(reason.unwrap_or("user"));

        let target = match reason {
            Some(reason) => format!("{}?reason={reason}", self.login_path),
            None => self.login_path.clone(),
        };
        let http = self.http.clone();
        let revoke_url = self.revoke_url.clone();
        let revoke_timeout = self.revoke_timeout;
        let navigator = self.navigator.clone();

        tokio::spawn(async move {
            if let Some(token) = token {
                revoke(&http, &revoke_url, &token, revoke_timeout).await;
            }
            navigator.redirect_to(&target);
        })
    }
}

impl LogoutHandler for LogoutOrchestrator {
    fn logout(&self, reason: Option<&str>) {
        drop(self.begin(reason));
    }
}

/// Ask the backend to revoke the credential. The outcome is only logged.
async fn revoke(http: &reqwest::Client, url: &str, token: &Secret<String>, timeout: Duration) {
    let result = http
        .post(url)
        .bearer_auth(token.expose())
        .timeout(timeout)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            debug!("credential revoked server-side");
        }
        Ok(response) => {
            warn!(status = response.status().as_u16(), "credential revocation rejected");
        }
        Err(e) => {
            warn!(error = %e, timeout = e.is_timeout(), "credential revocation failed");
        }
    }
}
