//! Upsell redirect for lapsed trials and subscriptions
//!
//! A 403 carrying a trial/subscription code is a billing fact, not an auth
//! failure: the credential stays and the logout handler is not involved.

use std::sync::Arc;

use tracing::info;

use crate::error::{ClassifiedError, codes};
use crate::navigator::{Navigator, path_of};

pub struct SubscriptionRedirect {
    upsell_path: String,
    navigator: Arc<dyn Navigator>,
}

impl SubscriptionRedirect {
    pub fn new(upsell_path: impl Into<String>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            upsell_path: upsell_path.into(),
            navigator,
        }
    }

    /// Redirect to the upsell page if this error calls for it.
    ///
    /// Returns whether a redirect happened. Does nothing when already on the
    /// upsell page, so a guarded call made by that page cannot loop.
    pub fn maybe_redirect(&self, error: &ClassifiedError) -> bool {
        let Some(code) = lapsed_subscription_code(error) else {
            return false;
        };

        let current = self.navigator.current_path();
        if path_of(&current) == path_of(&self.upsell_path) {
            info!(code, "already on upsell page, skipping redirect");
            return false;
        }

        let target = format!("{}?reason={}", self.upsell_path, code.to_ascii_lowercase());
        info!(code, target = %target, "subscription lapsed, redirecting to upsell");
        crate::metrics::record_redirect(code);
        self.navigator.redirect_to(&target);
        true
    }
}

fn lapsed_subscription_code(error: &ClassifiedError) -> Option<&str> {
    if error.status() != 403 {
        return None;
    }
    error
        .code()
        .filter(|code| codes::SUBSCRIPTION_LAPSED.contains(code))
}
