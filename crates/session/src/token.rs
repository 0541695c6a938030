//! Bearer credential store
//!
//! The primary tier is an in-process holder, empty after a restart. The
//! durable tier is the fallback read until the primary is written again.
//! One mutex covers both tiers: a reader never sees a write that has landed
//! in one tier but not the other.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::Secret;
use tracing::{debug, warn};

use crate::keys::AUTH_TOKEN;
use crate::state::SessionState;
use crate::storage::Storage;

pub struct TokenStore {
    primary: Mutex<Option<Secret<String>>>,
    durable: Arc<dyn Storage>,
    session: SessionState,
}

impl TokenStore {
    pub fn new(durable: Arc<dyn Storage>, session: SessionState) -> Self {
        Self {
            primary: Mutex::new(None),
            durable,
            session,
        }
    }

    fn primary(&self) -> MutexGuard<'_, Option<Secret<String>>> {
        self.primary.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current credential: primary tier, then durable fallback.
    pub fn read(&self) -> Option<Secret<String>> {
        let primary = self.primary();
        if let Some(token) = primary.as_ref() {
            return Some(token.clone());
        }
        self.durable
            .get(AUTH_TOKEN)
            .filter(|t| !t.is_empty())
            .map(Secret::new)
    }

    /// Store a credential in both tiers.
    ///
    /// A durable write failure is logged; the primary tier still holds the
    /// credential for the rest of the process lifetime.
    pub fn write(&self, token: Secret<String>) {
        let mut primary = self.primary();
        if let Err(e) = self.durable.set(AUTH_TOKEN, token.expose()) {
            warn!(error = %e, "failed to persist fallback credential");
        }
        *primary = Some(token);
        debug!("credential stored");
    }

    /// Store a credential unless a logout is in progress.
    ///
    /// The flag is checked under the same lock `clear` takes. Logout sets the
    /// flag before clearing, so a concurrent logout either sees this write
    /// and wipes it, or this call sees the flag and stores nothing.
    pub fn write_unless_logging_out(&self, token: Secret<String>) -> bool {
        let mut primary = self.primary();
        if self.session.is_logout_in_progress() {
            debug!("logout in progress, credential discarded");
            return false;
        }
        if let Err(e) = self.durable.set(AUTH_TOKEN, token.expose()) {
            warn!(error = %e, "failed to persist fallback credential");
        }
        *primary = Some(token);
        debug!("credential stored");
        true
    }

    /// Empty both tiers and the session return URL.
    pub fn clear(&self) {
        let mut primary = self.primary();
        *primary = None;
        if let Err(e) = self.durable.remove(AUTH_TOKEN) {
            warn!(error = %e, "failed to remove fallback credential");
        }
        self.session.clear_return_url();
        debug!("credential cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }
}
