//! Session-scoped state: the logout flag and the stored return URL
//!
//! The logout flag is the one piece of cross-request coordination in the
//! client. Logout sets it before touching the credential; anything about to
//! refresh the credential silently must check it first and back off. It is
//! never cleared implicitly, only through `clear_logout_flag`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::keys::{LOGOUT_IN_PROGRESS, RETURN_URL};
use crate::storage::Storage;

const FLAG_SET: &str = "true";

#[derive(Clone)]
pub struct SessionState {
    storage: Arc<dyn Storage>,
}

impl SessionState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Mark a logout as in progress.
    pub fn begin_logout(&self) {
        if let Err(e) = self.storage.set(LOGOUT_IN_PROGRESS, FLAG_SET) {
            warn!(error = %e, "failed to persist logout flag");
        }
        debug!("logout flag set");
    }

    pub fn is_logout_in_progress(&self) -> bool {
        self.storage.get(LOGOUT_IN_PROGRESS).as_deref() == Some(FLAG_SET)
    }

    pub fn clear_logout_flag(&self) {
        if let Err(e) = self.storage.remove(LOGOUT_IN_PROGRESS) {
            warn!(error = %e, "failed to clear logout flag");
        }
        debug!("logout flag cleared");
    }

    pub fn set_return_url(&self, url: &str) {
        if let Err(e) = self.storage.set(RETURN_URL, url) {
            warn!(error = %e, "failed to store return url");
        }
    }

    pub fn return_url(&self) -> Option<String> {
        self.storage.get(RETURN_URL)
    }

    /// Read the return URL and forget it.
    pub fn take_return_url(&self) -> Option<String> {
        let url = self.storage.get(RETURN_URL)?;
        self.clear_return_url();
        Some(url)
    }

    pub fn clear_return_url(&self) {
        if let Err(e) = self.storage.remove(RETURN_URL) {
            warn!(error = %e, "failed to clear return url");
        }
    }
}
