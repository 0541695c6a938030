//! Logout handler that lets the process wait for its network tail
//!
//! `LogoutOrchestrator` leaves revocation and navigation running on a spawned
//! task. A short-lived CLI would exit before that task finishes, so this
//! wrapper keeps the handles and `settle` awaits them before shutdown.

use std::sync::{Mutex, PoisonError};

use api_client::{LogoutHandler, LogoutOrchestrator};
use tokio::task::JoinHandle;
use tracing::warn;

pub struct TrackedLogout {
    orchestrator: LogoutOrchestrator,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TrackedLogout {
    pub fn new(orchestrator: LogoutOrchestrator) -> Self {
        Self {
            orchestrator,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every started logout tail to finish.
    pub async fn settle(&self) {
        let handles: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "logout task failed");
            }
        }
    }
}

impl LogoutHandler for TrackedLogout {
    fn logout(&self, reason: Option<&str>) {
        let handle = self.orchestrator.begin(reason);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }
}
