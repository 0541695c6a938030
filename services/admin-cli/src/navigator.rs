//! Terminal navigator
//!
//! A command-line session has no pages to move between. Redirects are
//! logged and reported on stderr so the operator knows where the web app
//! would have sent them.

use std::sync::{Mutex, PoisonError};

use api_client::Navigator;
use tracing::info;

pub struct TerminalNavigator {
    current: Mutex<String>,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self {
            current: Mutex::new("/".into()),
        }
    }
}

impl Default for TerminalNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn redirect_to(&self, path: &str) {
        info!(target_path = path, "redirect");
        eprintln!("-> {path}");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.to_owned();
    }
}
