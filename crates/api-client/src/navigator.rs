//! Navigation capability
//!
//! Logout and the upsell redirect both move the user somewhere else. They do
//! it through this trait so the embedding application decides what
//! "navigate" means and tests can record it.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub trait Navigator: Send + Sync {
    /// Current location (path plus optional query).
    fn current_path(&self) -> String;

    fn redirect_to(&self, path: &str);
}

/// In-memory navigator that tracks the current location and every redirect.
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<NavState>,
}

#[derive(Debug)]
struct NavState {
    current: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(NavState {
                current: start.into(),
                history: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, NavState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Redirects performed so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state().current.clone()
    }

    fn redirect_to(&self, path: &str) {
        let mut state = self.state();
        state.current = path.to_owned();
        state.history.push(path.to_owned());
    }
}

/// Path portion of a location, without query or fragment.
pub fn path_of(location: &str) -> &str {
    location
        .split(['?', '#'])
        .next()
        .unwrap_or(location)
}
