//! Session-resilient HTTP client for the admin backend
//!
//! Every page-level call goes through `ApiClient`. A call either returns the
//! backend payload or a `ClassifiedError`; the client never swallows a
//! failure. On the error path two global side effects may fire, each behind
//! a deterministic rule:
//! - auto-logout (`policy::should_logout`), for a 401 that means the session
//!   itself is gone
//! - upsell redirect (`redirect::SubscriptionRedirect`), for a 403 that means
//!   the trial or subscription lapsed
//!
//! Call flow:
//! 1. Caller builds a `RequestConfig` (and optionally a `RetryPolicy`)
//! 2. `ApiClient::execute` sends it inside a deadline envelope
//! 3. The outcome is normalized by `classify`
//! 4. On error, redirect and logout rules run, then the error is returned
//! 5. `ApiClient::execute_with_retry` repeats step 2-4 for transport failures

pub mod classify;
pub mod client;
pub mod error;
pub mod logout;
pub mod metrics;
pub mod navigator;
pub mod policy;
pub mod redirect;
pub mod refresh;
pub mod request;
pub mod retry;

pub use client::{ApiClient, ClientOptions};
pub use error::{ClassifiedError, ErrorKind};
pub use logout::{LogoutHandler, LogoutOrchestrator};
pub use navigator::{MemoryNavigator, Navigator};
pub use policy::should_logout;
pub use redirect::SubscriptionRedirect;
pub use refresh::RefreshOutcome;
pub use request::{RequestConfig, RetryPolicy};
