//! Fixed-delay retry for transport failures
//!
//! Only transport-class failures are retried. A real 4xx/5xx response is
//! returned immediately: retrying a validation or auth failure cannot change
//! the outcome. Attempts run one after another, never in parallel.

use std::future::Future;

use tracing::{debug, warn};

use crate::error::ClassifiedError;
use crate::request::RetryPolicy;

/// Run `attempt` up to `policy.max_attempts()` times.
///
/// The closure receives the 1-based attempt number. On exhaustion the last
/// error is returned unchanged.
pub async fn retry_transport<T, F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<T, ClassifiedError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ClassifiedError>>,
{
    let max_attempts = policy.max_attempts();
    let mut n = 1;

    loop {
        match attempt(n).await {
            Ok(value) => {
                if n > 1 {
                    debug!(attempt = n, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_network_error() && n < max_attempts => {
                warn!(
                    attempt = n,
                    max_attempts,
                    kind = err.kind().as_str(),
                    delay_ms = policy.retry_delay.as_millis() as u64,
                    "transport failure, retrying"
                );
                crate::metrics::record_retry();
                tokio::time::sleep(policy.retry_delay).await;
                n += 1;
            }
            Err(err) => {
                if err.is_network_error() {
                    warn!(
                        attempts = n,
                        kind = err.kind().as_str(),
                        "transport failure after all retries"
                    );
                }
                return Err(err);
            }
        }
    }
}
