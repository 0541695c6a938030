//! Client-side counters
//!
//! Emitted through the `metrics` facade; the embedding application decides
//! whether a recorder is installed. Without one these calls are no-ops.
//!
//! - `api_requests_total` (counter): labels `method`, `outcome`
//! - `api_errors_total` (counter): label `kind`
//! - `api_retries_total` (counter)
//! - `api_logouts_total` (counter): label `reason`
//! - `api_redirects_total` (counter): label `code`

pub fn record_request(method: &str, outcome: &'static str) {
    metrics::counter!("api_requests_total", "method" => method.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("api_errors_total", "kind" => kind).increment(1);
}

pub fn record_retry() {
    metrics::counter!("api_retries_total").increment(1);
}

pub fn record_logout(reason: &str) {
    metrics::counter!("api_logouts_total", "reason" => reason.to_string()).increment(1);
}

pub fn record_redirect(code: &str) {
    metrics::counter!("api_redirects_total", "code" => code.to_string()).increment(1);
}
