//! Auto-logout decision
//!
//! Decides from status and code together, never from status alone and never
//! from message text. Some endpoints answer 401 for reasons unrelated to the
//! session (a wrong one-time code during step-up), and those must not sign
//! the user out.

use crate::classify::is_step_up_code;
use crate::error::{ClassifiedError, codes};
use crate::request::RequestConfig;

/// Reason tag passed to the logout handler when a session is rejected.
pub const SESSION_EXPIRED: &str = "session_expired";

/// Whether this failure should end the session. Rules, in order:
///
/// 1. `suppress_auto_logout` on the call: no.
/// 2. Transport failure (timeout, network, HTML fallback): no.
/// 3. 401 with no code, or with `INVALID_TOKEN`: yes.
/// 4. 401 with a step-up code: no.
/// 5. Anything else, including 401 with any other code: no.
///
/// A 401 without a code is treated as a dead session; endpoints that forget
/// to send a code keep their historical behavior.
pub fn should_logout(error: &ClassifiedError, config: &RequestConfig) -> bool {
    if config.suppress_auto_logout {
        return false;
    }
    if error.is_network_error() {
        return false;
    }
    if error.status() != 401 {
        return false;
    }
    match error.code() {
        None => true,
        Some(codes::INVALID_TOKEN) => true,
        Some(code) if is_step_up_code(code) => false,
        Some(_) => false,
    }
}
