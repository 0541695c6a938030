//! Storage keys shared by every tier

/// Durable tier: fallback bearer credential.
pub const AUTH_TOKEN: &str = "auth_token";

/// Session tier: set while a logout is in progress.
pub const LOGOUT_IN_PROGRESS: &str = "logout_in_progress";

/// Session tier: location to return to after signing in again.
pub const RETURN_URL: &str = "return_url";
