//! Error types for storage operations

/// Errors from the storage tiers.
///
/// Only `FileStorage` produces these; the token store logs and swallows them
/// because a failed durable write must never fail the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("storage parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
