//! Client-side session state for the admin API client
//!
//! Two storage tiers back the session:
//! - a durable tier (file-backed in the binary) that keeps the fallback
//!   credential across restarts
//! - a session tier (process lifetime) that keeps the logout flag and the
//!   return URL
//!
//! `TokenStore` layers an in-process primary credential over the durable
//! tier. `SessionState` owns the logout flag that silent refresh consults
//! before touching the credential.

pub mod error;
pub mod keys;
pub mod state;
pub mod storage;
pub mod token;

pub use error::{Error, Result};
pub use state::SessionState;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use token::TokenStore;
