//! Configuration types and loading
//!
//! Precedence: CLI args > env vars > config file > defaults.
//! The bearer credential is never stored in the TOML. It comes from the
//! `ADMIN_API_TOKEN` env var or from the durable credential file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use api_client::{ClientOptions, RetryPolicy};
use common::Secret;
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Seed credential from `ADMIN_API_TOKEN`.
    #[serde(skip)]
    pub token: Option<Secret<String>>,
}

/// Admin backend origin and per-request deadline
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Credential persistence and session destinations
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_credential_file")]
    pub credential_file: PathBuf,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_upsell_path")]
    pub upsell_path: String,
    #[serde(default = "default_revoke_path")]
    pub revoke_path: String,
    #[serde(default = "default_revoke_timeout_ms")]
    pub revoke_timeout_ms: u64,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
}

/// Transport retry settings for idempotent requests
#[derive(Debug, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_credential_file() -> PathBuf {
    PathBuf::from("admin-api-credentials.json")
}

fn default_login_path() -> String {
    "/login".into()
}

fn default_upsell_path() -> String {
    "/upgrade".into()
}

fn default_revoke_path() -> String {
    "/api/auth/logout".into()
}

fn default_revoke_timeout_ms() -> u64 {
    2_000
}

fn default_refresh_path() -> String {
    "/api/auth/refresh".into()
}

fn default_retries() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credential_file: default_credential_file(),
            login_path: default_login_path(),
            upsell_path: default_upsell_path(),
            revoke_path: default_revoke_path(),
            revoke_timeout_ms: default_revoke_timeout_ms(),
            refresh_path: default_refresh_path(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        if let Ok(token) = std::env::var("ADMIN_API_TOKEN") {
            let token = token.trim().to_owned();
            if !token.is_empty() {
                config.token = Some(Secret::new(token));
            }
        }

        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.backend.base_url
            )));
        }

        if self.backend.timeout_ms == 0 {
            return Err(common::Error::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if self.session.revoke_timeout_ms == 0 {
            return Err(common::Error::Config(
                "revoke_timeout_ms must be greater than 0".into(),
            ));
        }

        // Logout must never outlast an ordinary request
        if self.session.revoke_timeout_ms >= self.backend.timeout_ms {
            return Err(common::Error::Config(format!(
                "revoke_timeout_ms ({}) must be below timeout_ms ({})",
                self.session.revoke_timeout_ms, self.backend.timeout_ms
            )));
        }

        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("admin-api.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.timeout_ms)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.backend.base_url.clone(),
            login_path: self.session.login_path.clone(),
            upsell_path: self.session.upsell_path.clone(),
            revoke_path: self.session.revoke_path.clone(),
            revoke_timeout: Duration::from_millis(self.session.revoke_timeout_ms),
            refresh_path: self.session.refresh_path.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.retries, Duration::from_millis(self.retry.delay_ms))
    }
}
