//! Command-line arguments
//!
//! ```text
//! admin-api [--config PATH] get|post|put|patch|delete <PATH> [JSON_BODY]
//! admin-api [--config PATH] login <TOKEN>
//! admin-api [--config PATH] logout
//! admin-api [--config PATH] refresh
//! ```

use clap::{Args, Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "admin-api", about = "Admin backend API client", version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "CONFIG_PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Fetch a resource
    Get(Target),
    /// Create a resource
    Post(Target),
    /// Replace a resource
    Put(Target),
    /// Update part of a resource
    Patch(Target),
    /// Delete a resource
    Delete(Target),
    /// Store a credential obtained by signing in
    Login { token: String },
    /// Sign out and revoke the stored credential
    Logout,
    /// Exchange the stored credential for a fresh one
    Refresh,
}

#[derive(Debug, PartialEq, Args)]
pub struct Target {
    /// API path, e.g. /api/customers
    #[arg(value_parser = parse_path)]
    pub path: String,

    /// JSON request body
    #[arg(value_parser = parse_body)]
    pub body: Option<Value>,
}

impl Command {
    /// The HTTP call this command makes, if it is a plain request.
    pub fn request(self) -> Option<(Method, Target)> {
        match self {
            Command::Get(t) => Some((Method::GET, t)),
            Command::Post(t) => Some((Method::POST, t)),
            Command::Put(t) => Some((Method::PUT, t)),
            Command::Patch(t) => Some((Method::PATCH, t)),
            Command::Delete(t) => Some((Method::DELETE, t)),
            Command::Login { .. } | Command::Logout | Command::Refresh => None,
        }
    }

    /// Transport retries are only safe for requests the backend may repeat.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Command::Get(_) | Command::Put(_) | Command::Delete(_))
    }
}

fn parse_path(path: &str) -> Result<String, String> {
    if path.starts_with('/') {
        Ok(path.to_owned())
    } else {
        Err(format!("path must start with '/', got: {path}"))
    }
}

fn parse_body(body: &str) -> Result<Value, String> {
    serde_json::from_str(body).map_err(|e| format!("request body is not valid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("admin-api").chain(args.iter().copied()))
    }

    #[test]
    fn parses_get_request() {
        let cli = parse(&["get", "/api/customers"]).unwrap();
        assert!(cli.command.is_idempotent());

        let (method, target) = cli.command.request().unwrap();
        assert_eq!(method, Method::GET);
        assert_eq!(target.path, "/api/customers");
        assert_eq!(target.body, None);
    }

    #[test]
    fn parses_request_with_body_and_config() {
        let cli = parse(&[
            "--config",
            "/etc/admin-api.toml",
            "post",
            "/api/users",
            r#"{"email":"ops@example.com"}"#,
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some("/etc/admin-api.toml"));
        assert!(!cli.command.is_idempotent());
        let (method, target) = cli.command.request().unwrap();
        assert_eq!(method, Method::POST);
        assert_eq!(target.path, "/api/users");
        assert_eq!(target.body, Some(json!({"email": "ops@example.com"})));
    }

    #[test]
    fn parses_session_commands() {
        assert_eq!(
            parse(&["login", "tok_abc"]).unwrap().command,
            Command::Login {
                token: "tok_abc".into()
            }
        );
        assert_eq!(parse(&["logout"]).unwrap().command, Command::Logout);
        assert_eq!(parse(&["refresh"]).unwrap().command, Command::Refresh);
        assert!(parse(&["logout"]).unwrap().command.request().is_none());
    }

    #[test]
    fn idempotency_follows_the_verb() {
        assert!(parse(&["put", "/api/users/1"]).unwrap().command.is_idempotent());
        assert!(parse(&["delete", "/api/users/1"]).unwrap().command.is_idempotent());
        assert!(!parse(&["patch", "/api/users/1"]).unwrap().command.is_idempotent());
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(parse(&["trace", "/api/me"]).is_err());
    }

    #[test]
    fn rejects_relative_path() {
        let err = parse(&["get", "api/me"]).unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn rejects_invalid_body() {
        let err = parse(&["patch", "/api/users/1", "{not json"]).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn rejects_missing_config_value() {
        assert!(parse(&["--config"]).is_err());
    }

    #[test]
    fn rejects_empty_invocation() {
        assert!(parse(&[]).is_err());
    }
}
