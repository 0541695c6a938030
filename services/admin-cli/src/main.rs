//! Admin API command-line client
//!
//! Single-binary operator tool that:
//! 1. Loads the backend and session configuration
//! 2. Restores the credential from the durable credential file
//! 3. Issues one API call (or signs in/out, or refreshes the session)
//! 4. Prints the JSON payload, or the user-facing error message

mod command;
mod config;
mod logout;
mod navigator;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use api_client::{
    ApiClient, LogoutHandler, LogoutOrchestrator, RefreshOutcome, RequestConfig,
};
use clap::Parser;
use common::Secret;
use reqwest::Method;
use serde_json::Value;
use session::{FileStorage, MemoryStorage, SessionState, TokenStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::{Cli, Command, Target};
use crate::config::Config;
use crate::logout::TrackedLogout;
use crate::navigator::TerminalNavigator;

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr keep stdout for the payload
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.backend.base_url,
        timeout_ms = config.backend.timeout_ms,
        credential_file = %config.session.credential_file.display(),
        "configuration loaded"
    );

    let durable = FileStorage::open(config.session.credential_file.clone()).with_context(|| {
        format!(
            "failed to open credential file {}",
            config.session.credential_file.display()
        )
    })?;
    let session = SessionState::new(Arc::new(MemoryStorage::new()));
    let tokens = Arc::new(TokenStore::new(Arc::new(durable), session.clone()));
    if let Some(token) = config.token.clone() {
        info!("seeding credential from ADMIN_API_TOKEN");
        tokens.write(token);
    }

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let navigator = Arc::new(TerminalNavigator::new());
    let options = config.client_options();
    let logout = Arc::new(TrackedLogout::new(LogoutOrchestrator::new(
        http.clone(),
        &options,
        tokens.clone(),
        session.clone(),
        navigator.clone(),
    )));
    let client = ApiClient::new(http, options, tokens, session, logout.clone(), navigator);

    let outcome = run(&client, &logout, &config, cli.command).await;

    // Revocation and the login redirect must finish before the process exits
    logout.settle().await;
    outcome
}

async fn run(
    client: &ApiClient,
    logout: &TrackedLogout,
    config: &Config,
    command: Command,
) -> Result<()> {
    match command {
        Command::Login { token } => {
            client.establish_session(Secret::new(token));
            // No return URL here: the session tier starts empty every run
            println!("signed in");
        }
        Command::Logout => {
            logout.logout(None);
            println!("signed out");
        }
        Command::Refresh => match client.refresh_session().await {
            Ok(RefreshOutcome::Refreshed) => println!("session refreshed"),
            Ok(RefreshOutcome::Aborted) => println!("refresh skipped: logout in progress"),
            Err(err) => bail!("{}", err.user_message()),
        },
        other => {
            let idempotent = other.is_idempotent();
            if let Some((method, target)) = other.request() {
                send_request(client, config, method, target, idempotent).await?;
            }
        }
    }

    Ok(())
}

async fn send_request(
    client: &ApiClient,
    config: &Config,
    method: Method,
    target: Target,
    idempotent: bool,
) -> Result<()> {
    let mut request = RequestConfig::new(method, target.path).with_timeout(config.request_timeout());
    if let Some(body) = target.body {
        request = request.with_body(body);
    }

    let result = if idempotent {
        client
            .execute_with_retry(&request, &config.retry_policy())
            .await
    } else {
        client.execute(&request).await
    };

    match result {
        Ok(payload) => print_payload(&payload),
        Err(err) => {
            error!(
                status = err.status(),
                kind = err.kind().as_str(),
                code = err.code().unwrap_or("none"),
                "request failed"
            );
            bail!("{}", err.user_message());
        }
    }
}

fn print_payload(payload: &Value) -> Result<()> {
    match payload {
        Value::Null => {}
        Value::String(text) => println!("{text}"),
        other => println!(
            "{}",
            serde_json::to_string_pretty(other).context("failed to render payload")?
        ),
    }
    Ok(())
}
