//! Hireboard Session CLI
//!
//! Composition root for the dashboard session layer: builds the auth state,
//! the file-backed session store and the service, runs startup rehydration,
//! then performs the requested action.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hireboard_auth_core::{
    FileStorage, RehydrationOutcome, SessionService, SharedAuthState, TokenValidator,
};
use hireboard_types::User;
use serde_json::json;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "hireboard-session",
    version,
    about = "Inspect and manage the Hireboard dashboard session"
)]
struct Cli {
    /// Session file (overrides HIREBOARD_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Restore the stored session and print the auth state
    Status,
    /// Store a session for a token issued by the API
    Login {
        /// Bearer token returned by the login endpoint
        #[arg(long)]
        token: String,
    },
    /// Clear the stored session
    Logout,
    /// Check a token offline without touching the stored session
    CheckToken {
        /// Token to check
        token: String,
    },
    /// Print the Authorization header for the stored token
    Header,
}

fn main() -> anyhow::Result<()> {
    hireboard_utils::load_env();
    hireboard_utils::init_tracing("warn");

    let cli = Cli::parse();

    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(path) = cli.session_file {
        config = config.with_session_file(path);
    }
    tracing::debug!("Using session file {}", config.session_file.display());

    match cli.command {
        Command::CheckToken { token } => check_token(&config, &token)?,
        Command::Status => {
            let (service, outcome) = open_session(&config)?;
            let view = service.view();
            let gate = view.gate();
            let report = json!({
                "rehydration": outcome.as_str(),
                "state": view.snapshot().to_json(),
                "gate": gate.as_str(),
                "redirect": gate.redirect_path(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Login { token } => {
            let (service, _) = open_session(&config)?;
            let claims = service
                .login(token.trim())
                .map_err(|e| anyhow::anyhow!("login failed ({}): {}", e.error_code(), e))?;
            match User::from_claims(&claims) {
                Ok(user) => println!("Signed in as {} ({})", user.id, user.role),
                Err(e) => {
                    tracing::debug!("Claims do not describe a dashboard user: {}", e);
                    println!("Signed in");
                }
            }
        }
        Command::Logout => {
            let (service, _) = open_session(&config)?;
            service.logout();
            println!("Signed out");
        }
        Command::Header => {
            let (service, _) = open_session(&config)?;
            match service.authorization_header() {
                Some(header) => println!("Authorization: {header}"),
                None => anyhow::bail!("no stored session"),
            }
        }
    }

    Ok(())
}

/// Build the session service over the configured file and rehydrate it
fn open_session(
    config: &Config,
) -> anyhow::Result<(SessionService<FileStorage>, RehydrationOutcome)> {
    let service = SessionService::new(
        FileStorage::new(&config.session_file),
        &config.session,
        SharedAuthState::new(),
    );
    let outcome = service.rehydrate()?;
    tracing::debug!("Rehydration finished: {}", outcome.as_str());
    Ok((service, outcome))
}

fn check_token(config: &Config, token: &str) -> anyhow::Result<()> {
    let validator = TokenValidator::new(config.session.expiry_policy);
    match validator.check(token.trim()) {
        Ok(claims) => {
            let report = json!({
                "valid": true,
                "exp": claims.exp(),
                "claims": claims,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            let report = json!({ "valid": false, "error": e.error_code() });
            println!("{}", serde_json::to_string_pretty(&report)?);
            anyhow::bail!("token rejected: {e}")
        }
    }
}
