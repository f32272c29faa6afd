use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

// Error tracing
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use campus_auth::{AuthContext, FileStorage, Role, StaticFixtureProvider};
use campus_shared::config::load_config;
use campus_shared::types::AppConfig;

mod commands;

/// Drive the campus session context from the shell. Each invocation is one
/// "page load": the persisted session is restored before the command runs.
#[derive(Debug, Parser)]
#[command(name = "campus-auth", version, about)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session storage directory, overriding `storage.dir`.
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in as a demo principal.
    Login {
        #[arg(required_unless_present = "json")]
        email: Option<String>,
        /// Read from stdin when omitted.
        #[arg(long, short, conflicts_with = "json")]
        password: Option<String>,
        /// Read a `{"email": .., "password": ..}` request from stdin instead.
        #[arg(long, conflicts_with = "email")]
        json: bool,
    },
    /// Sign out and clear the stored session.
    Logout,
    /// Show the current session.
    Whoami,
    /// Preview another role (admins only).
    SwitchRole { role: Role },
    /// Exit 0 when the current principal holds the capability, 1 otherwise.
    Can { capability: String },
    /// Edit profile fields of the signed-in principal.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        student_id: Option<String>,
    },
    /// List the registered demo principals.
    Principals,
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // stdout carries the JSON responses
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    init_tracing(&config);

    let storage_dir = cli
        .storage
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.dir));
    let storage = Arc::new(FileStorage::new(storage_dir));
    debug!("Using session storage at {}", storage.dir().display());

    let ctx = AuthContext::builder(storage, config.auth.clone())
    .with_provider(Arc::new(StaticFixtureProvider::from_config(&config)))
    .build();

    let state = ctx.initialize().await;
    debug!("Session state after initialization: {}", state);

    commands::run(&ctx, cli.command).await
}
