//! userctl CLI - run and provision the user service
//!
//! - `serve`: start the HTTP API (PostgreSQL or in-memory store)
//! - `migrate`: create the `user` table and its indexes

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use userctl_server::UserctlConfig;

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(name = "userctl", version, about = "User resource HTTP service")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces via OpenTelemetry OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Path to config file (default: ~/.userctl/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; a missing file is not an error
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;

    let config = UserctlConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await,
        Commands::Migrate(args) => commands::run_migrate(args, config).await,
    };

    tracing_setup::shutdown_otel();
    result
}
