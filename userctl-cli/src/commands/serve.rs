//! HTTP server command
//!
//! Wires store -> service -> router explicitly and blocks until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use userctl_server::db::{create_pool_with_options, PgUserStore};
use userctl_server::http::{run_server, AppState};
use userctl_server::{MemoryUserStore, StorageBackend, UserService, UserStore, UserctlConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Keep users in memory instead of PostgreSQL (lost on exit)
    #[arg(long)]
    pub in_memory: bool,
}

impl ServeArgs {
    fn apply(self, config: &mut UserctlConfig) {
        if let Some(bind) = self.bind {
            config.server.bind_addr = bind;
        }
        if self.cors_permissive {
            config.server.cors_permissive = true;
        }
        if let Some(max) = self.max_connections {
            config.database.max_connections = max;
        }
        if self.in_memory {
            config.storage = StorageBackend::Memory;
        }
        config.apply_env(self.database_url);
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: UserctlConfig) -> Result<()> {
    args.apply(&mut config);

    let store: Arc<dyn UserStore> = match config.storage {
        StorageBackend::Postgres => {
            let pool = create_pool_with_options(
                config.database_url()?,
                config.database.max_connections,
            )
            .await
            .context("Failed to create database pool")?;
            Arc::new(PgUserStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; users are lost on shutdown");
            Arc::new(MemoryUserStore::new())
        }
    };

    let server_config = config.server_config();
    tracing::info!(
        bind = %server_config.bind_addr,
        storage = ?config.storage,
        "Starting userctl server"
    );

    let state = AppState::new(UserService::new(store));

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
