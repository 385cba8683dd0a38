//! Explicit schema migration

use anyhow::{Context, Result};
use clap::Parser;
use userctl_server::db::{create_pool, migrations};
use userctl_server::UserctlConfig;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create the `user` table and indexes if they are missing
pub async fn run_migrate(args: MigrateArgs, mut config: UserctlConfig) -> Result<()> {
    config.apply_env(args.database_url);
    let database_url = config.database_url()?;

    let pool = create_pool(database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Migration failed")?;

    pool.close().await;
    Ok(())
}
