//! Schema for the `user` table
//!
//! Every statement is idempotent so `userctl migrate` can be re-run.
//! `user` is a reserved word in PostgreSQL and must stay quoted.

use sqlx::PgPool;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "create user table",
        r#"
        CREATE TABLE IF NOT EXISTS "user" (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL CHECK (btrim(name) <> ''),
            email TEXT NOT NULL CHECK (btrim(email) <> ''),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        // ASCII-only folding, same key as models::user::email_key
        "create case-insensitive email index",
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS user_email_ci_key
        ON "user" (lower(btrim(email, E' \t\n\f\r') COLLATE "C"))
        "#,
    ),
];

/// Create the schema if it does not exist yet.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running user migrations...");

    let mut tx = pool.begin().await?;
    for &(label, sql) in STATEMENTS {
        tracing::debug!(step = label, "Applying migration step");
        sqlx::query(sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!("User migrations complete");
    Ok(())
}
