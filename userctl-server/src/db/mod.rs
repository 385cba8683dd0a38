//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool, one connection per operation
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Schema changes only through `migrations::run`, never on server start

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::PgUserStore;
