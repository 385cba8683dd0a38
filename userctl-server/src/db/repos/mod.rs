//! Repository implementations for database access
//!
//! Conflicts are detected from constraint violations (no check-then-insert).

pub mod users;

pub use users::PgUserStore;
