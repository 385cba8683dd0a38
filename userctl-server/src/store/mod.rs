//! Persistence boundary for user records
//!
//! Implementations must make the email uniqueness check and the insert a
//! single atomic unit. `PgUserStore` relies on the unique index,
//! `MemoryUserStore` holds one lock across both.

pub mod memory;

use async_trait::async_trait;

use crate::models::{NewUser, User, UserId, ValidationError};

pub use crate::db::repos::PgUserStore;
pub use memory::MemoryUserStore;

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email '{email}' is already registered")]
    Conflict { email: String },

    #[error("user {id} not found")]
    NotFound { id: i64 },

    #[error("rejected by store: {0}")]
    Validation(ValidationError),

    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Durable keyed collection of users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, `id` ascending.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;

    /// Persist a new user with a fresh id and the current timestamp.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Permanently remove a user. Missing ids are an error, not a no-op.
    async fn delete_by_id(&self, id: UserId) -> Result<(), StoreError>;
}
