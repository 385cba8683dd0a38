//! User service - validation and outcome normalization
//!
//! Holds no state between calls. Validation always happens before the
//! store is touched, and store failures keep their kind on the way out.

use std::sync::Arc;

use crate::models::{User, UserCandidate, UserId, ValidationError};
use crate::store::{StoreError, UserStore};

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("a user with email '{email}' already exists")]
    Conflict { email: String },

    #[error("user {id} does not exist")]
    NotFound { id: i64 },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { email } => Self::Conflict { email },
            StoreError::NotFound { id } => Self::NotFound { id },
            StoreError::Validation(v) => Self::Validation(v),
            other => Self::Store(other),
        }
    }
}

/// Logic boundary between the HTTP layer and the store
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// All users, `id` ascending. An empty store is an empty list.
    pub async fn list_all(&self) -> Result<Vec<User>, ServiceError> {
        let users = self.store.list_all().await?;
        tracing::debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    pub async fn create(&self, candidate: UserCandidate) -> Result<User, ServiceError> {
        let new_user = candidate.validate()?;

        match self.store.insert(new_user).await {
            Ok(user) => {
                tracing::debug!(id = user.id, "Created user");
                Ok(user)
            }
            Err(e) => {
                let err = ServiceError::from(e);
                if let ServiceError::Conflict { email } = &err {
                    tracing::warn!(%email, "Rejected duplicate email");
                }
                Err(err)
            }
        }
    }

    pub async fn remove(&self, id: i64) -> Result<(), ServiceError> {
        let id = UserId::new(id)?;

        self.store.delete_by_id(id).await.map_err(|e| {
            let err = ServiceError::from(e);
            if matches!(err, ServiceError::NotFound { .. }) {
                tracing::warn!(id = id.get(), "Delete of unknown user");
            }
            err
        })?;

        tracing::debug!(id = id.get(), "Deleted user");
        Ok(())
    }
}
