//! In-process user store
//!
//! Single writer: every operation takes the same mutex, so no caller can
//! observe a half-applied insert or delete.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{StoreError, UserStore};
use crate::models::user::email_key;
use crate::models::{NewUser, User, UserId};

#[derive(Default)]
struct Inner {
    /// Last id handed out; ids are never reused
    last_id: i64,
    users: BTreeMap<i64, User>,
    /// `email_key` -> id
    emails: HashMap<String, i64>,
}

/// Memory-backed store for tests and throwaway deployments
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().cloned().collect())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;

        let key = user.email.key();
        if inner.emails.contains_key(&key) {
            return Err(StoreError::Conflict {
                email: user.email.as_str().to_owned(),
            });
        }

        inner.last_id += 1;
        let record = User {
            id: inner.last_id,
            name: user.name.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            created_at: Utc::now(),
        };
        inner.emails.insert(key, record.id);
        inner.users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        let removed = inner
            .users
            .remove(&id.get())
            .ok_or(StoreError::NotFound { id: id.get() })?;
        inner.emails.remove(&email_key(&removed.email));

        Ok(())
    }
}
