//! User repository
//!
//! - insert: single INSERT ... RETURNING, conflicts come from the
//!   `user_email_ci_key` unique index
//! - delete: single DELETE, zero rows affected means not found

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{NewUser, User, UserId, ValidationError};
use crate::store::{StoreError, UserStore};

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at
            FROM "user"
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "user" (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &user))
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: id.get() });
        }

        Ok(())
    }
}

fn map_insert_error(err: sqlx::Error, user: &NewUser) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict {
                email: user.email.as_str().to_owned(),
            };
        }
        if db_err.is_check_violation() {
            return StoreError::Validation(ValidationError::InvalidFormat {
                field: "user",
                reason: "rejected by table constraint",
            });
        }
    }
    StoreError::Backend(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserCandidate;

    // Integration tests - run with DATABASE_URL set
    // cargo test -p userctl-server -- --ignored
    //
    // Each test works inside its own email namespace so they can share a table.

    async fn store() -> PgUserStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        crate::db::migrations::run(&pool).await.expect("migrations failed");
        PgUserStore::new(pool)
    }

    fn unique_email(tag: &str) -> String {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        format!("{tag}-{nanos}@example.test")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_then_delete() {
        let store = store().await;
        let email = unique_email("insert");
        let created = store
            .insert(UserCandidate::new("Ann", &email).validate().unwrap())
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.email, email);
        assert!(store.list_all().await.unwrap().iter().any(|u| u.id == created.id));

        store.delete_by_id(UserId::new(created.id).unwrap()).await.unwrap();
        assert!(!store.list_all().await.unwrap().iter().any(|u| u.id == created.id));

        let err = store
            .delete_by_id(UserId::new(created.id).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_stores_values_verbatim() {
        let store = store().await;
        let email = format!("{} ", unique_email("verbatim"));
        let created = store
            .insert(UserCandidate::new(" Ann ", &email).validate().unwrap())
            .await
            .unwrap();

        assert_eq!(created.name, " Ann ");
        assert_eq!(created.email, email);

        store.delete_by_id(UserId::new(created.id).unwrap()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_email_is_conflict() {
        let store = store().await;
        let email = unique_email("dup");
        let first = store
            .insert(UserCandidate::new("Ann", &email).validate().unwrap())
            .await
            .unwrap();

        let err = store
            .insert(
                UserCandidate::new("Ann", email.to_uppercase())
                    .validate()
                    .unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let err = store
            .insert(
                UserCandidate::new("Ann", format!(" {email}\t"))
                    .validate()
                    .unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let matching = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.email.eq_ignore_ascii_case(&email))
            .count();
        assert_eq!(matching, 1);

        store.delete_by_id(UserId::new(first.id).unwrap()).await.unwrap();
    }
}
