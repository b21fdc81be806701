use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::auth::error::{StoreError, UniqueField};
use crate::auth::repo_types::{NewUser, User};

/// Persistence seam for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a user. Email and username are unique; a clash is `StoreError::Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, name_full, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, name_full, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, name_full, password_hash, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.name_full)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;
        debug!(user_id = %created.id, "user row inserted");
        Ok(created)
    }
}

const UNIQUE_VIOLATION: &str = "23505";

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION) {
            let field = match db_err.constraint() {
                Some("users_username_key") => UniqueField::Username,
                _ => UniqueField::Email,
            };
            return StoreError::Conflict(field);
        }
    }
    StoreError::Database(e)
}
