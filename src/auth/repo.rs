use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

/// User record in the database. Never mutated or deleted once created.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl User {
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with a hashed password. A unique-constraint
    /// violation on the username surfaces as `UsernameTaken`; everything
    /// else propagates as-is.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        password_hash: &str,
        created_at: &str,
    ) -> Result<User, CreateUserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(d) if d.is_unique_violation() => CreateUserError::UsernameTaken,
            _ => CreateUserError::Db(e),
        })?;
        Ok(user)
    }
}
