use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by username or email; the login identifier may be either.
    /// Emails are stored lowercased at signup, so the email arm folds the
    /// identifier's case while usernames stay exact.
    pub async fn find_by_username_or_email(
        db: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1 OR email = lower($1)
            "#,
        )
        .bind(identifier)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// True if either the username or the email is already taken.
    pub async fn exists(db: &PgPool, username: &str, email: &str) -> Result<bool, ApiError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM users
            WHERE username = $1 OR email = $2
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(row.is_some())
    }

    /// Create a new user with hashed password. A unique violation (signup
    /// race past the pre-check) maps to `DuplicateUser`.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::DuplicateUser
            }
            _ => ApiError::Store(e),
        })?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
