use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// Task record in the database. `user_id` is immutable after insert; every
/// query below filters by it, so one owner can never see another's rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub completed: bool,
    pub due_date: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Task {
    pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> Result<Vec<Task>, ApiError> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, description, completed, due_date, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        description: &str,
        due_date: Option<OffsetDateTime>,
    ) -> Result<Task, ApiError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, description, due_date)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, description, completed, due_date, created_at
            "#,
        )
        .bind(owner_id)
        .bind(description)
        .bind(due_date)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// Ownership-scoped lookup: wrong id and wrong owner both come back as
    /// `None`, so the caller cannot tell them apart.
    pub async fn find_by_owner(
        db: &PgPool,
        owner_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Task>, ApiError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, description, completed, due_date, created_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn update(
        db: &PgPool,
        owner_id: Uuid,
        task_id: Uuid,
        description: &str,
        completed: bool,
        due_date: Option<OffsetDateTime>,
    ) -> Result<Option<Task>, ApiError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET description = $1, completed = $2, due_date = $3
            WHERE id = $4 AND user_id = $5
            RETURNING id, user_id, description, completed, due_date, created_at
            "#,
        )
        .bind(description)
        .bind(completed)
        .bind(due_date)
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Returns whether a row was deleted under this owner's scope.
    pub async fn delete(db: &PgPool, owner_id: Uuid, task_id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_all_public_fields() {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            description: "buy milk".into(),
            completed: false,
            due_date: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&task).expect("serialize");
        assert_eq!(json["description"], "buy milk");
        assert_eq!(json["completed"], false);
        assert!(json["due_date"].is_null());
    }
}
