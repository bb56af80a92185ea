use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractor::AuthUser,
    error::{ApiError, AppJson},
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, DeleteResponse, TaskPatch},
        repo::Task,
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", put(update_task).delete(delete_task))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = Task::list_by_owner(&state.db, auth.id).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let description = payload.description.trim();
    if description.is_empty() {
        return Err(ApiError::Validation("description is required".into()));
    }

    let task = Task::create(&state.db, auth.id, description, payload.due_date).await?;
    info!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, auth, patch), fields(user_id = %auth.id, task_id = %task_id))]
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
    AppJson(patch): AppJson<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let existing = Task::find_by_owner(&state.db, auth.id, task_id)
        .await?
        .ok_or(ApiError::NotFound("task"))?;

    let description = match &patch.description {
        Some(d) => {
            let d = d.trim();
            if d.is_empty() {
                return Err(ApiError::Validation("description must be non-empty".into()));
            }
            d.to_string()
        }
        None => existing.description,
    };
    let completed = patch.completed.unwrap_or(existing.completed);
    let due_date = match patch.due_date {
        Some(value) => value,
        None => existing.due_date,
    };

    // A concurrent delete between lookup and update also lands here as 404
    let task = Task::update(&state.db, auth.id, task_id, &description, completed, due_date)
        .await?
        .ok_or(ApiError::NotFound("task"))?;

    info!(task_id = %task.id, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id, task_id = %task_id))]
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = Task::delete(&state.db, auth.id, task_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("task"));
    }

    info!(task_id = %task_id, "task deleted");
    Ok(Json(DeleteResponse {
        message: "task deleted successfully".into(),
    }))
}
