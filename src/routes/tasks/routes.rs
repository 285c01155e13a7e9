use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use super::dto;
use crate::error::{ApiError, FieldError};
use crate::routes::middleware_auth::AuthUser;
use crate::state::AppState;

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        ApiError::Validation(vec![FieldError::new("body", &rejection.body_text())])
    })
}

// Ids that don't parse can't match any stored task.
fn task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = state.tasks.list(&owner).await?;
    Ok(Json(tasks))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let new_task = dto::parse_create(&json_body(body)?).map_err(ApiError::Validation)?;
    let task = state.tasks.create(&owner, new_task).await?;

    tracing::debug!("created task {} for {}", task.id, owner);
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = dto::parse_update(&json_body(body)?).map_err(ApiError::Validation)?;
    let task = state.tasks.update(&owner, task_id(&id)?, patch).await?;
    Ok(Json(task))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.tasks.delete(&owner, task_id(&id)?).await?;

    tracing::debug!("deleted task {} for {}", id, owner);
    Ok(StatusCode::NO_CONTENT)
}
