use axum::extract::{rejection::JsonRejection, Json, State};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    // an unreadable body is treated like missing credentials
    let Json(payload) = payload.map_err(|_| ApiError::AuthenticationFailure)?;

    let (username, password) = match (payload.username, payload.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => return Err(ApiError::AuthenticationFailure),
    };

    if !state.credentials.authenticate(&username, &password).await? {
        tracing::warn!("failed login attempt: {}", username);
        return Err(ApiError::AuthenticationFailure);
    }

    let token = state
        .tokens
        .issue(&username)
        .map_err(|e| ApiError::Internal(e.into()))?;

    tracing::info!("login successful: {}", username);
    Ok(Json(LoginResponse { token }))
}
