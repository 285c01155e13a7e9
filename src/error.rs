use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: &str, msg: &str) -> Self {
        Self {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    AuthenticationFailure,
    #[error("missing or invalid bearer token")]
    AuthorizationFailure,
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => ApiError::Validation(errors),
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::AuthenticationFailure => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response(),
            ApiError::AuthorizationFailure => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }
            ApiError::Internal(e) => {
                tracing::error!("internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::AuthenticationFailure, StatusCode::UNAUTHORIZED),
            (ApiError::AuthorizationFailure, StatusCode::UNAUTHORIZED),
            (
                ApiError::Validation(vec![FieldError::new("text", "Task text is required")]),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (
                ApiError::Internal(anyhow::anyhow!("connection reset")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_store_errors_convert() {
        let err: ApiError = StoreError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound));

        let err: ApiError = StoreError::Validation(vec![FieldError::new("text", "x")]).into();
        assert!(matches!(err, ApiError::Validation(ref v) if v.len() == 1));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::Internal(anyhow::anyhow!("password=hunter2")).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("hunter2"));
        assert!(text.contains("Internal Server Error"));
    }
}
