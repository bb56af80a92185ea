use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can surface to a client.
///
/// Store and internal variants are logged server-side and collapse to an
/// opaque 500; nothing from the storage engine reaches the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing authorization header")]
    TokenMissing,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token")]
    TokenInvalid,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("stored credential is malformed")]
    CorruptCredential,

    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateUser => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::TokenMissing
            | ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::TokenInvalid => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CorruptCredential | ApiError::Store(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::CorruptCredential => {
                tracing::error!(error = %self, "corrupt stored credential");
                "internal server error".to_string()
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `Json` with the rejection folded into the error taxonomy: a missing or
/// malformed body is a 400 with the usual `{"error": ...}` shape instead of
/// axum's plain-text 422.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}
