use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::{auth::token::TokenKeys, error::ApiError};

/// Extracts and validates the bearer token, yielding the caller's identity.
///
/// Rejection short-circuits the request; the handler never runs without a
/// verified token.
#[derive(Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::TokenMissing)?;

        // The SPA sends the raw token; tolerate a "Bearer " prefix too.
        let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            e
        })?;

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/tasks");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_token_missing() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TokenMissing));
    }

    #[tokio::test]
    async fn garbage_token_is_token_invalid() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("garbage"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let state = AppState::fake();
        let keys = TokenKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "alice").expect("sign");
        let mut parts = parts_with_auth(Some(&token));
        let user = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(user.id, user_id);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn bearer_prefix_is_accepted() {
        let state = AppState::fake();
        let keys = TokenKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "alice").expect("sign");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let user = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(user.id, user_id);
    }
}
