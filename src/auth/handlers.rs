use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, SignupRequest, SignupResponse, VerifyAuthResponse},
        extractor::AuthUser,
        password::{hash_password, verify_password},
        repo::User,
        token::TokenKeys,
    },
    error::{ApiError, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/verify-auth", get(verify_auth))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.is_empty() {
        return Err(ApiError::Validation("username is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("password too short".into()));
    }

    // Pre-check; the unique constraint still backstops the signup race
    if User::exists(&state.db, &payload.username, &payload.email).await? {
        warn!(username = %payload.username, "username or email already registered");
        return Err(ApiError::DuplicateUser);
    }

    // Argon2 is deliberately expensive; keep it off the async workers
    let password = payload.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.into()))??;

    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.username)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Json(SignupResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.username_or_email = payload.username_or_email.trim().to_string();

    if payload.username_or_email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".into(),
        ));
    }

    // Unknown identifier and wrong password must be indistinguishable to the
    // caller; only the server-side log tells them apart.
    let user = match User::find_by_username_or_email(&state.db, &payload.username_or_email).await? {
        Some(u) => u,
        None => {
            warn!(identifier = %payload.username_or_email, "login unknown identifier");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let password = payload.password;
    let stored_hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(e.into()))??;

    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.username)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

#[instrument(skip(state, auth))]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}

/// Cheap token check for the client; echoes the verified identity without
/// touching the store.
#[instrument(skip(auth))]
pub async fn verify_auth(auth: AuthUser) -> Json<VerifyAuthResponse> {
    Json(VerifyAuthResponse {
        message: "authentication successful".into(),
        user: PublicUser {
            id: auth.id,
            username: auth.username,
        },
    })
}
