use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login. The identifier may be a username or an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "usernameOrEmail")]
    pub username_or_email: String,
    pub password: String,
}

/// Response returned after signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub token: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
}

/// Response for the token self-check endpoint.
#[derive(Debug, Serialize)]
pub struct VerifyAuthResponse {
    pub message: String,
    pub user: PublicUser,
}
