use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // user ID
    pub username: String, // display identity, echoed by /me-style endpoints
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    pub jti: Uuid,        // per-issuance nonce; two logins never share a token
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct TokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl_minutes } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl TokenKeys {
    pub fn sign(&self, user_id: Uuid, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Pure signature + expiry check; no side effects, no store access.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::TokenInvalid,
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRef;

    fn make_keys() -> TokenKeys {
        let state = AppState::fake();
        TokenKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn two_tokens_for_same_login_differ() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let a = keys.sign(user_id, "alice").expect("sign");
        let b = keys.sign(user_id, "alice").expect("sign");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn expired_token_fails_with_token_expired() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".into(),
            iat: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(1)).unix_timestamp() as usize,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));
    }

    #[tokio::test]
    async fn tampered_token_fails_with_token_invalid() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4(), "alice").expect("sign");
        // Flip one character in the signature segment
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("utf8");
        let err = keys.verify(&tampered).unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));
    }

    #[tokio::test]
    async fn wrong_secret_fails_with_token_invalid() {
        let keys = make_keys();
        let other = TokenKeys {
            encoding: EncodingKey::from_secret(b"another-secret"),
            decoding: DecodingKey::from_secret(b"another-secret"),
            ttl: Duration::from_secs(300),
        };
        let token = keys.sign(Uuid::new_v4(), "alice").expect("sign");
        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));
    }

    #[tokio::test]
    async fn garbage_token_fails_with_token_invalid() {
        let keys = make_keys();
        let err = keys.verify("not-a-jwt").unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));
    }
}
