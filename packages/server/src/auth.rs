//! Bearer-token authentication for mutating endpoints.
//!
//! Tokens are self-contained: a base64url JSON payload plus a keyed
//! SHA-256 signature over it. No session storage is needed; the server
//! only holds the shared secret.

use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::{FromRequest, HttpRequest, web};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::future::{Ready, ready};

use crate::AppState;

/// Environment variable holding the token signing secret.
pub const API_SECRET_ENV: &str = "FISHCENSUS_API_SECRET";

/// Errors that can occur while verifying a token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token is structurally malformed.
    #[error("Malformed token")]
    Malformed,
    /// The signature does not match the payload.
    #[error("Invalid token signature")]
    BadSignature,
    /// The token has expired.
    #[error("Token expired")]
    Expired,
}

/// Claims carried inside a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject the token was issued to.
    pub sub: String,
    /// Expiry as a Unix timestamp (seconds).
    pub exp: i64,
}

fn sign(secret: &str, payload_b64: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(payload_b64.as_bytes());
    hex::encode(hasher.finalize())
}

/// Issues a signed token for `sub` valid for `ttl_seconds`.
#[must_use]
pub fn issue_token(secret: &str, sub: &str, ttl_seconds: i64) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: chrono::Utc::now().timestamp() + ttl_seconds,
    };
    let payload = serde_json::to_vec(&claims).unwrap_or_default();
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let signature = sign(secret, &payload_b64);
    format!("{payload_b64}.{signature}")
}

/// Verifies a token against `secret` and returns its claims.
///
/// # Errors
///
/// Returns [`AuthError`] if the token is malformed, the signature does
/// not match, or the expiry has passed.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let (payload_b64, signature) = token.split_once('.').ok_or(AuthError::Malformed)?;
    if sign(secret, payload_b64) != signature {
        return Err(AuthError::BadSignature);
    }
    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AuthError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;
    if claims.exp < chrono::Utc::now().timestamp() {
        return Err(AuthError::Expired);
    }
    Ok(claims)
}

/// Extractor that rejects requests without a valid `Authorization:
/// Bearer` token. Handlers that mutate data take this as a parameter.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl FromRequest for AuthClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(ErrorUnauthorized("Server misconfigured")));
        };
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let Some(token) = token else {
            return ready(Err(ErrorUnauthorized("Missing bearer token")));
        };
        match verify_token(&state.api_secret, token) {
            Ok(claims) => ready(Ok(Self(claims))),
            Err(e) => {
                log::debug!("Rejected token: {e}");
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let token = issue_token("secret", "admin", 3600);
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", "admin", 3600);
        assert!(matches!(
            verify_token("other", &token),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("secret", "admin", -1);
        assert!(matches!(
            verify_token("secret", &token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue_token("secret", "admin", 3600);
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Claims {
                sub: "root".to_string(),
                exp: i64::MAX,
            })
            .unwrap());
        let forged = format!("{forged_payload}.{signature}");
        assert!(matches!(
            verify_token("secret", &forged),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            verify_token("secret", "not-a-token"),
            Err(AuthError::Malformed)
        ));
    }
}
