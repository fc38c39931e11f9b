// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 bearer token codec.
//!
//! Tokens carry only the username as subject plus issue/expiry stamps.
//! There is no revocation list; a token stays valid until it expires.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account username.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// Issue a token for `username` valid for `expire_minutes`.
pub fn issue(username: &str, secret: &str, expire_minutes: u64) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: username.to_string(),
        iat: now,
        exp: now + (expire_minutes as i64) * 60,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::Internal)
}

/// Verify signature and expiry, returning the claims.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-signing-key-0123456789abcdef";

    #[test]
    fn issue_and_verify_roundtrip() {
        let token = issue("jdoe", SECRET, 60).unwrap();
        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "jdoe");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue("jdoe", SECRET, 60).unwrap();
        let err = verify(&token, "a-different-secret-of-sufficient-len").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Issued far enough in the past to be outside the leeway window.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "jdoe".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verify(&token, SECRET).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            verify("not-a-token", SECRET),
            Err(AuthError::InvalidToken)
        ));
    }
}
