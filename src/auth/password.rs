// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use super::AuthError;

/// Hash a plaintext password into an Argon2id PHC-format string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hash)
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or an error if
/// the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash).map_err(|_| AuthError::Internal)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(AuthError::Internal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("Hunter2pass").unwrap();
        assert!(verify_password("Hunter2pass", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("Hunter2pass").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("Hunter2pass").unwrap();
        let b = hash_password("Hunter2pass").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }
}
