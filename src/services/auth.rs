// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account workflow: registration, login, and activation toggling.

use crate::auth::{password, token, AuthError};
use crate::config::Settings;
use crate::error::ApiError;
use crate::models::TokenResponse;
use crate::storage::repository::users::User;
use crate::storage::Database;

pub struct AuthService<'a> {
    db: &'a Database,
    settings: &'a Settings,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Database, settings: &'a Settings) -> Self {
        Self { db, settings }
    }

    /// Register a new attorney account. Inputs are already validated
    /// and normalized by the API layer.
    pub fn register(&self, username: String, email: String, password: String) -> Result<User, ApiError> {
        let hashed = password::hash_password(&password).map_err(ApiError::from)?;
        let user = User::new(username, email, hashed);
        self.db.users().insert(&user)?;
        tracing::info!(username = %user.username, "user registered");
        Ok(user)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Unknown username and wrong password produce the same message so
    /// the response does not leak which part was wrong.
    pub fn login(&self, username: &str, password_input: &str) -> Result<TokenResponse, ApiError> {
        let invalid = || ApiError::unauthorized("Incorrect username or password");

        let Some(user) = self.db.users().get_by_username(username)? else {
            return Err(invalid());
        };
        if !password::verify_password(password_input, &user.hashed_password)? {
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AuthError::InactiveAccount.into());
        }

        let bearer = token::issue(
            &user.username,
            &self.settings.secret_key,
            self.settings.access_token_expire_minutes,
        )?;
        Ok(TokenResponse::bearer(bearer))
    }

    pub fn activate_user(&self, id: &str) -> Result<User, ApiError> {
        Ok(self.db.users().set_active(id, true)?)
    }

    pub fn deactivate_user(&self, id: &str) -> Result<User, ApiError> {
        Ok(self.db.users().set_active(id, false)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        db: Database,
        settings: Settings,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let settings = Settings::for_tests(&dir.path().join("uploads"), &dir.path().join("t.redb"));
        let db = Database::open(std::path::Path::new(&settings.database_path)).unwrap();
        Fixture {
            _dir: dir,
            db,
            settings,
        }
    }

    impl Fixture {
        fn service(&self) -> AuthService<'_> {
            AuthService::new(&self.db, &self.settings)
        }
    }

    #[test]
    fn register_then_login_issues_verifiable_token() {
        let fx = fixture();
        let service = fx.service();
        let user = service
            .register(
                "jdoe".to_string(),
                "jdoe@example.com".to_string(),
                "Passw0rd!".to_string(),
            )
            .unwrap();
        assert!(user.is_active);
        assert_ne!(user.hashed_password, "Passw0rd!");

        let token_response = service.login("jdoe", "Passw0rd!").unwrap();
        assert_eq!(token_response.token_type, "bearer");

        let claims =
            token::verify(&token_response.access_token, &fx.settings.secret_key).unwrap();
        assert_eq!(claims.sub, "jdoe");
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        let fx = fixture();
        let service = fx.service();
        service
            .register(
                "jdoe".to_string(),
                "jdoe@example.com".to_string(),
                "Passw0rd!".to_string(),
            )
            .unwrap();

        let unknown = service.login("nobody", "Passw0rd!").unwrap_err();
        let wrong = service.login("jdoe", "WrongPass1").unwrap_err();
        assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.message, wrong.message);

        // Failure is idempotent: same outcome on repeat.
        let again = service.login("jdoe", "WrongPass1").unwrap_err();
        assert_eq!(again.message, wrong.message);
    }

    #[test]
    fn inactive_account_cannot_login() {
        let fx = fixture();
        let service = fx.service();
        let user = service
            .register(
                "idle".to_string(),
                "idle@example.com".to_string(),
                "Passw0rd!".to_string(),
            )
            .unwrap();
        service.deactivate_user(&user.id).unwrap();

        let err = service.login("idle", "Passw0rd!").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Inactive user");

        service.activate_user(&user.id).unwrap();
        assert!(service.login("idle", "Passw0rd!").is_ok());
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let fx = fixture();
        let service = fx.service();
        service
            .register(
                "jdoe".to_string(),
                "jdoe@example.com".to_string(),
                "Passw0rd!".to_string(),
            )
            .unwrap();

        let err = service
            .register(
                "jdoe".to_string(),
                "other@example.com".to_string(),
                "Passw0rd!".to_string(),
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Username already registered");

        let err = service
            .register(
                "other".to_string(),
                "jdoe@example.com".to_string(),
                "Passw0rd!".to_string(),
            )
            .unwrap_err();
        assert_eq!(err.message, "Email already registered");
    }
}
