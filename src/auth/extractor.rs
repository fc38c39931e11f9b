// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated attorney account.
//!
//! Use the `CurrentUser` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
//!     // user is a storage-layer User, verified active
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{token, AuthError};
use crate::state::AppState;
use crate::storage::repository::users::User;

/// Extractor that resolves the bearer token to an active account.
///
/// Resolution order: header shape, token signature and expiry, subject
/// lookup, active flag. Every failure before the active check renders
/// as 401 with a `WWW-Authenticate: Bearer` challenge.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let bearer = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = token::verify(bearer, &state.settings.secret_key)?;

        let user = state
            .db
            .users()
            .get_by_username(&claims.sub)
            .map_err(|e| {
                tracing::error!(error = %e, "user lookup failed during authentication");
                AuthError::Internal
            })?
            .ok_or(AuthError::UnknownSubject)?;

        if !user.is_active {
            return Err(AuthError::InactiveAccount);
        }

        Ok(CurrentUser(user))
    }
}
