// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication error taxonomy.
//!
//! Every credential problem renders as the same shape of 401 so callers
//! cannot distinguish unknown subjects from bad tokens; the inactive
//! account case is deliberately distinct (400) because the credentials
//! themselves were valid.

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingAuthHeader,

    #[error("Invalid authorization header")]
    InvalidAuthHeader,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Could not validate credentials")]
    UnknownSubject,

    #[error("Inactive user")]
    InactiveAccount,

    #[error("password hashing failed")]
    Hash,

    #[error("internal authentication error")]
    Internal,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::UnknownSubject => ApiError::unauthorized(err.to_string()),
            AuthError::InactiveAccount => ApiError::bad_request(err.to_string()),
            AuthError::Hash | AuthError::Internal => {
                tracing::error!(error = %err, "authentication internals failed");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
