// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    Form, Json,
};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::{LoginForm, RegisterRequest, TokenResponse, UserResponse},
    services::AuthService,
    state::AppState,
    validate,
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Username or email already registered"),
        (status = 422, description = "Invalid username, email, or password")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let username = validate::validate_username(&request.username).map_err(ApiError::unprocessable)?;
    let email = validate::validate_email(&request.email).map_err(ApiError::unprocessable)?;
    validate::validate_password_strength(&request.password).map_err(ApiError::unprocessable)?;

    let service = AuthService::new(&state.db, &state.settings);
    let user = service.register(username, email, request.password)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 400, description = "Inactive user"),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let service = AuthService::new(&state.db, &state.settings);
    let token = service.login(&form.username, &form.password)?;
    Ok(Json(token))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}
