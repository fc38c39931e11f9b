// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe: answers as long as the process is serving requests.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness probe: verifies the database and upload directory are usable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, body = HealthResponse),
        (status = 503, description = "A dependency is not ready")
    )
)]
pub async fn readiness(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.db.leads().get("readiness-probe").map_err(|e| {
        tracing::error!(error = %e, "readiness: database check failed");
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "database not ready")
    })?;

    if !state.files.root().is_dir() {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "upload directory not ready",
        ));
    }

    Ok(Json(HealthResponse { status: "ready" }))
}
