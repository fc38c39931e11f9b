// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Protected lead dashboard endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::{LeadListQuery, LeadListResponse, LeadStatusUpdate},
    services::LeadService,
    state::AppState,
    storage::repository::leads::Lead,
};

/// Path ids are parsed by hand so a malformed UUID reads as a
/// validation failure rather than a missing route.
fn parse_lead_id(raw: &str) -> Result<String, ApiError> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| ApiError::unprocessable("Invalid lead id"))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "Leads",
    params(LeadListQuery),
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = LeadListResponse),
        (status = 400, description = "Invalid sort field or order"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_leads(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<LeadListResponse>, ApiError> {
    let service = LeadService::new(&state.db, &state.files, &state.notifier);
    let (items, total) = service.list_leads(&query)?;
    Ok(Json(LeadListResponse {
        items,
        total,
        page: query.page,
        page_size: query.page_size,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{lead_id}",
    tag = "Leads",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = Lead),
        (status = 404, description = "Unknown lead"),
        (status = 422, description = "Malformed lead id")
    )
)]
pub async fn get_lead(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Json<Lead>, ApiError> {
    let id = parse_lead_id(&lead_id)?;
    let service = LeadService::new(&state.db, &state.files, &state.notifier);
    Ok(Json(service.get_lead(&id)?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/leads/{lead_id}",
    tag = "Leads",
    request_body = LeadStatusUpdate,
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = Lead),
        (status = 400, description = "Invalid status transition"),
        (status = 404, description = "Unknown lead")
    )
)]
pub async fn update_lead_status(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    Json(update): Json<LeadStatusUpdate>,
) -> Result<Json<Lead>, ApiError> {
    let id = parse_lead_id(&lead_id)?;
    let service = LeadService::new(&state.db, &state.files, &state.notifier);
    Ok(Json(service.update_status(&id, update.status)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{lead_id}/resume",
    tag = "Leads",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Resume file as an attachment"),
        (status = 404, description = "Unknown lead or missing file")
    )
)]
pub async fn download_resume(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_lead_id(&lead_id)?;
    let service = LeadService::new(&state.db, &state.files, &state.notifier);
    let download = service.resume_download(&id)?;

    let bytes = std::fs::read(&download.path).map_err(|e| {
        tracing::error!(error = %e, lead_id = %id, "resume read failed");
        ApiError::internal("Internal server error")
    })?;

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.media_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.filename),
            ),
        ],
        bytes,
    )
        .into_response();
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password;
    use crate::models::LeadStatus;
    use crate::storage::repository::users::User;
    use crate::storage::ResumeUpload;
    use tempfile::TempDir;

    fn attorney() -> User {
        User::new(
            "attorney".to_string(),
            "attorney@example.com".to_string(),
            password::hash_password("Passw0rd!").unwrap(),
        )
    }

    /// Seed a lead directly through storage so no email is involved.
    fn seed_lead(state: &AppState, email: &str) -> Lead {
        let reference = state
            .files
            .save(&ResumeUpload {
                filename: "resume.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                declared_size: None,
                data: b"%PDF-1.4 seeded".to_vec(),
            })
            .unwrap();
        let lead = Lead::new(
            "Jane".to_string(),
            "Roe".to_string(),
            email.to_string(),
            reference,
        );
        state.db.leads().insert(&lead).unwrap();
        lead
    }

    fn default_query() -> LeadListQuery {
        LeadListQuery {
            page: 1,
            page_size: 10,
            status: None,
            sort_by: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn list_returns_seeded_leads() {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path());
        seed_lead(&state, "a@example.com");
        seed_lead(&state, "b@example.com");

        let Json(page) = list_leads(
            CurrentUser(attorney()),
            State(state.clone()),
            Query(default_query()),
        )
        .await
        .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 1);
    }

    #[tokio::test]
    async fn get_round_trips_a_lead() {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path());
        let lead = seed_lead(&state, "get@example.com");

        let Json(fetched) = get_lead(
            CurrentUser(attorney()),
            State(state.clone()),
            Path(lead.id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(fetched.id, lead.id);
        assert_eq!(fetched.email, "get@example.com");
    }

    #[tokio::test]
    async fn malformed_id_is_unprocessable() {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path());

        let err = get_lead(
            CurrentUser(attorney()),
            State(state.clone()),
            Path("not-a-uuid".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path());

        let err = get_lead(
            CurrentUser(attorney()),
            State(state.clone()),
            Path(Uuid::new_v4().to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_transitions_status() {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path());
        let lead = seed_lead(&state, "patch@example.com");

        let Json(updated) = update_lead_status(
            CurrentUser(attorney()),
            State(state.clone()),
            Path(lead.id.clone()),
            Json(LeadStatusUpdate {
                status: LeadStatus::ReachedOut,
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.status, LeadStatus::ReachedOut);
        assert!(updated.reached_out_at.is_some());

        // Repeating the same status is a 400.
        let err = update_lead_status(
            CurrentUser(attorney()),
            State(state.clone()),
            Path(lead.id),
            Json(LeadStatusUpdate {
                status: LeadStatus::ReachedOut,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn resume_download_sets_attachment_headers() {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path());
        let lead = seed_lead(&state, "dl@example.com");

        let response = download_resume(
            CurrentUser(attorney()),
            State(state.clone()),
            Path(lead.id),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"Jane_Roe_resume.pdf\""
        );
    }

    #[tokio::test]
    async fn resume_download_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path());
        let lead = seed_lead(&state, "gone@example.com");
        state.files.delete(&lead.resume_path).unwrap();

        let err = download_resume(
            CurrentUser(attorney()),
            State(state.clone()),
            Path(lead.id),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
