// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The single unauthenticated endpoint: public lead submission.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::ApiError,
    services::LeadService,
    state::AppState,
    storage::{repository::leads::Lead, ResumeUpload},
    validate,
};

/// Parsed and validated multipart submission.
struct Submission {
    first_name: String,
    last_name: String,
    email: String,
    resume: ResumeUpload,
}

#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "Public",
    responses(
        (status = 201, body = Lead),
        (status = 400, description = "Duplicate email or invalid file"),
        (status = 422, description = "Missing or invalid fields")
    )
)]
pub async fn submit_lead(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let submission = parse_submission(multipart).await?;

    let service = LeadService::new(&state.db, &state.files, &state.notifier);
    let lead = service
        .create_lead(
            submission.first_name,
            submission.last_name,
            submission.email,
            submission.resume,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

async fn parse_submission(mut multipart: Multipart) -> Result<Submission, ApiError> {
    let mut first_name = None;
    let mut last_name = None;
    let mut email = None;
    let mut resume = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::unprocessable(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "first_name" => first_name = Some(read_text(field).await?),
            "last_name" => last_name = Some(read_text(field).await?),
            "email" => email = Some(read_text(field).await?),
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::unprocessable(format!("resume upload failed: {e}")))?;
                resume = Some(ResumeUpload {
                    filename,
                    content_type,
                    declared_size: None,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    let first_name = required(first_name, "first_name")?;
    let last_name = required(last_name, "last_name")?;
    let email = required(email, "email")?;
    let resume = resume.ok_or_else(|| ApiError::unprocessable("resume is required"))?;

    Ok(Submission {
        first_name: validate::validate_name(&first_name, "first_name")
            .map_err(ApiError::unprocessable)?,
        last_name: validate::validate_name(&last_name, "last_name")
            .map_err(ApiError::unprocessable)?,
        email: validate::validate_email(&email).map_err(ApiError::unprocessable)?,
        resume,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::unprocessable(format!("malformed field: {e}")))
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::unprocessable(format!("{field} is required")))
}
