// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::{to_bytes, Body},
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Settings,
    models::{
        LeadListResponse, LeadStatus, LeadStatusUpdate, LoginForm, RegisterRequest, TokenResponse,
        UserResponse,
    },
    state::AppState,
    storage::repository::leads::Lead,
};

pub mod auth;
pub mod health;
pub mod leads;
pub mod public;

/// Slack on top of `MAX_FILE_SIZE` for multipart framing and the text
/// fields that ride along with the resume.
const UPLOAD_FRAMING_SLACK: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings);
    // The resume upload must fit through the body limit; axum's 2 MB
    // default is below the configured cap.
    let body_limit = DefaultBodyLimit::max(state.settings.max_file_size as usize + UPLOAD_FRAMING_SLACK);

    let v1_routes = Router::new()
        .route("/leads", post(public::submit_lead).get(leads::list_leads))
        .route(
            "/leads/{lead_id}",
            get(leads::get_lead).patch(leads::update_lead_status),
        )
        .route("/leads/{lead_id}/resume", get(leads::download_resume))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me));

    Router::new()
        .nest("/api/v1", v1_routes)
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(attach_request_id))
        .layer(body_limit)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

/// Copy the generated request id into the JSON error envelope.
///
/// Runs inside the request-id layer, so the header is already present
/// on the request. Successful responses pass through untouched.
async fn attach_request_id(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let response = next.run(request).await;

    let Some(request_id) = request_id else {
        return response;
    };
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    if let Ok(mut json) = serde_json::from_slice::<serde_json::Value>(&bytes) {
        if let Some(error) = json.get_mut("error").and_then(|value| value.as_object_mut()) {
            error.insert(
                "request_id".to_string(),
                serde_json::Value::String(request_id),
            );
            if let Ok(rewritten) = serde_json::to_vec(&json) {
                parts.headers.remove(header::CONTENT_LENGTH);
                return Response::from_parts(parts, Body::from(rewritten));
            }
        }
    }
    Response::from_parts(parts, Body::from(bytes))
}

/// Allow only the configured origins; any origin that fails to parse is
/// dropped rather than failing startup.
fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_origin_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        public::submit_lead,
        leads::list_leads,
        leads::get_lead,
        leads::update_lead_status,
        leads::download_resume,
        auth::register,
        auth::login,
        auth::me,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Lead,
            LeadStatus,
            LeadStatusUpdate,
            LeadListResponse,
            RegisterRequest,
            LoginForm,
            TokenResponse,
            UserResponse,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Public", description = "Public lead submission"),
        (name = "Leads", description = "Attorney lead dashboard"),
        (name = "Auth", description = "Attorney accounts and tokens"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let dir = TempDir::new().unwrap();
        let app = router(AppState::for_tests(dir.path()));
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let dir = TempDir::new().unwrap();
        let app = router(AppState::for_tests(dir.path()));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_challenge_without_token() {
        let dir = TempDir::new().unwrap();
        let app = router(AppState::for_tests(dir.path()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/leads")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn error_envelope_carries_request_id() {
        let dir = TempDir::new().unwrap();
        let app = router(AppState::for_tests(dir.path()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/leads")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let header_id = response
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["request_id"], header_id.as_str());
    }

    #[tokio::test]
    async fn openapi_document_includes_all_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;
        for expected in [
            "/api/v1/leads",
            "/api/v1/leads/{lead_id}",
            "/api/v1/leads/{lead_id}/resume",
            "/api/v1/auth/register",
            "/api/v1/auth/login",
            "/api/v1/auth/me",
            "/health",
            "/health/ready",
        ] {
            assert!(paths.contains_key(expected), "missing {expected}");
        }
    }
}
