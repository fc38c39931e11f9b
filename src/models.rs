// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request/response structures for the REST API plus the lead status
//! state machine. All types derive `Serialize`/`Deserialize` and
//! `ToSchema` for automatic JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Lead status**: the two-state outreach machine
//! - **Auth**: registration, login, and token payloads
//! - **Leads**: list queries and status-update payloads

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::repository::users::User;

// =============================================================================
// Lead Status State Machine
// =============================================================================

/// Outreach status of a lead.
///
/// `Pending` is assigned at creation. The machine permits both
/// `PENDING -> REACHED_OUT` and the reverse edge; self-transitions are
/// rejected as already-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    Pending,
    ReachedOut,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "PENDING",
            LeadStatus::ReachedOut => "REACHED_OUT",
        }
    }

    /// Whether `from -> to` is an accepted transition.
    ///
    /// With two states every non-self pair is allowed; the check is kept
    /// as an explicit table so new states fail closed.
    pub fn can_transition(from: LeadStatus, to: LeadStatus) -> bool {
        matches!(
            (from, to),
            (LeadStatus::Pending, LeadStatus::ReachedOut)
                | (LeadStatus::ReachedOut, LeadStatus::Pending)
        )
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(LeadStatus::Pending),
            "REACHED_OUT" => Ok(LeadStatus::ReachedOut),
            other => Err(format!("unknown lead status '{other}'")),
        }
    }
}

// =============================================================================
// Lead API Models
// =============================================================================

/// Query parameters for the lead listing endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LeadListQuery {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (1-100).
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Optional status filter.
    #[serde(default)]
    pub status: Option<LeadStatus>,
    /// Sort field: `created_at` or `updated_at`.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Sort order: `asc` or `desc`.
    #[serde(default)]
    pub sort_order: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

/// Field a lead listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(format!(
                "Invalid sort field '{other}'. Must be one of: created_at, updated_at"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid sort order '{other}'. Must be 'asc' or 'desc'")),
        }
    }
}

/// Body for `PATCH /leads/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LeadStatusUpdate {
    pub status: LeadStatus,
}

/// Paginated lead listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadListResponse {
    pub items: Vec<crate::storage::repository::leads::Lead>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

// =============================================================================
// Auth API Models
// =============================================================================

/// Body for `POST /auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Form body for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Bearer token issued on successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// User representation returned by the API. Never includes the hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}
