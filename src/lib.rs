// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Leadflow - Lead Intake & Attorney Dashboard Service
//!
//! Prospects submit contact details and a resume through a public
//! endpoint; authenticated attorneys list, review, and transition the
//! status of submitted leads. Notifications go out over SMTP.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, bearer tokens, current-user extractor
//! - `email` - Template rendering and SMTP delivery with retries
//! - `services` - Workflow logic between handlers and storage
//! - `storage` - Embedded redb database and the resume file store

pub mod api;
pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod validate;
