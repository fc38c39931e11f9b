// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Workflow services between the HTTP handlers and the storage layer.

pub mod auth;
pub mod leads;

pub use auth::AuthService;
pub use leads::LeadService;
