// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed table access over the embedded database.

pub mod leads;
pub mod users;
