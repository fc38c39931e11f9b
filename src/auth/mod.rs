// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication: password hashing, bearer token codec, and the
//! request extractor that resolves the current attorney account.

pub mod error;
pub mod extractor;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use extractor::CurrentUser;
pub use token::Claims;
