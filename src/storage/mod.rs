// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persistence layer: embedded redb database and local resume storage.

pub mod database;
pub mod files;
pub mod repository;

pub use database::{Database, DbError, DbResult};
pub use files::{FileError, FileStore, ResumeUpload};
