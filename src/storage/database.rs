// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded application database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `leads`: lead_id → serialized Lead (JSON bytes)
//! - `lead_email_index`: lowercase email → lead_id (unique)
//! - `lead_status_index`: composite key (status|!created_at|lead_id) → lead_id
//! - `users`: user_id → serialized User (JSON bytes)
//! - `username_index`: username → user_id (unique)
//! - `user_email_index`: lowercase email → user_id (unique)
//!
//! Uniqueness is enforced inside the write transaction that inserts the
//! row: the index insert checks for an existing entry first, so two
//! concurrent submissions with the same email cannot both commit.

use std::path::Path;

use redb::TableDefinition;

use super::repository::{leads::LeadRepository, users::UserRepository};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: lead_id → serialized Lead (JSON bytes).
pub(crate) const LEADS: TableDefinition<&str, &[u8]> = TableDefinition::new("leads");

/// Unique index: lowercase email → lead_id.
pub(crate) const LEAD_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("lead_email_index");

/// Index: composite key → lead_id.
/// Key format: `status|!created_at_be|lead_id` for descending-time range scans.
pub(crate) const LEAD_STATUS_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("lead_status_index");

/// Primary table: user_id → serialized User (JSON bytes).
pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique index: username → user_id.
pub(crate) const USERNAME_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("username_index");

/// Unique index: lowercase email → user_id.
pub(crate) const USER_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_email_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID application database. One instance per process, shared
/// behind an `Arc` in the application state.
pub struct Database {
    pub(crate) db: redb::Database,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> DbResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = redb::Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LEADS)?;
            let _ = write_txn.open_table(LEAD_EMAIL_INDEX)?;
            let _ = write_txn.open_table(LEAD_STATUS_INDEX)?;
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(USER_EMAIL_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Lead table access.
    pub fn leads(&self) -> LeadRepository<'_> {
        LeadRepository { db: &self.db }
    }

    /// User table access.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository { db: &self.db }
    }
}

impl From<DbError> for crate::error::ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(message) => crate::error::ApiError::not_found(message),
            DbError::Conflict(message) => crate::error::ApiError::bad_request(message),
            other => {
                tracing::error!(error = %other, "database operation failed");
                crate::error::ApiError::internal("Internal server error")
            }
        }
    }
}
