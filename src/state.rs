// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.
//!
//! Constructed once in `main` and cloned into every handler via axum's
//! `State` extractor. All members are `Arc`-shared; there are no lazy
//! singletons, so tests can build as many isolated states as they need.

use std::sync::Arc;

use crate::config::{ConfigError, Settings};
use crate::email::{Notifier, SmtpMailer};
use crate::storage::{Database, DbError, FileError, FileStore};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database startup failed: {0}")]
    Database(#[from] DbError),

    #[error("file store startup failed: {0}")]
    Files(#[from] FileError),

    #[error("SMTP transport startup failed: {0}")]
    Smtp(String),
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Arc<Database>,
    pub files: Arc<FileStore>,
    pub notifier: Arc<Notifier<SmtpMailer>>,
}

impl AppState {
    /// Build the full state from validated settings.
    pub fn new(settings: Settings) -> Result<Self, StartupError> {
        let db = Database::open(std::path::Path::new(&settings.database_path))?;
        let files = FileStore::new(&settings.upload_dir, settings.max_file_size)?;
        let mailer = SmtpMailer::new(&settings).map_err(StartupError::Smtp)?;
        let notifier = Notifier::new(mailer, &settings);

        Ok(Self {
            settings: Arc::new(settings),
            db: Arc::new(db),
            files: Arc::new(files),
            notifier: Arc::new(notifier),
        })
    }
}

#[cfg(test)]
impl AppState {
    /// Isolated state rooted in a throwaway directory. The SMTP
    /// transport is never connected by the handlers under test.
    pub fn for_tests(dir: &std::path::Path) -> Self {
        let settings = Settings::for_tests(&dir.join("uploads"), &dir.join("test.redb"));
        Self::new(settings).expect("test state")
    }
}
