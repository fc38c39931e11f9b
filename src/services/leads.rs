// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lead workflow: the multi-step creation pipeline plus the dashboard
//! queries.
//!
//! Creation touches three systems (file store, database, SMTP) without
//! a surrounding transaction, so the pipeline compensates on failure:
//! whatever was persisted before the failing step is best-effort
//! deleted, and cleanup failures never mask the original error. The
//! window in which a committed lead is rolled back because its
//! notification emails failed is an accepted tradeoff.

use std::path::PathBuf;

use crate::error::ApiError;
use crate::models::{LeadListQuery, LeadStatus, SortField, SortOrder};
use crate::email::{MailTransport, Notifier};
use crate::storage::repository::leads::Lead;
use crate::storage::{files, Database, FileStore, ResumeUpload};

/// Everything a handler needs to stream a resume back.
#[derive(Debug)]
pub struct ResumeDownload {
    pub path: PathBuf,
    pub media_type: &'static str,
    /// Download name in the form `<first>_<last>_resume<ext>`.
    pub filename: String,
}

pub struct LeadService<'a, T: MailTransport> {
    db: &'a Database,
    files: &'a FileStore,
    notifier: &'a Notifier<T>,
}

impl<'a, T: MailTransport> LeadService<'a, T> {
    pub fn new(db: &'a Database, files: &'a FileStore, notifier: &'a Notifier<T>) -> Self {
        Self {
            db,
            files,
            notifier,
        }
    }

    /// Create a lead from a validated public submission.
    ///
    /// Steps: dedupe check, file save, row insert, prospect email,
    /// attorney email. A failure after the file save deletes the file;
    /// a failure after the insert also deletes the row.
    pub async fn create_lead(
        &self,
        first_name: String,
        last_name: String,
        email: String,
        resume: ResumeUpload,
    ) -> Result<Lead, ApiError> {
        if self.db.leads().get_by_email(&email)?.is_some() {
            return Err(ApiError::bad_request(
                "A lead with this email already exists",
            ));
        }

        let resume_ref = self.files.save(&resume)?;

        let lead = Lead::new(first_name, last_name, email, resume_ref.clone());
        if let Err(err) = self.db.leads().insert(&lead) {
            // The insert-time uniqueness check catches a concurrent
            // duplicate that slipped past the lookup above.
            self.cleanup_file(&resume_ref);
            return Err(err.into());
        }

        let full_name = format!("{} {}", lead.first_name, lead.last_name);
        let notify = async {
            self.notifier
                .notify_prospect(&lead.email, &full_name, &lead.id)
                .await?;
            self.notifier
                .notify_attorney(&lead.id, &full_name, &lead.email, &resume_ref, None)
                .await
        };
        if let Err(err) = notify.await {
            self.cleanup_row(&lead.id);
            self.cleanup_file(&resume_ref);
            return Err(err.into());
        }

        tracing::info!(lead_id = %lead.id, "lead created");
        Ok(lead)
    }

    pub fn get_lead(&self, id: &str) -> Result<Lead, ApiError> {
        self.db
            .leads()
            .get(id)?
            .ok_or_else(|| ApiError::not_found("Lead not found"))
    }

    /// Validate and run the dashboard listing query.
    pub fn list_leads(&self, query: &LeadListQuery) -> Result<(Vec<Lead>, u64), ApiError> {
        if query.page < 1 {
            return Err(ApiError::unprocessable("page must be at least 1"));
        }
        if !(1..=100).contains(&query.page_size) {
            return Err(ApiError::unprocessable(
                "page_size must be between 1 and 100",
            ));
        }

        let sort_by = match query.sort_by.as_deref() {
            None => SortField::CreatedAt,
            Some(raw) => raw.parse::<SortField>().map_err(ApiError::bad_request)?,
        };
        let sort_order = match query.sort_order.as_deref() {
            None => SortOrder::Desc,
            Some(raw) => raw.parse::<SortOrder>().map_err(ApiError::bad_request)?,
        };

        Ok(self.db.leads().list(
            query.page,
            query.page_size,
            query.status,
            sort_by,
            sort_order,
        )?)
    }

    /// Transition a lead through the status state machine.
    pub fn update_status(&self, id: &str, new_status: LeadStatus) -> Result<Lead, ApiError> {
        let lead = self.db.leads().transition_status(id, new_status)?;
        tracing::info!(lead_id = %lead.id, status = %lead.status, "lead status updated");
        Ok(lead)
    }

    /// Resolve a lead's resume for download.
    pub fn resume_download(&self, id: &str) -> Result<ResumeDownload, ApiError> {
        let lead = self.get_lead(id)?;
        let path = self.files.resolve(&lead.resume_path)?;
        let ext = files::file_extension(&lead.resume_path).unwrap_or_default();
        Ok(ResumeDownload {
            media_type: FileStore::media_type(&lead.resume_path),
            filename: format!("{}_{}_resume{}", lead.first_name, lead.last_name, ext),
            path,
        })
    }

    /// Remove a lead and its stored resume. Returns false when the lead
    /// did not exist.
    pub fn delete_lead(&self, id: &str) -> Result<bool, ApiError> {
        let Some(lead) = self.db.leads().get(id)? else {
            return Ok(false);
        };
        self.db.leads().delete(id)?;
        self.cleanup_file(&lead.resume_path);
        Ok(true)
    }

    /// Dashboard counts: `(pending, reached_out)`.
    pub fn count_by_status(&self) -> Result<(u64, u64), ApiError> {
        Ok(self.db.leads().count_by_status()?)
    }

    fn cleanup_row(&self, id: &str) {
        if let Err(err) = self.db.leads().delete(id) {
            tracing::warn!(lead_id = %id, error = %err, "lead row cleanup failed");
        }
    }

    fn cleanup_file(&self, reference: &str) {
        if let Err(err) = self.files.delete(reference) {
            tracing::warn!(reference = %reference, error = %err, "resume cleanup failed");
        }
    }
}
