// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lead persistence: CRUD, unique-email enforcement, and the filtered
//! listing query.
//!
//! The status index keeps a composite key per lead
//! (`status|!created_at|lead_id`) so the common dashboard query, newest
//! first within one status, is a single forward range scan. Every other
//! sort combination falls back to a full-table scan and in-memory sort;
//! lead volume is small enough that this is fine.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{LeadStatus, SortField, SortOrder};
use crate::storage::database::{DbError, DbResult, LEADS, LEAD_EMAIL_INDEX, LEAD_STATUS_INDEX};

// =============================================================================
// Lead Record
// =============================================================================

/// A prospect submission as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Stored lowercase; unique across all leads.
    pub email: String,
    /// Opaque reference into the resume file store.
    pub resume_path: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set on the first transition into `REACHED_OUT`, never cleared.
    pub reached_out_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// New lead in the initial `PENDING` state.
    pub fn new(first_name: String, last_name: String, email: String, resume_path: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            resume_path,
            status: LeadStatus::Pending,
            created_at: now,
            updated_at: now,
            reached_out_at: None,
        }
    }
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the lead_status_index table.
///
/// Format: `status | inverted_created_at_be_bytes | lead_id`
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
fn make_status_key(status: LeadStatus, created_at: i64, lead_id: &str) -> Vec<u8> {
    let tag = status.as_str();
    let mut key = Vec::with_capacity(tag.len() + 1 + 8 + 1 + lead_id.len());
    key.extend_from_slice(tag.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!created_at as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(lead_id.as_bytes());
    key
}

/// Build a prefix key for range scanning all leads in one status.
fn make_status_prefix(status: LeadStatus) -> Vec<u8> {
    let tag = status.as_str();
    let mut prefix = Vec::with_capacity(tag.len() + 1);
    prefix.extend_from_slice(tag.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a range scan (prefix with all 0xFF bytes appended).
fn make_status_prefix_end(status: LeadStatus) -> Vec<u8> {
    let mut end = make_status_prefix(status);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// LeadRepository
// =============================================================================

pub struct LeadRepository<'a> {
    pub(crate) db: &'a redb::Database,
}

impl LeadRepository<'_> {
    /// Insert a new lead, enforcing email uniqueness inside the write
    /// transaction. Returns Conflict if the email is already indexed.
    pub fn insert(&self, lead: &Lead) -> DbResult<()> {
        let json = serde_json::to_vec(lead)?;
        let created_at = lead.created_at.timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut email_table = write_txn.open_table(LEAD_EMAIL_INDEX)?;
            if email_table.get(lead.email.as_str())?.is_some() {
                return Err(DbError::Conflict(
                    "A lead with this email already exists".to_string(),
                ));
            }
            email_table.insert(lead.email.as_str(), lead.id.as_str())?;

            let mut lead_table = write_txn.open_table(LEADS)?;
            lead_table.insert(lead.id.as_str(), json.as_slice())?;

            let mut status_table = write_txn.open_table(LEAD_STATUS_INDEX)?;
            let key = make_status_key(lead.status, created_at, &lead.id);
            status_table.insert(key.as_slice(), lead.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a single lead by id.
    pub fn get(&self, id: &str) -> DbResult<Option<Lead>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEADS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a lead by its (lowercase) email via the unique index.
    pub fn get_by_email(&self, email: &str) -> DbResult<Option<Lead>> {
        let read_txn = self.db.begin_read()?;
        let email_table = read_txn.open_table(LEAD_EMAIL_INDEX)?;
        let Some(id) = email_table.get(email)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };
        let lead_table = read_txn.open_table(LEADS)?;
        match lead_table.get(id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Atomically transition a lead's status.
    ///
    /// Loads, validates, and rewrites the row (and its status-index entry)
    /// inside one write transaction. `reached_out_at` is set on the first
    /// entry into `REACHED_OUT` only and survives a transition back.
    pub fn transition_status(&self, id: &str, new_status: LeadStatus) -> DbResult<Lead> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut lead_table = write_txn.open_table(LEADS)?;

            let existing_bytes = {
                let existing = lead_table
                    .get(id)?
                    .ok_or_else(|| DbError::NotFound(format!("Lead {id} not found")))?;
                existing.value().to_vec()
            };
            let mut lead: Lead = serde_json::from_slice(&existing_bytes)?;

            if lead.status == new_status {
                return Err(DbError::Conflict(
                    "Status is already set to this value".to_string(),
                ));
            }
            if !LeadStatus::can_transition(lead.status, new_status) {
                return Err(DbError::Conflict(format!(
                    "Cannot transition from {} to {}",
                    lead.status, new_status
                )));
            }

            let old_status = lead.status;
            lead.status = new_status;
            lead.updated_at = Utc::now();
            if new_status == LeadStatus::ReachedOut && lead.reached_out_at.is_none() {
                lead.reached_out_at = Some(lead.updated_at);
            }

            let json = serde_json::to_vec(&lead)?;
            lead_table.insert(id, json.as_slice())?;

            let created_at = lead.created_at.timestamp();
            let mut status_table = write_txn.open_table(LEAD_STATUS_INDEX)?;
            status_table.remove(make_status_key(old_status, created_at, id).as_slice())?;
            status_table.insert(
                make_status_key(new_status, created_at, id).as_slice(),
                id,
            )?;

            lead
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Remove a lead and its index entries. Returns false when absent.
    pub fn delete(&self, id: &str) -> DbResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut lead_table = write_txn.open_table(LEADS)?;
            let Some(existing) = lead_table.remove(id)? else {
                return Ok(false);
            };
            let lead: Lead = serde_json::from_slice(existing.value())?;
            drop(existing);

            let mut email_table = write_txn.open_table(LEAD_EMAIL_INDEX)?;
            email_table.remove(lead.email.as_str())?;

            let mut status_table = write_txn.open_table(LEAD_STATUS_INDEX)?;
            let key = make_status_key(lead.status, lead.created_at.timestamp(), id);
            status_table.remove(key.as_slice())?;
            true
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Paginated listing. Returns `(items, total_matching)`.
    ///
    /// The `(status filter, created_at desc)` combination walks the status
    /// index in order; everything else scans and sorts in memory.
    pub fn list(
        &self,
        page: u64,
        page_size: u64,
        status: Option<LeadStatus>,
        sort_by: SortField,
        sort_order: SortOrder,
    ) -> DbResult<(Vec<Lead>, u64)> {
        let offset = (page.saturating_sub(1)) * page_size;

        if let (Some(filter), SortField::CreatedAt, SortOrder::Desc) = (status, sort_by, sort_order)
        {
            return self.list_by_status_index(filter, offset, page_size);
        }

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEADS)?;

        let mut matching: Vec<Lead> = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            let lead: Lead = serde_json::from_slice(entry.1.value())?;
            if status.is_none_or(|filter| lead.status == filter) {
                matching.push(lead);
            }
        }

        matching.sort_by(|a, b| {
            let ordering = match sort_by {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            match sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(page_size as usize)
            .collect();
        Ok((items, total))
    }

    /// Fast path: one forward range scan over the status index yields
    /// newest-first order directly.
    fn list_by_status_index(
        &self,
        status: LeadStatus,
        offset: u64,
        page_size: u64,
    ) -> DbResult<(Vec<Lead>, u64)> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(LEAD_STATUS_INDEX)?;
        let lead_table = read_txn.open_table(LEADS)?;

        let prefix = make_status_prefix(status);
        let prefix_end = make_status_prefix_end(status);

        let mut total = 0u64;
        let mut items = Vec::with_capacity(page_size as usize);
        for entry in idx_table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;
            let position = total;
            total += 1;
            if position < offset || items.len() >= page_size as usize {
                continue;
            }
            let id = entry.1.value();
            if let Some(value) = lead_table.get(id)? {
                items.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok((items, total))
    }

    /// Counts per status, for dashboard summaries.
    pub fn count_by_status(&self) -> DbResult<(u64, u64)> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEADS)?;
        let mut pending = 0u64;
        let mut reached_out = 0u64;
        for entry in table.iter()? {
            let entry = entry?;
            let lead: Lead = serde_json::from_slice(entry.1.value())?;
            match lead.status {
                LeadStatus::Pending => pending += 1,
                LeadStatus::ReachedOut => reached_out += 1,
            }
        }
        Ok((pending, reached_out))
    }
}
