// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attorney account persistence.
//!
//! Usernames and emails are both unique; the username check runs first so
//! a submission that collides on both reports the username conflict.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::database::{DbError, DbResult, USERNAME_INDEX, USERS, USER_EMAIL_INDEX};

/// Stored attorney account. The password hash never leaves this layer
/// except for verification in the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Stored lowercase; unique across all users.
    pub email: String,
    /// Argon2id PHC string.
    pub hashed_password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, hashed_password: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            hashed_password,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

pub struct UserRepository<'a> {
    pub(crate) db: &'a redb::Database,
}

impl UserRepository<'_> {
    /// Insert a new user, enforcing username and email uniqueness inside
    /// the write transaction.
    pub fn insert(&self, user: &User) -> DbResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut username_table = write_txn.open_table(USERNAME_INDEX)?;
            if username_table.get(user.username.as_str())?.is_some() {
                return Err(DbError::Conflict("Username already registered".to_string()));
            }
            let mut email_table = write_txn.open_table(USER_EMAIL_INDEX)?;
            if email_table.get(user.email.as_str())?.is_some() {
                return Err(DbError::Conflict("Email already registered".to_string()));
            }

            username_table.insert(user.username.as_str(), user.id.as_str())?;
            email_table.insert(user.email.as_str(), user.id.as_str())?;

            let mut user_table = write_txn.open_table(USERS)?;
            user_table.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> DbResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let username_table = read_txn.open_table(USERNAME_INDEX)?;
        let Some(id) = username_table.get(username)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };
        let user_table = read_txn.open_table(USERS)?;
        match user_table.get(id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let email_table = read_txn.open_table(USER_EMAIL_INDEX)?;
        let Some(id) = email_table.get(email)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };
        let user_table = read_txn.open_table(USERS)?;
        match user_table.get(id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Flip the active flag. NotFound for a missing user.
    pub fn set_active(&self, id: &str, is_active: bool) -> DbResult<User> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(USERS)?;
            let existing_bytes = {
                let existing = table
                    .get(id)?
                    .ok_or_else(|| DbError::NotFound(format!("User {id} not found")))?;
                existing.value().to_vec()
            };
            let mut user: User = serde_json::from_slice(&existing_bytes)?;
            user.is_active = is_active;
            let json = serde_json::to_vec(&user)?;
            table.insert(id, json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(updated)
    }
}
