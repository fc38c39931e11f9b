// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! All configuration is loaded from environment variables at startup and
//! validated before the server binds. Invalid values fail the process with
//! a typed [`ConfigError`] instead of surfacing later at request time.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_PATH` | Path to the embedded redb database file | `./leads.redb` |
//! | `SECRET_KEY` | JWT signing secret (>= 32 chars, no placeholders) | Required |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | Token lifetime (5 min - 7 days) | `1440` |
//! | `SMTP_HOST` | SMTP relay hostname | Required |
//! | `SMTP_PORT` | SMTP relay port | `587` |
//! | `SMTP_USERNAME` | SMTP auth username | Required |
//! | `SMTP_PASSWORD` | SMTP auth password | Required |
//! | `SMTP_FROM_EMAIL` | Sender address for outbound mail | Required |
//! | `SMTP_FROM_NAME` | Sender display name | `Lead Management System` |
//! | `ATTORNEY_EMAIL` | Recipient for new-lead notifications | Required |
//! | `UPLOAD_DIR` | Root directory for stored resumes | `./uploads/resumes` |
//! | `MAX_FILE_SIZE` | Upload size cap in bytes (1MB - 50MB) | `5242880` |
//! | `ENVIRONMENT` | `development` or `production` | `development` |
//! | `CORS_ORIGINS` | Comma-separated allowed origins | localhost defaults |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

/// Minimum accepted token lifetime in minutes.
pub const MIN_TOKEN_EXPIRE_MINUTES: u64 = 5;
/// Maximum accepted token lifetime in minutes (7 days).
pub const MAX_TOKEN_EXPIRE_MINUTES: u64 = 10_080;
/// Minimum accepted upload size cap (1MB).
pub const MIN_FILE_SIZE_BYTES: u64 = 1_048_576;
/// Maximum accepted upload size cap (50MB).
pub const MAX_FILE_SIZE_BYTES: u64 = 52_428_800;

/// Secret values that must never be used as a signing key.
const INSECURE_SECRET_PATTERNS: &[&str] = &[
    "your-secret-key-min-32-characters-change-in-production",
    "change_me_generate_secure_key",
    "changeme",
    "secret",
    "secretkey",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Validated application settings, constructed once in `main` and shared
/// read-only through [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: String,
    pub secret_key: String,
    pub access_token_expire_minutes: u64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from_email: String,
    pub smtp_from_name: String,
    pub attorney_email: String,
    pub upload_dir: String,
    pub max_file_size: u64,
    pub environment: String,
    pub cors_origins: String,
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Load and validate settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Self {
            database_path: env_or("DATABASE_PATH", "./leads.redb"),
            secret_key: validate_secret_key(require("SECRET_KEY")?)?,
            access_token_expire_minutes: validate_token_expiry(parse_var(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                1440,
            )?)?,
            smtp_host: require("SMTP_HOST")?,
            smtp_port: parse_var("SMTP_PORT", 587)?,
            smtp_username: require("SMTP_USERNAME")?,
            smtp_password: require("SMTP_PASSWORD")?,
            smtp_from_email: require("SMTP_FROM_EMAIL")?,
            smtp_from_name: env_or("SMTP_FROM_NAME", "Lead Management System"),
            attorney_email: require("ATTORNEY_EMAIL")?,
            upload_dir: env_or("UPLOAD_DIR", "./uploads/resumes"),
            max_file_size: validate_max_file_size(parse_var("MAX_FILE_SIZE", 5_242_880)?)?,
            environment: env_or("ENVIRONMENT", "development"),
            cors_origins: env_or(
                "CORS_ORIGINS",
                "http://localhost:3000,http://localhost:8000",
            ),
            host: env_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 8080)?,
        };
        Ok(settings)
    }

    /// Parse the comma-separated origin list.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn env_or(var: &'static str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::Missing(var))
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("{e}"),
        }),
        Err(_) => Ok(default),
    }
}

/// Reject short keys and known placeholder values.
///
/// Placeholder patterns are checked before the length requirement so a
/// padded placeholder is still rejected with the more specific message.
fn validate_secret_key(key: String) -> Result<String, ConfigError> {
    let lowered = key.to_lowercase();
    for pattern in INSECURE_SECRET_PATTERNS {
        if lowered == *pattern || lowered.starts_with(pattern) {
            return Err(ConfigError::Invalid {
                var: "SECRET_KEY",
                reason: "placeholder value detected; generate a random key".to_string(),
            });
        }
    }
    if key.len() < 32 {
        return Err(ConfigError::Invalid {
            var: "SECRET_KEY",
            reason: "must be at least 32 characters".to_string(),
        });
    }
    Ok(key)
}

fn validate_token_expiry(minutes: u64) -> Result<u64, ConfigError> {
    if !(MIN_TOKEN_EXPIRE_MINUTES..=MAX_TOKEN_EXPIRE_MINUTES).contains(&minutes) {
        return Err(ConfigError::Invalid {
            var: "ACCESS_TOKEN_EXPIRE_MINUTES",
            reason: format!(
                "must be between {MIN_TOKEN_EXPIRE_MINUTES} and {MAX_TOKEN_EXPIRE_MINUTES} minutes"
            ),
        });
    }
    Ok(minutes)
}

fn validate_max_file_size(bytes: u64) -> Result<u64, ConfigError> {
    if !(MIN_FILE_SIZE_BYTES..=MAX_FILE_SIZE_BYTES).contains(&bytes) {
        return Err(ConfigError::Invalid {
            var: "MAX_FILE_SIZE",
            reason: format!(
                "must be between {MIN_FILE_SIZE_BYTES} and {MAX_FILE_SIZE_BYTES} bytes"
            ),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
impl Settings {
    /// Settings for unit tests: no env access, throwaway paths.
    pub fn for_tests(upload_dir: &std::path::Path, database_path: &std::path::Path) -> Self {
        Self {
            database_path: database_path.display().to_string(),
            secret_key: "unit-test-signing-key-0123456789abcdef".to_string(),
            access_token_expire_minutes: 60,
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            smtp_from_email: "noreply@example.com".to_string(),
            smtp_from_name: "Lead Management System".to_string(),
            attorney_email: "attorney@example.com".to_string(),
            upload_dir: upload_dir.display().to_string(),
            max_file_size: 5_242_880,
            environment: "test".to_string(),
            cors_origins: "http://localhost:3000".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_rejects_placeholders() {
        let result = validate_secret_key("changeme".to_string());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        // Padded placeholder is still a placeholder
        let padded = "changeme-padded-out-to-more-than-32-characters".to_string();
        assert!(validate_secret_key(padded).is_err());
    }

    #[test]
    fn secret_key_rejects_short_values() {
        let result = validate_secret_key("too-short".to_string());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn secret_key_accepts_long_random_value() {
        let key = "f3a9c1d2e4b5a6978081726354453627".to_string();
        assert_eq!(validate_secret_key(key.clone()).unwrap(), key);
    }

    #[test]
    fn token_expiry_bounds() {
        assert!(validate_token_expiry(4).is_err());
        assert!(validate_token_expiry(10_081).is_err());
        assert_eq!(validate_token_expiry(1440).unwrap(), 1440);
        assert_eq!(validate_token_expiry(5).unwrap(), 5);
        assert_eq!(validate_token_expiry(10_080).unwrap(), 10_080);
    }

    #[test]
    fn max_file_size_bounds() {
        assert!(validate_max_file_size(1_048_575).is_err());
        assert!(validate_max_file_size(52_428_801).is_err());
        assert_eq!(validate_max_file_size(5_242_880).unwrap(), 5_242_880);
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let dir = std::env::temp_dir();
        let mut settings = Settings::for_tests(&dir, &dir.join("t.redb"));
        settings.cors_origins = "http://a.example, http://b.example ,".to_string();
        assert_eq!(
            settings.cors_origin_list(),
            vec!["http://a.example".to_string(), "http://b.example".to_string()]
        );
    }
}
