// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound email: SMTP delivery with retries behind a transport seam.
//!
//! The [`Notifier`] owns the sender identity and retry policy; the
//! actual wire delivery sits behind [`MailTransport`] so tests can
//! substitute a recording or failing transport. Production uses
//! lettre's async STARTTLS SMTP transport.

pub mod templates;

use std::future::Future;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Settings;

/// Delivery attempts before giving up.
const MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts; multiplied by the attempt number.
const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email template error: {0}")]
    Template(String),

    #[error("email delivery failed after {attempts} attempts: {last_error}")]
    Delivery { attempts: u32, last_error: String },
}

impl From<EmailError> for crate::error::ApiError {
    fn from(err: EmailError) -> Self {
        tracing::error!(error = %err, "email notification failed");
        crate::error::ApiError::internal("Failed to send notification email")
    }
}

/// A fully addressed message ready for the wire.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Formatted sender, `Display Name <addr>`.
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Wire delivery seam. Implementations report failures as strings; the
/// notifier owns classification and retries.
pub trait MailTransport: Send + Sync {
    fn deliver(&self, email: &OutgoingEmail) -> impl Future<Output = Result<(), String>> + Send;
}

// =============================================================================
// SMTP transport (production)
// =============================================================================

/// lettre-backed SMTP transport with STARTTLS and connection pooling.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &Settings) -> Result<Self, String> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .map_err(|e| format!("SMTP relay setup failed: {e}"))?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.smtp_username.clone(),
                settings.smtp_password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

impl MailTransport for SmtpMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), String> {
        let message = Message::builder()
            .from(email.from.parse().map_err(|e| format!("bad sender: {e}"))?)
            .to(email.to.parse().map_err(|e| format!("bad recipient: {e}"))?)
            .subject(&email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| format!("message build failed: {e}"))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

// =============================================================================
// Notifier
// =============================================================================

/// Renders templates and delivers them with linear-backoff retries.
pub struct Notifier<T: MailTransport> {
    pub(crate) transport: T,
    from: String,
    attorney_email: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<T: MailTransport> Notifier<T> {
    pub fn new(transport: T, settings: &Settings) -> Self {
        Self {
            transport,
            from: format!("{} <{}>", settings.smtp_from_name, settings.smtp_from_email),
            attorney_email: settings.attorney_email.clone(),
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Override the retry policy (tests use a zero delay).
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }

    /// Confirmation email to the prospect who just submitted.
    pub async fn notify_prospect(
        &self,
        to_email: &str,
        name: &str,
        lead_id: &str,
    ) -> Result<(), EmailError> {
        let rendered = templates::render(
            templates::PROSPECT_CONFIRMATION,
            &[("name", name), ("lead_id", lead_id)],
        )
        .map_err(EmailError::Template)?;
        self.send_with_retry(to_email, rendered).await
    }

    /// New-lead notification to the configured attorney address.
    ///
    /// `dashboard_url` defaults to the lead's dashboard path when the
    /// caller has no external URL to hand out.
    pub async fn notify_attorney(
        &self,
        lead_id: &str,
        name: &str,
        email: &str,
        resume_ref: &str,
        dashboard_url: Option<&str>,
    ) -> Result<(), EmailError> {
        let default_url = format!("/leads/{lead_id}");
        let rendered = templates::render(
            templates::ATTORNEY_NOTIFICATION,
            &[
                ("name", name),
                ("email", email),
                ("resume", resume_ref),
                ("lead_id", lead_id),
                ("dashboard_url", dashboard_url.unwrap_or(&default_url)),
            ],
        )
        .map_err(EmailError::Template)?;
        self.send_with_retry(&self.attorney_email, rendered).await
    }

    /// Deliver with up to `max_attempts` tries, sleeping
    /// `retry_delay * attempt` between failures.
    async fn send_with_retry(
        &self,
        to: &str,
        rendered: templates::Rendered,
    ) -> Result<(), EmailError> {
        let email = OutgoingEmail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: rendered.subject,
            html: rendered.html,
        };

        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self.transport.deliver(&email).await {
                Ok(()) => {
                    tracing::debug!(to = %email.to, subject = %email.subject, "email delivered");
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(
                        to = %email.to,
                        attempt,
                        error = %err,
                        "email delivery attempt failed"
                    );
                    last_error = err;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(EmailError::Delivery {
            attempts: self.max_attempts,
            last_error,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use tempfile::TempDir;

    fn notifier(transport: FakeTransport) -> Notifier<FakeTransport> {
        let dir = TempDir::new().unwrap();
        let settings = Settings::for_tests(dir.path(), &dir.path().join("t.redb"));
        Notifier::new(transport, &settings).with_retry(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn prospect_email_goes_to_submitter() {
        let notifier = notifier(FakeTransport::reliable());
        notifier
            .notify_prospect("john@example.com", "John Doe", "lead-1")
            .await
            .unwrap();

        let sent = notifier.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "john@example.com");
        assert_eq!(sent[0].from, "Lead Management System <noreply@example.com>");
        assert!(sent[0].html.contains("John Doe"));
    }

    #[tokio::test]
    async fn attorney_email_goes_to_configured_address() {
        let notifier = notifier(FakeTransport::reliable());
        notifier
            .notify_attorney("lead-1", "John Doe", "john@example.com", "ref.pdf", None)
            .await
            .unwrap();

        let sent = notifier.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "attorney@example.com");
        assert_eq!(sent[0].subject, "New Lead Submitted: John Doe");
        // Without an explicit URL the link falls back to the lead's path.
        assert!(sent[0].html.contains("href=\"/leads/lead-1\""));
    }

    #[tokio::test]
    async fn attorney_email_uses_explicit_dashboard_url() {
        let notifier = notifier(FakeTransport::reliable());
        notifier
            .notify_attorney(
                "lead-1",
                "John Doe",
                "john@example.com",
                "ref.pdf",
                Some("https://dashboard.example.com/leads/lead-1"),
            )
            .await
            .unwrap();

        let sent = notifier.transport.sent.lock().unwrap();
        assert!(sent[0]
            .html
            .contains("href=\"https://dashboard.example.com/leads/lead-1\""));
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let notifier = notifier(FakeTransport::failing(2));
        notifier
            .notify_prospect("john@example.com", "John", "lead-1")
            .await
            .unwrap();
        assert_eq!(notifier.transport.sent_count(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_last_error() {
        let notifier = notifier(FakeTransport::failing(3));
        let err = notifier
            .notify_prospect("john@example.com", "John", "lead-1")
            .await
            .unwrap_err();
        match err {
            EmailError::Delivery { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "connection refused");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(notifier.transport.sent_count(), 0);
    }
}
