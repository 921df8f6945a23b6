//! Outbound email seam.
//!
//! Delivery is an external collaborator: the service only needs
//! "send a verification or reset link to this address" and treats
//! failures as best-effort. The development implementation logs the
//! link instead of talking to a real transport.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Email transport failed: {0}")]
    Transport(String),
}

/// Kind of transactional email the auth flows send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Verify,
    Reset,
}

impl EmailKind {
    pub fn subject(self) -> &'static str {
        match self {
            EmailKind::Verify => "Verify Your Email Address",
            EmailKind::Reset => "Reset Your Password",
        }
    }

    /// Frontend path the emailed link points at.
    fn path(self) -> &'static str {
        match self {
            EmailKind::Verify => "/verify-email",
            EmailKind::Reset => "/reset-password",
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the email carrying the action link for `token` to `recipient`.
    async fn send(&self, kind: EmailKind, recipient: &str, token: &str) -> Result<(), MailerError>;
}

/// Development mailer: writes the action link to the log instead of
/// delivering it. Counts sends so tests can observe the side effect.
#[derive(Clone)]
pub struct LogMailer {
    frontend_url: String,
    sent_count: Arc<AtomicU64>,
}

impl LogMailer {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into(),
            sent_count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn action_link(&self, kind: EmailKind, token: &str) -> String {
        format!("{}{}?token={}", self.frontend_url, kind.path(), token)
    }

    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, kind: EmailKind, recipient: &str, token: &str) -> Result<(), MailerError> {
        let link = self.action_link(kind, token);
        self.sent_count.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            subject = kind.subject(),
            recipient,
            link,
            "Email delivery (log transport)"
        );
        Ok(())
    }
}
