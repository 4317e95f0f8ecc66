//! Port for outbound transactional email.
//!
//! One call sends one message to one recipient. The dispatcher iterates
//! recipients itself so every message carries its own unsubscribe link.

use async_trait::async_trait;
use tracing::debug;

/// A fully rendered outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Sender, e.g. `poke.community <updates@emails.poke.community>`.
    pub from: String,
    /// Single recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plaintext body.
    pub text: String,
    /// Extra message headers (`List-Unsubscribe` and friends).
    pub headers: Vec<(String, String)>,
}

/// Errors raised by mailer adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    /// The provider could not be reached.
    #[error("mail provider unreachable: {message}")]
    Transport {
        /// Underlying transport message.
        message: String,
    },
    /// The provider rejected the message.
    #[error("mail provider rejected the message: {message}")]
    Rejected {
        /// Provider response detail.
        message: String,
    },
}

impl MailerError {
    /// Create a transport error with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejection error with the given message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Port for sending one transactional email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}

/// Mailer used when no provider API key is configured: logs and drops.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        debug!(to = %email.to, subject = %email.subject, "mail provider disabled; dropping message");
        Ok(())
    }
}
