//! In-memory transport for development and tests.
//!
//! ```rust,ignore
//! use letterbox::transports::MemoryTransport;
//!
//! let transport = MemoryTransport::new();
//! let mailer = Mailer::new(transport.clone(), templates);
//!
//! mailer.send("welcome.html", data, |m| { m.to("user@example.com"); Ok(()) }).await?;
//!
//! assert!(transport.sent_to("user@example.com"));
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::MailError;
use crate::message::MessageEnvelope;
use crate::transport::{DeliveryResult, Transport};

/// An envelope captured by [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct StoredEnvelope {
    /// Message ID returned to the sender.
    pub id: String,
    /// The envelope as it was handed to the transport.
    pub envelope: MessageEnvelope,
    /// When the envelope was captured.
    pub sent_at: DateTime<Utc>,
}

/// Transport that keeps every envelope in memory instead of delivering it.
///
/// Clones share the same storage, so a test can hand one clone to a
/// [`Mailer`](crate::Mailer) and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<RwLock<Vec<StoredEnvelope>>>,
    /// If set, send() will return this error (for testing error paths).
    fail_with: Arc<RwLock<Option<String>>>,
}

impl MemoryTransport {
    /// Create a transport with empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail with `message`.
    pub fn set_failure(&self, message: impl Into<String>) {
        *self.fail_with.write() = Some(message.into());
    }

    /// Clear the failure state.
    pub fn clear_failure(&self) {
        *self.fail_with.write() = None;
    }

    /// All captured envelopes, oldest first.
    pub fn envelopes(&self) -> Vec<StoredEnvelope> {
        self.sent.read().clone()
    }

    /// The most recently captured envelope.
    pub fn last(&self) -> Option<StoredEnvelope> {
        self.sent.read().last().cloned()
    }

    /// Number of captured envelopes.
    pub fn count(&self) -> usize {
        self.sent.read().len()
    }

    /// Check if nothing was sent.
    pub fn is_empty(&self) -> bool {
        self.sent.read().is_empty()
    }

    /// Drop all captured envelopes.
    pub fn clear(&self) {
        self.sent.write().clear();
    }

    /// Remove and return all captured envelopes.
    pub fn flush(&self) -> Vec<StoredEnvelope> {
        std::mem::take(&mut *self.sent.write())
    }

    /// Check if an envelope was sent to `email` (case-insensitive).
    pub fn sent_to(&self, email: &str) -> bool {
        self.sent.read().iter().any(|stored| {
            stored
                .envelope
                .to
                .iter()
                .any(|addr| addr.email.eq_ignore_ascii_case(email))
        })
    }

    /// Captured envelopes matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Vec<StoredEnvelope>
    where
        F: Fn(&MessageEnvelope) -> bool,
    {
        self.sent
            .read()
            .iter()
            .filter(|stored| predicate(&stored.envelope))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, envelope: &MessageEnvelope) -> Result<DeliveryResult, MailError> {
        if let Some(message) = self.fail_with.read().clone() {
            return Err(MailError::Transport(message));
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.sent.write().push(StoredEnvelope {
            id: id.clone(),
            envelope: envelope.clone(),
            sent_at: Utc::now(),
        });

        Ok(DeliveryResult::new(id))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
