//! Transport that only logs envelopes.
//!
//! Useful for staging environments where messages should be visible in the
//! logs but never leave the process. Unlike pretend mode on the
//! [`Mailer`](crate::Mailer), this reports a message ID like a real transport.

use async_trait::async_trait;

use crate::error::MailError;
use crate::message::MessageEnvelope;
use crate::transport::{DeliveryResult, Transport};

/// Transport that emits tracing events instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct LogTransport {
    /// If true, log full envelope details. If false, just the recipients.
    log_full: bool,
}

impl LogTransport {
    /// Log a recipient summary.
    pub fn new() -> Self {
        Self { log_full: false }
    }

    /// Log every envelope field, and bodies at debug level.
    pub fn full() -> Self {
        Self { log_full: true }
    }
}

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, envelope: &MessageEnvelope) -> Result<DeliveryResult, MailError> {
        let message_id = uuid::Uuid::new_v4().to_string();

        if self.log_full {
            tracing::info!(
                message_id = %message_id,
                from = ?envelope.from.as_ref().map(|a| a.formatted()),
                to = ?envelope.to.iter().map(|a| a.formatted()).collect::<Vec<_>>(),
                cc = ?envelope.cc.iter().map(|a| a.formatted()).collect::<Vec<_>>(),
                bcc = ?envelope.bcc.iter().map(|a| a.formatted()).collect::<Vec<_>>(),
                subject = %envelope.subject,
                parts = ?envelope.body_parts().map(|p| p.mime_type.as_str()).collect::<Vec<_>>(),
                attachments = envelope.attachments.len(),
                "Message logged (full)"
            );

            for part in envelope.body_parts() {
                tracing::debug!(mime_type = %part.mime_type, body = %part.content, "Body part");
            }
        } else {
            tracing::info!(
                message_id = %message_id,
                to = ?envelope.to.iter().map(|a| &a.email).collect::<Vec<_>>(),
                subject = %envelope.subject,
                "Message logged"
            );
        }

        Ok(DeliveryResult::new(message_id))
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
