//! Transport trait and delivery result types.
//!
//! # Why `async_trait`?
//!
//! A [`Mailer`](crate::Mailer) holds its transport as `Arc<dyn Transport>` so
//! it can be swapped at runtime ([`Mailer::set_transport`](crate::Mailer::set_transport)).
//! Native async trait methods are not object-safe, so the trait is declared
//! with `#[async_trait]`, which boxes the returned future. Delivery is
//! network-bound; one allocation per send does not show up next to it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::message::MessageEnvelope;

/// Result of a successful delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// Message ID assigned by the transport
    pub message_id: String,
    /// Optional transport-specific response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl DeliveryResult {
    /// Create a delivery result with just a message ID.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            response: None,
        }
    }

    /// Create a delivery result with a transport response attached.
    pub fn with_response(message_id: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            message_id: message_id.into(),
            response: Some(response),
        }
    }
}

/// Delivers finished envelopes.
///
/// Implementations report failures as [`MailError::Transport`] (or a more
/// specific variant such as [`MailError::AttachmentNotFound`] when the
/// envelope cannot be encoded).
///
/// ```rust,ignore
/// use letterbox::{DeliveryResult, MailError, MessageEnvelope, Transport};
///
/// struct Outbox;
///
/// #[async_trait::async_trait]
/// impl Transport for Outbox {
///     async fn send(&self, envelope: &MessageEnvelope) -> Result<DeliveryResult, MailError> {
///         queue_somewhere(envelope).await?;
///         Ok(DeliveryResult::new(uuid::Uuid::new_v4().to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one envelope.
    async fn send(&self, envelope: &MessageEnvelope) -> Result<DeliveryResult, MailError>;

    /// Transport name (for logging/metrics).
    fn name(&self) -> &'static str {
        "unknown"
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, envelope: &MessageEnvelope) -> Result<DeliveryResult, MailError> {
        (**self).send(envelope).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
