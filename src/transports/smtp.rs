//! SMTP transport using lettre.
//!
//! ```rust,ignore
//! use letterbox::transports::SmtpTransport;
//! use letterbox::{MailSettings, SmtpSettings};
//!
//! // From `mail.*` configuration
//! let settings = MailSettings::from_env()?;
//! let transport = SmtpTransport::from_settings(&settings.smtp.unwrap())?;
//!
//! // Local relay without TLS or auth
//! let transport = SmtpTransport::localhost();
//! ```

use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentType, HeaderName, HeaderValue},
        Attachment as LettreAttachment, Mailbox, MultiPart, MultiPartBuilder,
        SinglePart,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::address::Address;
use crate::attachment::AttachmentType;
use crate::config::{Encryption, SmtpSettings};
use crate::error::MailError;
use crate::message::{BodyPart, MessageEnvelope};
use crate::transport::{DeliveryResult, Transport};

/// SMTP delivery.
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build a transport from connection settings.
    ///
    /// Credentials are only used when a username is configured.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, MailError> {
        let mut builder = match settings.encryption {
            Encryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
            Encryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            }
            Encryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
        };

        builder = builder
            .port(settings.port)
            .timeout(Some(settings.timeout));

        if let Some(username) = &settings.username {
            let password = settings.password.clone().unwrap_or_default();
            builder = builder.credentials(Credentials::new(username.clone(), password));
        }

        tracing::debug!(
            host = %settings.host,
            port = settings.port,
            encryption = ?settings.encryption,
            "Configured SMTP transport"
        );

        Ok(Self {
            transport: builder.build(),
        })
    }

    /// Plain connection to a relay on localhost:25 (no TLS, no auth).
    pub fn localhost() -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost")
            .port(25)
            .build();

        Self { transport }
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn send(&self, envelope: &MessageEnvelope) -> Result<DeliveryResult, MailError> {
        let message = build_message(envelope)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        // Use the server's queue reply as the ID when it gives one.
        let message_id = response
            .message()
            .next()
            .and_then(|m| m.lines().next())
            .map(|s| s.to_string())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(DeliveryResult::new(message_id))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Encode an envelope as a lettre message, reading attachments from disk.
fn build_message(envelope: &MessageEnvelope) -> Result<Message, MailError> {
    let from = envelope
        .from
        .as_ref()
        .ok_or(MailError::InvalidEnvelope("from"))?;

    let mut builder = Message::builder()
        .from(address_to_mailbox(from)?)
        .subject(&envelope.subject);

    for to in &envelope.to {
        builder = builder.to(address_to_mailbox(to)?);
    }
    for cc in &envelope.cc {
        builder = builder.cc(address_to_mailbox(cc)?);
    }
    for bcc in &envelope.bcc {
        builder = builder.bcc(address_to_mailbox(bcc)?);
    }
    for reply_to in &envelope.reply_to {
        builder = builder.reply_to(address_to_mailbox(reply_to)?);
    }

    for (name, value) in &envelope.headers {
        let header_name = HeaderName::new_from_ascii(name.clone())
            .map_err(|_| MailError::Build(format!("invalid header name '{}'", name)))?;
        builder = builder.raw_header(HeaderValue::new(header_name, value.clone()));
    }

    let body = body_multipart(envelope)?;

    let message = if envelope.attachments.is_empty() {
        match body {
            Body::Single(part) => builder.singlepart(part)?,
            Body::Multi(multi) => builder.multipart(multi)?,
        }
    } else {
        let mut mixed = match body {
            Body::Single(part) => MultiPart::mixed().singlepart(part),
            Body::Multi(multi) => MultiPart::mixed().multipart(multi),
        };

        for attachment in &envelope.attachments {
            let data = attachment.load()?;
            let content_type = ContentType::parse(&attachment.content_type)
                .unwrap_or(ContentType::TEXT_PLAIN);

            let part = match attachment.disposition {
                AttachmentType::Inline => {
                    let cid = attachment
                        .content_id
                        .clone()
                        .unwrap_or_else(|| attachment.filename.clone());
                    LettreAttachment::new_inline(cid).body(data, content_type)
                }
                AttachmentType::Attachment => {
                    LettreAttachment::new(attachment.filename.clone()).body(data, content_type)
                }
            };

            mixed = mixed.singlepart(part);
        }

        builder.multipart(mixed)?
    };

    Ok(message)
}

enum Body {
    Single(SinglePart),
    Multi(MultiPart),
}

/// One part goes out as-is; several become multipart/alternative with the
/// primary body last, since clients prefer the final alternative.
fn body_multipart(envelope: &MessageEnvelope) -> Result<Body, MailError> {
    let primary = envelope
        .body
        .as_ref()
        .map(single_part)
        .transpose()?;
    let mut alternatives = envelope
        .parts
        .iter()
        .map(single_part)
        .collect::<Result<Vec<_>, _>>()?;
    alternatives.extend(primary);

    let mut parts = alternatives.into_iter();
    let first = parts.next().ok_or(MailError::InvalidEnvelope("body"))?;

    let Some(second) = parts.next() else {
        return Ok(Body::Single(first));
    };

    let builder: MultiPartBuilder = MultiPart::alternative();
    let mut multi = builder.singlepart(first).singlepart(second);
    for part in parts {
        multi = multi.singlepart(part);
    }
    Ok(Body::Multi(multi))
}

fn single_part(part: &BodyPart) -> Result<SinglePart, MailError> {
    let content_type = ContentType::parse(&format!("{}; charset=utf-8", part.mime_type))
        .map_err(|e| MailError::Build(format!("{}: {}", part.mime_type, e)))?;

    Ok(SinglePart::builder()
        .header(content_type)
        .body(part.content.clone()))
}

/// Convert an Address to lettre's Mailbox, punycoding the domain.
fn address_to_mailbox(addr: &Address) -> Result<Mailbox, MailError> {
    let email: lettre::Address = addr.to_ascii()?.parse()?;
    Ok(Mailbox::new(addr.name.clone(), email))
}
