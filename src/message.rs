//! Message envelope and the builder handed to send configurators.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::address::{Address, ToAddress};
use crate::attachment::{AttachOptions, Attachment};
use crate::error::MailError;

/// MIME type of HTML body parts.
pub const TEXT_HTML: &str = "text/html";
/// MIME type of plain-text body parts.
pub const TEXT_PLAIN: &str = "text/plain";

/// One representation of the message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPart {
    /// MIME type, e.g. `text/html`
    pub mime_type: String,
    /// Rendered content
    pub content: String,
}

impl BodyPart {
    /// Create a body part from its content and MIME type.
    pub fn new(content: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }
}

/// The addressed, bodied message handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Sender address
    pub from: Option<Address>,
    /// Primary recipients
    pub to: Vec<Address>,
    /// Carbon copy recipients
    pub cc: Vec<Address>,
    /// Blind carbon copy recipients
    pub bcc: Vec<Address>,
    /// Reply-to addresses
    pub reply_to: Vec<Address>,
    /// Subject line
    pub subject: String,
    /// Primary body part
    pub body: Option<BodyPart>,
    /// Alternative body parts, in the order they were added
    pub parts: Vec<BodyPart>,
    /// File attachments
    pub attachments: Vec<Attachment>,
    /// Custom headers, in the order they were added
    pub headers: Vec<(String, String)>,
}

impl MessageEnvelope {
    /// All body parts: the primary body first, then additional parts.
    pub fn body_parts(&self) -> impl Iterator<Item = &BodyPart> {
        self.body.iter().chain(self.parts.iter())
    }

    /// First body part with the given MIME type.
    pub fn part(&self, mime_type: &str) -> Option<&BodyPart> {
        self.body_parts().find(|p| p.mime_type == mime_type)
    }

    /// The HTML content, if any.
    pub fn html(&self) -> Option<&str> {
        self.part(TEXT_HTML).map(|p| p.content.as_str())
    }

    /// The plain-text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.part(TEXT_PLAIN).map(|p| p.content.as_str())
    }

    /// Distinct `to` addresses, in the order they were first added.
    pub fn distinct_to(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.to.len());
        for addr in &self.to {
            if !seen.contains(&addr.email.as_str()) {
                seen.push(&addr.email);
            }
        }
        seen
    }

    /// Get all recipients (to + cc + bcc).
    pub fn all_recipients(&self) -> Vec<&Address> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .collect()
    }

    /// Check the envelope can be dispatched.
    ///
    /// Requires a sender and at least one body part, and every attachment
    /// must point at an existing file.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.from.is_none() {
            return Err(MailError::InvalidEnvelope("from"));
        }
        if self.body.is_none() && self.parts.is_empty() {
            return Err(MailError::InvalidEnvelope("body"));
        }
        for attachment in &self.attachments {
            attachment.check()?;
        }
        Ok(())
    }
}

/// Mutable builder for one [`MessageEnvelope`].
///
/// Every setter mutates in place and returns `&mut Self`, so a configurator
/// can chain calls:
///
/// ```
/// use letterbox::Message;
///
/// let mut message = Message::new();
/// message
///     .from(("Billing", "billing@example.com"))
///     .to("customer@example.com")
///     .subject("Your invoice");
///
/// assert_eq!(message.envelope().to.len(), 1);
/// ```
///
/// Nothing here performs I/O; attachments are only checked at dispatch.
#[derive(Debug, Clone, Default)]
pub struct Message {
    envelope: MessageEnvelope,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender, replacing any previous one.
    pub fn from(&mut self, addr: impl ToAddress) -> &mut Self {
        self.envelope.from = Some(addr.to_address());
        self
    }

    /// Add a recipient. Duplicates are kept.
    pub fn to(&mut self, addr: impl ToAddress) -> &mut Self {
        self.envelope.to.push(addr.to_address());
        self
    }

    /// Add a CC recipient.
    pub fn cc(&mut self, addr: impl ToAddress) -> &mut Self {
        self.envelope.cc.push(addr.to_address());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(&mut self, addr: impl ToAddress) -> &mut Self {
        self.envelope.bcc.push(addr.to_address());
        self
    }

    /// Add a reply-to address.
    pub fn reply_to(&mut self, addr: impl ToAddress) -> &mut Self {
        self.envelope.reply_to.push(addr.to_address());
        self
    }

    /// Set the subject line.
    pub fn subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.envelope.subject = subject.into();
        self
    }

    /// Attach a file. The file is read when the message is dispatched.
    pub fn attach(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.envelope.attachments.push(Attachment::from_path(path));
        self
    }

    /// Attach a file with explicit options.
    pub fn attach_with(&mut self, path: impl AsRef<Path>, options: AttachOptions) -> &mut Self {
        self.envelope
            .attachments
            .push(Attachment::with_options(path, options));
        self
    }

    /// Add a custom header.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.envelope.headers.push((name.into(), value.into()));
        self
    }

    /// Set the primary body, replacing any previous primary body.
    ///
    /// Additional parts of the same MIME type are dropped, so an envelope
    /// never carries two parts of one type through this call.
    pub fn set_body(
        &mut self,
        content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> &mut Self {
        let body = BodyPart::new(content, mime_type);
        self.envelope
            .parts
            .retain(|part| part.mime_type != body.mime_type);
        self.envelope.body = Some(body);
        self
    }

    /// Append an alternative body part (e.g. a plain-text version).
    pub fn add_part(
        &mut self,
        content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> &mut Self {
        self.envelope.parts.push(BodyPart::new(content, mime_type));
        self
    }

    /// The envelope built so far.
    pub fn envelope(&self) -> &MessageEnvelope {
        &self.envelope
    }

    /// Consume the builder and return the envelope.
    pub fn into_envelope(self) -> MessageEnvelope {
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaining() {
        let mut message = Message::new();
        message
            .from("sender@example.com")
            .to("recipient@example.com")
            .subject("Test")
            .set_body("Hello", TEXT_PLAIN);

        let envelope = message.envelope();
        assert_eq!(envelope.from.as_ref().unwrap().email, "sender@example.com");
        assert_eq!(envelope.to[0].email, "recipient@example.com");
        assert_eq!(envelope.subject, "Test");
        assert_eq!(envelope.text(), Some("Hello"));
    }

    #[test]
    fn test_from_and_subject_overwrite() {
        let mut message = Message::new();
        message
            .from("first@example.com")
            .from(("Second", "second@example.com"))
            .subject("one")
            .subject("two");

        let envelope = message.into_envelope();
        let from = envelope.from.unwrap();
        assert_eq!(from.email, "second@example.com");
        assert_eq!(from.name.as_deref(), Some("Second"));
        assert_eq!(envelope.subject, "two");
    }

    #[test]
    fn test_duplicate_recipients_kept() {
        let mut message = Message::new();
        message
            .to("a@example.com")
            .to("a@example.com")
            .to("b@example.com")
            .cc("c@example.com")
            .bcc("d@example.com");

        let envelope = message.envelope();
        assert_eq!(envelope.to.len(), 3);
        assert_eq!(envelope.distinct_to(), vec!["a@example.com", "b@example.com"]);
        assert_eq!(envelope.all_recipients().len(), 5);
    }

    #[test]
    fn test_set_body_replaces_primary() {
        let mut message = Message::new();
        message
            .set_body("<p>first</p>", TEXT_HTML)
            .set_body("<p>second</p>", TEXT_HTML)
            .add_part("plain", TEXT_PLAIN);

        let envelope = message.envelope();
        let parts: Vec<_> = envelope.body_parts().collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].mime_type, TEXT_HTML);
        assert_eq!(parts[0].content, "<p>second</p>");
        assert_eq!(parts[1].mime_type, TEXT_PLAIN);
    }

    #[test]
    fn test_set_body_drops_parts_of_same_type() {
        let mut message = Message::new();
        message
            .add_part("old html", TEXT_HTML)
            .add_part("plain", TEXT_PLAIN)
            .set_body("new html", TEXT_HTML);

        let envelope = message.envelope();
        let html: Vec<_> = envelope
            .body_parts()
            .filter(|part| part.mime_type == TEXT_HTML)
            .collect();
        assert_eq!(html.len(), 1);
        assert_eq!(html[0].content, "new html");
        assert_eq!(envelope.text(), Some("plain"));
    }

    #[test]
    fn test_attach_is_lazy() {
        let mut message = Message::new();
        message.attach("/no/such/file.pdf");
        assert_eq!(message.envelope().attachments.len(), 1);
        assert_eq!(message.envelope().attachments[0].filename, "file.pdf");
    }

    #[test]
    fn test_validate() {
        let mut message = Message::new();
        message.to("a@example.com");
        assert!(matches!(
            message.envelope().validate(),
            Err(MailError::InvalidEnvelope("from"))
        ));

        message.from("me@example.com");
        assert!(matches!(
            message.envelope().validate(),
            Err(MailError::InvalidEnvelope("body"))
        ));

        message.add_part("text only", TEXT_PLAIN);
        assert!(message.envelope().validate().is_ok());

        message.attach("/no/such/file.pdf");
        assert!(matches!(
            message.envelope().validate(),
            Err(MailError::AttachmentNotFound(_))
        ));
    }
}
