//! Error types for letterbox.

use thiserror::Error;

/// Boxed error returned by message configurators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or sending a message.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// The caller-supplied configurator failed.
    #[error("Invalid configurator: {0}")]
    InvalidConfigurator(String),

    /// A template could not be rendered.
    #[error("Failed to render template '{template}': {message}")]
    TemplateRender {
        /// Identifier of the template that failed.
        template: String,
        /// Error reported by the template engine.
        message: String,
    },

    /// Template data did not serialize to a key/value map.
    #[error("Invalid template data: {0}")]
    TemplateData(String),

    /// The finished envelope is missing a required piece (from, body).
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(&'static str),

    /// Attachment file not found.
    #[error("Attachment file not found: {0}")]
    AttachmentNotFound(String),

    /// Failed to read attachment file.
    #[error("Failed to read attachment: {0}")]
    AttachmentRead(String),

    /// Invalid email address format.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Configuration error (missing key, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error building the transport-level message.
    #[error("Build error: {0}")]
    Build(String),

    /// The transport failed to deliver the message.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl MailError {
    /// Create a template render error.
    pub fn render(template: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::TemplateRender {
            template: template.into(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Build(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Build(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_names_template() {
        let err = MailError::render("emails/welcome", "undefined variable `user`");
        assert_eq!(
            err.to_string(),
            "Failed to render template 'emails/welcome': undefined variable `user`"
        );
    }

    #[test]
    fn test_invalid_envelope_display() {
        let err = MailError::InvalidEnvelope("from");
        assert_eq!(err.to_string(), "Invalid envelope: from");
    }
}
