//! # Letterbox
//!
//! Render templated emails, address them with a fluent builder, and hand them
//! to a pluggable transport.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use letterbox::{Mailer, MiniJinjaEngine};
//! use letterbox::transports::SmtpTransport;
//!
//! let mailer = Mailer::from_source(
//!     &letterbox::EnvSource,
//!     MiniJinjaEngine::from_dir("templates/emails"),
//! )?;
//!
//! mailer
//!     .send(
//!         ("reset.html", "reset.txt"),
//!         serde_json::json!({ "link": reset_link }),
//!         |message| {
//!             message.to(&user.email).subject("Reset your password");
//!             Ok(())
//!         },
//!     )
//!     .await?;
//! ```
//!
//! ## Environment Variables
//!
//! [`EnvSource`] reads `mail.*` keys from upper-cased variables:
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `MAIL_FROM_ADDRESS` | Default sender email |
//! | `MAIL_FROM_NAME` | Default sender name |
//! | `MAIL_PRETEND` | Log instead of sending (default: false) |
//! | `MAIL_HOST` | SMTP server host |
//! | `MAIL_PORT` | SMTP server port (default: 587) |
//! | `MAIL_ENCRYPTION` | `tls`/`ssl`, `starttls` or `none` |
//! | `MAIL_USERNAME` | SMTP username |
//! | `MAIL_PASSWORD` | SMTP password |
//! | `MAIL_TIMEOUT` | SMTP timeout in seconds (default: 30) |
//!
//! ## Feature Flags
//!
//! - `templates` (default) - [`MiniJinjaEngine`] via minijinja
//! - `smtp` - SMTP transport via lettre
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `letterbox_messages_total` | Counter | transport, status | Messages processed (`success`, `pretended`, `error`) |
//! | `letterbox_send_duration_seconds` | Histogram | transport | Time spent in `send` |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the letterbox crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod address;
mod attachment;
mod config;
mod error;
mod mailer;
mod message;
mod template;
mod transport;

pub mod transports;

// Re-exports
pub use address::{Address, ToAddress};
pub use attachment::{AttachOptions, Attachment, AttachmentType};
pub use config::{ConfigSource, Encryption, EnvSource, MailSettings, MapSource, SmtpSettings};
pub use error::{BoxError, MailError};
pub use mailer::{Mailer, MailerConfig, SendOutcome};
pub use message::{BodyPart, Message, MessageEnvelope, TEXT_HTML, TEXT_PLAIN};
pub use template::{template_data, RenderError, TemplateData, TemplateEngine, View};
pub use transport::{DeliveryResult, Transport};

#[cfg(feature = "templates")]
pub use template::MiniJinjaEngine;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::Address;
    pub use crate::BoxError;
    pub use crate::MailError;
    pub use crate::Mailer;
    pub use crate::Message;
    pub use crate::MessageEnvelope;
    pub use crate::SendOutcome;
    pub use crate::TemplateEngine;
    pub use crate::ToAddress;
    pub use crate::Transport;
    pub use crate::View;
}
