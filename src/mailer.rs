//! The mailer: render a view, let the caller configure the message, dispatch it.
//!
//! One [`Mailer::send`] is a straight pipeline with no retries:
//!
//! 1. a fresh [`Message`] is created, pre-addressed from the default sender;
//! 2. the caller's configurator fills in recipients, subject, attachments;
//! 3. the HTML template (and optional plain-text template) is rendered with
//!    the caller's data plus a `message` key holding the envelope so far;
//! 4. the envelope is validated;
//! 5. it is logged (pretend mode) or handed to the [`Transport`].
//!
//! Any failure stops the pipeline and is returned to the caller. The envelope
//! is private to the call, so a failed send leaves nothing behind.

use std::sync::Arc;

#[cfg(feature = "metrics")]
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::Instrument;

use crate::address::{Address, ToAddress};
use crate::config::MailSettings;
use crate::error::{BoxError, MailError};
use crate::message::{Message, MessageEnvelope, TEXT_HTML, TEXT_PLAIN};
use crate::template::{template_data, TemplateData, TemplateEngine, View};
use crate::transport::{DeliveryResult, Transport};

/// Settings shared by every send on one [`Mailer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailerConfig {
    /// Sender applied to every new message.
    pub from: Option<Address>,
    /// Log messages instead of handing them to the transport.
    pub pretend: bool,
}

/// What happened to a successfully processed message.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The transport accepted the message.
    Delivered(DeliveryResult),
    /// Pretend mode was on; the message was only logged.
    Pretended,
}

impl SendOutcome {
    /// The transport's delivery result, if the message was actually sent.
    pub fn delivery(&self) -> Option<&DeliveryResult> {
        match self {
            Self::Delivered(result) => Some(result),
            Self::Pretended => None,
        }
    }

    /// Check if the message was only logged.
    pub fn is_pretended(&self) -> bool {
        matches!(self, Self::Pretended)
    }
}

/// Renders templated messages and dispatches them through a transport.
///
/// A `Mailer` is `Send + Sync`; share it behind an `Arc` and call
/// [`send`](Self::send) from as many tasks as needed. Each call builds its own
/// message. [`always_from`](Self::always_from), [`pretend`](Self::pretend) and
/// [`set_transport`](Self::set_transport) are meant for startup; a change made
/// while sends are in flight may or may not be seen by them.
///
/// ```rust,ignore
/// use letterbox::{Mailer, MiniJinjaEngine};
/// use letterbox::transports::SmtpTransport;
///
/// let mailer = Mailer::new(
///     SmtpTransport::from_settings(&smtp)?,
///     MiniJinjaEngine::from_dir("templates/emails"),
/// );
/// mailer.always_from(("Acme", "noreply@acme.test"));
///
/// mailer
///     .send(
///         ("welcome.html", "welcome.txt"),
///         serde_json::json!({ "name": user.name }),
///         |message| {
///             message.to(&user.email).subject("Welcome to Acme");
///             Ok(())
///         },
///     )
///     .await?;
/// ```
pub struct Mailer {
    config: RwLock<MailerConfig>,
    transport: RwLock<Arc<dyn Transport>>,
    templates: Arc<dyn TemplateEngine>,
}

impl Mailer {
    /// Create a mailer with no default sender and pretend mode off.
    pub fn new(
        transport: impl Transport + 'static,
        templates: impl TemplateEngine + 'static,
    ) -> Self {
        Self::with_config(MailerConfig::default(), transport, templates)
    }

    /// Create a mailer with explicit settings.
    pub fn with_config(
        config: MailerConfig,
        transport: impl Transport + 'static,
        templates: impl TemplateEngine + 'static,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            transport: RwLock::new(Arc::new(transport)),
            templates: Arc::new(templates),
        }
    }

    /// Create a mailer from startup settings: default sender and pretend flag.
    pub fn from_settings(
        settings: &MailSettings,
        transport: impl Transport + 'static,
        templates: impl TemplateEngine + 'static,
    ) -> Self {
        let config = MailerConfig {
            from: settings.from.clone(),
            pretend: settings.pretend,
        };
        Self::with_config(config, transport, templates)
    }

    /// Create an SMTP-backed mailer from `mail.*` configuration keys.
    ///
    /// Fails if `mail.host` is missing or any value is malformed.
    #[cfg(feature = "smtp")]
    pub fn from_source(
        source: &dyn crate::config::ConfigSource,
        templates: impl TemplateEngine + 'static,
    ) -> Result<Self, MailError> {
        let settings = MailSettings::from_source(source)?;
        let smtp = settings
            .smtp
            .as_ref()
            .ok_or_else(|| MailError::Configuration("mail.host not set".into()))?;
        let transport = crate::transports::SmtpTransport::from_settings(smtp)?;
        Ok(Self::from_settings(&settings, transport, templates))
    }

    /// Set the sender used for every message that does not set its own.
    pub fn always_from(&self, addr: impl ToAddress) {
        self.config.write().from = Some(addr.to_address());
    }

    /// Turn pretend mode on or off.
    ///
    /// While pretending, messages are built and rendered as usual but only
    /// logged; the transport is never called.
    pub fn pretend(&self, enabled: bool) {
        self.config.write().pretend = enabled;
    }

    /// Check if pretend mode is on.
    pub fn is_pretending(&self) -> bool {
        self.config.read().pretend
    }

    /// The default sender, if one is set.
    pub fn default_from(&self) -> Option<Address> {
        self.config.read().from.clone()
    }

    /// A snapshot of the current settings.
    pub fn config(&self) -> MailerConfig {
        self.config.read().clone()
    }

    /// The transport messages are handed to.
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.read().clone()
    }

    /// Replace the transport.
    pub fn set_transport(&self, transport: impl Transport + 'static) {
        self.set_transport_arc(Arc::new(transport));
    }

    /// Replace the transport with a shared one.
    pub fn set_transport_arc(&self, transport: Arc<dyn Transport>) {
        *self.transport.write() = transport;
    }

    /// The template engine views are rendered with.
    pub fn templates(&self) -> Arc<dyn TemplateEngine> {
        Arc::clone(&self.templates)
    }

    /// Render `view` with `data`, let `configure` address the message, and
    /// dispatch it.
    ///
    /// `view` is a template name (HTML body) or an `(html, text)` pair.
    /// `data` must serialize to a map; templates also see a `message` key
    /// holding the envelope as configured, which replaces any `message` key
    /// in `data`.
    ///
    /// `configure` runs before any rendering. If it returns an error the send
    /// fails with [`MailError::InvalidConfigurator`].
    ///
    /// # Errors
    ///
    /// - `TemplateData` - `data` is not a map
    /// - `InvalidConfigurator` - `configure` failed
    /// - `TemplateRender` - a template failed to render
    /// - `InvalidEnvelope` - no sender or no body
    /// - `AttachmentNotFound` - an attached file is missing
    /// - whatever the transport reports (usually `Transport`)
    pub async fn send<V, D, F>(
        &self,
        view: V,
        data: D,
        configure: F,
    ) -> Result<SendOutcome, MailError>
    where
        V: Into<View>,
        D: Serialize,
        F: FnOnce(&mut Message) -> Result<(), BoxError>,
    {
        let view = view.into();
        let config = self.config();
        let transport = self.transport();
        let transport_name = transport.name();

        let span = tracing::info_span!(
            "letterbox.send",
            transport = transport_name,
            template = %view.html(),
            pretend = config.pretend,
        );

        #[cfg(feature = "metrics")]
        let start = Instant::now();

        let result = async {
            let envelope = self.build(&view, data, &config, configure)?;
            self.dispatch(envelope, &config, transport.as_ref()).await
        }
        .instrument(span)
        .await;

        #[cfg(feature = "metrics")]
        {
            let duration = start.elapsed().as_secs_f64();
            let status = match &result {
                Ok(SendOutcome::Delivered(_)) => "success",
                Ok(SendOutcome::Pretended) => "pretended",
                Err(_) => "error",
            };
            metrics::counter!("letterbox_messages_total", "transport" => transport_name, "status" => status)
                .increment(1);
            metrics::histogram!("letterbox_send_duration_seconds", "transport" => transport_name)
                .record(duration);
        }

        result
    }

    /// Build, configure, render and validate one envelope.
    fn build<D, F>(
        &self,
        view: &View,
        data: D,
        config: &MailerConfig,
        configure: F,
    ) -> Result<MessageEnvelope, MailError>
    where
        D: Serialize,
        F: FnOnce(&mut Message) -> Result<(), BoxError>,
    {
        let mut data = template_data(data)?;

        let mut message = Message::new();
        if let Some(from) = &config.from {
            message.from(from);
        }

        configure(&mut message).map_err(|e| MailError::InvalidConfigurator(e.to_string()))?;

        data.insert(
            "message".to_string(),
            serde_json::to_value(message.envelope())?,
        );

        let html = self.render(view.html(), &data)?;
        message.set_body(html, TEXT_HTML);

        if let Some(text) = view.text() {
            let text = self.render(text, &data)?;
            message.add_part(text, TEXT_PLAIN);
        }

        let envelope = message.into_envelope();
        envelope.validate()?;
        Ok(envelope)
    }

    fn render(&self, template: &str, data: &TemplateData) -> Result<String, MailError> {
        tracing::debug!(template, "Rendering template");
        self.templates
            .render(template, data)
            .map_err(|e| MailError::render(template, e))
    }

    async fn dispatch(
        &self,
        envelope: MessageEnvelope,
        config: &MailerConfig,
        transport: &dyn Transport,
    ) -> Result<SendOutcome, MailError> {
        if config.pretend {
            tracing::info!(
                "Pretending to mail message to: {}",
                envelope.distinct_to().join(", ")
            );
            return Ok(SendOutcome::Pretended);
        }

        match transport.send(&envelope).await {
            Ok(result) => {
                tracing::info!(message_id = %result.message_id, "Message delivered");
                Ok(SendOutcome::Delivered(result))
            }
            Err(e) => {
                tracing::error!(error = %e, "Message delivery failed");
                Err(e)
            }
        }
    }
}
