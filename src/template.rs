//! Template engines used to render message bodies.
//!
//! The mailer only needs one operation from an engine: render a named
//! template against a key/value context. Anything that can do that
//! implements [`TemplateEngine`], including plain closures:
//!
//! ```
//! use letterbox::{RenderError, TemplateData, TemplateEngine};
//!
//! let engine = |name: &str, data: &TemplateData| -> Result<String, RenderError> {
//!     let user = data.get("user").and_then(|v| v.as_str()).unwrap_or("there");
//!     Ok(format!("[{}] Hello, {}!", name, user))
//! };
//!
//! let mut data = TemplateData::new();
//! data.insert("user".into(), "Ada".into());
//! assert_eq!(engine.render("greeting", &data).unwrap(), "[greeting] Hello, Ada!");
//! ```
//!
//! With the `templates` feature, [`MiniJinjaEngine`] renders Jinja templates
//! registered in memory or loaded from a directory.

use serde::Serialize;
use thiserror::Error;

use crate::error::MailError;

/// Key/value context passed to templates.
pub type TemplateData = serde_json::Map<String, serde_json::Value>;

/// Error reported by a template engine.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    /// Create a render error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The engine's error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Renders named templates into strings.
pub trait TemplateEngine: Send + Sync {
    /// Render `template` with `data`.
    fn render(&self, template: &str, data: &TemplateData) -> Result<String, RenderError>;
}

impl<F> TemplateEngine for F
where
    F: Fn(&str, &TemplateData) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, template: &str, data: &TemplateData) -> Result<String, RenderError> {
        (self)(template, data)
    }
}

/// Which template(s) to render for a message.
///
/// A single identifier renders the HTML body; a pair renders the HTML body
/// and a plain-text alternative.
///
/// ```
/// use letterbox::View;
///
/// let html_only: View = "emails/welcome.html".into();
/// assert_eq!(html_only.text(), None);
///
/// let both: View = ("emails/welcome.html", "emails/welcome.txt").into();
/// assert_eq!(both.html(), "emails/welcome.html");
/// assert_eq!(both.text(), Some("emails/welcome.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// HTML template only.
    Html(String),
    /// HTML template plus a plain-text template.
    WithText { html: String, text: String },
}

impl View {
    /// The HTML template identifier.
    pub fn html(&self) -> &str {
        match self {
            Self::Html(html) | Self::WithText { html, .. } => html,
        }
    }

    /// The plain-text template identifier, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Html(_) => None,
            Self::WithText { text, .. } => Some(text),
        }
    }
}

impl From<&str> for View {
    fn from(html: &str) -> Self {
        Self::Html(html.to_string())
    }
}

impl From<String> for View {
    fn from(html: String) -> Self {
        Self::Html(html)
    }
}

impl<H: Into<String>, T: Into<String>> From<(H, T)> for View {
    fn from((html, text): (H, T)) -> Self {
        Self::WithText {
            html: html.into(),
            text: text.into(),
        }
    }
}

/// Serialize `data` into a template context.
///
/// `data` must serialize to a map (a struct, a `HashMap`, a JSON object);
/// `()` and `null` give an empty context.
pub fn template_data(data: impl Serialize) -> Result<TemplateData, MailError> {
    match serde_json::to_value(data)? {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(TemplateData::new()),
        other => Err(MailError::TemplateData(format!(
            "expected a map, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a map",
    }
}

#[cfg(feature = "templates")]
pub use self::minijinja_engine::MiniJinjaEngine;

#[cfg(feature = "templates")]
mod minijinja_engine {
    use std::path::Path;

    use minijinja::Environment;

    use super::{RenderError, TemplateData, TemplateEngine};
    use crate::error::MailError;

    /// Template engine backed by a `minijinja` environment.
    ///
    /// Templates whose names end in `.html` are auto-escaped.
    ///
    /// ```
    /// use letterbox::{MiniJinjaEngine, TemplateData, TemplateEngine};
    ///
    /// let engine = MiniJinjaEngine::new()
    ///     .template("hello.txt", "Hi {{ name }}")
    ///     .unwrap();
    ///
    /// let mut data = TemplateData::new();
    /// data.insert("name".into(), "Ada".into());
    /// assert_eq!(engine.render("hello.txt", &data).unwrap(), "Hi Ada");
    /// ```
    #[derive(Debug)]
    pub struct MiniJinjaEngine {
        env: Environment<'static>,
    }

    impl MiniJinjaEngine {
        /// An engine with no templates.
        pub fn new() -> Self {
            Self {
                env: Environment::new(),
            }
        }

        /// An engine that loads templates from files under `dir` on demand.
        pub fn from_dir(dir: impl AsRef<Path>) -> Self {
            let mut env = Environment::new();
            env.set_loader(minijinja::path_loader(dir.as_ref().to_path_buf()));
            Self { env }
        }

        /// Wrap an environment configured by the caller (filters, globals, ...).
        pub fn with_environment(env: Environment<'static>) -> Self {
            Self { env }
        }

        /// Register a template from source.
        ///
        /// Fails if the source does not compile.
        pub fn template(
            mut self,
            name: impl Into<String>,
            source: impl Into<String>,
        ) -> Result<Self, MailError> {
            let name = name.into();
            self.env
                .add_template_owned(name.clone(), source.into())
                .map_err(|e| MailError::render(name, e))?;
            Ok(self)
        }
    }

    impl Default for MiniJinjaEngine {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TemplateEngine for MiniJinjaEngine {
        fn render(&self, template: &str, data: &TemplateData) -> Result<String, RenderError> {
            let tmpl = self
                .env
                .get_template(template)
                .map_err(|e| RenderError::new(e.to_string()))?;
            tmpl.render(data)
                .map_err(|e| RenderError::new(e.to_string()))
        }
    }
}
