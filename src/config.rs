//! Startup configuration.
//!
//! Settings are looked up by dotted key through a [`ConfigSource`]:
//!
//! | Key | Description |
//! |-----|-------------|
//! | `mail.from.address` | Default sender email |
//! | `mail.from.name` | Default sender name |
//! | `mail.pretend` | Log instead of sending (default: false) |
//! | `mail.host` | SMTP server host |
//! | `mail.port` | SMTP server port (default: 587) |
//! | `mail.encryption` | `tls`/`ssl`, `starttls` or `none` (default) |
//! | `mail.username` | SMTP username |
//! | `mail.password` | SMTP password |
//! | `mail.timeout` | SMTP timeout in seconds (default: 30) |
//!
//! [`EnvSource`] maps each key to an environment variable by upper-casing it
//! and replacing dots with underscores (`mail.from.address` → `MAIL_FROM_ADDRESS`).

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::address::Address;
use crate::error::MailError;

/// Key lookup for startup configuration.
pub trait ConfigSource {
    /// Value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl EnvSource {
    /// Environment variable name for a dotted key.
    pub fn var_name(key: &str) -> String {
        key.replace('.', "_").to_uppercase()
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(Self::var_name(key)).ok()
    }
}

/// In-memory configuration, handy for tests and for values loaded elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Settings consumed by [`Mailer::from_settings`](crate::Mailer::from_settings).
#[derive(Debug, Clone, Default)]
pub struct MailSettings {
    /// Default sender, applied to every message.
    pub from: Option<Address>,
    /// Start in pretend mode.
    pub pretend: bool,
    /// SMTP settings, present when `mail.host` is set.
    pub smtp: Option<SmtpSettings>,
}

impl MailSettings {
    /// Read settings from `source`.
    ///
    /// Missing keys fall back to defaults; malformed values are errors.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, MailError> {
        let from = match source.get("mail.from.address") {
            Some(address) if !address.is_empty() => {
                let name = source.get("mail.from.name");
                Some(Address::parse_with_name(name.as_deref(), &address)?)
            }
            _ => None,
        };

        let pretend = match source.get("mail.pretend") {
            Some(value) => parse_bool("mail.pretend", &value)?,
            None => false,
        };

        let smtp = match source.get("mail.host") {
            Some(host) if !host.is_empty() => Some(SmtpSettings::from_source(source)?),
            _ => None,
        };

        Ok(Self {
            from,
            pretend,
            smtp,
        })
    }

    /// Read settings from environment variables.
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_source(&EnvSource)
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encryption {
    /// No TLS (dangerous, only for localhost)
    #[default]
    None,
    /// STARTTLS - upgrade to TLS after connecting (port 587)
    StartTls,
    /// Implicit TLS - connect with TLS from start (port 465)
    Tls,
}

impl std::str::FromStr for Encryption {
    type Err = MailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            other => Err(MailError::Configuration(format!(
                "mail.encryption must be one of tls, ssl, starttls, none (got '{}')",
                other
            ))),
        }
    }
}

/// Connection settings for the SMTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub encryption: Encryption,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl SmtpSettings {
    pub const DEFAULT_PORT: u16 = 587;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Settings for `host` with default port, no encryption and no credentials.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            encryption: Encryption::default(),
            username: None,
            password: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Read SMTP settings from `source`. `mail.host` is required.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, MailError> {
        let host = source
            .get("mail.host")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| MailError::Configuration("mail.host not set".into()))?;

        let mut settings = Self::new(host);

        if let Some(port) = source.get("mail.port") {
            settings.port = port.parse().map_err(|_| {
                MailError::Configuration(format!("mail.port is not a valid port: '{}'", port))
            })?;
        }
        if let Some(encryption) = source.get("mail.encryption") {
            settings.encryption = encryption.parse()?;
        }
        if let Some(timeout) = source.get("mail.timeout") {
            let secs: u64 = timeout.parse().map_err(|_| {
                MailError::Configuration(format!(
                    "mail.timeout must be a number of seconds: '{}'",
                    timeout
                ))
            })?;
            settings.timeout = Duration::from_secs(secs);
        }

        // The password only matters when a username is present.
        settings.username = source.get("mail.username").filter(|u| !u.is_empty());
        if settings.username.is_some() {
            settings.password = Some(source.get("mail.password").unwrap_or_default());
        }

        Ok(settings)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, MailError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MailError::Configuration(format!(
            "{} must be a boolean (got '{}')",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_name() {
        assert_eq!(EnvSource::var_name("mail.from.address"), "MAIL_FROM_ADDRESS");
        assert_eq!(EnvSource::var_name("mail.pretend"), "MAIL_PRETEND");
    }

    #[test]
    fn test_empty_source_gives_defaults() {
        let settings = MailSettings::from_source(&MapSource::new()).unwrap();
        assert!(settings.from.is_none());
        assert!(!settings.pretend);
        assert!(settings.smtp.is_none());
    }

    #[test]
    fn test_from_and_pretend() {
        let source: MapSource = [
            ("mail.from.address", "a@x.com"),
            ("mail.from.name", "A"),
            ("mail.pretend", "true"),
        ]
        .into_iter()
        .collect();

        let settings = MailSettings::from_source(&source).unwrap();
        let from = settings.from.unwrap();
        assert_eq!(from.email, "a@x.com");
        assert_eq!(from.name.as_deref(), Some("A"));
        assert!(settings.pretend);
    }

    #[test]
    fn test_invalid_from_address() {
        let source = MapSource::new().set("mail.from.address", "not an address");
        assert!(matches!(
            MailSettings::from_source(&source),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_empty_host_means_no_smtp() {
        let source = MapSource::new()
            .set("mail.host", "")
            .set("mail.from.address", "a@x.com");

        let settings = MailSettings::from_source(&source).unwrap();
        assert!(settings.smtp.is_none());
        assert_eq!(settings.from.unwrap().email, "a@x.com");
    }

    #[test]
    fn test_invalid_pretend_flag() {
        let source = MapSource::new().set("mail.pretend", "sometimes");
        assert!(matches!(
            MailSettings::from_source(&source),
            Err(MailError::Configuration(_))
        ));
    }

    #[test]
    fn test_smtp_settings() {
        let source = MapSource::new()
            .set("mail.host", "smtp.example.com")
            .set("mail.port", "465")
            .set("mail.encryption", "ssl")
            .set("mail.username", "postmaster")
            .set("mail.password", "hunter2");

        let smtp = MailSettings::from_source(&source).unwrap().smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.encryption, Encryption::Tls);
        assert_eq!(smtp.username.as_deref(), Some("postmaster"));
        assert_eq!(smtp.password.as_deref(), Some("hunter2"));
        assert_eq!(smtp.timeout, SmtpSettings::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_smtp_defaults() {
        let smtp = SmtpSettings::from_source(&MapSource::new().set("mail.host", "localhost")).unwrap();
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.encryption, Encryption::None);
        assert!(smtp.username.is_none());
        assert!(smtp.password.is_none());
    }

    #[test]
    fn test_smtp_bad_port() {
        let source = MapSource::new()
            .set("mail.host", "localhost")
            .set("mail.port", "smtp");
        assert!(matches!(
            SmtpSettings::from_source(&source),
            Err(MailError::Configuration(_))
        ));
    }

    #[test]
    fn test_smtp_requires_host() {
        assert!(SmtpSettings::from_source(&MapSource::new()).is_err());
    }
}
