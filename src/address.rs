//! Mailbox addresses: an email with an optional display name.

use crate::error::MailError;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address with an optional display name.
///
/// ```
/// use letterbox::Address;
///
/// let addr: Address = "user@example.com".into();
/// assert_eq!(addr.email, "user@example.com");
/// assert_eq!(addr.name, None);
///
/// let addr: Address = ("Alice", "alice@example.com").into();
/// assert_eq!(addr.name.as_deref(), Some("Alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Optional display name (e.g., "Alice Smith")
    pub name: Option<String>,
    /// Email address (e.g., "alice@example.com")
    pub email: String,
}

impl Address {
    /// Create an address without a display name.
    ///
    /// Obviously broken addresses are accepted but logged; use
    /// [`Address::parse`] for strict validation.
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();
        warn_if_suspicious(&email);
        Self { name: None, email }
    }

    /// Create an address with a display name.
    ///
    /// An empty name is treated as no name.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        warn_if_suspicious(&email);
        let name = name.into();
        Self {
            name: (!name.is_empty()).then_some(name),
            email,
        }
    }

    /// Parse and validate an email address (RFC 5321/5322).
    ///
    /// ```
    /// use letterbox::Address;
    ///
    /// assert!(Address::parse("user@example.com").is_ok());
    /// assert!(Address::parse("not-an-email").is_err());
    /// ```
    pub fn parse(email: &str) -> Result<Self, MailError> {
        if !EmailAddress::is_valid(email) {
            return Err(MailError::InvalidAddress(format!(
                "'{}' is not a valid email address",
                email
            )));
        }

        Ok(Self {
            name: None,
            email: email.to_string(),
        })
    }

    /// Parse and validate an email address with an optional display name.
    pub fn parse_with_name(name: Option<&str>, email: &str) -> Result<Self, MailError> {
        let mut addr = Self::parse(email)?;
        addr.name = name.filter(|n| !n.is_empty()).map(str::to_string);
        Ok(addr)
    }

    /// The email with its domain converted to ASCII (Punycode).
    ///
    /// ```
    /// use letterbox::Address;
    ///
    /// let addr = Address::new("user@例え.jp");
    /// assert_eq!(addr.to_ascii().unwrap(), "user@xn--r8jz45g.jp");
    /// ```
    pub fn to_ascii(&self) -> Result<String, MailError> {
        let (local, domain) = self.email.split_once('@').ok_or_else(|| {
            MailError::InvalidAddress(format!("'{}' is missing @ symbol", self.email))
        })?;

        let domain = idna::domain_to_ascii(domain).map_err(|e| {
            MailError::InvalidAddress(format!(
                "Failed to convert domain '{}' to ASCII: {:?}",
                domain, e
            ))
        })?;

        Ok(format!("{}@{}", local, domain))
    }

    /// Format as "Name <email>" or just "email" if no name.
    pub fn formatted(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

fn warn_if_suspicious(email: &str) {
    if email.is_empty() || !email.contains('@') {
        tracing::warn!(
            email = %email,
            "Creating address with potentially invalid email. Use Address::parse() for strict validation."
        );
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl<N: AsRef<str>, E: AsRef<str>> From<(N, E)> for Address {
    fn from((name, email): (N, E)) -> Self {
        Self::with_name(name.as_ref(), email.as_ref())
    }
}

/// Types that can be used wherever the message builder expects an address.
///
/// ```rust
/// use letterbox::{Address, ToAddress};
///
/// struct User {
///     name: String,
///     email: String,
/// }
///
/// impl ToAddress for User {
///     fn to_address(&self) -> Address {
///         Address::with_name(&self.name, &self.email)
///     }
/// }
/// ```
pub trait ToAddress {
    fn to_address(&self) -> Address;
}

impl<T: ToAddress + ?Sized> ToAddress for &T {
    fn to_address(&self) -> Address {
        (*self).to_address()
    }
}

impl ToAddress for Address {
    fn to_address(&self) -> Address {
        self.clone()
    }
}

impl ToAddress for str {
    fn to_address(&self) -> Address {
        Address::new(self)
    }
}

impl ToAddress for String {
    fn to_address(&self) -> Address {
        Address::new(self)
    }
}

// (name, email)
impl<N: AsRef<str>, E: AsRef<str>> ToAddress for (N, E) {
    fn to_address(&self) -> Address {
        Address::with_name(self.0.as_ref(), self.1.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let addr: Address = "test@example.com".into();
        assert_eq!(addr.email, "test@example.com");
        assert_eq!(addr.name, None);
    }

    #[test]
    fn test_empty_name_is_dropped() {
        let addr = Address::with_name("", "a@x.com");
        assert_eq!(addr.name, None);
        assert_eq!(addr.formatted(), "a@x.com");
    }

    #[test]
    fn test_formatted() {
        let addr = Address::with_name("Alice", "alice@example.com");
        assert_eq!(addr.formatted(), "Alice <alice@example.com>");
        assert_eq!(addr.to_string(), "Alice <alice@example.com>");
    }

    #[test]
    fn test_parse_with_name() {
        let addr = Address::parse_with_name(Some("A"), "a@x.com").unwrap();
        assert_eq!(addr.name.as_deref(), Some("A"));

        let addr = Address::parse_with_name(None, "a@x.com").unwrap();
        assert!(addr.name.is_none());

        assert!(Address::parse_with_name(Some("A"), "nope").is_err());
    }

    #[test]
    fn test_to_ascii_requires_at() {
        let addr = Address::new("no-at-sign");
        assert!(matches!(addr.to_ascii(), Err(MailError::InvalidAddress(_))));
    }
}
