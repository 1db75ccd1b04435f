//! Account email type.
//!
//! The server keys every account, cart and order history by the email it
//! returned at login. [`Email`] carries that key exactly as sent: no trimming,
//! no case folding and no address syntax checks, so every request addresses
//! the same account the server authenticated.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty or only whitespace.
    #[error("email cannot be empty")]
    Empty,
}

/// The email identifying a store account.
///
/// ## Examples
///
/// ```
/// use ai_store_core::Email;
///
/// let email = Email::parse("Shopper@Example.COM").unwrap();
/// assert_eq!(email.as_str(), "Shopper@Example.COM");
/// assert_eq!(email.domain(), Some("Example.COM"));
///
/// assert!(Email::parse("guest").is_ok());
/// assert!(Email::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Wrap an account email, keeping it verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] if the input is blank.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.trim().is_empty() {
            return Err(EmailError::Empty);
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the email as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The part before the first `@`, if there is one.
    #[must_use]
    pub fn local_part(&self) -> Option<&str> {
        self.0.split_once('@').map(|(local, _)| local)
    }

    /// Everything after the first `@`, if there is one.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
