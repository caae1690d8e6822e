//! Strong type definitions for co-signed documents.
//!
//! Identifiers arriving at the service boundary are untrusted strings; they
//! are parsed into newtypes once so that the rest of the workspace never
//! handles an unchecked value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum accepted length of a document identifier, in bytes.
pub const MAX_DOCUMENT_ID_LEN: usize = 256;

/// Identifier assigned to a document by the external document store.
///
/// Opaque to this system; immutable; the primary key of a record.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse a document id.
    ///
    /// Accepts ASCII alphanumerics, `-` and `_`, which covers every id the
    /// external store hands out and keeps ids safe to splice into URLs.
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDocumentId);
        }
        if trimmed.len() > MAX_DOCUMENT_ID_LEN {
            return Err(ValidationError::DocumentIdTooLong {
                max: MAX_DOCUMENT_ID_LEN,
            });
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ValidationError::InvalidDocumentIdChar(c));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DocumentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

/// An email address identifying a party.
///
/// Equality is exact and case-sensitive: the external store reports the
/// last modifier's address verbatim and the divergence check compares it
/// byte for byte.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse an email address.
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }

        let invalid = || ValidationError::InvalidEmail(trimmed.to_string());
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        if domain.starts_with('.') || domain.ends_with('.') {
            return Err(invalid());
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Access role on the external document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns the document. Only granted to the service's owner account.
    Owner,
    /// Can edit.
    Writer,
    /// Read-only. Used to lock a party out after they sign.
    Reader,
}

impl Role {
    /// Wire name used by the external store.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Writer => "writer",
            Role::Reader => "reader",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "writer" => Ok(Role::Writer),
            "reader" => Ok(Role::Reader),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_accepts_drive_style_ids() {
        let id = DocumentId::parse("1aB-c_D9").unwrap();
        assert_eq!(id.as_str(), "1aB-c_D9");
        assert_eq!(id.to_string(), "1aB-c_D9");
    }

    #[test]
    fn test_document_id_rejects_bad_input() {
        assert_eq!(DocumentId::parse("  "), Err(ValidationError::EmptyDocumentId));
        assert_eq!(
            DocumentId::parse("a/b"),
            Err(ValidationError::InvalidDocumentIdChar('/'))
        );
        assert!(matches!(
            DocumentId::parse("x".repeat(MAX_DOCUMENT_ID_LEN + 1)),
            Err(ValidationError::DocumentIdTooLong { .. })
        ));
    }

    #[test]
    fn test_email_parse() {
        assert_eq!(Email::parse(" a@x.com ").unwrap().as_str(), "a@x.com");
        assert_eq!(Email::parse(""), Err(ValidationError::EmptyEmail));
        assert!(Email::parse("ax.com").is_err());
        assert!(Email::parse("@x.com").is_err());
        assert!(Email::parse("a@").is_err());
        assert!(Email::parse("a@b@c").is_err());
        assert!(Email::parse("a b@x.com").is_err());
        assert!(Email::parse("a@.com").is_err());
    }

    #[test]
    fn test_email_is_case_sensitive() {
        let lower = Email::parse("a@x.com").unwrap();
        let upper = Email::parse("A@x.com").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_serde_rejects_invalid_values() {
        let ok: Email = serde_json::from_str("\"a@x.com\"").unwrap();
        assert_eq!(ok.as_str(), "a@x.com");
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
        assert!(serde_json::from_str::<DocumentId>("\"\"").is_err());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::Reader.to_string(), "reader");
        assert_eq!("writer".parse::<Role>().unwrap(), Role::Writer);
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
        assert!("admin".parse::<Role>().is_err());
    }
}
