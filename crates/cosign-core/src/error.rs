//! Error types for Cosign Core.

use thiserror::Error;

use crate::party::Party;
use crate::types::DocumentId;

/// Malformed input: identifiers or addresses that fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("document id is empty")]
    EmptyDocumentId,

    #[error("document id exceeds {max} bytes")]
    DocumentIdTooLong { max: usize },

    #[error("document id contains invalid character {0:?}")]
    InvalidDocumentIdChar(char),

    #[error("email is empty")]
    EmptyEmail,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Errors raised while planning a transition over a document record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The email is not one of the document's parties.
    #[error("{email} is not a party to document {document_id}")]
    NotAParty { document_id: DocumentId, email: String },

    /// The operation needs a party slot that has not been assigned yet.
    #[error("party {party:?} is not assigned on document {document_id}")]
    PartyUnassigned { document_id: DocumentId, party: Party },

    /// Both slots are taken by other emails.
    #[error("document {document_id} already has two parties")]
    SlotsFull { document_id: DocumentId },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
