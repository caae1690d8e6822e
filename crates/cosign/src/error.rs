//! Error types for the Cosigner.

use std::time::Duration;

use cosign_core::{CoreError, DocumentId, ValidationError};
use cosign_drive::DriveError;
use cosign_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Cosigner operations.
///
/// Every error is request-scoped: when one is returned, no record change
/// from that request has been committed.
#[derive(Debug, Error)]
pub enum CosignError {
    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request does not fit the document's parties.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The external document store failed.
    #[error("external store error: {0}")]
    Drive(#[from] DriveError),

    /// The external phase of a request ran past its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request is incomplete (e.g. neither a title nor a template).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The error taxonomy callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Unknown document or party.
    NotFound,
    /// The external store rejected, failed, or timed out.
    Upstream,
    /// Missing or invalid input.
    Malformed,
    /// Our own record store failed.
    Storage,
}

impl CosignError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CosignError::Validation(_) | CosignError::InvalidRequest(_) => ErrorClass::Malformed,
            CosignError::Core(e) => match e {
                CoreError::Validation(_) | CoreError::SlotsFull { .. } => ErrorClass::Malformed,
                CoreError::NotAParty { .. } | CoreError::PartyUnassigned { .. } => {
                    ErrorClass::NotFound
                }
            },
            CosignError::Store(e) => match e {
                StoreError::NotFound(_) => ErrorClass::NotFound,
                StoreError::SlotsFull(_) => ErrorClass::Malformed,
                _ => ErrorClass::Storage,
            },
            CosignError::Drive(e) => match e {
                DriveError::NotFound(_) => ErrorClass::NotFound,
                _ => ErrorClass::Upstream,
            },
            CosignError::Timeout(_) => ErrorClass::Upstream,
        }
    }

    /// Whether the request failed because a deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            CosignError::Timeout(_) | CosignError::Drive(DriveError::Timeout)
        )
    }

    pub(crate) fn not_found(document_id: &DocumentId) -> Self {
        CosignError::Store(StoreError::NotFound(document_id.clone()))
    }
}

/// Result type for Cosigner operations.
pub type Result<T> = std::result::Result<T, CosignError>;
