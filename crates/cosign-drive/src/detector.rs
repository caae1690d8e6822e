//! Change detection.
//!
//! Point-in-time check of who touched a document last. It is not a diff:
//! "party X edited twice in a row" and "nobody edited" look the same.

use std::sync::Arc;

use cosign_core::{DocumentId, Email};

use crate::error::Result;
use crate::service::DocumentService;

/// Compares the external store's last modifier against an expected signer.
pub struct ChangeDetector<D: DocumentService + ?Sized> {
    service: Arc<D>,
}

impl<D: DocumentService + ?Sized> Clone for ChangeDetector<D> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<D: DocumentService + ?Sized> ChangeDetector<D> {
    pub fn new(service: Arc<D>) -> Self {
        Self { service }
    }

    /// True when the last modifier is not `expected` (exact match).
    ///
    /// A document without a reported last modifier counts as diverged.
    pub async fn has_diverged_since(&self, document_id: &DocumentId, expected: &Email) -> Result<bool> {
        let last = self.service.last_modifying_user(document_id).await?;
        let diverged = last.as_ref() != Some(expected);

        tracing::debug!(
            document_id = %document_id,
            expected = %expected,
            last_modifier = last.as_ref().map(Email::as_str).unwrap_or("<none>"),
            diverged,
            "divergence check"
        );
        Ok(diverged)
    }
}
