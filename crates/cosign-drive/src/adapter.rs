//! Permission adapter.
//!
//! Ensures an email holds exactly one grant with a given role. Known
//! parties already have a grant, so theirs is updated in place; anyone
//! else gets a fresh grant.

use std::sync::Arc;

use cosign_core::{DocumentId, DocumentRecord, Email, Role};

use crate::error::Result;
use crate::service::{DocumentService, Grant, PermissionId};

/// What the adapter did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    Inserted(PermissionId),
    Updated(PermissionId),
}

/// Grants and updates roles on the external store.
pub struct PermissionAdapter<D: DocumentService + ?Sized> {
    service: Arc<D>,
}

impl<D: DocumentService + ?Sized> Clone for PermissionAdapter<D> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<D: DocumentService + ?Sized> PermissionAdapter<D> {
    pub fn new(service: Arc<D>) -> Self {
        Self { service }
    }

    /// Make `email` hold `role` on the record's document.
    ///
    /// Errors from the external store are returned unchanged.
    pub async fn grant_or_update(
        &self,
        record: &DocumentRecord,
        email: &Email,
        role: Role,
    ) -> Result<GrantOutcome> {
        let grant = Grant::silent(email.clone(), role);

        if record.parties.is_party(email) {
            let permission_id = self.service.permission_id_for_email(email).await?;
            self.service
                .update_permission(&record.document_id, &permission_id, &grant)
                .await?;
            tracing::debug!(
                document_id = %record.document_id,
                email = %email,
                role = %role,
                "permission updated"
            );
            Ok(GrantOutcome::Updated(permission_id))
        } else {
            let permission_id = self
                .service
                .insert_permission(&record.document_id, &grant)
                .await?;
            tracing::debug!(
                document_id = %record.document_id,
                email = %email,
                role = %role,
                "permission inserted"
            );
            Ok(GrantOutcome::Inserted(permission_id))
        }
    }

    /// Insert a grant on a document that has no record yet.
    pub async fn insert(&self, document_id: &DocumentId, email: &Email, role: Role) -> Result<PermissionId> {
        let grant = Grant::silent(email.clone(), role);
        self.service.insert_permission(document_id, &grant).await
    }
}
