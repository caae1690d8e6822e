//! The raw external document store contract.

use std::fmt;

use async_trait::async_trait;
use cosign_core::{DocumentId, Email, Role};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MIME type of documents created by the service.
pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

/// Identifier the external store assigns to a grant.
///
/// The store resolves one id per email address; updating a grant requires
/// resolving it first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(pub String);

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user grant on one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub email: Email,
    pub role: Role,
    /// Whether the external store should email the grantee.
    pub send_notification_emails: bool,
}

impl Grant {
    /// A grant that never triggers a notification email.
    pub fn silent(email: Email, role: Role) -> Self {
        Self {
            email,
            role,
            send_notification_emails: false,
        }
    }
}

/// Metadata of a document on the external store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub id: DocumentId,
    pub title: String,
}

/// Async interface to the external document store.
///
/// Implementations must be thread-safe (Send + Sync). A single instance is
/// created per process and shared by every request.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Create an empty document.
    async fn create_document(&self, title: &str) -> Result<FileMeta>;

    /// Copy a template document, keeping the template's title.
    async fn copy_template(&self, template_id: &DocumentId) -> Result<FileMeta>;

    /// Insert a new grant.
    async fn insert_permission(&self, document_id: &DocumentId, grant: &Grant) -> Result<PermissionId>;

    /// Resolve the permission id the store uses for an email.
    async fn permission_id_for_email(&self, email: &Email) -> Result<PermissionId>;

    /// Change the role of an existing grant.
    async fn update_permission(
        &self,
        document_id: &DocumentId,
        permission_id: &PermissionId,
        grant: &Grant,
    ) -> Result<()>;

    /// The last user to modify the document, if the store reports one.
    async fn last_modifying_user(&self, document_id: &DocumentId) -> Result<Option<Email>>;
}
