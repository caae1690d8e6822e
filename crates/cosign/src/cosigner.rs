//! The Cosigner: the signing protocol over two stores.
//!
//! Every request follows the same order: take the document's lock, read a
//! fresh record, run every external-store call under the request deadline,
//! and only then commit to the record store. An error or timeout anywhere
//! before the commit leaves the record untouched.

use std::future::Future;
use std::sync::Arc;

use cosign_core::{plan_signing, CoreError, DocumentId, DocumentRecord, Email, Path, Role, SlotAssignment};
use cosign_drive::{ChangeDetector, DocumentService, PermissionAdapter};
use cosign_store::{CreateResult, RecordStore, RecordStoreExt};

use crate::config::CosignConfig;
use crate::error::{CosignError, Result};
use crate::locks::LockTable;

/// Where a new document's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// An empty document with this title.
    Title(String),
    /// A copy of an existing document, keeping its title.
    Template(DocumentId),
}

/// The main Cosigner struct.
///
/// Provides:
/// - Document creation (blank or from a template)
/// - Granting access to the second party
/// - The signing state machine
/// - Listing a party's documents
pub struct Cosigner<S: RecordStore, D: DocumentService> {
    /// The record store.
    store: S,
    /// The external document store client, shared by the adapters.
    drive: Arc<D>,
    permissions: PermissionAdapter<D>,
    detector: ChangeDetector<D>,
    config: CosignConfig,
    locks: LockTable,
}

impl<S: RecordStore, D: DocumentService> Cosigner<S, D> {
    /// Create a new Cosigner.
    pub fn new(store: S, drive: D, config: CosignConfig) -> Self {
        let drive = Arc::new(drive);
        Self {
            store,
            permissions: PermissionAdapter::new(Arc::clone(&drive)),
            detector: ChangeDetector::new(Arc::clone(&drive)),
            drive,
            config,
            locks: LockTable::new(),
        }
    }

    /// Get the record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the external document store client.
    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn config(&self) -> &CosignConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signing
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a signing request from `email` on a document.
    ///
    /// When the requester was the last to modify the document, they are
    /// locked to `reader` and counted as signed. Otherwise their signature
    /// is withdrawn and the counterpart roles are swapped: whoever is
    /// unsigned gets `writer` back and the other party is re-locked and
    /// counted.
    pub async fn sign(&self, document_id: &DocumentId, email: &Email) -> Result<DocumentRecord> {
        let _guard = self.locks.acquire(document_id).await;
        let record = self.store.require(document_id).await?;

        // Reject strangers before touching the external store.
        if !record.parties.is_party(email) {
            return Err(CoreError::NotAParty {
                document_id: document_id.clone(),
                email: email.to_string(),
            }
            .into());
        }

        let plan = self
            .bounded(async {
                let diverged = self.detector.has_diverged_since(document_id, email).await?;
                let plan = plan_signing(&record, email, diverged)?;
                for (grantee, role) in &plan.grants {
                    self.permissions.grant_or_update(&record, grantee, *role).await?;
                }
                Ok::<_, CosignError>(plan)
            })
            .await?;

        let committed = if plan.changes_record() {
            self.store.update_signatures(document_id, plan.next).await?
        } else {
            record
        };

        let (signed_a, signed_b) = committed.signatures.raw();
        tracing::info!(
            document_id = %document_id,
            email = %email,
            path = path_name(&plan.path),
            signed_a,
            signed_b,
            fingerprint = %committed.fingerprint(),
            "sign request committed"
        );
        Ok(committed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Give `email` editing rights and make them party B if the slot is free.
    ///
    /// Idempotent for existing parties. A party whose signature is recorded
    /// keeps its `reader` lock: the record is returned without any external
    /// call. A third distinct email is rejected before any external call.
    pub async fn grant_access(&self, document_id: &DocumentId, email: &Email) -> Result<DocumentRecord> {
        let _guard = self.locks.acquire(document_id).await;
        let record = self.store.require(document_id).await?;

        let assignment = record.parties.check_b(email);
        match assignment {
            SlotAssignment::Full => {
                return Err(CoreError::SlotsFull {
                    document_id: document_id.clone(),
                }
                .into());
            }
            SlotAssignment::AlreadyParty(party) if record.signatures.is_signed(party) => {
                tracing::debug!(
                    document_id = %document_id,
                    email = %email,
                    party = ?party,
                    "party already signed; access left locked"
                );
                return Ok(record);
            }
            _ => {}
        }

        self.bounded(async {
            self.permissions
                .grant_or_update(&record, email, Role::Writer)
                .await?;
            Ok::<_, CosignError>(())
        })
        .await?;

        let committed = match assignment {
            SlotAssignment::Assigned => self.store.set_party_b(document_id, email).await?,
            _ => record,
        };

        tracing::info!(
            document_id = %document_id,
            email = %email,
            assigned = assignment == SlotAssignment::Assigned,
            fingerprint = %committed.fingerprint(),
            "access granted"
        );
        Ok(committed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a document on the external store and record `email` as party A.
    ///
    /// The configured owner account receives `owner`, the creator `writer`.
    pub async fn create_document(&self, email: &Email, source: DocumentSource) -> Result<DocumentRecord> {
        if let DocumentSource::Title(title) = &source {
            if title.trim().is_empty() {
                return Err(CosignError::InvalidRequest(
                    "a title or a template id is required".to_string(),
                ));
            }
        }

        let meta = self
            .bounded(async {
                let meta = match &source {
                    DocumentSource::Title(title) => self.drive.create_document(title).await?,
                    DocumentSource::Template(template_id) => {
                        self.drive.copy_template(template_id).await?
                    }
                };
                if let Some(owner) = &self.config.owner_account {
                    self.permissions.insert(&meta.id, owner, Role::Owner).await?;
                }
                self.permissions.insert(&meta.id, email, Role::Writer).await?;
                Ok::<_, CosignError>(meta)
            })
            .await?;

        let url = self.config.document_url(&meta.id);
        let record = DocumentRecord::new(meta.id, meta.title, url, email.clone());

        let committed = match self.store.create(&record).await? {
            CreateResult::Created => record,
            CreateResult::AlreadyExists => {
                tracing::warn!(
                    document_id = %record.document_id,
                    "external store reused a document id; keeping the existing record"
                );
                self.store
                    .get(&record.document_id)
                    .await?
                    .ok_or_else(|| CosignError::not_found(&record.document_id))?
            }
        };

        tracing::info!(
            document_id = %committed.document_id,
            email = %email,
            from_template = matches!(source, DocumentSource::Template(_)),
            fingerprint = %committed.fingerprint(),
            "document created"
        );
        Ok(committed)
    }

    /// Documents where `email` is party A or party B, ordered by id.
    pub async fn list_documents(&self, email: &Email) -> Result<Vec<DocumentRecord>> {
        Ok(self.store.list_by_email(email).await?)
    }

    /// Get one record.
    pub async fn get_document(&self, document_id: &DocumentId) -> Result<Option<DocumentRecord>> {
        Ok(self.store.get(document_id).await?)
    }

    /// Run the external phase of a request under the request deadline.
    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.config.request_timeout;
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?limit, "external phase timed out");
                Err(CosignError::Timeout(limit))
            }
        }
    }
}

fn path_name(path: &Path) -> &'static str {
    match path {
        Path::Confirm { .. } => "confirm",
        Path::Handover { .. } => "handover",
    }
}
