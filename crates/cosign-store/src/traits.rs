//! RecordStore trait: the abstract interface for document record persistence.
//!
//! This trait keeps the signing service storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use cosign_core::{DocumentId, DocumentRecord, Email, Party, SignState};

use crate::error::{Result, StoreError};

/// Result of creating a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateResult {
    /// Record was inserted.
    Created,
    /// A record with this document id already exists (not an error).
    AlreadyExists,
}

/// The RecordStore trait: async interface for document records.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, `spawn_blocking` keeps the runtime free.
///
/// # Design Notes
///
/// - Every write touches exactly one row and is atomic on its own.
/// - The store does not serialize read-modify-write sequences; callers
///   hold a per-document lock around them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record.
    async fn create(&self, record: &DocumentRecord) -> Result<CreateResult>;

    /// Get a record by document id.
    async fn get(&self, document_id: &DocumentId) -> Result<Option<DocumentRecord>>;

    /// All records where `email` is party A or party B, ordered by id.
    async fn list_by_email(&self, email: &Email) -> Result<Vec<DocumentRecord>>;

    /// Assign party B.
    ///
    /// Idempotent when `email` already holds a slot. Fails with
    /// `SlotsFull` when slot B holds a different email.
    async fn set_party_b(&self, document_id: &DocumentId, email: &Email) -> Result<DocumentRecord>;

    /// Overwrite both sign counters in a single write.
    async fn update_signatures(
        &self,
        document_id: &DocumentId,
        signatures: SignState,
    ) -> Result<DocumentRecord>;
}

/// Extension trait for single-party counter changes.
///
/// Both methods read and then write; the caller must hold the document's
/// lock for the duration.
pub trait RecordStoreExt: RecordStore {
    /// Mark `party` signed.
    fn increment_sign(
        &self,
        document_id: &DocumentId,
        party: Party,
    ) -> impl std::future::Future<Output = Result<DocumentRecord>> + Send;

    /// Clear `party`'s signature.
    fn withdraw_sign(
        &self,
        document_id: &DocumentId,
        party: Party,
    ) -> impl std::future::Future<Output = Result<DocumentRecord>> + Send;

    /// Get a record, failing with `NotFound` if absent.
    fn require(
        &self,
        document_id: &DocumentId,
    ) -> impl std::future::Future<Output = Result<DocumentRecord>> + Send;
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {
    async fn increment_sign(&self, document_id: &DocumentId, party: Party) -> Result<DocumentRecord> {
        let record = self.require(document_id).await?;
        let mut signatures = record.signatures;
        if !signatures.counter_mut(party).sign() {
            return Ok(record);
        }
        self.update_signatures(document_id, signatures).await
    }

    async fn withdraw_sign(&self, document_id: &DocumentId, party: Party) -> Result<DocumentRecord> {
        let record = self.require(document_id).await?;
        let mut signatures = record.signatures;
        if !signatures.counter_mut(party).withdraw() {
            return Ok(record);
        }
        self.update_signatures(document_id, signatures).await
    }

    async fn require(&self, document_id: &DocumentId) -> Result<DocumentRecord> {
        self.get(document_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(document_id.clone()))
    }
}
