//! In-memory implementation of the RecordStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use cosign_core::{DocumentId, DocumentRecord, Email, SignState, SlotAssignment};

use crate::error::{Result, StoreError};
use crate::traits::{CreateResult, RecordStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    records: RwLock<BTreeMap<DocumentId, DocumentRecord>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<DocumentId, DocumentRecord>>> {
        self.records
            .read()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<DocumentId, DocumentRecord>>> {
        self.records
            .write()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {e}")))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, record: &DocumentRecord) -> Result<CreateResult> {
        let mut records = self.write()?;
        if records.contains_key(&record.document_id) {
            return Ok(CreateResult::AlreadyExists);
        }
        records.insert(record.document_id.clone(), record.clone());
        Ok(CreateResult::Created)
    }

    async fn get(&self, document_id: &DocumentId) -> Result<Option<DocumentRecord>> {
        Ok(self.read()?.get(document_id).cloned())
    }

    async fn list_by_email(&self, email: &Email) -> Result<Vec<DocumentRecord>> {
        Ok(self
            .read()?
            .values()
            .filter(|r| r.parties.is_party(email))
            .cloned()
            .collect())
    }

    async fn set_party_b(&self, document_id: &DocumentId, email: &Email) -> Result<DocumentRecord> {
        let mut records = self.write()?;
        let record = records
            .get_mut(document_id)
            .ok_or_else(|| StoreError::NotFound(document_id.clone()))?;

        if record.parties.assign_b(email.clone()) == SlotAssignment::Full {
            return Err(StoreError::SlotsFull(document_id.clone()));
        }
        Ok(record.clone())
    }

    async fn update_signatures(
        &self,
        document_id: &DocumentId,
        signatures: SignState,
    ) -> Result<DocumentRecord> {
        let mut records = self.write()?;
        let record = records
            .get_mut(document_id)
            .ok_or_else(|| StoreError::NotFound(document_id.clone()))?;
        record.signatures = signatures;
        Ok(record.clone())
    }
}
