//! Per-document mutual exclusion.
//!
//! One async mutex per document id. A request holds its document's guard
//! from the first record read until the commit, so two signers on the same
//! document never interleave their read-modify-write. Documents never
//! contend with each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cosign_core::DocumentId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard for one document; released on drop.
pub type DocumentGuard = OwnedMutexGuard<()>;

/// Table of per-document locks.
#[derive(Default)]
pub struct LockTable {
    locks: Mutex<HashMap<DocumentId, Arc<AsyncMutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a document.
    pub async fn acquire(&self, document_id: &DocumentId) -> DocumentGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Entries only the table references are idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(document_id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of documents with a live entry.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
