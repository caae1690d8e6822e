//! # Cosign Store
//!
//! Persistence for [`DocumentRecord`]s. Provides a trait-based interface
//! with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - The async trait for all record operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`RecordStoreExt`] - Single-party sign/withdraw helpers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cosign_core::{DocumentId, DocumentRecord, Email};
//! use cosign_store::{RecordStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("cosign.db").unwrap();
//!
//!     let record = DocumentRecord::new(
//!         DocumentId::parse("d1").unwrap(),
//!         "Lease",
//!         "https://docs.google.com/document/d/d1/",
//!         Email::parse("a@x.com").unwrap(),
//!     );
//!     store.create(&record).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent creates**: Creating the same record twice returns `AlreadyExists`
//! - **Single-row commits**: `update_signatures` writes both counters in one statement
//! - **No locking here**: read-modify-write sequences are serialized by the caller
//!
//! [`DocumentRecord`]: cosign_core::DocumentRecord

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CreateResult, RecordStore, RecordStoreExt};
