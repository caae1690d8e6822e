//! # Cosign
//!
//! Two-party document co-signing on top of an external document store.
//!
//! ## Overview
//!
//! A document has two parties, A (its creator) and B (the first other
//! email granted access). Each signs by asking the service to lock their
//! edits. The external store's "last modified by" field decides what a
//! signing request means:
//!
//! - **Requester touched it last**: lock the requester to `reader` and count
//!   their signature.
//! - **Someone else touched it last**: the requester's signature is void.
//!   The unsigned party gets `writer` back and the other party is re-locked
//!   and counted.
//!
//! ## Consistency
//!
//! There is no transaction spanning the external store and the record
//! store. Every request runs its external calls first, under a deadline and
//! a per-document lock, and commits the record last. A failed or timed-out
//! request leaves the record exactly as it was, so clients may retry.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cosign::{Cosigner, CosignConfig, DocumentSource};
//! use cosign::core::Email;
//! use cosign::drive::MemoryDrive;
//! use cosign::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("cosign.db").unwrap();
//!     let cosigner = Cosigner::new(store, MemoryDrive::new(), CosignConfig::default());
//!
//!     let alice = Email::parse("alice@example.com").unwrap();
//!     let bob = Email::parse("bob@example.com").unwrap();
//!
//!     let record = cosigner
//!         .create_document(&alice, DocumentSource::Title("Lease".into()))
//!         .await
//!         .unwrap();
//!     cosigner.grant_access(&record.document_id, &bob).await.unwrap();
//!     cosigner.sign(&record.document_id, &alice).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `cosign::core` - records, parties, the pure transition planner
//! - `cosign::store` - record store abstraction and SQLite
//! - `cosign::drive` - external document store client and adapters

pub mod config;
pub mod cosigner;
pub mod error;
pub mod locks;

// Re-export component crates
pub use cosign_core as core;
pub use cosign_drive as drive;
pub use cosign_store as store;

// Re-export main types for convenience
pub use config::{CosignConfig, DEFAULT_URL_BASE};
pub use cosigner::{Cosigner, DocumentSource};
pub use error::{CosignError, ErrorClass, Result};
pub use locks::{DocumentGuard, LockTable};

// Re-export commonly used core types
pub use cosign_core::{DocumentId, DocumentRecord, Email, Party, Role, SignState};
