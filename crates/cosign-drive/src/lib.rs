//! # Cosign Drive
//!
//! The external document store, seen from the signing protocol.
//!
//! ## Overview
//!
//! The external store owns document content and access permissions. This
//! crate wraps it behind the [`DocumentService`] trait and builds the two
//! collaborators the signing state machine talks to:
//!
//! - [`PermissionAdapter`] - ensures an email holds exactly one grant with a
//!   given role, updating an existing grant in place instead of duplicating it
//! - [`ChangeDetector`] - answers whether someone other than the expected
//!   signer touched the document last
//!
//! ## Backends
//!
//! - [`DriveClient`] - Drive v2 REST over reqwest
//! - [`MemoryDrive`] - in-memory fake with failure injection, for tests
//!
//! Notification emails are always suppressed when granting: the external
//! store rate-limits sharing notifications.

pub mod adapter;
pub mod client;
pub mod detector;
pub mod error;
pub mod memory;
pub mod service;

pub use adapter::{GrantOutcome, PermissionAdapter};
pub use client::{DriveClient, DriveConfig};
pub use detector::ChangeDetector;
pub use error::{DriveError, Result};
pub use memory::{DriveCall, DriveOp, MemoryDrive};
pub use service::{DocumentService, FileMeta, Grant, PermissionId, DOCUMENT_MIME_TYPE};
