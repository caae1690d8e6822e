//! # Cosign Testkit
//!
//! Testing utilities for the cosign workspace.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a Cosigner over the in-memory stores with a fixed cast of
//!   parties, plus shortcuts for steering the change detector
//! - **Generators**: Proptest strategies for records and scripted signing runs
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use cosign_core::Party;
//! use cosign_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let id = fixture.two_party_document().await;
//!     let record = fixture.sign_as(&id, Party::A, false).await.unwrap();
//!     assert_eq!(record.signatures.raw(), (1, 0));
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cosign_testkit::generators::sign_steps;
//!
//! proptest! {
//!     #[test]
//!     fn runs_never_corrupt_records(steps in sign_steps(12)) {
//!         // replay `steps` against a fixture
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{email, MemoryCosigner, TestFixture, OWNER, PARTY_A, PARTY_B, STRANGER};
