//! # Cosign Core
//!
//! Pure primitives for two-party document co-signing: identifiers, party
//! slots, sign counters, and the signing transition planner.
//!
//! This crate contains no I/O, no storage, no networking. Every decision the
//! signing protocol makes is computed here; the service crates only carry the
//! decision out against the external document store and the record store.
//!
//! ## Key Types
//!
//! - [`DocumentId`] - Identifier assigned by the external document store
//! - [`Email`] - A party's address, compared by exact match
//! - [`PartySlots`] - The two signer slots; assigned once, never reassigned
//! - [`SignState`] - The `(signed_a, signed_b)` pair
//! - [`DocumentRecord`] - Persisted metadata for one co-signed document
//! - [`SigningPlan`] - Grants plus next sign state for one signing request
//!
//! ## State Machine
//!
//! ```text
//!            A signs             B signs
//!   (0,0) ----------> (1,0) ----------> (1,1)
//!     |                                   ^
//!     |   B signs            A signs      |
//!     +-----------> (0,1) ----------------+
//!
//!   any state --(divergent request)--> withdraw requester, hand over
//! ```

pub mod error;
pub mod party;
pub mod record;
pub mod transition;
pub mod types;

pub use error::{CoreError, ValidationError};
pub use party::{Party, PartySlots, SlotAssignment};
pub use record::{DocumentRecord, SignCounter, SignState};
pub use transition::{plan_signing, Path, SigningPlan};
pub use types::{DocumentId, Email, Role};
