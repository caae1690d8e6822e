//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a Cosigner over the in-memory
//! stores, a fixed cast of emails, and shortcuts for steering the change
//! detector.

use std::sync::Arc;

use cosign::{CosignConfig, Cosigner, DocumentSource};
use cosign_core::{DocumentId, DocumentRecord, Email, Party};
use cosign_drive::MemoryDrive;
use cosign_store::MemoryStore;

/// Creator of every fixture document.
pub const PARTY_A: &str = "a@x.com";
/// Second party of every fixture document.
pub const PARTY_B: &str = "b@x.com";
/// An email that is never a party.
pub const STRANGER: &str = "c@x.com";
/// Service account receiving `owner` on created documents.
pub const OWNER: &str = "svc@x.com";

/// Parse a fixture email.
pub fn email(s: &str) -> Email {
    Email::parse(s).expect("fixture email")
}

/// A Cosigner over in-memory stores.
pub type MemoryCosigner = Cosigner<MemoryStore, MemoryDrive>;

/// A test fixture with a shared in-memory Cosigner.
pub struct TestFixture {
    pub cosigner: Arc<MemoryCosigner>,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Fixture with the owner account configured.
    pub fn new() -> Self {
        Self::with_config(CosignConfig {
            owner_account: Some(email(OWNER)),
            ..CosignConfig::default()
        })
    }

    pub fn with_config(config: CosignConfig) -> Self {
        Self {
            cosigner: Arc::new(Cosigner::new(MemoryStore::new(), MemoryDrive::new(), config)),
        }
    }

    pub fn drive(&self) -> &MemoryDrive {
        self.cosigner.drive()
    }

    pub fn email_of(party: Party) -> Email {
        match party {
            Party::A => email(PARTY_A),
            Party::B => email(PARTY_B),
        }
    }

    /// A document created by party A, party B not yet assigned.
    pub async fn one_party_document(&self, title: &str) -> DocumentRecord {
        self.cosigner
            .create_document(&email(PARTY_A), DocumentSource::Title(title.to_string()))
            .await
            .expect("fixture document creation")
    }

    /// A document with both parties assigned and nobody signed.
    pub async fn two_party_document(&self) -> DocumentId {
        let record = self.one_party_document("Lease").await;
        self.cosigner
            .grant_access(&record.document_id, &email(PARTY_B))
            .await
            .expect("fixture access grant");
        record.document_id
    }

    /// Make the next signing request by `requester` diverged or not.
    ///
    /// Not diverged: the requester modified the document last. Diverged:
    /// the other party did.
    pub fn steer(&self, document_id: &DocumentId, requester: Party, diverged: bool) {
        let modifier = if diverged { requester.other() } else { requester };
        self.drive()
            .set_last_modifier(document_id, &Self::email_of(modifier));
    }

    /// Steer the detector, then sign.
    pub async fn sign_as(
        &self,
        document_id: &DocumentId,
        requester: Party,
        diverged: bool,
    ) -> cosign::Result<DocumentRecord> {
        self.steer(document_id, requester, diverged);
        self.cosigner
            .sign(document_id, &Self::email_of(requester))
            .await
    }

    /// Current stored record.
    pub async fn record(&self, document_id: &DocumentId) -> DocumentRecord {
        self.cosigner
            .get_document(document_id)
            .await
            .expect("fixture record read")
            .expect("fixture record exists")
    }
}
