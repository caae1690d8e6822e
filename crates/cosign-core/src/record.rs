//! The persisted metadata of one co-signed document.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::party::{Party, PartySlots, SlotAssignment};
use crate::types::{DocumentId, Email};

/// Per-party sign counter.
///
/// `0` means not currently signed, anything else means signed. State
/// transitions treat the counter as a flag: signing an already-signed party
/// leaves the value alone, and withdrawal always lands on zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignCounter(u32);

impl SignCounter {
    pub const UNSIGNED: Self = Self(0);
    pub const SIGNED: Self = Self(1);

    /// Wrap a raw stored value.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// The raw stored value.
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn is_signed(self) -> bool {
        self.0 > 0
    }

    /// Mark signed. Returns true if this was a 0 -> signed transition.
    pub fn sign(&mut self) -> bool {
        if self.is_signed() {
            false
        } else {
            self.0 = 1;
            true
        }
    }

    /// Clear the signature. Returns true if a signature was withdrawn.
    pub fn withdraw(&mut self) -> bool {
        let was_signed = self.is_signed();
        self.0 = 0;
        was_signed
    }
}

/// The `(signed_a, signed_b)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SignState {
    pub a: SignCounter,
    pub b: SignCounter,
}

impl SignState {
    /// Nobody has signed.
    pub const INITIAL: Self = Self {
        a: SignCounter::UNSIGNED,
        b: SignCounter::UNSIGNED,
    };

    pub const fn from_raw(signed_a: u32, signed_b: u32) -> Self {
        Self {
            a: SignCounter::from_raw(signed_a),
            b: SignCounter::from_raw(signed_b),
        }
    }

    pub fn get(&self, party: Party) -> SignCounter {
        match party {
            Party::A => self.a,
            Party::B => self.b,
        }
    }

    pub fn counter_mut(&mut self, party: Party) -> &mut SignCounter {
        match party {
            Party::A => &mut self.a,
            Party::B => &mut self.b,
        }
    }

    pub fn is_signed(&self, party: Party) -> bool {
        self.get(party).is_signed()
    }

    /// Both parties currently signed.
    pub fn is_complete(&self) -> bool {
        self.a.is_signed() && self.b.is_signed()
    }

    /// Raw `(signed_a, signed_b)` values.
    pub fn raw(&self) -> (u32, u32) {
        (self.a.value(), self.b.value())
    }
}

/// Metadata for one co-signed document.
///
/// Owned by the record store. Callers read a fresh copy per request, mutate
/// it, and write it back; nothing caches a record across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire", into = "RecordWire")]
pub struct DocumentRecord {
    pub document_id: DocumentId,
    pub title: String,
    pub url: String,
    pub parties: PartySlots,
    pub signatures: SignState,
}

impl DocumentRecord {
    /// A new record with the creator in slot A and nobody signed.
    pub fn new(
        document_id: DocumentId,
        title: impl Into<String>,
        url: impl Into<String>,
        creator: Email,
    ) -> Self {
        Self {
            document_id,
            title: title.into(),
            url: url.into(),
            parties: PartySlots::new(creator),
            signatures: SignState::INITIAL,
        }
    }

    /// Rebuild a record from stored columns.
    pub fn from_columns(
        document_id: &str,
        title: String,
        url: String,
        party_a_email: &str,
        party_b_email: Option<&str>,
        signed_a: u32,
        signed_b: u32,
    ) -> Result<Self, ValidationError> {
        let mut parties = PartySlots::new(Email::parse(party_a_email)?);
        if let Some(b) = party_b_email.filter(|b| !b.is_empty()) {
            if parties.assign_b(Email::parse(b)?) != SlotAssignment::Assigned {
                return Err(ValidationError::InvalidEmail(format!(
                    "party b {b} duplicates party a"
                )));
            }
        }

        Ok(Self {
            document_id: DocumentId::parse(document_id)?,
            title,
            url,
            parties,
            signatures: SignState::from_raw(signed_a, signed_b),
        })
    }

    pub fn party_a_email(&self) -> &Email {
        self.parties.a()
    }

    pub fn party_b_email(&self) -> Option<&Email> {
        self.parties.b()
    }

    /// Content fingerprint: blake3 over the canonical CBOR encoding, hex.
    ///
    /// Two records with the same fingerprint are byte-identical in every
    /// persisted field.
    pub fn fingerprint(&self) -> String {
        hex::encode(blake3::hash(&self.canonical_bytes()).as_bytes())
    }

    /// Canonical CBOR encoding of the flat record.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(&RecordWire::from(self.clone()), &mut buf)
            .expect("CBOR serialization into a Vec failed");
        buf
    }
}

/// Flat form of a record, as it crosses the service boundary.
///
/// `party_b_email` is the empty string while slot B is unassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordWire {
    document_id: String,
    title: String,
    url: String,
    party_a_email: String,
    #[serde(default)]
    party_b_email: String,
    #[serde(default)]
    signed_a: u32,
    #[serde(default)]
    signed_b: u32,
}

impl From<DocumentRecord> for RecordWire {
    fn from(record: DocumentRecord) -> Self {
        let (signed_a, signed_b) = record.signatures.raw();
        Self {
            document_id: record.document_id.into(),
            title: record.title,
            url: record.url,
            party_a_email: record.parties.a().to_string(),
            party_b_email: record
                .parties
                .b()
                .map(ToString::to_string)
                .unwrap_or_default(),
            signed_a,
            signed_b,
        }
    }
}

impl TryFrom<RecordWire> for DocumentRecord {
    type Error = ValidationError;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        DocumentRecord::from_columns(
            &wire.document_id,
            wire.title,
            wire.url,
            &wire.party_a_email,
            Some(wire.party_b_email.as_str()),
            wire.signed_a,
            wire.signed_b,
        )
    }
}
