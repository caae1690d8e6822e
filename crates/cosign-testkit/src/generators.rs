//! Proptest generators for property-based testing.

use proptest::prelude::*;

use cosign_core::{DocumentId, DocumentRecord, Email, Party, SignState};
use cosign_drive::DriveOp;

/// Generate a valid email address.
pub fn email() -> impl Strategy<Value = Email> {
    ("[a-z][a-z0-9._]{0,11}", "[a-z]{1,8}\\.(com|org|io)")
        .prop_map(|(local, domain)| Email::parse(format!("{local}@{domain}")).expect("generated email"))
}

/// Generate a valid document id.
pub fn document_id() -> impl Strategy<Value = DocumentId> {
    "[A-Za-z0-9_-]{1,44}".prop_map(|s| DocumentId::parse(s).expect("generated document id"))
}

/// Generate a party.
pub fn party() -> impl Strategy<Value = Party> {
    prop_oneof![Just(Party::A), Just(Party::B)]
}

/// Generate a sign state with flag-valued counters.
pub fn sign_state() -> impl Strategy<Value = SignState> {
    (0u32..=1, 0u32..=1).prop_map(|(a, b)| SignState::from_raw(a, b))
}

/// Generate a record, with or without party B.
pub fn record() -> impl Strategy<Value = DocumentRecord> {
    (
        document_id(),
        "[A-Za-z ]{1,20}",
        email(),
        proptest::option::of(email()),
        sign_state(),
    )
        .prop_map(|(id, title, a, b, signatures)| {
            let url = format!("https://docs.google.com/document/d/{id}/");
            let mut record = DocumentRecord::new(id, title, url, a);
            if let Some(b) = b {
                record.parties.assign_b(b);
            }
            record.signatures = signatures;
            record
        })
}

/// One signing request in a scripted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignStep {
    pub requester: Party,
    pub diverged: bool,
    /// External call to fail during this step, if any.
    pub fault: Option<DriveOp>,
}

/// Generate a signing step; roughly one in six carries a fault.
pub fn sign_step() -> impl Strategy<Value = SignStep> {
    let fault = prop_oneof![
        5 => Just(None),
        1 => prop_oneof![
            Just(Some(DriveOp::LastModifyingUser)),
            Just(Some(DriveOp::PermissionIdForEmail)),
            Just(Some(DriveOp::UpdatePermission)),
        ],
    ];
    (party(), any::<bool>(), fault).prop_map(|(requester, diverged, fault)| SignStep {
        requester,
        diverged,
        fault,
    })
}

/// Generate a scripted run of signing requests.
pub fn sign_steps(max_len: usize) -> impl Strategy<Value = Vec<SignStep>> {
    prop::collection::vec(sign_step(), 1..=max_len)
}
