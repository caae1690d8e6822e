//! Signing transition planning.
//!
//! Given a fresh record, the requesting email and the result of the
//! divergence check, decide which permission grants to issue and what the
//! sign state becomes. Planning is pure: the caller issues the grants and
//! commits `next` only once every grant has succeeded.

use crate::error::{CoreError, Result};
use crate::party::Party;
use crate::record::{DocumentRecord, SignState};
use crate::types::{Email, Role};

/// Which branch of the state machine a request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Path {
    /// The requester was the last to touch the document: lock them and
    /// count their signature.
    Confirm { party: Party },
    /// Someone else touched the document: the requester's signature is
    /// void, `unlocked` gets editing rights back and `counted` is re-locked
    /// and counted as signed.
    Handover { unlocked: Party, counted: Party },
}

/// The decision for one signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningPlan {
    /// Slot of the requesting email.
    pub requester: Party,
    pub path: Path,
    /// Grants to issue, in order.
    pub grants: Vec<(Email, Role)>,
    pub previous: SignState,
    pub next: SignState,
}

impl SigningPlan {
    /// Whether committing the plan changes the stored counters.
    pub fn changes_record(&self) -> bool {
        self.previous != self.next
    }
}

/// Plan a signing request.
///
/// `diverged` is the answer of the change detector for `(document, requester)`:
/// true when the external store's last modifier is not the requester.
pub fn plan_signing(record: &DocumentRecord, requester: &Email, diverged: bool) -> Result<SigningPlan> {
    let party = record
        .parties
        .party_of(requester)
        .ok_or_else(|| CoreError::NotAParty {
            document_id: record.document_id.clone(),
            email: requester.to_string(),
        })?;

    let previous = record.signatures;
    let mut next = previous;

    if !diverged {
        next.counter_mut(party).sign();
        return Ok(SigningPlan {
            requester: party,
            path: Path::Confirm { party },
            grants: vec![(requester.clone(), Role::Reader)],
            previous,
            next,
        });
    }

    // The document changed under the requester: their signature is void.
    next.counter_mut(party).withdraw();

    // The requester's counter is now clear, so A being signed means the
    // requester is B.
    let (unlocked, counted) = if next.a.is_signed() {
        (Party::B, Party::A)
    } else {
        (Party::A, Party::B)
    };

    let email_of = |p: Party| {
        record
            .parties
            .email(p)
            .cloned()
            .ok_or_else(|| CoreError::PartyUnassigned {
                document_id: record.document_id.clone(),
                party: p,
            })
    };
    let grants = vec![
        (email_of(unlocked)?, Role::Writer),
        (email_of(counted)?, Role::Reader),
    ];
    next.counter_mut(counted).sign();

    Ok(SigningPlan {
        requester: party,
        path: Path::Handover { unlocked, counted },
        grants,
        previous,
        next,
    })
}
