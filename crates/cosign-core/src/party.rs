//! Party slots.
//!
//! A document has exactly two signer slots. Slot A is filled when the
//! document is created; slot B is filled the first time a second, distinct
//! email is granted access. Once filled, a slot is never reassigned.

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// One of the two signers of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    A,
    B,
}

impl Party {
    /// The counterpart.
    pub const fn other(self) -> Party {
        match self {
            Party::A => Party::B,
            Party::B => Party::A,
        }
    }
}

/// The document's signer slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartySlots {
    /// Only the creator is known.
    OnlyA { a: Email },
    /// Both parties are known.
    Both { a: Email, b: Email },
}

/// Outcome of offering an email for slot B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAssignment {
    /// Slot B was empty and now holds the email.
    Assigned,
    /// The email already occupies a slot; nothing changed.
    AlreadyParty(Party),
    /// Both slots hold other emails.
    Full,
}

impl PartySlots {
    /// Slots for a freshly created document.
    pub fn new(a: Email) -> Self {
        PartySlots::OnlyA { a }
    }

    /// Party A's email.
    pub fn a(&self) -> &Email {
        match self {
            PartySlots::OnlyA { a } | PartySlots::Both { a, .. } => a,
        }
    }

    /// Party B's email, if assigned.
    pub fn b(&self) -> Option<&Email> {
        match self {
            PartySlots::OnlyA { .. } => None,
            PartySlots::Both { b, .. } => Some(b),
        }
    }

    /// The email occupying a slot.
    pub fn email(&self, party: Party) -> Option<&Email> {
        match party {
            Party::A => Some(self.a()),
            Party::B => self.b(),
        }
    }

    /// Which slot, if any, the email occupies.
    pub fn party_of(&self, email: &Email) -> Option<Party> {
        if self.a() == email {
            Some(Party::A)
        } else if self.b() == Some(email) {
            Some(Party::B)
        } else {
            None
        }
    }

    /// Whether the email occupies either slot.
    pub fn is_party(&self, email: &Email) -> bool {
        self.party_of(email).is_some()
    }

    /// What `assign_b` would do, without changing anything.
    pub fn check_b(&self, email: &Email) -> SlotAssignment {
        if let Some(party) = self.party_of(email) {
            return SlotAssignment::AlreadyParty(party);
        }
        match self {
            PartySlots::OnlyA { .. } => SlotAssignment::Assigned,
            PartySlots::Both { .. } => SlotAssignment::Full,
        }
    }

    /// Offer an email for slot B.
    ///
    /// Idempotent: offering an existing party's email changes nothing.
    pub fn assign_b(&mut self, email: Email) -> SlotAssignment {
        let outcome = self.check_b(&email);
        if outcome == SlotAssignment::Assigned {
            let a = self.a().clone();
            *self = PartySlots::Both { a, b: email };
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_assign_b_once() {
        let mut slots = PartySlots::new(email("a@x.com"));
        assert_eq!(slots.b(), None);

        assert_eq!(slots.assign_b(email("b@x.com")), SlotAssignment::Assigned);
        assert_eq!(slots.b(), Some(&email("b@x.com")));

        // Same email again: idempotent.
        assert_eq!(
            slots.assign_b(email("b@x.com")),
            SlotAssignment::AlreadyParty(Party::B)
        );

        // A third email never displaces B.
        assert_eq!(slots.assign_b(email("c@x.com")), SlotAssignment::Full);
        assert_eq!(slots.b(), Some(&email("b@x.com")));
    }

    #[test]
    fn test_party_a_cannot_take_slot_b() {
        let mut slots = PartySlots::new(email("a@x.com"));
        assert_eq!(
            slots.assign_b(email("a@x.com")),
            SlotAssignment::AlreadyParty(Party::A)
        );
        assert!(matches!(slots, PartySlots::OnlyA { .. }));
    }

    #[test]
    fn test_party_of() {
        let slots = PartySlots::Both {
            a: email("a@x.com"),
            b: email("b@x.com"),
        };
        assert_eq!(slots.party_of(&email("a@x.com")), Some(Party::A));
        assert_eq!(slots.party_of(&email("b@x.com")), Some(Party::B));
        assert_eq!(slots.party_of(&email("B@x.com")), None);
        assert_eq!(slots.email(Party::B), Some(&email("b@x.com")));
        assert_eq!(Party::A.other(), Party::B);
    }
}
