// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primary-pointer arbitration for a single surface.
//!
//! Both hands may hover a surface at once, but state that must follow one hand
//! (a virtual cursor, shift state from roll) reads the primary only. The slot
//! is a back-reference by [`Hand`]; it never owns a pointer.
//!
//! The dispatcher claims the slot when a hand starts hovering, presses, or grabs
//! a surface, and fills it when it is vacant. A steady hover by both hands
//! therefore does not bounce the primary back and forth every frame.

use crate::types::Hand;

/// The primary pointer of one surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimarySlot {
    hand: Option<Hand>,
}

impl PrimarySlot {
    /// Current primary hand.
    pub fn get(self) -> Option<Hand> {
        self.hand
    }

    /// True when `hand` is primary.
    pub fn is(self, hand: Hand) -> bool {
        self.hand == Some(hand)
    }

    /// Make `hand` primary. Returns the displaced hand, which must be told it lost primary.
    pub fn ensure(&mut self, hand: Hand) -> Option<Hand> {
        match self.hand.replace(hand) {
            Some(prev) if prev != hand => Some(prev),
            _ => None,
        }
    }

    /// Make `hand` primary only if nobody is. Returns true if it is primary afterwards.
    pub fn claim_if_vacant(&mut self, hand: Hand) -> bool {
        *self.hand.get_or_insert(hand) == hand
    }

    /// Clear the slot if `hand` holds it. Returns true if it was cleared.
    pub fn release(&mut self, hand: Hand) -> bool {
        if self.is(hand) {
            self.hand = None;
            true
        } else {
            false
        }
    }
}
