// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover state helper: compute enter/leave transitions from target changes.
//!
//! Each pointer keeps one [`HoverState`]. Feed it the surface resolved this
//! frame (or `None`) and it reports what changed since the previous frame.
//!
//! ```
//! use understory_pointer::hover::{HoverEvent, HoverState};
//!
//! let mut h: HoverState<u32> = HoverState::new();
//! assert_eq!(h.update(Some(1)), vec![HoverEvent::Enter(1)]);
//! assert!(h.update(Some(1)).is_empty());
//! assert_eq!(h.update(Some(2)), vec![HoverEvent::Leave(1), HoverEvent::Enter(2)]);
//! assert_eq!(h.update(None), vec![HoverEvent::Leave(2)]);
//! ```

/// Tracks the surface a pointer targeted on the previous frame.
///
/// Ordering semantics: when the target changes, the leave for the old target
/// is always emitted before the enter for the new one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState<K: Copy + Eq> {
    current: Option<K>,
}

/// A hover transition event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// Pointer starts targeting the given surface.
    Enter(K),
    /// Pointer stops targeting the given surface.
    Leave(K),
}

impl<K: Copy + Eq> HoverState<K> {
    /// Create an empty hover state.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The currently hovered target, if any.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Update the hovered target and return the transitions from the previous one.
    pub fn update(&mut self, target: Option<K>) -> Vec<HoverEvent<K>> {
        if self.current == target {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(2);
        if let Some(old) = self.current {
            out.push(HoverEvent::Leave(old));
        }
        if let Some(new) = target {
            out.push(HoverEvent::Enter(new));
        }
        self.current = target;
        out
    }
}
