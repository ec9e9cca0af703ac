// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit resolver: pick the winning hit and report target changes.
//!
//! ## Target Selection
//!
//! - The nearest hit by distance wins; registry order and z-order play no part.
//! - Equal distances are broken by input order: the first candidate wins.
//!   Overlays are not expected to be coplanar, so this only has to be deterministic.
//!
//! ## See Also
//!
//! [`hover`](crate::hover) for the enter/leave bookkeeping fed by [`resolve`].

use understory_overlay::SurfaceId;

use crate::hover::{HoverEvent, HoverState};
use crate::types::Hit;

/// The nearest hit, if any.
pub fn nearest(hits: &[Hit]) -> Option<&Hit> {
    // Single pass without allocation or sort. Strict `<` keeps the first of equals.
    let mut best: Option<&Hit> = None;
    for h in hits {
        match best {
            Some(b) if h.distance.total_cmp(&b.distance).is_ge() => {}
            _ => best = Some(h),
        }
    }
    best
}

/// Outcome of resolving one frame's hits for one pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The winning hit.
    pub hit: Option<Hit>,
    /// Transitions from last frame's target, leave first.
    pub transitions: Vec<HoverEvent<SurfaceId>>,
}

impl Resolution {
    /// True when the winning surface was not targeted on the previous frame.
    pub fn entered(&self) -> bool {
        self.transitions
            .iter()
            .any(|t| matches!(t, HoverEvent::Enter(_)))
    }
}

/// Select the nearest hit and update `hover` to target it.
pub fn resolve(hover: &mut HoverState<SurfaceId>, hits: &[Hit]) -> Resolution {
    let hit = nearest(hits).copied();
    let transitions = hover.update(hit.map(|h| h.surface));
    Resolution { hit, transitions }
}
