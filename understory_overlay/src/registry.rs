// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface registry: slot storage with generational ids.

use crate::types::{SurfaceFlags, SurfaceGeometry, SurfaceId};

/// A registered surface: placement, flags, and caller payload.
#[derive(Clone, Debug)]
pub struct Surface<T> {
    /// World placement and shape.
    pub geometry: SurfaceGeometry,
    /// Visibility and participation flags.
    pub flags: SurfaceFlags,
    /// Payload owned by the layer above (handlers, interaction state).
    pub data: T,
}

impl<T> Surface<T> {
    /// True when the surface should be offered to ray casts.
    pub fn is_candidate(&self) -> bool {
        self.flags
            .contains(SurfaceFlags::VISIBLE | SurfaceFlags::INTERACTABLE)
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    surface: Surface<T>,
}

/// Flat set of surfaces addressed by [`SurfaceId`].
///
/// Iteration order is slot order, which is stable for the lifetime of each
/// surface. Removing a surface frees its slot for reuse with a bumped generation.
pub struct Registry<T> {
    slots: Vec<Option<Slot<T>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("slots_total", &self.slots.len())
            .field("slots_alive", &self.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Number of live surfaces.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no surface is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a surface and return its id.
    pub fn insert(&mut self, geometry: SurfaceGeometry, flags: SurfaceFlags, data: T) -> SurfaceId {
        let surface = Surface {
            geometry,
            flags,
            data,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot {
                generation,
                surface,
            });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Slot {
                generation,
                surface,
            }));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "SurfaceId uses 32-bit indices by design."
        )]
        SurfaceId::new(idx as u32, generation)
    }

    /// Remove a surface, returning it if `id` was live.
    pub fn remove(&mut self, id: SurfaceId) -> Option<Surface<T>> {
        if !self.is_alive(id) {
            return None;
        }
        let slot = self.slots[id.idx()].take()?;
        self.free_list.push(id.idx());
        Some(slot.surface)
    }

    /// Returns true if `id` refers to a live surface.
    ///
    /// A `SurfaceId` is live if its slot is occupied and the generation matches.
    pub fn is_alive(&self, id: SurfaceId) -> bool {
        self.get(id).is_some()
    }

    /// Borrow a live surface.
    pub fn get(&self, id: SurfaceId) -> Option<&Surface<T>> {
        let slot = self.slots.get(id.idx())?.as_ref()?;
        (slot.generation == id.1).then_some(&slot.surface)
    }

    /// Mutably borrow a live surface.
    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface<T>> {
        let slot = self.slots.get_mut(id.idx())?.as_mut()?;
        if slot.generation != id.1 {
            return None;
        }
        Some(&mut slot.surface)
    }

    /// Update surface flags.
    pub fn set_flags(&mut self, id: SurfaceId, flags: SurfaceFlags) {
        if let Some(s) = self.get_mut(id) {
            s.flags = flags;
        }
    }

    /// Show or hide a surface.
    pub fn set_visible(&mut self, id: SurfaceId, visible: bool) {
        if let Some(s) = self.get_mut(id) {
            s.flags.set(SurfaceFlags::VISIBLE, visible);
        }
    }

    /// Iterate live surfaces in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &Surface<T>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let slot = slot.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "SurfaceId uses 32-bit indices by design."
            )]
            Some((SurfaceId::new(i as u32, slot.generation), &slot.surface))
        })
    }

    /// Iterate live surfaces mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SurfaceId, &mut Surface<T>)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let slot = slot.as_mut()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "SurfaceId uses 32-bit indices by design."
            )]
            Some((SurfaceId::new(i as u32, slot.generation), &mut slot.surface))
        })
    }

    /// Iterate surfaces that are both visible and interactable.
    ///
    /// Hidden surfaces are filtered here so that no intersection call is spent on them.
    pub fn candidates(&self) -> impl Iterator<Item = (SurfaceId, &Surface<T>)> + '_ {
        self.iter().filter(|(_, s)| s.is_candidate())
    }
}
