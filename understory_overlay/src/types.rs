// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for overlay surfaces: identifiers, flags, and placement.

use core::f32::consts::PI;

use glam::Affine3A;

use crate::uv::UvTransform;

/// Identifier for a surface in a [`Registry`](crate::Registry).
///
/// This is a small, copyable handle that stays stable while the surface lives
/// but becomes invalid when the surface is removed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `SurfaceId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `SurfaceId`.
///
/// ### Liveness
///
/// Use [`Registry::is_alive`](crate::Registry::is_alive) to check whether a `SurfaceId` still refers
/// to a live surface. Stale ids never alias a different live surface because the generation must match.
/// Pointers keep `SurfaceId`s across frames (last target, grabbed target), so a disposed overlay
/// is detected by liveness rather than by holding a reference to it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SurfaceId(pub(crate) u32, pub(crate) u32);

impl SurfaceId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot index of this id. Useful for logging and for dense side tables.
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of this id.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl core::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}v{}", self.0, self.1)
    }
}

bitflags::bitflags! {
    /// Surface flags controlling visibility and pointer participation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SurfaceFlags: u8 {
        /// Surface is visible (rendered, and a candidate for ray casts).
        const VISIBLE      = 0b0000_0001;
        /// Surface receives pointer rays.
        const INTERACTABLE = 0b0000_0010;
        /// Surface follows the global show/hide toggle.
        const SHOW_HIDE    = 0b0000_0100;
    }
}

impl Default for SurfaceFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::INTERACTABLE | Self::SHOW_HIDE
    }
}

/// How the square overlay space is laid out in 3D.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Mapping {
    /// A flat quad in the local XY plane, facing local `+Z`.
    #[default]
    Flat,
    /// A cylindrical arc bending towards the viewer around the local `Y` axis.
    ///
    /// The arc spans `2π · curvature` radians and its arc length equals the
    /// overlay width. Curvature at or below `f32::EPSILON` behaves as [`Mapping::Flat`].
    Curved {
        /// Curvature factor; `0.25` bends the overlay into a half cylinder.
        curvature: f32,
    },
}

impl Mapping {
    /// Returns `(radius, half_angle)` of the arc for an overlay of `width`, or
    /// `None` when the mapping is effectively flat.
    pub fn arc(self, width: f32) -> Option<(f32, f32)> {
        match self {
            Self::Curved { curvature } if curvature > f32::EPSILON => {
                let theta = PI * 4.0 * curvature;
                Some((width * 2.0 / theta, theta / 4.0))
            }
            _ => None,
        }
    }
}

/// World placement and shape of a surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceGeometry {
    /// Rigid world transform (rotation and translation only).
    ///
    /// Local `+X` is right, `+Y` is up and `+Z` points out of the front face.
    pub transform: Affine3A,
    /// Width of the square overlay space in meters, before [`scale`](Self::scale).
    pub width: f32,
    /// User scale applied on top of `width` (changed by resize gestures).
    pub scale: f32,
    /// Flat or curved layout.
    pub mapping: Mapping,
    /// Texture UV ↔ overlay UV remapping.
    pub uv: UvTransform,
}

impl SurfaceGeometry {
    /// A flat surface of `width` meters at `transform`.
    pub fn flat(transform: Affine3A, width: f32) -> Self {
        Self {
            transform,
            width,
            ..Self::default()
        }
    }

    /// Width in meters after applying [`scale`](Self::scale).
    pub fn effective_width(&self) -> f32 {
        self.width * self.scale
    }
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            transform: Affine3A::IDENTITY,
            width: 1.0,
            scale: 1.0,
            mapping: Mapping::Flat,
            uv: UvTransform::IDENTITY,
        }
    }
}
