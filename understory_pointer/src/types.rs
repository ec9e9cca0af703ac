// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: hands, modes, hits, and the per-frame event stream.

use glam::Vec3;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use understory_overlay::SurfaceId;

/// A tracked controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    /// Left controller.
    Left,
    /// Right controller.
    Right,
}

impl Hand {
    /// Both hands, left first.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// The opposite hand.
    pub const fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Dense index (`Left = 0`, `Right = 1`).
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

impl core::fmt::Display for Hand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Discrete interaction variant selected by controller roll or an explicit modifier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerMode {
    /// Primary click and scroll.
    #[default]
    Normal,
    /// Secondary behavior; also routes held scroll to resizing.
    Alt,
    /// Tertiary behavior. Only reachable through an explicit modifier.
    Alt2,
    /// No click semantics. Only reachable through an explicit modifier.
    Neutral,
}

/// One pointer ray hitting one surface in the current frame.
///
/// Hits are rebuilt from scratch every frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    /// The surface that was hit.
    pub surface: SurfaceId,
    /// The hand whose ray produced the hit.
    pub hand: Hand,
    /// Distance along the ray.
    pub distance: f32,
    /// Texture UV of the hit (after letterbox compensation).
    pub uv: Point,
    /// World-space hit point.
    pub point: Vec3,
    /// World-space surface normal.
    pub normal: Vec3,
    /// Pointer mode when the ray was cast.
    pub mode: PointerMode,
    /// Whether `hand` is the surface's primary pointer after arbitration.
    pub is_primary: bool,
}

/// An outbound notification produced by [`Dispatcher::update`](crate::Dispatcher::update).
///
/// Events are emitted in the order they must be delivered. For a hovered
/// surface this is always `PrimaryLost` (if any), `Hover`, then `Down`/`Up`, then `Scroll`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// The hand's ray stopped targeting `surface`.
    Left {
        /// Surface that lost the ray.
        surface: SurfaceId,
        /// Hand that moved away.
        hand: Hand,
    },
    /// The ray rests on a surface this frame.
    Hover(Hit),
    /// Click rising edge on the hovered surface.
    Down(Hit),
    /// Click falling edge on the hovered surface.
    Up(Hit),
    /// Scroll axis above the deadzone on the hovered surface.
    Scroll {
        /// Hit the scroll applies to.
        hit: Hit,
        /// Raw axis value.
        value: f32,
    },
    /// `hand` is no longer the primary pointer of `surface`.
    PrimaryLost {
        /// Surface whose primary changed.
        surface: SurfaceId,
        /// The displaced hand.
        hand: Hand,
    },
    /// The hand took hold of a grabbable surface.
    Grabbed(Hit),
    /// The hand let go of its grabbed surface.
    Dropped {
        /// Released surface.
        surface: SurfaceId,
        /// Releasing hand.
        hand: Hand,
    },
    /// Still holding; nothing else happened this frame.
    GrabHeld {
        /// Held surface.
        surface: SurfaceId,
        /// Holding hand.
        hand: Hand,
    },
    /// Click rising edge while holding.
    ClickWhileHeld {
        /// Held surface.
        surface: SurfaceId,
        /// Holding hand.
        hand: Hand,
    },
    /// Alt-click rising edge while holding.
    AltClickWhileHeld {
        /// Held surface.
        surface: SurfaceId,
        /// Holding hand.
        hand: Hand,
    },
    /// Held scroll in [`PointerMode::Alt`]: resize.
    ScrollSize {
        /// Held surface.
        surface: SurfaceId,
        /// Holding hand.
        hand: Hand,
        /// Raw axis value.
        value: f32,
    },
    /// Held scroll in any other mode: push away or pull closer.
    ScrollDistance {
        /// Held surface.
        surface: SurfaceId,
        /// Holding hand.
        hand: Hand,
        /// Raw axis value.
        value: f32,
    },
    /// The global show/hide toggle flipped.
    ShowHide {
        /// New state.
        visible: bool,
    },
    /// The hand moved while the space-drag action is held.
    SpaceDrag {
        /// Dragging hand.
        hand: Hand,
        /// World translation since the previous frame.
        delta: Vec3,
    },
}

impl PointerEvent {
    /// The surface this event targets, if any.
    pub fn surface(&self) -> Option<SurfaceId> {
        match *self {
            Self::Hover(hit) | Self::Down(hit) | Self::Up(hit) | Self::Grabbed(hit) => {
                Some(hit.surface)
            }
            Self::Scroll { hit, .. } => Some(hit.surface),
            Self::Left { surface, .. }
            | Self::PrimaryLost { surface, .. }
            | Self::Dropped { surface, .. }
            | Self::GrabHeld { surface, .. }
            | Self::ClickWhileHeld { surface, .. }
            | Self::AltClickWhileHeld { surface, .. }
            | Self::ScrollSize { surface, .. }
            | Self::ScrollDistance { surface, .. } => Some(surface),
            Self::ShowHide { .. } | Self::SpaceDrag { .. } => None,
        }
    }

    /// The hand this event belongs to, if any.
    pub fn hand(&self) -> Option<Hand> {
        match *self {
            Self::Hover(hit) | Self::Down(hit) | Self::Up(hit) | Self::Grabbed(hit) => {
                Some(hit.hand)
            }
            Self::Scroll { hit, .. } => Some(hit.hand),
            Self::Left { hand, .. }
            | Self::PrimaryLost { hand, .. }
            | Self::Dropped { hand, .. }
            | Self::GrabHeld { hand, .. }
            | Self::ClickWhileHeld { hand, .. }
            | Self::AltClickWhileHeld { hand, .. }
            | Self::ScrollSize { hand, .. }
            | Self::ScrollDistance { hand, .. }
            | Self::SpaceDrag { hand, .. } => Some(hand),
            Self::ShowHide { .. } => None,
        }
    }

    /// True for the held-interaction callbacks that fire exactly once per holding frame.
    pub fn is_held_callback(&self) -> bool {
        matches!(
            self,
            Self::GrabHeld { .. } | Self::ClickWhileHeld { .. } | Self::AltClickWhileHeld { .. }
        )
    }
}
