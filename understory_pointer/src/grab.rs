// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grab coordinator: `Free` / `Holding` per pointer, and the default manipulation.
//!
//! ## State machine
//!
//! - `Free → Holding`: grab rising edge while the resolved hit's surface has a
//!   [`GrabHandler`](crate::GrabHandler) and no other hand holds it.
//! - `Holding → Free`: grab no longer pressed, or the target was hidden (both
//!   emit `Dropped`), or the target was removed (silent). No held callback fires
//!   on the frame a grab ends.
//!
//! While holding, hit testing for that hand is skipped. Each frame emits at most
//! one scroll routing event (`ScrollSize` in alt mode, `ScrollDistance` otherwise)
//! and then exactly one of `ClickWhileHeld`, `AltClickWhileHeld`, `GrabHeld`.
//!
//! ## Manipulation
//!
//! The surface keeps the hand-local offset captured at grab time and turns to
//! face the headset. Held scroll pushes it along that offset or resizes it,
//! bounded by [`GrabLimits`]. Dropping records its headset-relative position
//! so the surface can reappear there when shown again.

use glam::{Affine3A, Mat3, Vec3};
use kurbo::Point;
use tracing::{debug, warn};
use understory_overlay::{IntersectionProvider, SurfaceFlags, SurfaceGeometry, SurfaceId};

use crate::config::{GrabLimits, InteractionConfig};
use crate::pointer::Pointer;
use crate::surface::SurfaceSet;
use crate::types::{Hit, PointerEvent, PointerMode};

/// Saved spawn positions farther than this from the headset are ignored on respawn.
const FAR_RESPAWN: f32 = 20.0;
/// Saved spawn positions nearer than this are ignored on respawn.
const NEAR_RESPAWN: f32 = 0.2;

/// Grab state of one pointer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum GrabState {
    /// Not holding anything; the pointer hit-tests normally.
    #[default]
    Free,
    /// Holding a surface; hit testing is bypassed.
    Holding(Held),
}

impl GrabState {
    /// The held surface.
    pub fn target(&self) -> Option<SurfaceId> {
        match self {
            Self::Free => None,
            Self::Holding(h) => Some(h.target),
        }
    }

    /// True while holding.
    pub fn is_holding(&self) -> bool {
        matches!(self, Self::Holding(_))
    }
}

/// What a holding pointer remembers about its target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Held {
    /// The held surface.
    pub target: SurfaceId,
    /// Overlay-space UV where the grab landed; the laser keeps ending there.
    pub uv: Point,
    /// Surface position in the hand's local frame.
    pub offset: Vec3,
}

/// Rigid transform at `position` whose front face (`+Z`) points at `viewer`.
///
/// World up is kept where possible; when the viewer is straight above or below,
/// the viewer's forward axis stands in for up.
pub fn face_towards(position: Vec3, viewer: &Affine3A) -> Affine3A {
    let eye = Vec3::from(viewer.translation);
    let Some(back) = (eye - position).try_normalize() else {
        return Affine3A::from_translation(position);
    };
    let up = if back.cross(Vec3::Y).length_squared() > 1e-6 {
        Vec3::Y
    } else {
        -Vec3::from(viewer.matrix3.z_axis)
    };
    let Some(x) = up.cross(back).try_normalize() else {
        return Affine3A::from_translation(position);
    };
    let y = back.cross(x);
    Affine3A::from_mat3_translation(Mat3::from_cols(x, y, back), position)
}

/// Move a hand-local `offset` along itself by `value³`.
///
/// Returns `None` when the move would pull closer than `min_distance` or push
/// beyond `max_distance`.
pub fn push_pull(offset: Vec3, value: f32, limits: &GrabLimits) -> Option<Vec3> {
    let next = offset + offset.normalize_or_zero() * value.powi(3);
    let d = next.length();
    if (d < limits.min_distance && value < 0.0) || (d > limits.max_distance && value > 0.0) {
        return None;
    }
    Some(next)
}

/// Scale after a resize step of `value`: `scale · (1 − 2·value³)`.
///
/// Returns `None` when the step would leave `[min_scale, max_scale]` in the
/// direction of travel. Steps back towards the range are always allowed.
pub fn resize(scale: f32, value: f32, limits: &GrabLimits) -> Option<f32> {
    let next = scale * (1.0 - 2.0 * value.powi(3));
    if (next < limits.min_scale && next < scale) || (next > limits.max_scale && next > scale) {
        return None;
    }
    Some(next)
}

/// Place a surface at its saved headset-relative spawn point, facing the headset.
///
/// Returns false (and leaves the surface alone) when no usable spawn is saved.
pub(crate) fn respawn(geometry: &mut SurfaceGeometry, saved: Option<Vec3>, hmd: &Affine3A) -> bool {
    let Some(local) = saved else {
        return false;
    };
    let len = local.length();
    if !(NEAR_RESPAWN..=FAR_RESPAWN).contains(&len) {
        return false;
    }
    geometry.transform = face_towards(hmd.transform_point3(local), hmd);
    true
}

/// Try to start holding `hit.surface`. Returns true if the pointer is now holding it.
///
/// On success the hand also becomes the surface's primary pointer.
pub(crate) fn try_begin(
    pointer: &mut Pointer,
    hit: &mut Hit,
    surfaces: &mut SurfaceSet,
    out: &mut Vec<PointerEvent>,
) -> bool {
    if !pointer.edges().grab.rising() {
        return false;
    }
    let Some(surface) = surfaces.get_mut(hit.surface) else {
        return false;
    };
    if !surface.data.supports_grab() {
        return false;
    }
    let hand = pointer.hand();
    if let Some(owner) = surface.data.held_by {
        debug!(surface = %hit.surface, %hand, %owner, "grab rejected, surface already held");
        return false;
    }

    if let Some(prev) = surface.data.primary.ensure(hand) {
        debug!(surface = %hit.surface, from = %prev, to = %hand, "primary taken by grab");
        out.push(PointerEvent::PrimaryLost {
            surface: hit.surface,
            hand: prev,
        });
    }
    surface.data.held_by = Some(hand);
    let position = Vec3::from(surface.geometry.transform.translation);
    pointer.grab = GrabState::Holding(Held {
        target: hit.surface,
        uv: surface.geometry.uv.to_overlay(hit.uv),
        offset: pointer.pose().inverse().transform_point3(position),
    });
    hit.is_primary = true;
    debug!(surface = %hit.surface, %hand, distance = hit.distance, "grabbed");
    out.push(PointerEvent::Grabbed(*hit));
    true
}

/// Run one frame for a holding pointer.
pub(crate) fn held_frame(
    pointer: &mut Pointer,
    surfaces: &mut SurfaceSet,
    provider: &impl IntersectionProvider,
    config: &InteractionConfig,
    hmd: &Affine3A,
    out: &mut Vec<PointerEvent>,
) {
    let GrabState::Holding(mut held) = pointer.grab else {
        return;
    };
    let hand = pointer.hand();
    let Some(surface) = surfaces.get_mut(held.target) else {
        debug!(surface = %held.target, %hand, "held surface is gone, releasing");
        pointer.grab = GrabState::Free;
        pointer.hide_laser();
        return;
    };

    let edges = *pointer.edges();
    let visible = surface.flags.contains(SurfaceFlags::VISIBLE);
    if !edges.grab.now || !visible {
        surface.data.held_by = None;
        let position = Vec3::from(surface.geometry.transform.translation);
        surface.data.saved_spawn = Some(hmd.inverse().transform_point3(position));
        pointer.grab = GrabState::Free;
        if !visible {
            pointer.hide_laser();
        }
        debug!(surface = %held.target, %hand, visible, "dropped");
        out.push(PointerEvent::Dropped {
            surface: held.target,
            hand,
        });
        return;
    }

    if edges.scroll.abs() > config.scroll_deadzone {
        let value = edges.scroll;
        if pointer.mode() == PointerMode::Alt {
            if let Some(scale) = resize(surface.geometry.scale, value, &config.grab) {
                surface.geometry.scale = scale;
            }
            out.push(PointerEvent::ScrollSize {
                surface: held.target,
                hand,
                value,
            });
        } else {
            if let Some(offset) = push_pull(held.offset, value, &config.grab) {
                held.offset = offset;
            }
            out.push(PointerEvent::ScrollDistance {
                surface: held.target,
                hand,
                value,
            });
        }
    }

    let position = pointer.pose().transform_point3(held.offset);
    surface.geometry.transform = face_towards(position, hmd);
    pointer.grab = GrabState::Holding(held);

    let target = held.target;
    out.push(if edges.click.rising() {
        PointerEvent::ClickWhileHeld {
            surface: target,
            hand,
        }
    } else if edges.alt_click.rising() {
        PointerEvent::AltClickWhileHeld {
            surface: target,
            hand,
        }
    } else {
        PointerEvent::GrabHeld {
            surface: target,
            hand,
        }
    });

    match provider.transform_from_uv(target, &surface.geometry, held.uv) {
        Ok(at) => {
            let length = (Vec3::from(at.translation) - pointer.position()).length();
            pointer.show_laser(length, config.colors.for_mode(pointer.mode()));
        }
        Err(err) => {
            warn!(surface = %target, %hand, "cannot place laser end on held surface: {err}");
        }
    }
}
