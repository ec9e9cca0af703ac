// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Pointer: a frame-stepped, two-hand pointer engine for VR overlays.
//!
//! ## Overview
//!
//! Each frame, every hand casts a ray from its controller pose into a set of
//! overlay surfaces (see [`understory_overlay`]). The nearest hit becomes the
//! hand's target and produces an ordered list of [`PointerEvent`]s:
//!
//! - `Left` when a hand stops targeting a surface, always before anything that
//!   concerns its new target.
//! - `Hover`, then `Down`/`Up` on click edges, then `Scroll` above a deadzone.
//! - `PrimaryLost` when another hand takes over a surface's primary slot.
//! - While a hand holds a grabbable surface, hit testing is bypassed and the
//!   surface follows the hand; exactly one held callback is emitted per frame.
//!
//! The engine keeps no references to surfaces across frames, only generational
//! [`SurfaceId`](understory_overlay::SurfaceId)s, so removing a surface at any
//! time is safe: a pointer that was holding it lets go silently.
//!
//! ## Modules
//!
//! - [`input`]: input sampling and edge latching.
//! - [`mode`]: roll-based mode classification.
//! - [`cast`] and [`resolve`]: ray casting and nearest-hit resolution.
//! - [`hover`]: enter/leave bookkeeping.
//! - [`grab`]: held-surface manipulation.
//! - [`Dispatcher`] ties them together; [`deliver`] routes events to handlers.
//!
//! ## Example
//!
//! ```
//! use glam::{Affine3A, Vec3};
//! use understory_overlay::{CpuIntersector, SurfaceFlags, SurfaceGeometry};
//! use understory_pointer::{
//!     input::FrameInput, Dispatcher, Grabbable, Hand, PointerEvent, SurfaceSet, SurfaceState,
//! };
//!
//! let mut surfaces = SurfaceSet::new();
//! let panel = surfaces.insert(
//!     SurfaceGeometry::flat(Affine3A::from_translation(Vec3::new(0.0, 0.0, -1.0)), 1.0),
//!     SurfaceFlags::default(),
//!     SurfaceState::new().with_grab(Grabbable),
//! );
//!
//! let mut dispatcher = Dispatcher::default();
//! let mut input = FrameInput::default();
//! // Right controller at the origin, pointing down -Z; left hand points at nothing.
//! input.hand_mut(Hand::Right).pose = Affine3A::IDENTITY;
//! input.hand_mut(Hand::Left).pose = Affine3A::from_translation(Vec3::new(0.0, -5.0, 0.0));
//!
//! let events = dispatcher.update(&mut surfaces, &input, &CpuIntersector);
//! assert!(matches!(events[..], [PointerEvent::Hover(hit)] if hit.surface == panel));
//!
//! input.hand_mut(Hand::Right).grab = true;
//! let events = dispatcher.update(&mut surfaces, &input, &CpuIntersector);
//! assert!(matches!(events[..], [PointerEvent::Grabbed(_)]));
//! assert_eq!(dispatcher.pointer(Hand::Right).grabbed(), Some(panel));
//! ```

pub mod cast;
mod config;
mod dispatch;
mod error;
pub mod grab;
pub mod hover;
pub mod input;
pub mod mode;
mod pointer;
mod primary;
pub mod resolve;
mod surface;
mod types;

pub use config::{GrabLimits, InteractionConfig, ModeColors, Rgb};
pub use dispatch::{Dispatcher, InteractionArgs, InteractionResult, deliver};
pub use error::ConfigError;
pub use pointer::{Laser, Pointer};
pub use primary::PrimarySlot;
pub use surface::{
    GrabHandler, Grabbable, PointerHandler, PointerObserver, SurfaceSet, SurfaceState,
};
pub use types::{Hand, Hit, PointerEvent, PointerMode};
