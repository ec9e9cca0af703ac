// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-surface interaction state and the handler capabilities a surface may carry.
//!
//! Capabilities are explicit optional handler sets rather than type checks: a
//! surface supports grabbing exactly when it has a [`GrabHandler`].

use glam::Vec3;
use understory_overlay::{Registry, SurfaceId};

use crate::primary::PrimarySlot;
use crate::types::{Hand, Hit};

/// Receives pointer events for a hovered surface. All methods default to no-ops.
pub trait PointerHandler {
    /// The ray rests on the surface.
    fn on_hover(&mut self, hit: &Hit) {
        let _ = hit;
    }
    /// Click rising edge.
    fn on_down(&mut self, hit: &Hit) {
        let _ = hit;
    }
    /// Click falling edge.
    fn on_up(&mut self, hit: &Hit) {
        let _ = hit;
    }
    /// `hand` stopped targeting the surface.
    fn on_left(&mut self, hand: Hand) {
        let _ = hand;
    }
    /// Scroll above the deadzone.
    fn on_scroll(&mut self, hit: &Hit, value: f32) {
        let _ = (hit, value);
    }
}

/// Receives held-interaction callbacks. Presence of this handler makes a surface grabbable.
pub trait GrabHandler {
    /// A hand took hold of the surface at `hit`.
    fn on_grabbed(&mut self, hit: &Hit) {
        let _ = hit;
    }
    /// The holding hand let go.
    fn on_dropped(&mut self, hand: Hand) {
        let _ = hand;
    }
    /// Still held, nothing else happened.
    fn on_grab_held(&mut self, hand: Hand) {
        let _ = hand;
    }
    /// Click pressed while held.
    fn on_click_while_held(&mut self, hand: Hand) {
        let _ = hand;
    }
    /// Alt-click pressed while held.
    fn on_alt_click_while_held(&mut self, hand: Hand) {
        let _ = hand;
    }
    /// Held scroll in alt mode. Scale has already been applied.
    fn on_scroll_size(&mut self, hand: Hand, value: f32) {
        let _ = (hand, value);
    }
    /// Held scroll in other modes. Distance has already been applied.
    fn on_scroll_distance(&mut self, hand: Hand, value: f32) {
        let _ = (hand, value);
    }
}

/// A grabbable capability with no callbacks of its own.
#[derive(Copy, Clone, Debug, Default)]
pub struct Grabbable;

impl GrabHandler for Grabbable {}

/// Interaction state attached to each registered surface.
#[derive(Default)]
pub struct SurfaceState {
    /// Pointer event handler, if the surface wants them.
    pub pointer: Option<Box<dyn PointerHandler>>,
    /// Grab handler; `Some` makes the surface grabbable.
    pub grab: Option<Box<dyn GrabHandler>>,
    pub(crate) primary: PrimarySlot,
    pub(crate) held_by: Option<Hand>,
    pub(crate) saved_spawn: Option<Vec3>,
}

/// The registry the dispatcher operates on.
pub type SurfaceSet = Registry<SurfaceState>;

impl core::fmt::Debug for SurfaceState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceState")
            .field("pointer", &self.pointer.is_some())
            .field("grab", &self.grab.is_some())
            .field("primary", &self.primary.get())
            .field("held_by", &self.held_by)
            .field("saved_spawn", &self.saved_spawn)
            .finish()
    }
}

impl SurfaceState {
    /// A surface with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a pointer handler.
    pub fn with_pointer(mut self, handler: impl PointerHandler + 'static) -> Self {
        self.pointer = Some(Box::new(handler));
        self
    }

    /// Attach a grab handler, making the surface grabbable.
    pub fn with_grab(mut self, handler: impl GrabHandler + 'static) -> Self {
        self.grab = Some(Box::new(handler));
        self
    }

    /// Whether the surface accepts grabs.
    pub fn supports_grab(&self) -> bool {
        self.grab.is_some()
    }

    /// The surface's primary pointer.
    pub fn primary(&self) -> Option<Hand> {
        self.primary.get()
    }

    /// The hand currently holding the surface.
    pub fn held_by(&self) -> Option<Hand> {
        self.held_by
    }

    /// Headset-relative position recorded when the surface was last dropped.
    pub fn saved_spawn(&self) -> Option<Vec3> {
        self.saved_spawn
    }
}

/// Receives the events that belong to a pointer or the whole scene rather than one surface.
pub trait PointerObserver {
    /// `hand` lost primary status on `surface`.
    fn on_primary_lost(&mut self, hand: Hand, surface: SurfaceId) {
        let _ = (hand, surface);
    }
    /// The show/hide toggle flipped.
    fn on_show_hide(&mut self, visible: bool) {
        let _ = visible;
    }
    /// Play-space drag by `delta`.
    fn on_space_drag(&mut self, hand: Hand, delta: Vec3) {
        let _ = (hand, delta);
    }
}

impl PointerObserver for () {}
