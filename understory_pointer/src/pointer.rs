// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-hand pointer state.

use std::collections::VecDeque;

use glam::{Affine3A, Vec3};
use understory_overlay::SurfaceId;

use crate::config::{InteractionConfig, Rgb};
use crate::grab::GrabState;
use crate::hover::HoverState;
use crate::input::{EdgeState, InputState};
use crate::mode::classify;
use crate::types::{Hand, PointerMode};

/// Length of a laser that has nothing to point at.
pub(crate) const IDLE_LASER_LENGTH: f32 = 2.0;

/// Visual state of a pointer's ray.
///
/// A visible laser implies the pointer has a target (a surface or a fallback interaction).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Laser {
    /// Whether the ray should be drawn.
    pub visible: bool,
    /// Distance from the hand to the end of the ray.
    pub length: f32,
    /// Ray colour.
    pub color: Rgb,
}

/// One hand's pointer: pose, mode, latched input, grab and hover state.
///
/// Created once per hand by the [`Dispatcher`](crate::Dispatcher) and mutated every frame.
pub struct Pointer {
    hand: Hand,
    pose: Affine3A,
    prev_position: Vec3,
    mode: PointerMode,
    edges: EdgeState,
    pub(crate) grab: GrabState,
    pub(crate) hover: HoverState<SurfaceId>,
    pub(crate) laser: Laser,
    release_actions: VecDeque<Box<dyn FnOnce()>>,
}

impl core::fmt::Debug for Pointer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pointer")
            .field("hand", &self.hand)
            .field("mode", &self.mode)
            .field("edges", &self.edges)
            .field("grab", &self.grab)
            .field("hover", &self.hover.current())
            .field("laser", &self.laser)
            .field("release_actions", &self.release_actions.len())
            .finish_non_exhaustive()
    }
}

impl Pointer {
    pub(crate) fn new(hand: Hand, config: &InteractionConfig) -> Self {
        Self {
            hand,
            pose: Affine3A::IDENTITY,
            prev_position: Vec3::ZERO,
            mode: PointerMode::Normal,
            edges: EdgeState::default(),
            grab: GrabState::Free,
            hover: HoverState::new(),
            laser: Laser {
                visible: false,
                length: IDLE_LASER_LENGTH,
                color: config.colors.normal,
            },
            release_actions: VecDeque::new(),
        }
    }

    /// Which hand this pointer belongs to.
    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// Controller pose sampled this frame.
    pub fn pose(&self) -> Affine3A {
        self.pose
    }

    /// Controller position sampled this frame.
    pub fn position(&self) -> Vec3 {
        self.pose.translation.into()
    }

    /// Interaction mode computed this frame.
    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    /// Latched input.
    pub fn edges(&self) -> &EdgeState {
        &self.edges
    }

    /// Grab state.
    pub fn grab(&self) -> &GrabState {
        &self.grab
    }

    /// The grabbed surface, if holding.
    pub fn grabbed(&self) -> Option<SurfaceId> {
        self.grab.target()
    }

    /// Surface resolved on the most recent hit-testing frame.
    pub fn hovered(&self) -> Option<SurfaceId> {
        self.hover.current()
    }

    /// Laser visual state.
    pub fn laser(&self) -> Laser {
        self.laser
    }

    /// Latch this frame's sample and recompute the mode.
    ///
    /// Every field is replaced together so later stages see one consistent frame.
    pub(crate) fn latch(&mut self, sample: &InputState, hmd: &Affine3A, config: &InteractionConfig) {
        self.prev_position = self.position();
        self.edges.advance(sample);
        self.pose = sample.pose;
        self.mode = classify(self.hand, &sample.pose, hmd, sample.modifier, config);
    }

    /// Translation since the previous frame while space drag stays held.
    ///
    /// `None` on the first held frame and whenever the action is released.
    pub(crate) fn space_drag_delta(&self) -> Option<Vec3> {
        let l = self.edges.space_drag;
        (l.before && l.now).then(|| self.position() - self.prev_position)
    }

    pub(crate) fn push_release_action(&mut self, action: Box<dyn FnOnce()>) {
        self.release_actions.push_back(action);
    }

    /// Run and discard queued release actions, oldest first. Returns how many ran.
    pub(crate) fn run_release_actions(&mut self) -> usize {
        let mut n = 0;
        while let Some(action) = self.release_actions.pop_front() {
            action();
            n += 1;
        }
        n
    }

    pub(crate) fn hide_laser(&mut self) {
        self.laser.visible = false;
    }

    pub(crate) fn show_laser(&mut self, length: f32, color: Rgb) {
        self.laser = Laser {
            visible: true,
            length,
            color,
        };
    }
}
