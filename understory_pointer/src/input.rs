// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sampling controller input and tracking edges between frames.
//!
//! ## Usage
//!
//! 1) Implement [`InputSource`] over your runtime's action system (or fill a [`FrameInput`]).
//! 2) The dispatcher calls [`InputSource::input_state`] once per hand at the start of the frame.
//! 3) [`EdgeState::advance`] shifts every latch `now → before` and stores the new sample in one step,
//!    so downstream logic never sees a half-updated frame.
//!
//! ```
//! use understory_pointer::input::Latch;
//!
//! let mut click = Latch::default();
//! click.push(true);
//! assert!(click.rising());
//! click.push(true);
//! assert!(!click.rising() && click.now);
//! click.push(false);
//! assert!(click.falling());
//! ```

use glam::{Affine3A, Vec2};

use crate::types::{Hand, PointerMode};

/// Action names looked up by the provided [`InputSource::input_state`].
pub mod action {
    /// Primary click (boolean).
    pub const CLICK: &str = "click";
    /// Grab (boolean).
    pub const GRAB: &str = "grab";
    /// Alternate click (boolean).
    pub const ALT_CLICK: &str = "alt_click";
    /// Global show/hide toggle (boolean).
    pub const SHOW_HIDE: &str = "show_hide";
    /// Drag the play space (boolean).
    pub const SPACE_DRAG: &str = "space_drag";
    /// Explicit modifier selecting [`PointerMode::Alt`](crate::PointerMode::Alt) (boolean).
    pub const MODIFIER_ALT: &str = "modifier_alt";
    /// Explicit modifier selecting [`PointerMode::Alt2`](crate::PointerMode::Alt2) (boolean).
    pub const MODIFIER_ALT2: &str = "modifier_alt2";
    /// Explicit modifier selecting [`PointerMode::Neutral`](crate::PointerMode::Neutral) (boolean).
    pub const MODIFIER_NEUTRAL: &str = "modifier_neutral";
    /// Scroll (2D axis; the `y` component is used).
    pub const SCROLL: &str = "scroll";
}

/// Everything sampled for one hand at the start of a frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputState {
    /// World pose of the controller. The ray points down its local `-Z`.
    pub pose: Affine3A,
    /// Primary click.
    pub click: bool,
    /// Grab.
    pub grab: bool,
    /// Alternate click.
    pub alt_click: bool,
    /// Show/hide toggle.
    pub show_hide: bool,
    /// Space drag.
    pub space_drag: bool,
    /// Vertical scroll axis.
    pub scroll: f32,
    /// Explicit mode override; the only way to reach `Alt2` or `Neutral`.
    pub modifier: Option<PointerMode>,
}

/// Source of per-frame controller samples.
///
/// Implementations should return values captured once for the current frame;
/// the dispatcher reads both hands before processing either.
pub trait InputSource {
    /// World pose of the headset.
    fn hmd_pose(&self) -> Affine3A;

    /// World pose of a controller.
    fn hand_pose(&self, hand: Hand) -> Affine3A;

    /// Current state of a boolean action. Unknown names are `false`.
    fn boolean_action(&self, name: &str, hand: Hand) -> bool;

    /// Current value of a 2D axis action. Unknown names are zero.
    fn axis2d_action(&self, name: &str, hand: Hand) -> Vec2;

    /// Assemble the full sample for `hand` from the named actions in [`action`].
    fn input_state(&self, hand: Hand) -> InputState {
        let modifier = if self.boolean_action(action::MODIFIER_ALT, hand) {
            Some(PointerMode::Alt)
        } else if self.boolean_action(action::MODIFIER_ALT2, hand) {
            Some(PointerMode::Alt2)
        } else if self.boolean_action(action::MODIFIER_NEUTRAL, hand) {
            Some(PointerMode::Neutral)
        } else {
            None
        };
        InputState {
            pose: self.hand_pose(hand),
            click: self.boolean_action(action::CLICK, hand),
            grab: self.boolean_action(action::GRAB, hand),
            alt_click: self.boolean_action(action::ALT_CLICK, hand),
            show_hide: self.boolean_action(action::SHOW_HIDE, hand),
            space_drag: self.boolean_action(action::SPACE_DRAG, hand),
            scroll: self.axis2d_action(action::SCROLL, hand).y,
            modifier,
        }
    }
}

/// A ready-made frame sample, handy for tests, replays and scripted demos.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Headset pose.
    pub hmd: Affine3A,
    /// Per-hand samples, indexed by [`Hand::index`].
    pub hands: [InputState; 2],
}

impl FrameInput {
    /// Mutable access to one hand's sample.
    pub fn hand_mut(&mut self, hand: Hand) -> &mut InputState {
        &mut self.hands[hand.index()]
    }
}

impl InputSource for FrameInput {
    fn hmd_pose(&self) -> Affine3A {
        self.hmd
    }

    fn hand_pose(&self, hand: Hand) -> Affine3A {
        self.hands[hand.index()].pose
    }

    fn boolean_action(&self, name: &str, hand: Hand) -> bool {
        let s = &self.hands[hand.index()];
        match name {
            action::CLICK => s.click,
            action::GRAB => s.grab,
            action::ALT_CLICK => s.alt_click,
            action::SHOW_HIDE => s.show_hide,
            action::SPACE_DRAG => s.space_drag,
            action::MODIFIER_ALT => s.modifier == Some(PointerMode::Alt),
            action::MODIFIER_ALT2 => s.modifier == Some(PointerMode::Alt2),
            action::MODIFIER_NEUTRAL => s.modifier == Some(PointerMode::Neutral),
            _ => false,
        }
    }

    fn axis2d_action(&self, name: &str, hand: Hand) -> Vec2 {
        match name {
            action::SCROLL => Vec2::new(0.0, self.hands[hand.index()].scroll),
            _ => Vec2::ZERO,
        }
    }

    // The stored sample is already assembled.
    fn input_state(&self, hand: Hand) -> InputState {
        self.hands[hand.index()]
    }
}

/// A boolean sampled on two consecutive frames.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Latch {
    /// Value on the previous frame.
    pub before: bool,
    /// Value on the current frame.
    pub now: bool,
}

impl Latch {
    /// Shift `now` into `before` and store `value`.
    pub fn push(&mut self, value: bool) {
        self.before = self.now;
        self.now = value;
    }

    /// `false → true` this frame.
    pub const fn rising(self) -> bool {
        !self.before && self.now
    }

    /// `true → false` this frame.
    pub const fn falling(self) -> bool {
        self.before && !self.now
    }
}

/// Per-hand latched input.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EdgeState {
    /// Primary click.
    pub click: Latch,
    /// Grab.
    pub grab: Latch,
    /// Alternate click.
    pub alt_click: Latch,
    /// Show/hide toggle.
    pub show_hide: Latch,
    /// Space drag.
    pub space_drag: Latch,
    /// Current scroll axis value.
    pub scroll: f32,
}

impl EdgeState {
    /// Latch a new frame's sample.
    pub fn advance(&mut self, sample: &InputState) {
        self.click.push(sample.click);
        self.grab.push(sample.grab);
        self.alt_click.push(sample.alt_click);
        self.show_hide.push(sample.show_hide);
        self.space_drag.push(sample.space_drag);
        self.scroll = sample.scroll;
    }
}
