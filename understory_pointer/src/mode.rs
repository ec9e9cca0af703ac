// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mode classifier: controller roll (or an explicit modifier) → [`PointerMode`].
//!
//! Roll is measured as the dot product of the headset's up axis with the
//! controller's right axis, negated for the left hand so both hands classify
//! mirror-symmetrically. There is no hysteresis; the mode is recomputed every
//! frame and may flicker when held right at the threshold.

use glam::{Affine3A, Vec3};

use crate::config::InteractionConfig;
use crate::types::{Hand, PointerMode};

/// Signed roll of `hand` relative to the headset, in `[-1, 1]`.
pub fn roll_dot(hand: Hand, hand_pose: &Affine3A, hmd_pose: &Affine3A) -> f32 {
    let up = Vec3::from(hmd_pose.matrix3.y_axis).normalize_or_zero();
    let right = Vec3::from(hand_pose.matrix3.x_axis).normalize_or_zero();
    let dot = up.dot(right);
    match hand {
        Hand::Left => -dot,
        Hand::Right => dot,
    }
}

/// Threshold a roll dot product. The comparison is strict, so `dot == threshold` is `Normal`.
pub fn classify_dot(dot: f32, threshold: f32) -> PointerMode {
    if dot < threshold {
        PointerMode::Alt
    } else {
        PointerMode::Normal
    }
}

/// Full classification for one hand this frame.
///
/// An explicit `modifier` wins over roll. Roll alone only ever yields
/// `Normal` or `Alt`.
pub fn classify(
    hand: Hand,
    hand_pose: &Affine3A,
    hmd_pose: &Affine3A,
    modifier: Option<PointerMode>,
    config: &InteractionConfig,
) -> PointerMode {
    if let Some(mode) = modifier {
        return mode;
    }
    if !config.roll_alt_mode {
        return PointerMode::Normal;
    }
    classify_dot(
        roll_dot(hand, hand_pose, hmd_pose),
        config.alt_roll_threshold,
    )
}
