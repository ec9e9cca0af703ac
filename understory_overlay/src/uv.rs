// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! UV remapping between a (possibly non-square) texture and the square overlay space.
//!
//! Overlay space is the unit square laid over the full surface width in both
//! directions, with `(0, 0)` at the top-left corner and `v` growing downwards.
//! A texture that is wider than tall occupies a horizontal band in the middle of
//! that square; a taller one occupies a vertical band.

use kurbo::{Affine, Point};

/// Affine mapping between texture UV and overlay UV.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvTransform {
    to_overlay: Affine,
    to_texture: Affine,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl UvTransform {
    /// Texture and overlay space coincide.
    pub const IDENTITY: Self = Self {
        to_overlay: Affine::IDENTITY,
        to_texture: Affine::IDENTITY,
    };

    /// Letterbox a `width × height` texture inside the square overlay space.
    ///
    /// A zero dimension yields [`UvTransform::IDENTITY`].
    pub fn for_texture(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 || width == height {
            return Self::IDENTITY;
        }
        let w = f64::from(width);
        let h = f64::from(height);
        let to_overlay = if w > h {
            Affine::new([1.0, 0.0, 0.0, h / w, 0.0, (w - h) * 0.5 / w])
        } else {
            Affine::new([w / h, 0.0, 0.0, 1.0, (h - w) * 0.5 / h, 0.0])
        };
        Self {
            to_overlay,
            to_texture: to_overlay.inverse(),
        }
    }

    /// Map a texture UV into overlay space.
    pub fn to_overlay(&self, uv: Point) -> Point {
        self.to_overlay * uv
    }

    /// Map an overlay UV into texture space.
    ///
    /// Returns `None` when the point falls outside the texture (in the letterbox
    /// margin), which callers treat as a miss.
    pub fn to_texture(&self, uv: Point) -> Option<Point> {
        let t = self.to_texture * uv;
        ((0.0..=1.0).contains(&t.x) && (0.0..=1.0).contains(&t.y)).then_some(t)
    }
}
