// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray intersection and UV placement for flat and curved surfaces.
//!
//! All math happens in the surface's local frame: the ray is brought in with the
//! inverse of [`SurfaceGeometry::transform`], intersected against the quad or arc,
//! and the hit is taken back out to world space. Because the transform is rigid,
//! distances along a unit direction are the same in both frames.

use glam::{Affine3A, Quat, Vec3};
use kurbo::Point;

use crate::types::SurfaceGeometry;

/// Parallel rays (and degenerate directions) are rejected below this magnitude.
const EPSILON: f32 = 1e-4;

/// A world-space ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Origin of the ray.
    pub origin: Vec3,
    /// Unit direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// The ray a tracked pose points along: from its translation down its local `-Z`.
    pub fn from_pose(pose: &Affine3A) -> Option<Self> {
        Self::new(
            pose.transform_point3(Vec3::ZERO),
            pose.transform_vector3(Vec3::NEG_Z),
        )
    }
}

/// Result of a ray hitting a surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// World-space surface normal at the hit point.
    pub normal: Vec3,
    /// Hit position in overlay UV space (see [`crate::uv`]).
    pub uv: Point,
}

/// Intersect `ray` with `surface`, returning the nearest hit in front of the origin.
pub fn intersect(surface: &SurfaceGeometry, ray: &Ray) -> Option<RayHit> {
    let inv = surface.transform.inverse();
    let o = inv.transform_point3(ray.origin);
    let d = inv.transform_vector3(ray.direction);
    let width = surface.effective_width();
    if width <= 0.0 {
        return None;
    }
    let half = width * 0.5;

    let (t, local_point, local_normal, u) = match surface.mapping.arc(width) {
        None => {
            if d.z.abs() < EPSILON {
                return None;
            }
            let t = -o.z / d.z;
            if t < 0.0 {
                return None;
            }
            let p = o + d * t;
            if p.x.abs() > half || p.y.abs() > half {
                return None;
            }
            (t, p, Vec3::Z, p.x / width + 0.5)
        }
        Some((radius, half_angle)) => {
            // Cylinder axis is parallel to Y through (0, 0, radius).
            let ox = o.x;
            let oz = o.z - radius;
            let a = d.x * d.x + d.z * d.z;
            if a < EPSILON * EPSILON {
                return None;
            }
            let b = 2.0 * (ox * d.x + oz * d.z);
            let c = ox * ox + oz * oz - radius * radius;
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                return None;
            }
            let sq = disc.sqrt();
            let roots = [(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)];
            let mut found = None;
            for t in roots {
                if t < 0.0 {
                    continue;
                }
                let p = o + d * t;
                let phi = p.x.atan2(radius - p.z);
                if phi.abs() > half_angle || p.y.abs() > half {
                    continue;
                }
                let normal = Vec3::new(-p.x, 0.0, radius - p.z) / radius;
                found = Some((t, p, normal, phi / (2.0 * half_angle) + 0.5));
                break;
            }
            found?
        }
    };

    let v = 0.5 - local_point.y / width;
    Some(RayHit {
        distance: t,
        point: surface.transform.transform_point3(local_point),
        normal: surface
            .transform
            .transform_vector3(local_normal)
            .normalize_or_zero(),
        uv: Point::new(f64::from(u), f64::from(v)),
    })
}

/// World transform of the point at overlay UV `uv`.
///
/// For curved surfaces the returned rotation faces the cylinder axis.
pub fn transform_from_uv(surface: &SurfaceGeometry, uv: Point) -> Affine3A {
    let width = surface.effective_width();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "UV coordinates are unit-range and stored as f64 only for kurbo."
    )]
    let (u, v) = (uv.x as f32 - 0.5, 0.5 - uv.y as f32);
    let local = match surface.mapping.arc(width) {
        None => Affine3A::from_translation(Vec3::new(u * width, v * width, 0.0)),
        Some((radius, half_angle)) => {
            let phi = u * 2.0 * half_angle;
            Affine3A::from_rotation_translation(
                Quat::from_rotation_y(-phi),
                Vec3::new(
                    radius * phi.sin(),
                    v * width,
                    radius - radius * phi.cos(),
                ),
            )
        }
    };
    surface.transform * local
}
