// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The intersection boundary between pointer logic and whatever owns overlay geometry.
//!
//! A runtime that renders overlays natively (a compositor, an XR runtime) can answer
//! ray queries itself by implementing [`IntersectionProvider`]. [`CpuIntersector`]
//! answers them from [`SurfaceGeometry`] alone.

use glam::Affine3A;
use kurbo::Point;

use crate::geometry::{self, Ray, RayHit};
use crate::types::{SurfaceGeometry, SurfaceId};

/// Failure of a single intersection or placement query.
///
/// Errors are scoped to one surface; callers treat them as a miss for that surface.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The surface geometry cannot be intersected (zero width, non-invertible transform).
    #[error("degenerate surface geometry")]
    Degenerate,
    /// The native backend reported an error.
    #[error("intersection backend failed: {0}")]
    Backend(String),
}

/// Answers ray and placement queries for overlay surfaces.
///
/// Implementations must not mutate surfaces; the same query within a frame
/// should return the same answer.
pub trait IntersectionProvider {
    /// Intersect `ray` with the surface. `Ok(None)` is a miss.
    fn intersect_ray(
        &self,
        id: SurfaceId,
        geometry: &SurfaceGeometry,
        ray: &Ray,
    ) -> Result<Option<RayHit>, ProviderError>;

    /// World transform of the overlay-space point `uv` on the surface.
    fn transform_from_uv(
        &self,
        id: SurfaceId,
        geometry: &SurfaceGeometry,
        uv: Point,
    ) -> Result<Affine3A, ProviderError>;
}

/// Reference provider computing flat and curved intersections on the CPU.
#[derive(Copy, Clone, Debug, Default)]
pub struct CpuIntersector;

impl CpuIntersector {
    fn check(geometry: &SurfaceGeometry) -> Result<(), ProviderError> {
        let w = geometry.effective_width();
        if !w.is_finite() || w <= 0.0 || geometry.transform.matrix3.determinant().abs() < 1e-6 {
            return Err(ProviderError::Degenerate);
        }
        Ok(())
    }
}

impl IntersectionProvider for CpuIntersector {
    fn intersect_ray(
        &self,
        _id: SurfaceId,
        geometry: &SurfaceGeometry,
        ray: &Ray,
    ) -> Result<Option<RayHit>, ProviderError> {
        Self::check(geometry)?;
        Ok(geometry::intersect(geometry, ray))
    }

    fn transform_from_uv(
        &self,
        _id: SurfaceId,
        geometry: &SurfaceGeometry,
        uv: Point,
    ) -> Result<Affine3A, ProviderError> {
        Self::check(geometry)?;
        Ok(geometry::transform_from_uv(geometry, uv))
    }
}
