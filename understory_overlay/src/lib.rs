// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Overlay: a registry of VR overlay surfaces and the geometry to hit-test them.
//!
//! ## Overview
//!
//! An overlay is a square panel placed in 3D space. Its content lives in a unit
//! "overlay UV" square; the panel is either a flat quad or a cylindrical arc that
//! bends towards the viewer. Textures that are not square are letterboxed inside
//! the overlay square by a [`UvTransform`].
//!
//! This crate stores surfaces and answers geometry questions about them.
//! It has no notion of pointers, buttons or hands.
//!
//! - [`Registry`] holds surfaces behind generational [`SurfaceId`]s, so a stale id
//!   held across frames is detected rather than aliased.
//! - [`SurfaceFlags`] gates which surfaces are offered to ray casts.
//! - [`IntersectionProvider`] is the query boundary; [`CpuIntersector`] is a
//!   reference implementation for flat and curved surfaces.
//!
//! ## Example
//!
//! ```
//! use glam::{Affine3A, Vec3};
//! use understory_overlay::{
//!     CpuIntersector, IntersectionProvider, Ray, Registry, SurfaceFlags, SurfaceGeometry,
//! };
//!
//! let mut surfaces: Registry<&str> = Registry::new();
//! let panel = surfaces.insert(
//!     SurfaceGeometry::flat(Affine3A::from_translation(Vec3::new(0.0, 1.5, -2.0)), 1.0),
//!     SurfaceFlags::default(),
//!     "panel",
//! );
//!
//! let ray = Ray::new(Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Z).unwrap();
//! let (id, surface) = surfaces.candidates().next().unwrap();
//! let hit = CpuIntersector
//!     .intersect_ray(id, &surface.geometry, &ray)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(id, panel);
//! assert!((hit.distance - 2.0).abs() < 1e-5);
//! ```

pub mod geometry;
mod provider;
mod registry;
pub mod types;
pub mod uv;

pub use geometry::{Ray, RayHit};
pub use provider::{CpuIntersector, IntersectionProvider, ProviderError};
pub use registry::{Registry, Surface};
pub use types::{Mapping, SurfaceFlags, SurfaceGeometry, SurfaceId};
pub use uv::UvTransform;
