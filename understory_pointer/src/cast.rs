// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray caster: one hand's ray against every candidate surface.

use tracing::warn;
use understory_overlay::{IntersectionProvider, Ray, Registry};

use crate::types::{Hand, Hit, PointerMode};

/// Cast `ray` against every visible, interactable surface and collect the hits.
///
/// Hidden surfaces are skipped without querying the provider. A provider error
/// for one surface is logged and treated as a miss for that surface only; hits
/// with a non-finite distance, or that land in a texture's letterbox margin,
/// are misses too. The result is in registry order, not distance order.
pub fn cast_ray<T>(
    hand: Hand,
    mode: PointerMode,
    ray: &Ray,
    surfaces: &Registry<T>,
    provider: &impl IntersectionProvider,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (id, surface) in surfaces.candidates() {
        let hit = match provider.intersect_ray(id, &surface.geometry, ray) {
            Ok(Some(hit)) => hit,
            Ok(None) => continue,
            Err(err) => {
                warn!(surface = %id, %hand, "intersection failed, treating as miss: {err}");
                continue;
            }
        };
        if !hit.distance.is_finite() || hit.distance < 0.0 {
            warn!(surface = %id, %hand, distance = hit.distance, "discarding invalid hit distance");
            continue;
        }
        let Some(uv) = surface.geometry.uv.to_texture(hit.uv) else {
            continue;
        };
        hits.push(Hit {
            surface: id,
            hand,
            distance: hit.distance,
            uv,
            point: hit.point,
            normal: hit.normal,
            mode,
            is_primary: false,
        });
    }
    hits
}
