// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Affine3A, Vec3};
use understory_overlay::{CpuIntersector, Mapping, Ray, SurfaceFlags, SurfaceGeometry};
use understory_pointer::{
    Dispatcher, Grabbable, Hand, PointerMode, SurfaceSet, SurfaceState, cast::cast_ray,
    input::FrameInput, resolve::nearest,
};

/// `n × n` panels in a wall, each 1 m wide, stacked `layers` deep along -Z.
fn gen_wall(n: usize, layers: usize, curvature: f32) -> SurfaceSet {
    let mut surfaces = SurfaceSet::new();
    let half = n as f32 * 0.5;
    for layer in 0..layers {
        for y in 0..n {
            for x in 0..n {
                let at = Vec3::new(
                    x as f32 - half + 0.5,
                    y as f32 - half + 0.5,
                    -1.0 - layer as f32,
                );
                let mut geometry = SurfaceGeometry::flat(Affine3A::from_translation(at), 0.9);
                if curvature > 0.0 {
                    geometry.mapping = Mapping::Curved { curvature };
                }
                surfaces.insert(
                    geometry,
                    SurfaceFlags::default(),
                    SurfaceState::new().with_grab(Grabbable),
                );
            }
        }
    }
    surfaces
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        v as f32 / (1_u64 << 24) as f32
    }
}

fn gen_rays(count: usize, spread: f32, seed: u64) -> Vec<Ray> {
    let mut rng = Rng::new(seed);
    (0..count)
        .filter_map(|_| {
            let x = (rng.next_f32() - 0.5) * spread;
            let y = (rng.next_f32() - 0.5) * spread;
            Ray::new(Vec3::new(x, y, 0.0), Vec3::NEG_Z)
        })
        .collect()
}

fn bench_cast(c: &mut Criterion) {
    let mut group = c.benchmark_group("cast_and_resolve");
    for &(n, layers) in &[(4_usize, 1_usize), (8, 2), (16, 4)] {
        for (label, curvature) in [("flat", 0.0_f32), ("curved", 0.1)] {
            let surfaces = gen_wall(n, layers, curvature);
            let rays = gen_rays(256, n as f32, 0x5eed);
            group.throughput(Throughput::Elements(rays.len() as u64));
            group.bench_function(format!("{label}_{}", surfaces.len()), |b| {
                b.iter(|| {
                    let mut found = 0_usize;
                    for ray in &rays {
                        let hits = cast_ray(
                            Hand::Right,
                            PointerMode::Normal,
                            ray,
                            &surfaces,
                            &CpuIntersector,
                        );
                        found += usize::from(nearest(&hits).is_some());
                    }
                    black_box(found)
                });
            });
        }
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatcher_update");
    for &n in &[4_usize, 16] {
        let poses: Vec<Affine3A> = gen_rays(64, n as f32, 0xfeed)
            .iter()
            .map(|r| Affine3A::from_translation(r.origin))
            .collect();
        group.throughput(Throughput::Elements(poses.len() as u64));
        group.bench_function(format!("sweep_{n}x{n}"), |b| {
            b.iter_batched(
                || (gen_wall(n, 1, 0.0), Dispatcher::default(), FrameInput::default()),
                |(mut surfaces, mut dispatcher, mut input)| {
                    let mut events = 0_usize;
                    for (i, pose) in poses.iter().enumerate() {
                        input.hand_mut(Hand::Right).pose = *pose;
                        input.hand_mut(Hand::Left).pose = poses[poses.len() - 1 - i];
                        input.hand_mut(Hand::Right).click = i % 4 == 0;
                        events += dispatcher
                            .update(&mut surfaces, &input, &CpuIntersector)
                            .len();
                    }
                    black_box(events)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cast, bench_update);
criterion_main!(benches);
