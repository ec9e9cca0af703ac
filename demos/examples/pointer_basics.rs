// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two hands hovering and clicking two panels.
//!
//! The right hand sweeps from one panel to the other, clicking on the way;
//! the left hand joins on the second panel and takes over its primary slot.
//! Every frame's events are printed in delivery order.
//!
//! Run:
//! - `cargo run -p understory_demos --example pointer_basics`
//! - `RUST_LOG=understory_pointer=trace cargo run -p understory_demos --example pointer_basics`

use glam::{Affine3A, Quat, Vec3};
use tracing_subscriber::EnvFilter;
use understory_overlay::{CpuIntersector, SurfaceFlags, SurfaceGeometry, SurfaceId};
use understory_pointer::{
    Dispatcher, Hand, Hit, PointerEvent, PointerHandler, PointerObserver, SurfaceSet,
    SurfaceState, input::FrameInput,
};

struct Named(&'static str);

impl PointerHandler for Named {
    fn on_down(&mut self, hit: &Hit) {
        println!(
            "  [{}] pressed by {} at uv ({:.2}, {:.2}), primary: {}",
            self.0, hit.hand, hit.uv.x, hit.uv.y, hit.is_primary
        );
    }

    fn on_left(&mut self, hand: Hand) {
        println!("  [{}] {hand} hand left", self.0);
    }
}

struct Console;

impl PointerObserver for Console {
    fn on_primary_lost(&mut self, hand: Hand, surface: SurfaceId) {
        println!("  {hand} hand is no longer primary on {surface}");
    }
}

fn aim_at(x: f32) -> Affine3A {
    Affine3A::from_translation(Vec3::new(x, 1.5, 0.0))
}

fn resting() -> Affine3A {
    // Pointing at the floor.
    Affine3A::from_rotation_translation(
        Quat::from_rotation_x(-core::f32::consts::FRAC_PI_2),
        Vec3::new(0.0, 1.0, 0.0),
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut surfaces = SurfaceSet::new();
    for (name, x) in [("browser", -0.6), ("keyboard", 0.6)] {
        surfaces.insert(
            SurfaceGeometry::flat(Affine3A::from_translation(Vec3::new(x, 1.5, -1.5)), 1.0),
            SurfaceFlags::default(),
            SurfaceState::new().with_pointer(Named(name)),
        );
    }

    let mut dispatcher = Dispatcher::default();
    let mut input = FrameInput::default();
    input.hmd = Affine3A::from_translation(Vec3::new(0.0, 1.6, 0.0));
    input.hand_mut(Hand::Left).pose = resting();

    // (right x, right click, left x)
    let script: [(f32, bool, Option<f32>); 7] = [
        (-0.6, false, None),
        (-0.6, true, None),
        (-0.6, false, None),
        (0.6, false, None),
        (0.6, false, Some(0.5)),
        (0.6, true, Some(0.5)),
        (2.5, false, Some(0.5)),
    ];

    for (frame, (right_x, click, left_x)) in script.into_iter().enumerate() {
        input.hand_mut(Hand::Right).pose = aim_at(right_x);
        input.hand_mut(Hand::Right).click = click;
        input.hand_mut(Hand::Left).pose = left_x.map_or_else(resting, aim_at);

        println!("== Frame {frame} ==");
        let events = dispatcher.tick(&mut surfaces, &input, &CpuIntersector, &mut Console);
        for event in &events {
            match event {
                PointerEvent::Hover(hit) => println!(
                    "  {} hovers {} at {:.2} m",
                    hit.hand, hit.surface, hit.distance
                ),
                other => println!("  {other:?}"),
            }
        }
        for hand in Hand::ALL {
            let laser = dispatcher.pointer(hand).laser();
            if laser.visible {
                println!("  {hand} laser {:.2} m in {}", laser.length, laser.color);
            }
        }
    }
}
