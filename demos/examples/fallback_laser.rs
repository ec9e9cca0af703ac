// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A custom input source, a fallback interaction and release actions.
//!
//! Input comes from named actions, the way a VR runtime's action system
//! exposes them. When the left hand points at nothing but the floor, a
//! "teleport" fallback draws the laser to the floor. A release action queued
//! on the right hand fires on the next click release, and holding space drag
//! reports how far the right hand moved.
//!
//! Run:
//! - `cargo run -p understory_demos --example fallback_laser`

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use glam::{Affine3A, Quat, Vec2, Vec3};
use tracing_subscriber::EnvFilter;
use understory_overlay::CpuIntersector;
use understory_pointer::{
    Dispatcher, Hand, InteractionArgs, InteractionResult, PointerObserver, Rgb, SurfaceSet,
    input::{InputSource, action},
};

#[derive(Default)]
struct Actions {
    hmd: Affine3A,
    poses: HashMap<Hand, Affine3A>,
    pressed: HashSet<(&'static str, Hand)>,
    axes: HashMap<(&'static str, Hand), Vec2>,
}

impl Actions {
    fn set(&mut self, name: &'static str, hand: Hand, down: bool) {
        if down {
            self.pressed.insert((name, hand));
        } else {
            self.pressed.remove(&(name, hand));
        }
    }
}

impl InputSource for Actions {
    fn hmd_pose(&self) -> Affine3A {
        self.hmd
    }

    fn hand_pose(&self, hand: Hand) -> Affine3A {
        self.poses.get(&hand).copied().unwrap_or_default()
    }

    fn boolean_action(&self, name: &str, hand: Hand) -> bool {
        self.pressed.iter().any(|(n, h)| *n == name && *h == hand)
    }

    fn axis2d_action(&self, name: &str, hand: Hand) -> Vec2 {
        self.axes
            .iter()
            .find(|((n, h), _)| *n == name && *h == hand)
            .map_or(Vec2::ZERO, |(_, v)| *v)
    }
}

/// Distance along the pointer to the floor plane `y = 0`, if it points down.
fn floor_distance(pose: &Affine3A) -> Option<f32> {
    let origin = pose.transform_point3(Vec3::ZERO);
    let dir = pose.transform_vector3(Vec3::NEG_Z).normalize_or_zero();
    (dir.y < -1e-3).then(|| origin.y / -dir.y)
}

struct Console;

impl PointerObserver for Console {
    fn on_space_drag(&mut self, hand: Hand, delta: Vec3) {
        println!("  {hand} dragged space by ({:.2}, {:.2}, {:.2})", delta.x, delta.y, delta.z);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut surfaces = SurfaceSet::new();
    let mut dispatcher = Dispatcher::default();

    dispatcher.register_fallback("teleport", |args: &InteractionArgs| {
        if args.hand != Hand::Left {
            return InteractionResult::UNHANDLED;
        }
        match floor_distance(&args.pose) {
            Some(d) if d < 8.0 => {
                if args.click {
                    println!("  teleport to {d:.2} m ahead");
                }
                InteractionResult::handled(d, Rgb(0x20, 0xC0, 0x40))
            }
            _ => InteractionResult::UNHANDLED,
        }
    });

    let released = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&released);
    dispatcher.add_release_action(Hand::Right, move || counter.set(counter.get() + 1));

    let mut input = Actions {
        hmd: Affine3A::from_translation(Vec3::new(0.0, 1.6, 0.0)),
        ..Actions::default()
    };
    let down = Quat::from_rotation_x(-0.6);
    input.poses.insert(
        Hand::Left,
        Affine3A::from_rotation_translation(down, Vec3::new(-0.2, 1.2, 0.0)),
    );
    input.poses.insert(Hand::Right, Affine3A::from_translation(Vec3::new(0.2, 1.2, 0.0)));

    for frame in 0..6 {
        input.set(action::CLICK, Hand::Left, frame == 1);
        input.set(action::CLICK, Hand::Right, frame == 2);
        input.set(action::SPACE_DRAG, Hand::Right, (3..=5).contains(&frame));
        if frame >= 4 {
            input.poses.insert(
                Hand::Right,
                Affine3A::from_translation(Vec3::new(0.2 + 0.1 * (frame - 3) as f32, 1.2, 0.0)),
            );
        }
        input.axes.insert((action::SCROLL, Hand::Right), Vec2::ZERO);

        println!("== Frame {frame} ==");
        dispatcher.tick(&mut surfaces, &input, &CpuIntersector, &mut Console);
        let laser = dispatcher.pointer(Hand::Left).laser();
        if laser.visible {
            println!("  left laser reaches the floor at {:.2} m ({})", laser.length, laser.color);
        }
        println!("  release actions fired: {}", released.get());
    }
}
