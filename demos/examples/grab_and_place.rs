// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grabbing a panel, pushing it away, resizing it, and re-summoning it.
//!
//! The right hand grabs a panel, carries it to the side, scrolls to push it
//! further away, rolls into alt mode to shrink it, and lets go. The panel is
//! then hidden and shown again with the show/hide button; on showing, it
//! reappears where it was dropped relative to the headset, which has since moved.
//!
//! Run:
//! - `cargo run -p understory_demos --example grab_and_place`
//! - `RUST_LOG=understory_pointer=debug cargo run -p understory_demos --example grab_and_place`

use glam::{Affine3A, Quat, Vec3};
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_overlay::{CpuIntersector, SurfaceFlags, SurfaceGeometry};
use understory_pointer::{
    Dispatcher, GrabHandler, Hand, Hit, InteractionConfig, SurfaceSet, SurfaceState,
    input::FrameInput,
};

const CONFIG: &str = r##"
scroll_deadzone = 0.05
primary_hand = "right"

[grab]
min_scale = 0.5
max_distance = 4.0

[colors]
alt = "#FF4000"
"##;

struct Report;

impl GrabHandler for Report {
    fn on_grabbed(&mut self, hit: &Hit) {
        println!("  grabbed by {} at {:.2} m", hit.hand, hit.distance);
    }

    fn on_scroll_distance(&mut self, _hand: Hand, value: f32) {
        println!("  pushed by {value:+.2}");
    }

    fn on_scroll_size(&mut self, _hand: Hand, value: f32) {
        println!("  resized by {value:+.2}");
    }

    fn on_dropped(&mut self, hand: Hand) {
        println!("  dropped by {hand}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match InteractionConfig::from_toml_str(CONFIG) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("bad demo config: {err}");
            return;
        }
    };
    info!(deadzone = config.scroll_deadzone, "config loaded");

    let mut surfaces = SurfaceSet::new();
    let panel = surfaces.insert(
        SurfaceGeometry::flat(Affine3A::from_translation(Vec3::new(0.0, 1.5, -1.0)), 1.0),
        SurfaceFlags::default(),
        SurfaceState::new().with_grab(Report),
    );

    let mut dispatcher = Dispatcher::new(config);
    let mut input = FrameInput::default();
    input.hmd = Affine3A::from_translation(Vec3::new(0.0, 1.6, 0.0));
    input.hand_mut(Hand::Left).pose = Affine3A::from_translation(Vec3::new(-0.3, -5.0, 0.0));
    let right = Vec3::new(0.0, 1.5, 0.0);
    let rolled = Quat::from_rotation_z(-core::f32::consts::FRAC_PI_2);

    let mut step = |label: &str, input: &FrameInput, surfaces: &mut SurfaceSet| {
        println!("== {label} ==");
        dispatcher.tick(surfaces, input, &CpuIntersector, &mut ());
        let Some(s) = surfaces.get(panel) else {
            return;
        };
        let at = s.geometry.transform.translation;
        println!(
            "  panel at ({:.2}, {:.2}, {:.2}), scale {:.2}, visible: {}",
            at.x,
            at.y,
            at.z,
            s.geometry.scale,
            s.flags.contains(SurfaceFlags::VISIBLE)
        );
    };

    input.hand_mut(Hand::Right).pose = Affine3A::from_translation(right);
    step("aim", &input, &mut surfaces);

    input.hand_mut(Hand::Right).grab = true;
    step("grab", &input, &mut surfaces);

    input.hand_mut(Hand::Right).pose = Affine3A::from_translation(right + Vec3::new(0.8, 0.0, 0.0));
    step("carry to the right", &input, &mut surfaces);

    input.hand_mut(Hand::Right).scroll = 0.8;
    step("push away", &input, &mut surfaces);

    // Rolling the controller puts it in alt mode, so the same scroll resizes.
    input.hand_mut(Hand::Right).pose =
        Affine3A::from_rotation_translation(rolled, right + Vec3::new(0.8, 0.0, 0.0));
    input.hand_mut(Hand::Right).scroll = 0.5;
    step("roll and shrink", &input, &mut surfaces);

    input.hand_mut(Hand::Right).scroll = 0.0;
    input.hand_mut(Hand::Right).grab = false;
    step("drop", &input, &mut surfaces);

    input.hand_mut(Hand::Left).show_hide = true;
    step("hide", &input, &mut surfaces);
    input.hand_mut(Hand::Left).show_hide = false;

    // Walk forward and turn, then summon the panel again.
    input.hmd = Affine3A::from_rotation_translation(
        Quat::from_rotation_y(core::f32::consts::FRAC_PI_2),
        Vec3::new(0.0, 1.6, -2.0),
    );
    step("walk", &input, &mut surfaces);
    input.hand_mut(Hand::Left).show_hide = true;
    step("show", &input, &mut surfaces);
}
