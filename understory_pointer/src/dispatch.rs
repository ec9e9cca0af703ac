// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher façade: one call per frame drives both pointers.
//!
//! ## Frame order
//!
//! 1) Both hands are sampled, then latched (edges shift and the mode is recomputed).
//! 2) Scene-wide input for both hands, before any hit testing: release actions
//!    on a click falling edge, space drag, show/hide toggle.
//! 3) Hands are processed one after another, [`primary_hand`](crate::InteractionConfig::primary_hand) first.
//!    For each hand:
//!    - if holding: the grab path only (see [`grab`](crate::grab));
//!    - otherwise: cast, resolve, `Left` on target change, then either a grab
//!      start or primary arbitration, `Hover`, `Down`/`Up`, `Scroll`;
//!    - with no hit at all: fallback interactions decide the laser.
//!
//! [`Dispatcher::update`] only computes the ordered [`PointerEvent`] list.
//! [`deliver`] hands those events to the surface handlers and an observer.
//! [`Dispatcher::tick`] does both.

use glam::Affine3A;
use tracing::{debug, trace};
use understory_overlay::{IntersectionProvider, Ray, SurfaceFlags, SurfaceId};

use crate::cast::cast_ray;
use crate::config::{InteractionConfig, Rgb};
use crate::grab;
use crate::hover::HoverEvent;
use crate::input::InputSource;
use crate::pointer::Pointer;
use crate::resolve::resolve;
use crate::surface::{GrabHandler, PointerHandler, PointerObserver, SurfaceSet};
use crate::types::{Hand, PointerEvent, PointerMode};

/// What a fallback interaction sees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InteractionArgs {
    /// The hand with nothing under its ray.
    pub hand: Hand,
    /// Its current mode.
    pub mode: PointerMode,
    /// Its pose.
    pub pose: Affine3A,
    /// Click rising edge this frame.
    pub click: bool,
}

/// What a fallback interaction answers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InteractionResult {
    /// The interaction claimed this frame. Later fallbacks are not consulted.
    pub handled: bool,
    /// Laser length to show; zero keeps the laser hidden.
    pub length: f32,
    /// Laser colour when shown.
    pub color: Rgb,
}

impl InteractionResult {
    /// Not interested; the next fallback is consulted.
    pub const UNHANDLED: Self = Self {
        handled: false,
        length: 0.0,
        color: Rgb(0, 0, 0),
    };

    /// Claimed, drawing a laser of `length` in `color`.
    pub const fn handled(length: f32, color: Rgb) -> Self {
        Self {
            handled: true,
            length,
            color,
        }
    }
}

type Fallback = Box<dyn FnMut(&InteractionArgs) -> InteractionResult>;

/// Drives both pointers against a [`SurfaceSet`] once per frame.
pub struct Dispatcher {
    config: InteractionConfig,
    pointers: [Pointer; 2],
    fallbacks: Vec<(String, Fallback)>,
    shown: bool,
}

impl core::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.fallbacks.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("pointers", &self.pointers)
            .field("fallbacks", &names)
            .field("shown", &self.shown)
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl Dispatcher {
    /// Create a dispatcher with both pointers idle and overlays shown.
    pub fn new(config: InteractionConfig) -> Self {
        let pointers = Hand::ALL.map(|hand| Pointer::new(hand, &config));
        Self {
            config,
            pointers,
            fallbacks: Vec::new(),
            shown: true,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Pointer state for `hand`.
    pub fn pointer(&self, hand: Hand) -> &Pointer {
        &self.pointers[hand.index()]
    }

    /// State of the global show/hide toggle.
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Order in which hands are processed each frame.
    pub fn hand_order(&self) -> [Hand; 2] {
        let first = self.config.primary_hand;
        [first, first.other()]
    }

    /// Queue `action` to run once on `hand`'s next click release, whatever it points at.
    pub fn add_release_action(&mut self, hand: Hand, action: impl FnOnce() + 'static) {
        self.pointers[hand.index()].push_release_action(Box::new(action));
    }

    /// Register a fallback interaction consulted when a free pointer hits nothing.
    ///
    /// Fallbacks run in registration order. Registering an existing name replaces
    /// it in place.
    pub fn register_fallback(
        &mut self,
        name: impl Into<String>,
        interaction: impl FnMut(&InteractionArgs) -> InteractionResult + 'static,
    ) {
        let name = name.into();
        let interaction: Fallback = Box::new(interaction);
        if let Some(slot) = self.fallbacks.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = interaction;
        } else {
            self.fallbacks.push((name, interaction));
        }
    }

    /// Remove a fallback by name. Returns true if it existed.
    pub fn unregister_fallback(&mut self, name: &str) -> bool {
        let before = self.fallbacks.len();
        self.fallbacks.retain(|(n, _)| n != name);
        self.fallbacks.len() != before
    }

    /// Flip the show/hide toggle as if a show/hide button had been pressed.
    pub fn toggle_show_hide(&mut self, surfaces: &mut SurfaceSet, hmd: &Affine3A) -> PointerEvent {
        toggle_visibility(&mut self.shown, surfaces, hmd)
    }

    /// Advance one frame and return its events in delivery order.
    pub fn update(
        &mut self,
        surfaces: &mut SurfaceSet,
        input: &impl InputSource,
        provider: &impl IntersectionProvider,
    ) -> Vec<PointerEvent> {
        let hmd = input.hmd_pose();
        // Both hands are sampled before either is processed.
        let samples = Hand::ALL.map(|hand| input.input_state(hand));
        for pointer in &mut self.pointers {
            pointer.latch(&samples[pointer.hand().index()], &hmd, &self.config);
        }

        let mut out = Vec::new();
        for hand in self.hand_order() {
            self.pre_step(hand, surfaces, &hmd, &mut out);
        }
        for hand in self.hand_order() {
            self.step(hand, surfaces, provider, &hmd, &mut out);
        }
        out
    }

    /// [`update`](Self::update) followed by [`deliver`]. Returns the delivered events.
    pub fn tick(
        &mut self,
        surfaces: &mut SurfaceSet,
        input: &impl InputSource,
        provider: &impl IntersectionProvider,
        observer: &mut impl PointerObserver,
    ) -> Vec<PointerEvent> {
        let events = self.update(surfaces, input, provider);
        deliver(&events, surfaces, observer);
        events
    }

    /// Input that affects the whole scene. Runs for both hands before either hit-tests.
    fn pre_step(
        &mut self,
        hand: Hand,
        surfaces: &mut SurfaceSet,
        hmd: &Affine3A,
        out: &mut Vec<PointerEvent>,
    ) {
        let pointer = &mut self.pointers[hand.index()];
        let edges = *pointer.edges();

        if edges.click.falling() {
            let n = pointer.run_release_actions();
            if n > 0 {
                trace!(%hand, n, "ran release actions");
            }
        }
        if let Some(delta) = pointer.space_drag_delta() {
            out.push(PointerEvent::SpaceDrag { hand, delta });
        }
        if edges.show_hide.rising() {
            out.push(toggle_visibility(&mut self.shown, surfaces, hmd));
        }
    }

    fn step(
        &mut self,
        hand: Hand,
        surfaces: &mut SurfaceSet,
        provider: &impl IntersectionProvider,
        hmd: &Affine3A,
        out: &mut Vec<PointerEvent>,
    ) {
        let Self {
            config,
            pointers,
            fallbacks,
            ..
        } = self;
        let pointer = &mut pointers[hand.index()];
        let edges = *pointer.edges();

        if pointer.grab.is_holding() {
            grab::held_frame(pointer, surfaces, provider, config, hmd, out);
            return;
        }

        let hits = match Ray::from_pose(&pointer.pose()) {
            Some(ray) => cast_ray(hand, pointer.mode(), &ray, surfaces, provider),
            None => Vec::new(),
        };
        let resolution = resolve(&mut pointer.hover, &hits);
        for t in &resolution.transitions {
            match *t {
                HoverEvent::Leave(id) => {
                    // A removed surface gets no leave.
                    let Some(surface) = surfaces.get_mut(id) else {
                        continue;
                    };
                    surface.data.primary.release(hand);
                    trace!(surface = %id, %hand, "pointer left");
                    out.push(PointerEvent::Left { surface: id, hand });
                }
                HoverEvent::Enter(id) => trace!(surface = %id, %hand, "pointer entered"),
            }
        }

        let Some(mut hit) = resolution.hit else {
            run_fallbacks(pointer, fallbacks);
            return;
        };
        pointer.show_laser(hit.distance, config.colors.for_mode(pointer.mode()));

        if grab::try_begin(pointer, &mut hit, surfaces, out) {
            return;
        }

        let Some(surface) = surfaces.get_mut(hit.surface) else {
            return;
        };
        let state = &mut surface.data;
        // A held surface keeps its holder as primary.
        if !state.held_by.is_some_and(|owner| owner != hand) {
            if resolution.entered() || edges.click.rising() {
                if let Some(prev) = state.primary.ensure(hand) {
                    debug!(surface = %hit.surface, from = %prev, to = %hand, "primary changed");
                    out.push(PointerEvent::PrimaryLost {
                        surface: hit.surface,
                        hand: prev,
                    });
                }
            } else {
                state.primary.claim_if_vacant(hand);
            }
        }
        hit.is_primary = state.primary.is(hand);

        out.push(PointerEvent::Hover(hit));
        if edges.click.rising() {
            out.push(PointerEvent::Down(hit));
        } else if edges.click.falling() {
            out.push(PointerEvent::Up(hit));
        }
        if edges.scroll.abs() > config.scroll_deadzone {
            out.push(PointerEvent::Scroll {
                hit,
                value: edges.scroll,
            });
        }
    }
}

fn run_fallbacks(pointer: &mut Pointer, fallbacks: &mut [(String, Fallback)]) {
    let args = InteractionArgs {
        hand: pointer.hand(),
        mode: pointer.mode(),
        pose: pointer.pose(),
        click: pointer.edges().click.rising(),
    };
    for (name, interaction) in fallbacks.iter_mut() {
        let result = interaction(&args);
        if !result.handled {
            continue;
        }
        if result.length > f32::EPSILON {
            trace!(fallback = %name, hand = %args.hand, "fallback interaction drew the laser");
            pointer.show_laser(result.length, result.color);
            return;
        }
        break;
    }
    pointer.hide_laser();
}

fn toggle_visibility(shown: &mut bool, surfaces: &mut SurfaceSet, hmd: &Affine3A) -> PointerEvent {
    *shown = !*shown;
    for (_, surface) in surfaces.iter_mut() {
        if !surface.flags.contains(SurfaceFlags::SHOW_HIDE) {
            continue;
        }
        surface.flags.set(SurfaceFlags::VISIBLE, *shown);
        if *shown {
            grab::respawn(&mut surface.geometry, surface.data.saved_spawn, hmd);
        }
    }
    debug!(visible = *shown, "show/hide toggled");
    PointerEvent::ShowHide { visible: *shown }
}

fn with_pointer(
    surfaces: &mut SurfaceSet,
    id: SurfaceId,
    f: impl FnOnce(&mut Box<dyn PointerHandler>),
) {
    if let Some(handler) = surfaces.get_mut(id).and_then(|s| s.data.pointer.as_mut()) {
        f(handler);
    }
}

fn with_grab(
    surfaces: &mut SurfaceSet,
    id: SurfaceId,
    f: impl FnOnce(&mut Box<dyn GrabHandler>),
) {
    if let Some(handler) = surfaces.get_mut(id).and_then(|s| s.data.grab.as_mut()) {
        f(handler);
    }
}

/// Hand `events` to surface handlers and `observer`, in order.
///
/// Events for surfaces that no longer exist, or that lack the relevant
/// handler, are skipped.
pub fn deliver(
    events: &[PointerEvent],
    surfaces: &mut SurfaceSet,
    observer: &mut impl PointerObserver,
) {
    for event in events {
        match *event {
            PointerEvent::Left { surface, hand } => {
                with_pointer(surfaces, surface, |h| h.on_left(hand));
            }
            PointerEvent::Hover(hit) => with_pointer(surfaces, hit.surface, |h| h.on_hover(&hit)),
            PointerEvent::Down(hit) => with_pointer(surfaces, hit.surface, |h| h.on_down(&hit)),
            PointerEvent::Up(hit) => with_pointer(surfaces, hit.surface, |h| h.on_up(&hit)),
            PointerEvent::Scroll { hit, value } => {
                with_pointer(surfaces, hit.surface, |h| h.on_scroll(&hit, value));
            }
            PointerEvent::PrimaryLost { surface, hand } => {
                if surfaces.is_alive(surface) {
                    observer.on_primary_lost(hand, surface);
                }
            }
            PointerEvent::Grabbed(hit) => with_grab(surfaces, hit.surface, |h| h.on_grabbed(&hit)),
            PointerEvent::Dropped { surface, hand } => {
                with_grab(surfaces, surface, |h| h.on_dropped(hand));
            }
            PointerEvent::GrabHeld { surface, hand } => {
                with_grab(surfaces, surface, |h| h.on_grab_held(hand));
            }
            PointerEvent::ClickWhileHeld { surface, hand } => {
                with_grab(surfaces, surface, |h| h.on_click_while_held(hand));
            }
            PointerEvent::AltClickWhileHeld { surface, hand } => {
                with_grab(surfaces, surface, |h| h.on_alt_click_while_held(hand));
            }
            PointerEvent::ScrollSize {
                surface,
                hand,
                value,
            } => with_grab(surfaces, surface, |h| h.on_scroll_size(hand, value)),
            PointerEvent::ScrollDistance {
                surface,
                hand,
                value,
            } => with_grab(surfaces, surface, |h| h.on_scroll_distance(hand, value)),
            PointerEvent::ShowHide { visible } => observer.on_show_hide(visible),
            PointerEvent::SpaceDrag { hand, delta } => observer.on_space_drag(hand, delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;
    use std::{cell::RefCell, rc::Rc};

    use glam::{Quat, Vec3};
    use understory_overlay::{CpuIntersector, SurfaceGeometry};

    use crate::input::{FrameInput, InputState};
    use crate::surface::{Grabbable, SurfaceState};
    use crate::types::Hit;

    struct Scene {
        surfaces: SurfaceSet,
        input: FrameInput,
        dispatcher: Dispatcher,
    }

    fn pointing_away() -> Affine3A {
        Affine3A::from_quat(Quat::from_rotation_y(PI))
    }

    impl Scene {
        fn new() -> Self {
            let mut input = FrameInput::default();
            for hand in Hand::ALL {
                input.hand_mut(hand).pose = pointing_away();
            }
            Self {
                surfaces: SurfaceSet::new(),
                input,
                dispatcher: Dispatcher::default(),
            }
        }

        /// A 1 m flat panel centered at `at`, facing +Z.
        fn add(&mut self, at: Vec3, state: SurfaceState) -> SurfaceId {
            self.surfaces.insert(
                SurfaceGeometry::flat(Affine3A::from_translation(at), 1.0),
                SurfaceFlags::default(),
                state,
            )
        }

        fn hand(&mut self, hand: Hand) -> &mut InputState {
            self.input.hand_mut(hand)
        }

        /// Point `hand` down -Z from (x, y, 0).
        fn aim(&mut self, hand: Hand, x: f32, y: f32) {
            self.hand(hand).pose = Affine3A::from_translation(Vec3::new(x, y, 0.0));
        }

        fn away(&mut self, hand: Hand) {
            self.hand(hand).pose = pointing_away();
        }

        fn frame(&mut self) -> Vec<PointerEvent> {
            self.dispatcher
                .update(&mut self.surfaces, &self.input, &CpuIntersector)
        }
    }

    fn hovers(events: &[PointerEvent], hand: Hand) -> Vec<Hit> {
        events
            .iter()
            .filter_map(|e| match e {
                PointerEvent::Hover(h) if h.hand == hand => Some(*h),
                _ => None,
            })
            .collect()
    }

    fn count(events: &[PointerEvent], pred: impl Fn(&PointerEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn adjacent_surfaces_leave_once_when_ray_moves_off() {
        let mut s = Scene::new();
        let x = s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        let _y = s.add(Vec3::new(1.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.0, 0.0);

        let ev = s.frame();
        let h = hovers(&ev, Hand::Right);
        assert_eq!(h.len(), 1);
        assert_eq!(h[0].surface, x);
        assert!((h[0].distance - 1.0).abs() < 1e-5);
        assert_eq!(s.dispatcher.pointer(Hand::Right).hovered(), Some(x));

        s.away(Hand::Right);
        let ev = s.frame();
        assert_eq!(
            ev,
            vec![PointerEvent::Left {
                surface: x,
                hand: Hand::Right
            }]
        );
        assert!(s.frame().is_empty(), "no further events");
        assert!(!s.dispatcher.pointer(Hand::Right).laser().visible);
    }

    #[test]
    fn nearest_wins_over_insertion_order() {
        let mut s = Scene::new();
        let _far = s.add(Vec3::new(0.0, 0.0, -3.0), SurfaceState::new());
        let near = s.add(Vec3::new(0.0, 0.0, -1.5), SurfaceState::new());
        s.aim(Hand::Left, 0.0, 0.0);
        let h = hovers(&s.frame(), Hand::Left);
        assert_eq!(h.iter().map(|h| h.surface).collect::<Vec<_>>(), vec![near]);
        let laser = s.dispatcher.pointer(Hand::Left).laser();
        assert!(laser.visible && (laser.length - 1.5).abs() < 1e-5, "{laser:?}");
    }

    #[test]
    fn leave_precedes_enter_on_target_change() {
        let mut s = Scene::new();
        let a = s.add(Vec3::new(0.0, 0.0, -2.0), SurfaceState::new());
        let b = s.add(Vec3::new(3.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.0, 0.0);
        s.frame();
        s.aim(Hand::Right, 3.0, 0.0);
        let ev = s.frame();
        let left = ev
            .iter()
            .position(|e| *e == PointerEvent::Left { surface: a, hand: Hand::Right })
            .unwrap();
        let first_b = ev.iter().position(|e| e.surface() == Some(b)).unwrap();
        assert!(left < first_b, "{ev:?}");
        assert_eq!(count(&ev, |e| matches!(e, PointerEvent::Left { .. })), 1);
    }

    #[test]
    fn click_held_for_many_frames_is_one_down_one_up() {
        let mut s = Scene::new();
        s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.0, 0.0);
        let mut all = Vec::new();
        for click in [false, true, true, true, true, false, false] {
            s.hand(Hand::Right).click = click;
            all.extend(s.frame());
        }
        assert_eq!(count(&all, |e| matches!(e, PointerEvent::Down(_))), 1);
        assert_eq!(count(&all, |e| matches!(e, PointerEvent::Up(_))), 1);
    }

    #[test]
    fn hover_comes_before_down_in_the_same_frame() {
        let mut s = Scene::new();
        s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.0, 0.0);
        s.hand(Hand::Right).click = true;
        s.hand(Hand::Right).scroll = 0.5;
        let ev = s.frame();
        assert!(matches!(ev[0], PointerEvent::Hover(_)), "{ev:?}");
        assert!(matches!(ev[1], PointerEvent::Down(_)), "{ev:?}");
        assert!(
            matches!(ev[2], PointerEvent::Scroll { value, .. } if value == 0.5),
            "{ev:?}"
        );
    }

    #[test]
    fn scroll_inside_deadzone_is_ignored() {
        let mut s = Scene::new();
        s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.0, 0.0);
        s.hand(Hand::Right).scroll = 0.1;
        let ev = s.frame();
        assert_eq!(count(&ev, |e| matches!(e, PointerEvent::Scroll { .. })), 0);
    }

    #[test]
    fn grab_bypasses_hit_testing_until_release() {
        let mut s = Scene::new();
        let g = s.add(
            Vec3::new(0.0, 0.0, -0.5),
            SurfaceState::new().with_grab(Grabbable),
        );
        s.aim(Hand::Right, 0.0, 0.0);
        s.frame();

        s.hand(Hand::Right).grab = true;
        let ev = s.frame();
        let grabbed: Vec<_> = ev
            .iter()
            .filter_map(|e| match e {
                PointerEvent::Grabbed(h) => Some(*h),
                _ => None,
            })
            .collect();
        assert_eq!(grabbed.len(), 1);
        assert_eq!(grabbed[0].surface, g);
        assert!((grabbed[0].distance - 0.5).abs() < 1e-5);
        assert!(grabbed[0].is_primary);
        assert!(hovers(&ev, Hand::Right).is_empty(), "grab frame does not hover");
        assert_eq!(s.dispatcher.pointer(Hand::Right).grabbed(), Some(g));
        assert_eq!(s.surfaces.get(g).unwrap().data.held_by(), Some(Hand::Right));

        for _ in 0..3 {
            let ev = s.frame();
            assert_eq!(
                ev,
                vec![PointerEvent::GrabHeld {
                    surface: g,
                    hand: Hand::Right
                }]
            );
        }

        s.hand(Hand::Right).grab = false;
        let ev = s.frame();
        assert_eq!(
            ev,
            vec![PointerEvent::Dropped {
                surface: g,
                hand: Hand::Right
            }]
        );
        assert_eq!(s.dispatcher.pointer(Hand::Right).grabbed(), None);
        let state = &s.surfaces.get(g).unwrap().data;
        assert_eq!(state.held_by(), None);
        assert!(state.saved_spawn().is_some());

        let ev = s.frame();
        assert_eq!(hovers(&ev, Hand::Right).len(), 1, "hit testing resumes");
    }

    #[test]
    fn held_surface_follows_the_hand() {
        let mut s = Scene::new();
        let g = s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new().with_grab(Grabbable),
        );
        s.aim(Hand::Right, 0.0, 0.0);
        s.hand(Hand::Right).grab = true;
        s.frame();
        s.aim(Hand::Right, 0.5, 0.25);
        s.frame();
        let at = Vec3::from(s.surfaces.get(g).unwrap().geometry.transform.translation);
        assert!((at - Vec3::new(0.5, 0.25, -1.0)).length() < 1e-5, "{at:?}");
        let laser = s.dispatcher.pointer(Hand::Right).laser();
        assert!(laser.visible && (laser.length - 1.0).abs() < 1e-3, "{laser:?}");
    }

    #[test]
    fn second_hand_cannot_take_a_held_surface() {
        let mut s = Scene::new();
        let g = s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new().with_grab(Grabbable),
        );
        s.aim(Hand::Right, 0.1, 0.0);
        s.aim(Hand::Left, -0.1, 0.0);
        // Both press in the same frame: the first-processed hand wins.
        s.hand(Hand::Right).grab = true;
        s.hand(Hand::Left).grab = true;
        let ev = s.frame();
        assert_eq!(count(&ev, |e| matches!(e, PointerEvent::Grabbed(_))), 1);
        assert_eq!(s.dispatcher.pointer(Hand::Right).grabbed(), Some(g));
        assert_eq!(s.dispatcher.pointer(Hand::Left).grabbed(), None);
        let left = hovers(&ev, Hand::Left);
        assert_eq!(left.len(), 1, "other hand still hit-tests the held surface");
        assert!(!left[0].is_primary, "holder stays primary");

        // A fresh press by the other hand is rejected too.
        s.hand(Hand::Left).grab = false;
        s.frame();
        s.hand(Hand::Left).grab = true;
        let ev = s.frame();
        assert_eq!(count(&ev, |e| matches!(e, PointerEvent::Grabbed(_))), 0);
        assert_eq!(s.surfaces.get(g).unwrap().data.held_by(), Some(Hand::Right));
    }

    #[test]
    fn exactly_one_held_callback_per_frame() {
        let mut s = Scene::new();
        let g = s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new().with_grab(Grabbable),
        );
        s.aim(Hand::Right, 0.0, 0.0);
        s.hand(Hand::Right).grab = true;
        s.frame();

        // Click and alt-click together: click wins.
        s.hand(Hand::Right).click = true;
        s.hand(Hand::Right).alt_click = true;
        let ev = s.frame();
        assert_eq!(
            ev,
            vec![PointerEvent::ClickWhileHeld {
                surface: g,
                hand: Hand::Right
            }]
        );

        s.hand(Hand::Right).click = false;
        s.hand(Hand::Right).alt_click = false;
        s.frame();
        s.hand(Hand::Right).alt_click = true;
        let ev = s.frame();
        assert_eq!(
            ev,
            vec![PointerEvent::AltClickWhileHeld {
                surface: g,
                hand: Hand::Right
            }]
        );

        // Scroll in normal mode moves the surface, then the held callback follows.
        s.hand(Hand::Right).scroll = 0.5;
        let ev = s.frame();
        assert!(
            matches!(ev[..], [
                PointerEvent::ScrollDistance { value, .. },
                PointerEvent::GrabHeld { .. }
            ] if value == 0.5),
            "{ev:?}"
        );
        let z = s.surfaces.get(g).unwrap().geometry.transform.translation.z;
        assert!((z + 1.125).abs() < 1e-4, "pushed away, z = {z}");

        // Explicit alt modifier routes the same scroll to resizing.
        s.hand(Hand::Right).modifier = Some(PointerMode::Alt);
        let ev = s.frame();
        assert!(
            matches!(ev[..], [
                PointerEvent::ScrollSize { .. },
                PointerEvent::GrabHeld { .. }
            ]),
            "{ev:?}"
        );
        let scale = s.surfaces.get(g).unwrap().geometry.scale;
        assert!((scale - 0.75).abs() < 1e-5, "scale = {scale}");
    }

    #[test]
    fn removed_held_surface_releases_silently() {
        let mut s = Scene::new();
        let g = s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new().with_grab(Grabbable),
        );
        s.aim(Hand::Right, 0.0, 0.0);
        s.hand(Hand::Right).grab = true;
        s.frame();
        s.surfaces.remove(g);

        assert!(s.frame().is_empty(), "no held callback, no drop");
        assert_eq!(s.dispatcher.pointer(Hand::Right).grabbed(), None);
        assert!(s.frame().is_empty(), "and no leave for the removed surface");
    }

    #[test]
    fn primary_follows_enter_and_press_but_not_steady_hover() {
        let mut s = Scene::new();
        let p = s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.1, 0.0);
        let ev = s.frame();
        assert!(hovers(&ev, Hand::Right)[0].is_primary);

        s.aim(Hand::Left, -0.1, 0.0);
        let ev = s.frame();
        let lost = ev
            .iter()
            .position(|e| {
                *e == PointerEvent::PrimaryLost {
                    surface: p,
                    hand: Hand::Right,
                }
            })
            .unwrap();
        let left_hover = ev
            .iter()
            .position(|e| matches!(e, PointerEvent::Hover(h) if h.hand == Hand::Left))
            .unwrap();
        assert!(lost < left_hover, "primary lost is signalled before the new hover");
        assert!(hovers(&ev, Hand::Left)[0].is_primary);

        let ev = s.frame();
        assert_eq!(count(&ev, |e| matches!(e, PointerEvent::PrimaryLost { .. })), 0);
        assert!(!hovers(&ev, Hand::Right)[0].is_primary);
        assert_eq!(s.surfaces.get(p).unwrap().data.primary(), Some(Hand::Left));

        s.hand(Hand::Right).click = true;
        let ev = s.frame();
        assert!(ev.contains(&PointerEvent::PrimaryLost {
            surface: p,
            hand: Hand::Left
        }));
        let down = ev
            .iter()
            .find_map(|e| match e {
                PointerEvent::Down(h) => Some(*h),
                _ => None,
            })
            .unwrap();
        assert!(down.is_primary);

        // Leaving clears the claim; the remaining hand picks it up again.
        s.away(Hand::Right);
        s.frame();
        assert_eq!(s.surfaces.get(p).unwrap().data.primary(), Some(Hand::Left));
    }

    #[test]
    fn hit_carries_mode_and_laser_colour() {
        let mut s = Scene::new();
        s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Left, 0.0, 0.0);
        s.hand(Hand::Left).modifier = Some(PointerMode::Alt2);
        let ev = s.frame();
        assert_eq!(hovers(&ev, Hand::Left)[0].mode, PointerMode::Alt2);
        let laser = s.dispatcher.pointer(Hand::Left).laser();
        assert_eq!(laser.color, s.dispatcher.config().colors.alt2);
    }

    #[test]
    fn release_actions_run_on_click_release_anywhere() {
        let mut s = Scene::new();
        let ran = Rc::new(RefCell::new(0));
        let r = Rc::clone(&ran);
        s.dispatcher
            .add_release_action(Hand::Left, move || *r.borrow_mut() += 1);
        s.hand(Hand::Left).click = true;
        s.frame();
        assert_eq!(*ran.borrow(), 0);
        s.hand(Hand::Left).click = false;
        s.frame();
        s.frame();
        assert_eq!(*ran.borrow(), 1);
    }

    #[test]
    fn fallback_draws_laser_when_nothing_is_hit() {
        let mut s = Scene::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        s.dispatcher.register_fallback("ignore", move |args| {
            log.borrow_mut().push(args.hand);
            InteractionResult::UNHANDLED
        });
        s.dispatcher.register_fallback("space", |args| {
            if args.hand == Hand::Left {
                InteractionResult::handled(1.5, Rgb(1, 2, 3))
            } else {
                InteractionResult::UNHANDLED
            }
        });
        s.frame();
        let left = s.dispatcher.pointer(Hand::Left).laser();
        assert!(left.visible && left.length == 1.5 && left.color == Rgb(1, 2, 3));
        assert!(!s.dispatcher.pointer(Hand::Right).laser().visible);
        assert_eq!(*seen.borrow(), vec![Hand::Right, Hand::Left], "primary hand first");

        assert!(s.dispatcher.unregister_fallback("space"));
        assert!(!s.dispatcher.unregister_fallback("space"));
        s.frame();
        assert!(!s.dispatcher.pointer(Hand::Left).laser().visible);
    }

    #[test]
    fn show_hide_toggles_flagged_surfaces() {
        let mut s = Scene::new();
        let toggled = s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        let pinned = s.surfaces.insert(
            SurfaceGeometry::default(),
            SurfaceFlags::VISIBLE | SurfaceFlags::INTERACTABLE,
            SurfaceState::new(),
        );
        s.hand(Hand::Left).show_hide = true;
        let ev = s.frame();
        assert_eq!(ev, vec![PointerEvent::ShowHide { visible: false }]);
        assert!(!s.dispatcher.is_shown());
        let visible = |s: &Scene, id| {
            s.surfaces
                .get(id)
                .unwrap()
                .flags
                .contains(SurfaceFlags::VISIBLE)
        };
        assert!(!visible(&s, toggled));
        assert!(visible(&s, pinned));

        // Holding the button does not toggle again.
        assert!(s.frame().is_empty());
        s.hand(Hand::Left).show_hide = false;
        s.frame();
        s.hand(Hand::Left).show_hide = true;
        assert_eq!(s.frame(), vec![PointerEvent::ShowHide { visible: true }]);
        assert!(visible(&s, toggled));
    }

    #[test]
    fn hidden_surfaces_cannot_be_hit() {
        let mut s = Scene::new();
        s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.0, 0.0);
        let hmd = Affine3A::IDENTITY;
        s.dispatcher.toggle_show_hide(&mut s.surfaces, &hmd);
        assert!(s.frame().is_empty());
    }

    #[test]
    fn space_drag_emits_deltas_while_held() {
        let mut s = Scene::new();
        s.hand(Hand::Right).space_drag = true;
        s.aim(Hand::Right, 0.0, 5.0);
        assert!(s.frame().is_empty(), "first held frame has no delta");
        s.aim(Hand::Right, 0.25, 5.0);
        let ev = s.frame();
        assert_eq!(ev.len(), 1);
        match ev[0] {
            PointerEvent::SpaceDrag { hand, delta } => {
                assert_eq!(hand, Hand::Right);
                assert!((delta - Vec3::new(0.25, 0.0, 0.0)).length() < 1e-6);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn show_hide_applies_before_either_hand_hit_tests() {
        let mut s = Scene::new();
        let panel = s.add(Vec3::new(0.0, 0.0, -1.0), SurfaceState::new());
        s.aim(Hand::Right, 0.0, 0.0);
        assert_eq!(hovers(&s.frame(), Hand::Right).len(), 1);

        // The left hand is processed second, but its toggle still lands first.
        s.hand(Hand::Left).show_hide = true;
        let ev = s.frame();
        assert_eq!(
            ev,
            vec![
                PointerEvent::ShowHide { visible: false },
                PointerEvent::Left {
                    surface: panel,
                    hand: Hand::Right
                },
            ]
        );
        assert!(!s.dispatcher.pointer(Hand::Right).laser().visible);
    }

    #[test]
    fn grab_takes_primary_from_the_other_hand() {
        let mut s = Scene::new();
        let g = s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new().with_grab(Grabbable),
        );
        s.aim(Hand::Right, 0.1, 0.0);
        s.frame();
        s.aim(Hand::Left, -0.1, 0.0);
        s.frame();
        assert_eq!(s.surfaces.get(g).unwrap().data.primary(), Some(Hand::Left));

        s.hand(Hand::Right).grab = true;
        let ev = s.frame();
        assert_eq!(
            ev[0],
            PointerEvent::PrimaryLost {
                surface: g,
                hand: Hand::Left
            }
        );
        assert!(
            matches!(ev[1], PointerEvent::Grabbed(h) if h.hand == Hand::Right && h.is_primary),
            "{ev:?}"
        );
        let left = hovers(&ev, Hand::Left);
        assert_eq!(left.len(), 1);
        assert!(!left[0].is_primary);
        assert_eq!(s.surfaces.get(g).unwrap().data.primary(), Some(Hand::Right));
    }

    #[test]
    fn hiding_a_held_surface_drops_it() {
        let mut s = Scene::new();
        let g = s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new().with_grab(Grabbable),
        );
        s.aim(Hand::Right, 0.0, 0.0);
        s.hand(Hand::Right).grab = true;
        s.frame();
        assert_eq!(s.dispatcher.pointer(Hand::Right).grabbed(), Some(g));

        s.hand(Hand::Left).show_hide = true;
        let ev = s.frame();
        assert_eq!(
            ev,
            vec![
                PointerEvent::ShowHide { visible: false },
                PointerEvent::Dropped {
                    surface: g,
                    hand: Hand::Right
                },
            ]
        );
        let pointer = s.dispatcher.pointer(Hand::Right);
        assert_eq!(pointer.grabbed(), None);
        assert!(!pointer.laser().visible);
        let state = &s.surfaces.get(g).unwrap().data;
        assert_eq!(state.held_by(), None);
        assert!(state.saved_spawn().is_some());

        // Grab stays pressed: the hand resumes hit testing and finds nothing.
        assert_eq!(
            s.frame(),
            vec![PointerEvent::Left {
                surface: g,
                hand: Hand::Right
            }]
        );
        assert!(s.frame().is_empty());
    }

    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn push(&self, s: String) {
            self.0.borrow_mut().push(s);
        }
    }

    impl PointerHandler for Log {
        fn on_hover(&mut self, hit: &Hit) {
            self.push(format!("hover {}", hit.hand));
        }
        fn on_down(&mut self, hit: &Hit) {
            self.push(format!("down {}", hit.hand));
        }
        fn on_left(&mut self, hand: Hand) {
            self.push(format!("left {hand}"));
        }
    }

    impl GrabHandler for Log {
        fn on_grabbed(&mut self, hit: &Hit) {
            self.push(format!("grabbed {}", hit.hand));
        }
        fn on_grab_held(&mut self, hand: Hand) {
            self.push(format!("held {hand}"));
        }
        fn on_dropped(&mut self, hand: Hand) {
            self.push(format!("dropped {hand}"));
        }
    }

    impl PointerObserver for Log {
        fn on_primary_lost(&mut self, hand: Hand, _surface: SurfaceId) {
            self.push(format!("primary lost {hand}"));
        }
    }

    #[test]
    fn tick_delivers_to_handlers_in_order() {
        let mut s = Scene::new();
        let log = Log::default();
        s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new()
                .with_pointer(log.clone())
                .with_grab(log.clone()),
        );
        let mut observer = log.clone();
        let mut tick = |s: &mut Scene| {
            s.dispatcher
                .tick(&mut s.surfaces, &s.input, &CpuIntersector, &mut observer);
        };

        s.aim(Hand::Right, 0.0, 0.0);
        s.hand(Hand::Right).click = true;
        tick(&mut s);
        s.aim(Hand::Left, 0.1, 0.0);
        tick(&mut s);
        s.hand(Hand::Left).grab = true;
        tick(&mut s);
        tick(&mut s);
        s.hand(Hand::Left).grab = false;
        tick(&mut s);
        s.away(Hand::Right);
        tick(&mut s);

        assert_eq!(
            *log.0.borrow(),
            vec![
                "hover right",
                "down right",
                "hover right",
                "primary lost right",
                "hover left",
                "hover right",
                "grabbed left",
                "hover right",
                "held left",
                "hover right",
                "dropped left",
                "left right",
                "hover left",
            ]
        );
    }

    #[test]
    fn deliver_skips_removed_surfaces() {
        let mut s = Scene::new();
        let log = Log::default();
        let id = s.add(
            Vec3::new(0.0, 0.0, -1.0),
            SurfaceState::new().with_pointer(log.clone()),
        );
        s.aim(Hand::Right, 0.0, 0.0);
        let ev = s.frame();
        s.surfaces.remove(id);
        deliver(&ev, &mut s.surfaces, &mut ());
        assert!(log.0.borrow().is_empty());
    }
}
