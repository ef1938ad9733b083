// Distortion engine: snapshots, ripple wiring, overrides and CPU rendering.

use glam::{Vec2, Vec4};
use hydro_core::config::*;
use hydro_core::error::{HydroError, Result};
use hydro_core::params::HydroUniforms;
use hydro_core::tilt::{AccelSample, AccelerometerSource};
use hydro_core::{
    ContentSource, DistortionEngine, GesturePhase, Image, Passthrough, PointerEvent,
    RippleOverride, ShockwaveController, TestCard,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn engine(config: EffectConfig) -> DistortionEngine {
    let mut e = DistortionEngine::new(config, 42).expect("valid config");
    e.resize(Vec2::new(200.0, 100.0));
    e
}

fn tap(e: &mut DistortionEngine, at: Vec2) {
    e.handle_pointer(&PointerEvent::down(at, 0));
    e.handle_pointer(&PointerEvent::up(at, 80));
}

#[test]
fn invalid_config_is_rejected() {
    let bad = EffectConfig::default().with_effects(HydroEffects {
        blur: -1.0,
        ..HydroEffects::default()
    });
    assert!(matches!(
        DistortionEngine::new(bad, 1),
        Err(HydroError::InvalidConfig(_))
    ));

    let inverted = EffectConfig::default().with_effects(HydroEffects {
        expand: expand(LengthRange::new(30.0, 10.0), LengthRange::new(80.0, 200.0)),
        ..HydroEffects::default()
    });
    assert!(DistortionEngine::new(inverted, 1).is_err());
}

#[test]
fn idle_snapshot_has_no_ripple() {
    let e = engine(EffectConfig::default());
    let p = e.snapshot();
    assert_eq!(p.progress, 0.0);
    assert_eq!(p.size, Vec2::new(200.0, 100.0));
    assert_eq!(p.click_mode, 2);
    assert_eq!(p.animate_mode, 0);
    assert_eq!(p.color_count, 3);
    assert!(p.use_alpha_mask);
}

#[test]
fn disabled_palette_zeroes_dispersion_uniforms() {
    let mut e = engine(EffectConfig::default().with_chromatic(None));
    e.handle_accel(AccelSample::new(3.0, 0.0, 9.8));
    let p = e.snapshot();
    assert_eq!(p.tilt, Vec2::ZERO);
    assert_eq!(p.color_count, 0);
    assert_eq!(p.chromatic_density, 0.0);
    assert!(!p.use_alpha_mask);
}

#[test]
fn accelerometer_feeds_gained_and_clamped_tilt() {
    let mut e = engine(EffectConfig::default());
    let rest = 45f32.to_radians().sin() * 9.81;
    // x: -(1/5) * 15 = -3; y: far past the clamp
    e.handle_accel(AccelSample::new(1.0, rest + 50.0, 0.0));
    let p = e.snapshot();
    assert!((p.tilt.x + 3.0).abs() < 1e-4, "{:?}", p.tilt);
    assert_eq!(p.tilt.y, 10.0);
}

#[test]
fn tap_triggers_ripple_at_touch_point() {
    let mut e = engine(EffectConfig::default());
    tap(&mut e, Vec2::new(50.0, 40.0));
    assert!(e.is_rippling());

    let f = e.frame(ms(100));
    assert!(f.params.progress > 0.0 && f.params.progress < 1.0);
    assert_eq!(f.params.center, Vec2::new(50.0, 40.0));
    assert!((10.0..=35.0).contains(&f.params.strength));

    let f = e.frame(Duration::from_secs(2));
    assert_eq!(f.params.progress, 0.0);
    assert!(!e.is_rippling());
}

#[test]
fn no_click_action_means_no_ripple() {
    let mut e = engine(
        EffectConfig::default().with_animations(animations(ClickAction::None, AnimateAction::Morph)),
    );
    tap(&mut e, Vec2::new(10.0, 10.0));
    assert!(!e.is_rippling());
    assert_eq!(e.snapshot().click_mode, 0);
    assert_eq!(e.snapshot().animate_mode, 1);
}

#[test]
fn cancel_leaves_ripple_untouched() {
    let mut e = engine(EffectConfig::default());
    tap(&mut e, Vec2::new(5.0, 5.0));
    e.frame(ms(200));
    let before = e.ripple_state();

    e.handle_pointer(&PointerEvent::down(Vec2::new(9.0, 9.0), 300));
    e.handle_pointer(&PointerEvent::cancel(310));
    let after = e.ripple_state();
    assert_eq!(before, after);
    assert_eq!(e.gesture_phase(), GesturePhase::Idle);
}

#[test]
fn press_trigger_fires_on_down() {
    let mut e = engine(EffectConfig::default().with_ripple_trigger(RippleTrigger::OnPress));
    e.handle_pointer(&PointerEvent::down(Vec2::new(5.0, 5.0), 0));
    assert!(e.is_rippling());
}

#[test]
fn override_replaces_local_gestures() {
    let mut e = engine(EffectConfig::default());
    e.set_ripple_override(Some(RippleOverride {
        progress: 0.3,
        center: Vec2::new(100.0, 90.0),
    }));
    let r = e.handle_pointer(&PointerEvent::down(Vec2::new(1.0, 1.0), 0));
    assert!(!r.ripple);
    assert_eq!(e.gesture_phase(), GesturePhase::Idle);

    let p = e.snapshot();
    assert_eq!(p.progress, 0.3);
    assert_eq!(p.center, Vec2::new(100.0, 90.0));

    e.set_ripple_override(None);
    assert_eq!(e.snapshot().progress, 0.0);
}

#[test]
fn draggable_surface_exposes_offset_and_stretch() {
    let mut e = engine(EffectConfig::default().with_draggable(true));
    e.handle_pointer(&PointerEvent::down(Vec2::new(10.0, 10.0), 0));
    let r = e.handle_pointer(&PointerEvent::moved(Vec2::new(40.0, 10.0), 16));
    assert_eq!(r.drag_delta, Some(Vec2::new(30.0, 0.0)));

    let layer = e.frame(ms(16)).layer;
    assert_eq!(layer.offset, Vec2::new(30.0, 0.0));
    assert!(layer.scale_x > 1.0 && layer.scale_y < 1.0);
    assert!(layer.interaction > 0.0);

    e.handle_pointer(&PointerEvent::up(Vec2::new(40.0, 10.0), 32));
    let layer = e.layer();
    assert_eq!((layer.scale_x, layer.scale_y), (1.0, 1.0));
    assert!(e.is_rippling());
}

#[test]
fn fixed_surface_never_moves() {
    let mut e = engine(EffectConfig::default());
    e.handle_pointer(&PointerEvent::down(Vec2::ZERO, 0));
    e.handle_pointer(&PointerEvent::moved(Vec2::new(50.0, 0.0), 16));
    assert_eq!(e.layer().offset, Vec2::ZERO);
}

#[test]
fn idle_render_reproduces_content() {
    let e = engine(EffectConfig::default());
    let content = TestCard::generate(40, 30);
    assert_eq!(e.render(&content), content);
}

#[test]
fn passthrough_fallback_ignores_active_effects() {
    let mut e = engine(
        EffectConfig::default().with_animations(animations(ClickAction::Expand, AnimateAction::Morph)),
    )
    .with_compositor(Box::new(Passthrough));
    e.handle_accel(AccelSample::new(4.0, 0.0, 0.0));
    tap(&mut e, Vec2::new(20.0, 15.0));
    e.frame(ms(300));
    let content = TestCard::generate(40, 30);
    assert_eq!(e.render(&content), content);
}

#[test]
fn active_render_distorts_but_keeps_shape_clip() {
    let config = EffectConfig::default()
        .with_animations(animations(ClickAction::Fluid, AnimateAction::Morph))
        .with_shape(ClipShape::RoundedRect { radius: 8.0 });
    let mut e = DistortionEngine::new(config, 3).expect("valid config");
    let content = Image::filled(32, 32, Vec4::new(0.2, 0.6, 0.9, 1.0));
    e.resize(Vec2::new(32.0, 32.0));
    e.handle_accel(AccelSample::new(2.0, 0.0, 0.0));
    e.frame(ms(500));
    let out = e.render(&content);
    assert_eq!(out.get(0, 0).w, 0.0);
    assert_eq!(out.get(16, 16).w, 1.0);
}

#[test]
fn uniform_layout_matches_shader_struct() {
    assert_eq!(std::mem::size_of::<HydroUniforms>(), 208);
    let mut e = engine(EffectConfig::default().with_chromatic(chromatic_aberration([
        colors::CYAN,
        colors::MAGENTA,
    ])));
    e.handle_accel(AccelSample::new(1.0, 0.0, 0.0));
    let u = e.snapshot().to_uniforms();
    assert_eq!(u.color_count, 2);
    assert_eq!(u.colors[0], [0.0, 1.0, 1.0, 1.0]);
    assert_eq!(u.colors[1], [1.0, 0.0, 1.0, 1.0]);
    assert_eq!(u.colors[2], [0.0; 4]);
    assert_eq!(u.use_alpha_mask, 1);
    let bytes: &[u8] = bytemuck::bytes_of(&u);
    assert_eq!(bytes.len(), 208);
}

#[test]
fn shockwave_drives_engine_through_override() {
    let mut wave = ShockwaveController::new();
    let mut e = engine(ShockwaveController::effect_config(1.0));
    e.resize(Vec2::new(400.0, 800.0));

    e.set_chromatic_active(wave.chromatic_active());
    assert_eq!(e.snapshot().color_count, 0);

    wave.trigger(None);
    assert!(wave.is_active());
    wave.tick(ms(300));
    e.set_ripple_override(Some(wave.ripple_override(e.view_size())));
    e.set_chromatic_active(wave.chromatic_active());
    let p = e.snapshot();
    assert!((p.progress - 0.5).abs() < 1e-3);
    assert!(p.center.distance(Vec2::new(200.0, 720.0)) < 1e-3);
    assert_eq!(p.click_mode, 1);
    assert_eq!(p.color_count, 3);
    assert_eq!(p.chromatic_density, 2.5);
    assert_eq!(p.fluidity, 0.8);
    assert!(!p.use_alpha_mask);

    wave.tick(ms(400));
    assert!(!wave.is_active());
    assert_eq!(wave.progress(), 0.0);
}

#[test]
fn shockwave_keeps_explicit_origin() {
    let mut wave = ShockwaveController::new();
    wave.trigger(Some(Vec2::new(12.0, 34.0)));
    wave.tick(ms(700));
    wave.trigger(None);
    assert_eq!(wave.origin(Vec2::new(100.0, 100.0)), Vec2::new(12.0, 34.0));
}

struct CountingSensor {
    released: Rc<Cell<bool>>,
    queued: Option<AccelSample>,
}

impl AccelerometerSource for CountingSensor {
    fn subscribe(&mut self) -> Result<()> {
        Ok(())
    }

    fn poll(&mut self) -> Option<AccelSample> {
        self.queued.take()
    }

    fn unsubscribe(&mut self) {
        self.released.set(true);
    }
}

#[test]
fn attached_sensor_is_pumped_each_tick_and_released() {
    let released = Rc::new(Cell::new(false));
    let mut e = engine(EffectConfig::default());
    let ok = e.attach_sensor(Box::new(CountingSensor {
        released: released.clone(),
        queued: Some(AccelSample::new(-5.0, 45f32.to_radians().sin() * 9.81, 0.0)),
    }));
    assert!(ok);
    assert!(e.has_sensor());

    e.tick(ms(16));
    assert!((e.tilt().x - 1.0).abs() < 1e-6);

    e.detach_sensor();
    assert!(released.get());
    assert!(!e.has_sensor());
}

#[test]
fn direct_samples_survive_an_idle_sensor() {
    let released = Rc::new(Cell::new(false));
    let rest = 45f32.to_radians().sin() * 9.81;
    let mut e = engine(EffectConfig::default());
    e.attach_sensor(Box::new(CountingSensor {
        released,
        queued: None,
    }));

    let pushed = e.handle_accel(AccelSample::new(2.5, rest, 0.0));
    assert!((pushed.x + 0.5).abs() < 1e-6);
    e.tick(ms(16));
    assert_eq!(e.tilt(), pushed);

    // a fresh sensor sample replaces it
    e.detach_sensor();
    let released = Rc::new(Cell::new(false));
    e.attach_sensor(Box::new(CountingSensor {
        released,
        queued: Some(AccelSample::new(-5.0, rest, 0.0)),
    }));
    e.tick(ms(16));
    assert!((e.tilt().x - 1.0).abs() < 1e-6);
}

#[test]
fn dropping_engine_releases_sensor() {
    let released = Rc::new(Cell::new(false));
    {
        let mut e = engine(EffectConfig::default());
        e.attach_sensor(Box::new(CountingSensor {
            released: released.clone(),
            queued: None,
        }));
    }
    assert!(released.get());
}

#[test]
fn test_card_source_follows_resize() {
    let mut card = TestCard::new(0, 0);
    assert!(card.current_frame().is_none());
    card.resize(glam::UVec2::new(16, 8));
    let frame = card.current_frame().map(|f| (f.width(), f.height()));
    assert_eq!(frame, Some((16, 8)));
}
