// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use hydro_core::config::{AnimateAction, ClickAction};
use hydro_core::PointerKind;
use input::*;

#[test]
fn pointer_event_types_map_to_gesture_kinds() {
    assert_eq!(pointer_kind("pointerdown"), Some(PointerKind::Down));
    assert_eq!(pointer_kind("pointermove"), Some(PointerKind::Move));
    assert_eq!(pointer_kind("pointerup"), Some(PointerKind::Up));
    assert_eq!(pointer_kind("pointercancel"), Some(PointerKind::Cancel));
    assert_eq!(pointer_kind("lostpointercapture"), Some(PointerKind::Cancel));
    assert_eq!(pointer_kind("click"), None);
}

#[test]
fn client_position_scales_to_backing_store() {
    // 200x100 css box at (10, 20), backing store at 2x
    let p = client_to_canvas_px(
        Vec2::new(110.0, 70.0),
        Vec2::new(10.0, 20.0),
        Vec2::new(200.0, 100.0),
        Vec2::new(400.0, 200.0),
    );
    assert_eq!(p, Vec2::new(200.0, 100.0));
}

#[test]
fn collapsed_canvas_maps_to_origin() {
    let p = client_to_canvas_px(Vec2::new(5.0, 5.0), Vec2::ZERO, Vec2::ZERO, Vec2::ONE);
    assert_eq!(p, Vec2::ZERO);
}

#[test]
fn backing_size_follows_device_pixel_ratio() {
    assert_eq!(backing_size(Vec2::new(300.0, 150.0), 2.0), (600, 300));
    assert_eq!(backing_size(Vec2::new(300.0, 150.0), f64::NAN), (300, 150));
    assert_eq!(backing_size(Vec2::ZERO, 3.0), (1, 1));
}

#[test]
fn event_timestamps_truncate_to_ms() {
    assert_eq!(event_time_ms(1234.9), 1234);
    assert_eq!(event_time_ms(-3.0), 0);
    assert_eq!(event_time_ms(f64::INFINITY), 0);
}

#[test]
fn keys_map_to_actions() {
    assert_eq!(key_action("1"), Some(KeyAction::Click(ClickAction::Fluid)));
    assert_eq!(key_action("2"), Some(KeyAction::Click(ClickAction::Expand)));
    assert_eq!(key_action("3"), Some(KeyAction::Click(ClickAction::None)));
    assert_eq!(key_action("M"), Some(KeyAction::ToggleMorph));
    assert_eq!(key_action(" "), Some(KeyAction::Shockwave));
    assert_eq!(key_action("x"), None);
}

#[test]
fn controls_only_report_real_changes() {
    let mut c = WebControls::default();
    assert!(!c.apply(KeyAction::Click(ClickAction::Fluid)));
    assert!(c.apply(KeyAction::Click(ClickAction::Expand)));
    assert!(c.apply(KeyAction::ToggleMorph));
    assert!(!c.apply(KeyAction::Shockwave));

    let config = c.config(2.0);
    assert_eq!(config.animations.click_action, ClickAction::Expand);
    assert_eq!(config.animations.animate_action, AnimateAction::Morph);
    assert_eq!(config.density, 2.0);
    assert!(config.validate().is_ok());
}

#[test]
fn second_pointer_is_ignored_until_the_first_lifts() {
    let mut active = ActivePointer::default();
    assert!(!active.accept(PointerKind::Move, 1)); // hover
    assert!(active.accept(PointerKind::Down, 1));
    assert!(!active.accept(PointerKind::Down, 2));
    assert!(!active.accept(PointerKind::Move, 2));
    assert!(!active.accept(PointerKind::Up, 2));
    assert!(active.accept(PointerKind::Move, 1));
    assert!(active.accept(PointerKind::Up, 1));
    assert_eq!(active.id(), None);

    assert!(active.accept(PointerKind::Down, 2));
    assert!(active.accept(PointerKind::Cancel, 2));
    assert_eq!(active.id(), None);
}
