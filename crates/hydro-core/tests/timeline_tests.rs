// Ripple timeline randomization, the wrapping clock and spring ramps.

use hydro_core::config::{expand, ClickAction, ExpandConfig, LengthRange};
use hydro_core::constants::{DEFAULT_RIPPLE_STRENGTH, DEFAULT_RIPPLE_WIDTH};
use hydro_core::ripple::{RippleTimeline, TriggerSource};
use hydro_core::timeline::{ContinuousClock, Spring, Tween};
use std::time::Duration;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn tween_runs_linearly_and_reports_completion() {
    let mut t = Tween::new();
    t.start(ms(1000));
    assert!(t.is_running());
    assert!(!t.tick(ms(250)));
    assert!((t.value() - 0.25).abs() < 1e-6);
    assert!(!t.tick(ms(500)));
    assert!((t.value() - 0.75).abs() < 1e-6);
    assert!(t.tick(ms(400)));
    assert_eq!(t.value(), 1.0);
    assert!(!t.is_running());
    // finished tweens ignore further ticks
    assert!(!t.tick(ms(100)));
}

#[test]
fn ripple_starts_idle() {
    let r = RippleTimeline::new(ClickAction::Fluid, 1);
    let s = r.state();
    assert_eq!(s.progress, 0.0);
    assert_eq!(s.strength, DEFAULT_RIPPLE_STRENGTH);
    assert_eq!(s.width, DEFAULT_RIPPLE_WIDTH);
    assert!((0.0..100.0).contains(&s.seed));
    assert!(!r.is_active());
}

#[test]
fn generic_trigger_draws_inside_configured_ranges() {
    let mut r = RippleTimeline::new(ClickAction::Expand, 7);
    let cfg = ExpandConfig::default();
    for _ in 0..200 {
        let d = r.trigger(TriggerSource::Generic, &cfg, 1.0);
        assert!((10.0..=35.0).contains(&d.strength), "{d:?}");
        assert!((80.0..=200.0).contains(&d.width), "{d:?}");
        assert!((0.0..100.0).contains(&d.seed), "{d:?}");
        assert!((800..=1600).contains(&d.duration.as_millis()), "{d:?}");
    }
}

#[test]
fn aberration_and_shockwave_durations() {
    let mut r = RippleTimeline::new(ClickAction::Expand, 3);
    let cfg = ExpandConfig::default();
    for _ in 0..100 {
        let d = r.trigger(TriggerSource::AberrationOnly, &cfg, 1.0);
        assert!((1000..=1800).contains(&d.duration.as_millis()));
    }
    let d = r.trigger(TriggerSource::Shockwave, &cfg, 1.0);
    assert_eq!(d.duration, ms(600));
}

#[test]
fn density_scales_ranges_to_pixels() {
    let mut r = RippleTimeline::new(ClickAction::Expand, 11);
    let cfg = expand(LengthRange::new(10.0, 20.0), LengthRange::new(40.0, 40.0));
    for _ in 0..50 {
        let d = r.trigger(TriggerSource::Generic, &cfg, 2.5);
        assert!((25.0..=50.0).contains(&d.strength));
        assert_eq!(d.width, 100.0);
    }
}

#[test]
fn same_seed_gives_same_draws() {
    let cfg = ExpandConfig::default();
    let mut a = RippleTimeline::new(ClickAction::Fluid, 99);
    let mut b = RippleTimeline::new(ClickAction::Fluid, 99);
    for _ in 0..10 {
        assert_eq!(
            a.trigger(TriggerSource::Generic, &cfg, 1.0),
            b.trigger(TriggerSource::Generic, &cfg, 1.0)
        );
    }
}

#[test]
fn ripple_completes_back_to_idle() {
    let mut r = RippleTimeline::new(ClickAction::Fluid, 5);
    let d = r.trigger(TriggerSource::Generic, &ExpandConfig::default(), 1.0);
    assert!(r.is_active());
    assert_eq!(r.progress(), 0.0);

    r.tick(d.duration / 2);
    assert!((r.progress() - 0.5).abs() < 1e-3);
    r.tick(d.duration);
    assert!(!r.is_active());
    assert_eq!(r.progress(), 0.0);
}

#[test]
fn retrigger_interrupts_in_flight_ripple() {
    let mut r = RippleTimeline::new(ClickAction::Fluid, 5);
    let cfg = ExpandConfig::default();
    let first = r.trigger(TriggerSource::Generic, &cfg, 1.0);
    r.tick(first.duration / 2);
    assert!(r.progress() > 0.4);

    let second = r.trigger(TriggerSource::Generic, &cfg, 1.0);
    assert_eq!(r.progress(), 0.0);
    assert!(r.is_active());
    let s = r.state();
    assert_eq!(s.seed, second.seed);
    assert_eq!(s.strength, second.strength);
    assert_eq!(s.width, second.width);
}

#[test]
fn clock_advances_ten_units_per_second_and_wraps() {
    let mut c = ContinuousClock::default();
    c.tick(Duration::from_secs(99));
    assert!((c.value() - 990.0).abs() < 1e-3);
    c.tick(Duration::from_secs(2));
    assert!((c.value() - 10.0).abs() < 1e-3, "{}", c.value());
    assert!(c.value() < 1000.0);
}

#[test]
fn clock_survives_huge_steps() {
    let mut c = ContinuousClock::default();
    c.tick(Duration::from_secs(1234));
    assert!((0.0..1000.0).contains(&c.value()));
}

#[test]
fn spring_is_critically_damped() {
    let mut s = Spring::new(0.0);
    s.animate_to(1.0, 200.0);
    let mut last = 0.0;
    for _ in 0..200 {
        s.tick(ms(16));
        assert!(s.value() >= last - 1e-6, "went backwards");
        assert!(s.value() <= 1.0 + 1e-6, "overshot: {}", s.value());
        last = s.value();
    }
    assert_eq!(s.value(), 1.0);
    assert!(s.is_settled());
}

#[test]
fn stiffer_spring_settles_faster() {
    let mut soft = Spring::new(0.0);
    let mut stiff = Spring::new(0.0);
    soft.animate_to(1.0, 200.0);
    stiff.animate_to(1.0, 1500.0);
    soft.tick(ms(50));
    stiff.tick(ms(50));
    assert!(stiff.value() > soft.value());
}

#[test]
fn spring_step_size_does_not_change_the_path() {
    let mut coarse = Spring::new(0.0);
    let mut fine = Spring::new(0.0);
    coarse.animate_to(1.0, 200.0);
    fine.animate_to(1.0, 200.0);
    coarse.tick(ms(100));
    for _ in 0..10 {
        fine.tick(ms(10));
    }
    assert!((coarse.value() - fine.value()).abs() < 1e-4);
}
