//! Explicit animation timelines advanced by the host frame loop.
//!
//! Nothing here blocks or sleeps: each timeline is a small value type whose
//! state only changes inside `tick(dt)` or an explicit trigger.

use crate::constants::*;
use std::time::Duration;

/// Linear 0 -> 1 animation over a fixed duration.
#[derive(Clone, Debug, Default)]
pub struct Tween {
    value: f32,
    duration_sec: f32,
    running: bool,
}

impl Tween {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `value` and stop any running animation.
    pub fn snap_to(&mut self, value: f32) {
        self.value = value.clamp(0.0, 1.0);
        self.running = false;
    }

    /// Restart from 0, reaching 1 after `duration`.
    pub fn start(&mut self, duration: Duration) {
        self.value = 0.0;
        self.duration_sec = duration.as_secs_f32();
        self.running = true;
    }

    /// Advance the animation. Returns `true` on the tick that completes it.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }
        if self.duration_sec <= 0.0 {
            self.value = 1.0;
        } else {
            self.value = (self.value + dt.as_secs_f32() / self.duration_sec).min(1.0);
        }
        if self.value >= 1.0 {
            self.running = false;
            return true;
        }
        false
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Critically damped spring used for the interaction-intensity ramps.
///
/// Integrated analytically per tick, so large or uneven frame times stay
/// stable.
#[derive(Clone, Debug)]
pub struct Spring {
    value: f32,
    velocity: f32,
    target: f32,
    stiffness: f32,
}

impl Spring {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            stiffness: STIFFNESS_MEDIUM,
        }
    }

    /// Retarget the spring; current velocity is carried over.
    pub fn animate_to(&mut self, target: f32, stiffness: f32) {
        self.target = target;
        self.stiffness = stiffness.max(f32::EPSILON);
    }

    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn tick(&mut self, dt: Duration) {
        if self.is_settled() {
            return;
        }
        let t = dt.as_secs_f32();
        let omega = self.stiffness.sqrt();
        // x(t) = (c1 + c2 t) e^(-wt) around the target
        let c1 = self.value - self.target;
        let c2 = self.velocity + omega * c1;
        let decay = (-omega * t).exp();
        let disp = (c1 + c2 * t) * decay;
        self.velocity = (c2 - omega * (c1 + c2 * t)) * decay;
        self.value = self.target + disp;
        if disp.abs() < SPRING_REST_DISPLACEMENT && self.velocity.abs() < SPRING_REST_VELOCITY {
            self.snap_to(self.target);
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }
}

/// Free-running wrapping time signal for morph noise and idle motion.
#[derive(Clone, Debug)]
pub struct ContinuousClock {
    value: f32,
    units_per_sec: f32,
    wrap: f32,
}

impl Default for ContinuousClock {
    fn default() -> Self {
        Self::new(CLOCK_UNITS_PER_SEC, CLOCK_WRAP)
    }
}

impl ContinuousClock {
    pub fn new(units_per_sec: f32, wrap: f32) -> Self {
        Self {
            value: 0.0,
            units_per_sec,
            wrap,
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        self.value += dt.as_secs_f32() * self.units_per_sec;
        if self.wrap > 0.0 && self.value >= self.wrap {
            self.value = self.value.rem_euclid(self.wrap);
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}
