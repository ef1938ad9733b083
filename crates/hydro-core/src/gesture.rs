//! Pointer gestures -> touch physics.
//!
//! `Idle -> Pressed -> (Dragging | released) -> Idle`. The tracker is fed one
//! pointer event at a time and never blocks; springs advance in `tick`.

use crate::config::RippleTrigger;
use crate::constants::*;
use crate::timeline::Spring;
use glam::Vec2;
use smallvec::SmallVec;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// One pointer event in view-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Vec2,
    pub timestamp_ms: u64,
}

impl PointerEvent {
    pub fn down(position: Vec2, timestamp_ms: u64) -> Self {
        Self {
            kind: PointerKind::Down,
            position,
            timestamp_ms,
        }
    }

    pub fn moved(position: Vec2, timestamp_ms: u64) -> Self {
        Self {
            kind: PointerKind::Move,
            position,
            timestamp_ms,
        }
    }

    pub fn up(position: Vec2, timestamp_ms: u64) -> Self {
        Self {
            kind: PointerKind::Up,
            position,
            timestamp_ms,
        }
    }

    pub fn cancel(timestamp_ms: u64) -> Self {
        Self {
            kind: PointerKind::Cancel,
            position: Vec2::ZERO,
            timestamp_ms,
        }
    }
}

/// Touch physics read by the parameter builder and the layer transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsState {
    pub touch_position: Vec2,
    pub velocity_magnitude: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub interaction_progress: f32,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            touch_position: Vec2::ZERO,
            velocity_magnitude: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            interaction_progress: 0.0,
        }
    }
}

/// Anisotropic stretch for a normalized drag velocity, capped at +-20%.
pub fn stretch_for_velocity(velocity: f32) -> (f32, f32) {
    let sx = 1.0 / (1.0 - (velocity * STRETCH_X_GAIN).clamp(-STRETCH_LIMIT, STRETCH_LIMIT));
    let sy = 1.0 * (1.0 - (velocity * STRETCH_Y_GAIN).clamp(-STRETCH_LIMIT, STRETCH_LIMIT));
    (sx, sy)
}

#[derive(Clone, Copy, Debug)]
struct VelocitySample {
    t_ms: u64,
    pos: Vec2,
}

/// Least-squares pointer velocity over a short trailing window.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    samples: SmallVec<[VelocitySample; VELOCITY_MAX_SAMPLES]>,
}

impl VelocityTracker {
    pub fn add_position(&mut self, timestamp_ms: u64, position: Vec2) {
        if self.samples.len() == VELOCITY_MAX_SAMPLES {
            self.samples.remove(0);
        }
        self.samples.push(VelocitySample {
            t_ms: timestamp_ms,
            pos: position,
        });
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Velocity in px/s; zero until two samples fall inside the window.
    pub fn velocity(&self) -> Vec2 {
        let Some(last) = self.samples.last() else {
            return Vec2::ZERO;
        };
        let recent = self
            .samples
            .iter()
            .filter(|s| last.t_ms.saturating_sub(s.t_ms) <= VELOCITY_HORIZON_MS);
        let mut n = 0.0f32;
        let mut sum_t = 0.0f32;
        let mut sum_p = Vec2::ZERO;
        for s in recent.clone() {
            n += 1.0;
            sum_t += rel_secs(s.t_ms, last.t_ms);
            sum_p += s.pos;
        }
        if n < 2.0 {
            return Vec2::ZERO;
        }
        let mean_t = sum_t / n;
        let mean_p = sum_p / n;
        let mut num = Vec2::ZERO;
        let mut den = 0.0f32;
        for s in recent {
            let dt = rel_secs(s.t_ms, last.t_ms) - mean_t;
            num += (s.pos - mean_p) * dt;
            den += dt * dt;
        }
        if den <= f32::EPSILON {
            return Vec2::ZERO;
        }
        num / den
    }
}

#[inline]
fn rel_secs(t_ms: u64, latest_ms: u64) -> f32 {
    -(latest_ms.saturating_sub(t_ms) as f32) / 1000.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Pressed,
    Dragging,
}

#[derive(Clone, Copy, Debug)]
pub struct GestureConfig {
    pub draggable: bool,
    pub touch_slop_px: f32,
    pub ripple_trigger: RippleTrigger,
}

/// What the host should do after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureResponse {
    pub ripple: bool,
    /// Movement applied to the drag offset (draggable surfaces only).
    pub drag_delta: Option<Vec2>,
}

pub struct GestureTracker {
    config: GestureConfig,
    phase: GesturePhase,
    physics: PhysicsState,
    interaction: Spring,
    velocity: VelocityTracker,
    press_origin: Vec2,
    last_position: Vec2,
    drag_offset: Vec2,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: GesturePhase::Idle,
            physics: PhysicsState::default(),
            interaction: Spring::new(0.0),
            velocity: VelocityTracker::default(),
            press_origin: Vec2::ZERO,
            last_position: Vec2::ZERO,
            drag_offset: Vec2::ZERO,
        }
    }

    pub fn handle(&mut self, ev: &PointerEvent) -> GestureResponse {
        match (ev.kind, self.phase) {
            (PointerKind::Down, GesturePhase::Dragging) => {
                // a press without an up ends the drag first
                self.interaction.animate_to(0.0, STIFFNESS_LOW);
                self.reset_motion();
                log::debug!("[gesture] drag interrupted by press");
                self.on_press(ev)
            }
            (PointerKind::Down, _) => self.on_press(ev),
            (PointerKind::Move, GesturePhase::Pressed) => {
                self.velocity.add_position(ev.timestamp_ms, ev.position);
                self.physics.touch_position = ev.position;
                if ev.position.distance(self.press_origin) > self.config.touch_slop_px {
                    self.phase = GesturePhase::Dragging;
                    self.interaction.animate_to(DRAG_INTENSITY, STIFFNESS_LOW);
                    log::debug!("[gesture] drag start at ({:.1},{:.1})", ev.position.x, ev.position.y);
                    self.on_drag_motion(ev)
                } else {
                    GestureResponse::default()
                }
            }
            (PointerKind::Move, GesturePhase::Dragging) => {
                self.velocity.add_position(ev.timestamp_ms, ev.position);
                self.on_drag_motion(ev)
            }
            (PointerKind::Up, GesturePhase::Pressed) => {
                self.physics.touch_position = ev.position;
                self.interaction.animate_to(0.0, STIFFNESS_MEDIUM);
                self.phase = GesturePhase::Idle;
                GestureResponse {
                    ripple: self.config.ripple_trigger == RippleTrigger::OnRelease,
                    drag_delta: None,
                }
            }
            (PointerKind::Up, GesturePhase::Dragging) => {
                self.interaction.animate_to(0.0, STIFFNESS_LOW);
                self.reset_motion();
                self.phase = GesturePhase::Idle;
                log::debug!("[gesture] drag end");
                GestureResponse {
                    ripple: self.config.ripple_trigger == RippleTrigger::OnRelease,
                    drag_delta: None,
                }
            }
            (PointerKind::Cancel, GesturePhase::Pressed | GesturePhase::Dragging) => {
                self.interaction.animate_to(0.0, STIFFNESS_MEDIUM);
                self.reset_motion();
                self.phase = GesturePhase::Idle;
                GestureResponse::default()
            }
            // hover moves and stray ups/cancels
            _ => GestureResponse::default(),
        }
    }

    fn on_press(&mut self, ev: &PointerEvent) -> GestureResponse {
        self.phase = GesturePhase::Pressed;
        self.press_origin = ev.position;
        self.last_position = ev.position;
        self.physics.touch_position = ev.position;
        self.velocity.reset();
        self.velocity.add_position(ev.timestamp_ms, ev.position);
        self.interaction.animate_to(PRESS_INTENSITY, STIFFNESS_MEDIUM);
        GestureResponse {
            ripple: self.config.ripple_trigger == RippleTrigger::OnPress,
            drag_delta: None,
        }
    }

    fn on_drag_motion(&mut self, ev: &PointerEvent) -> GestureResponse {
        let delta = ev.position - self.last_position;
        self.last_position = ev.position;
        self.physics.touch_position = ev.position;

        let drag_delta = if self.config.draggable {
            self.drag_offset += delta;
            Some(delta)
        } else {
            None
        };

        let v = self.velocity.velocity();
        let magnitude = (v.x.abs() + v.y.abs()) / VELOCITY_NORMALIZE;
        self.physics.velocity_magnitude = magnitude;
        let (sx, sy) = stretch_for_velocity(magnitude);
        self.physics.scale_x = sx;
        self.physics.scale_y = sy;

        GestureResponse {
            ripple: false,
            drag_delta,
        }
    }

    fn reset_motion(&mut self) {
        self.physics.velocity_magnitude = 0.0;
        self.physics.scale_x = 1.0;
        self.physics.scale_y = 1.0;
        self.velocity.reset();
    }

    pub fn tick(&mut self, dt: Duration) {
        self.interaction.tick(dt);
        self.physics.interaction_progress = self.interaction.value().clamp(0.0, 1.0);
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn physics(&self) -> &PhysicsState {
        &self.physics
    }

    pub fn drag_offset(&self) -> Vec2 {
        self.drag_offset
    }

    /// Target the interaction ramp is heading to.
    pub fn interaction_target(&self) -> f32 {
        self.interaction.target()
    }
}
