//! Accelerometer -> bounded tilt vector.
//!
//! The normalizer is pure; [`TiltListener`] ties it to a platform
//! [`AccelerometerSource`] and releases the subscription when dropped.

use crate::constants::*;
use crate::error::Result;
use glam::Vec2;

/// One raw accelerometer reading in m/s^2, gravity included.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AccelSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Device tilt with each axis in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TiltVector {
    pub x: f32,
    pub y: f32,
}

impl TiltVector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Offset used by dispersion: scaled by the effect gain, then clamped
    /// per axis to `max_tilt`.
    pub fn effect_offset(self, max_tilt: f32) -> Vec2 {
        let m = max_tilt.max(0.0);
        Vec2::new(
            (self.x * TILT_EFFECT_GAIN).clamp(-m, m),
            (self.y * TILT_EFFECT_GAIN).clamp(-m, m),
        )
    }
}

#[derive(Clone, Debug)]
pub struct TiltNormalizer {
    resting_gravity: f32,
    current: TiltVector,
}

impl Default for TiltNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_RESTING_ANGLE_DEG)
    }
}

impl TiltNormalizer {
    pub fn new(resting_angle_deg: f32) -> Self {
        Self {
            resting_gravity: resting_angle_deg.to_radians().sin() * STANDARD_GRAVITY,
            current: TiltVector::ZERO,
        }
    }

    pub fn normalize(&self, sample: AccelSample) -> TiltVector {
        let x = -(sample.x / ACCEL_NORMALIZE_DIVISOR).clamp(-1.0, 1.0);
        let y = ((sample.y - self.resting_gravity) / ACCEL_NORMALIZE_DIVISOR).clamp(-1.0, 1.0);
        if !x.is_finite() || !y.is_finite() {
            return self.current;
        }
        TiltVector { x, y }
    }

    pub fn ingest(&mut self, sample: AccelSample) -> TiltVector {
        self.current = self.normalize(sample);
        self.current
    }

    pub fn current(&self) -> TiltVector {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = TiltVector::ZERO;
    }
}

/// Platform accelerometer feed.
pub trait AccelerometerSource {
    /// Start delivering samples. An error means no sensor; tilt then stays
    /// at zero.
    fn subscribe(&mut self) -> Result<()>;
    /// Next pending sample, if any. Never blocks.
    fn poll(&mut self) -> Option<AccelSample>;
    fn unsubscribe(&mut self);
}

/// Scoped sensor subscription feeding a caller-owned [`TiltNormalizer`].
///
/// Subscribes on construction and unsubscribes on drop, so repeated
/// mount/unmount cycles never leak listeners.
pub struct TiltListener {
    source: Box<dyn AccelerometerSource>,
    subscribed: bool,
}

impl TiltListener {
    pub fn new(mut source: Box<dyn AccelerometerSource>) -> Self {
        let subscribed = match source.subscribe() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[tilt] {e}; tilt stays level");
                false
            }
        };
        Self { source, subscribed }
    }

    /// Drain pending samples into `normalizer`; the latest one wins.
    pub fn pump(&mut self, normalizer: &mut TiltNormalizer) -> TiltVector {
        if self.subscribed {
            while let Some(sample) = self.source.poll() {
                normalizer.ingest(sample);
            }
        }
        normalizer.current()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl Drop for TiltListener {
    fn drop(&mut self) {
        if self.subscribed {
            self.source.unsubscribe();
            self.subscribed = false;
            log::debug!("[tilt] sensor released");
        }
    }
}
