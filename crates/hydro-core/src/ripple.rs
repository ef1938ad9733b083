//! One-shot ripple wavefront with per-trigger randomization.

use crate::config::{ClickAction, ExpandConfig};
use crate::constants::*;
use crate::timeline::Tween;
use rand::prelude::*;
use std::time::Duration;

/// Which call site fired the ripple; selects the duration range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSource {
    /// Pointer-driven ripple, 800-1600 ms.
    Generic,
    /// Dispersion-only surfaces, 1000-1800 ms.
    AberrationOnly,
    /// Controller-driven tab-switch shockwave, fixed 600 ms.
    Shockwave,
}

impl TriggerSource {
    fn duration_ms(self, rng: &mut StdRng) -> u32 {
        match self {
            TriggerSource::Generic => rng.gen_range(GENERIC_DURATION_MS.0..=GENERIC_DURATION_MS.1),
            TriggerSource::AberrationOnly => {
                rng.gen_range(ABERRATION_DURATION_MS.0..=ABERRATION_DURATION_MS.1)
            }
            TriggerSource::Shockwave => SHOCKWAVE_DURATION_MS,
        }
    }
}

/// Snapshot of the ripple as seen by the parameter builder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleState {
    pub progress: f32,
    pub seed: f32,
    /// Amplitude in pixels.
    pub strength: f32,
    /// Band width in pixels.
    pub width: f32,
    pub mode: ClickAction,
}

/// Values drawn by a single trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleDraw {
    pub seed: f32,
    pub strength: f32,
    pub width: f32,
    pub duration: Duration,
}

pub struct RippleTimeline {
    tween: Tween,
    seed: f32,
    strength: f32,
    width: f32,
    mode: ClickAction,
    rng: StdRng,
}

impl RippleTimeline {
    pub fn new(mode: ClickAction, rng_seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        let seed = rng.gen::<f32>() * RIPPLE_SEED_RANGE;
        Self {
            tween: Tween::new(),
            seed,
            strength: DEFAULT_RIPPLE_STRENGTH,
            width: DEFAULT_RIPPLE_WIDTH,
            mode,
            rng,
        }
    }

    /// Draw new randomized parameters and restart the wavefront from 0.
    /// Interrupts any ripple already in flight.
    pub fn trigger(&mut self, source: TriggerSource, expand: &ExpandConfig, density: f32) -> RippleDraw {
        let (s_min, s_max) = expand.strength.to_px(density);
        let (w_min, w_max) = expand.width.to_px(density);
        self.seed = self.rng.gen::<f32>() * RIPPLE_SEED_RANGE;
        self.strength = sample_range(&mut self.rng, s_min, s_max);
        self.width = sample_range(&mut self.rng, w_min, w_max);
        let duration = Duration::from_millis(source.duration_ms(&mut self.rng) as u64);
        self.tween.start(duration);
        log::debug!(
            "[ripple] trigger {:?} seed={:.2} strength={:.1}px width={:.1}px duration={}ms",
            source,
            self.seed,
            self.strength,
            self.width,
            duration.as_millis()
        );
        RippleDraw {
            seed: self.seed,
            strength: self.strength,
            width: self.width,
            duration,
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        if self.tween.tick(dt) {
            // back to idle
            self.tween.snap_to(0.0);
        }
    }

    pub fn is_active(&self) -> bool {
        self.tween.is_running()
    }

    pub fn progress(&self) -> f32 {
        self.tween.value()
    }

    pub fn state(&self) -> RippleState {
        RippleState {
            progress: self.tween.value(),
            seed: self.seed,
            strength: self.strength,
            width: self.width,
            mode: self.mode,
        }
    }
}

fn sample_range(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}
