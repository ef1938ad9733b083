//! Controller-driven shockwave (tab switches and similar screen-wide hits).
//!
//! The controller does not touch any engine state directly: each frame the
//! host reads [`ShockwaveController::ripple_override`] and
//! [`ShockwaveController::chromatic_active`] and hands them to the engine
//! built from [`ShockwaveController::effect_config`].

use crate::config::{
    animations, colors, AnimateAction, ChromaticConfig, ClickAction, EffectConfig, HydroEffects,
};
use crate::constants::*;
use crate::params::RippleOverride;
use crate::timeline::Tween;
use glam::Vec2;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ShockwaveController {
    progress: Tween,
    origin: Option<Vec2>,
    active: bool,
}

impl ShockwaveController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire from `origin`, or from the bottom centre of the view when `None`.
    /// A previous explicit origin is kept if none is given.
    pub fn trigger(&mut self, origin: Option<Vec2>) {
        if origin.is_some() {
            self.origin = origin;
        }
        self.active = true;
        self.progress
            .start(Duration::from_millis(SHOCKWAVE_DURATION_MS as u64));
        log::debug!("[shockwave] fire origin={:?}", self.origin);
    }

    pub fn tick(&mut self, dt: Duration) {
        if self.progress.tick(dt) {
            self.active = false;
            self.progress.snap_to(0.0);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn progress(&self) -> f32 {
        self.progress.value()
    }

    pub fn origin(&self, view_size: Vec2) -> Vec2 {
        self.origin.unwrap_or(Vec2::new(
            view_size.x / 2.0,
            view_size.y * SHOCKWAVE_ORIGIN_HEIGHT,
        ))
    }

    pub fn ripple_override(&self, view_size: Vec2) -> RippleOverride {
        RippleOverride {
            progress: self.progress.value(),
            center: self.origin(view_size),
        }
    }

    /// Dispersion only shows while the wave is travelling.
    pub fn chromatic_active(&self) -> bool {
        self.active
    }

    /// Effect preset for a full-screen shockwave surface.
    pub fn effect_config(density: f32) -> EffectConfig {
        EffectConfig::default()
            .with_chromatic(Some(ChromaticConfig::new([
                colors::CYAN,
                colors::MAGENTA,
                colors::YELLOW,
            ])))
            .with_animations(animations(ClickAction::Expand, AnimateAction::None))
            .with_effects(HydroEffects {
                chromatic_density: SHOCKWAVE_CHROMATIC_DENSITY,
                fluidity: SHOCKWAVE_FLUIDITY,
                max_tilt: 0.0,
                blur: 0.0,
                ..HydroEffects::default()
            })
            .with_alpha_mask(false)
            .with_density(density)
    }
}
