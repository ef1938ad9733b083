//! Per-frame parameter snapshot.
//!
//! [`ParameterBlock::snapshot`] reads every live signal exactly once and
//! returns a plain value; nothing downstream can observe a half-updated set.

use crate::config::EffectConfig;
use crate::constants::MAX_PALETTE_COLORS;
use crate::gesture::PhysicsState;
use crate::ripple::RippleState;
use crate::tilt::TiltVector;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

/// Externally driven ripple (shockwave controllers and similar).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleOverride {
    pub progress: f32,
    pub center: Vec2,
}

/// Live state sampled for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    pub config: &'a EffectConfig,
    pub physics: &'a PhysicsState,
    pub ripple: RippleState,
    pub ripple_override: Option<RippleOverride>,
    pub time: f32,
    pub tilt: TiltVector,
    pub view_size: Vec2,
    /// `false` zeroes dispersion for this frame even with a palette set.
    pub chromatic_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterBlock {
    pub center: Vec2,
    pub progress: f32,
    pub time: f32,
    pub size: Vec2,
    pub seed: f32,
    pub strength: f32,
    pub width: f32,
    pub fluidity: f32,
    pub morph_strength: f32,
    pub click_mode: i32,
    pub animate_mode: i32,
    /// Already gained and clamped to `max_tilt`.
    pub tilt: Vec2,
    pub color_count: u32,
    /// RGBA per palette entry; slot `i` is `colors[4i..4i+4]`.
    pub colors: [f32; MAX_PALETTE_COLORS * 4],
    pub use_alpha_mask: bool,
    pub chromatic_density: f32,
}

impl Default for ParameterBlock {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            progress: 0.0,
            time: 0.0,
            size: Vec2::ZERO,
            seed: 0.0,
            strength: 0.0,
            width: 0.0,
            fluidity: 0.0,
            morph_strength: 0.0,
            click_mode: 0,
            animate_mode: 0,
            tilt: Vec2::ZERO,
            color_count: 0,
            colors: [0.0; MAX_PALETTE_COLORS * 4],
            use_alpha_mask: false,
            chromatic_density: 0.0,
        }
    }
}

impl ParameterBlock {
    pub fn snapshot(inputs: &FrameInputs<'_>) -> Self {
        let cfg = inputs.config;
        let fx = &cfg.effects;
        let (progress, center) = match inputs.ripple_override {
            Some(o) => (o.progress, o.center),
            None => (inputs.ripple.progress, inputs.physics.touch_position),
        };

        let mut block = ParameterBlock {
            center,
            progress: progress.clamp(0.0, 1.0),
            time: inputs.time,
            size: inputs.view_size,
            seed: inputs.ripple.seed,
            strength: inputs.ripple.strength,
            width: inputs.ripple.width,
            fluidity: fx.fluidity,
            morph_strength: fx.morph_strength,
            click_mode: cfg.animations.click_action.code(),
            animate_mode: cfg.animations.animate_action.code(),
            ..ParameterBlock::default()
        };

        // dispersion off leaves tilt, density, count and mask at zero
        if let (Some(palette), true) = (&cfg.chromatic, inputs.chromatic_active) {
            block.tilt = inputs.tilt.effect_offset(fx.max_tilt);
            block.chromatic_density = fx.chromatic_density;
            block.use_alpha_mask = cfg.alpha_mask;
            let used = palette.colors().iter().take(MAX_PALETTE_COLORS);
            for (i, c) in used.enumerate() {
                block.colors[i * 4..i * 4 + 4].copy_from_slice(&c.to_array());
                block.color_count += 1;
            }
        }
        block
    }

    pub fn color(&self, i: usize) -> Vec4 {
        if i >= MAX_PALETTE_COLORS {
            return Vec4::ZERO;
        }
        Vec4::from_slice(&self.colors[i * 4..i * 4 + 4])
    }

    pub fn to_uniforms(&self) -> HydroUniforms {
        let mut colors = [[0.0f32; 4]; MAX_PALETTE_COLORS];
        for (i, slot) in colors.iter_mut().enumerate() {
            *slot = self.color(i).to_array();
        }
        HydroUniforms {
            center: self.center.to_array(),
            size: self.size.to_array(),
            tilt: self.tilt.to_array(),
            progress: self.progress,
            time: self.time,
            seed: self.seed,
            strength: self.strength,
            width: self.width,
            fluidity: self.fluidity,
            morph_strength: self.morph_strength,
            chromatic_density: self.chromatic_density,
            click_mode: self.click_mode,
            animate_mode: self.animate_mode,
            color_count: self.color_count.min(MAX_PALETTE_COLORS as u32) as i32,
            use_alpha_mask: self.use_alpha_mask as i32,
            _pad: [0.0; 2],
            colors,
        }
    }
}

/// GPU layout of [`ParameterBlock`]; matches `HydroUniforms` in `hydro.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct HydroUniforms {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub tilt: [f32; 2],
    pub progress: f32,
    pub time: f32,
    pub seed: f32,
    pub strength: f32,
    pub width: f32,
    pub fluidity: f32,
    pub morph_strength: f32,
    pub chromatic_density: f32,
    pub click_mode: i32,
    pub animate_mode: i32,
    pub color_count: i32,
    pub use_alpha_mask: i32,
    pub _pad: [f32; 2],
    pub colors: [[f32; 4]; MAX_PALETTE_COLORS],
}
