//! Per-pixel distortion compositor.
//!
//! This is the reference implementation of `shaders/hydro.wgsl`: the GPU
//! renderer runs the shader, hosts without a GPU (and the tests) run this.
//! Every function is pure in `(coord, params)`.

use crate::constants::*;
use crate::image::Image;
use crate::params::ParameterBlock;
use glam::{Vec2, Vec4};
use std::f32::consts::PI;

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Seeded sinusoidal noise field; zero unless morph animation is on.
pub fn morph_displacement(coord: Vec2, p: &ParameterBlock) -> Vec2 {
    if p.animate_mode != 1 {
        return Vec2::ZERO;
    }
    let t = p.time * p.fluidity * MORPH_TIME_SCALE;
    let nx = (coord.y * MORPH_FREQ_MAJOR + t + p.seed).sin() * (coord.x * MORPH_FREQ_MINOR + t).cos();
    let ny = (coord.x * MORPH_FREQ_MAJOR + t - p.seed).cos() * (coord.y * MORPH_FREQ_MINOR - t).sin();
    Vec2::new(nx, ny) * (p.morph_strength * MORPH_AMPLITUDE_SCALE)
}

/// Radial ripple displacement; zero outside `0 < progress < 1`.
pub fn click_displacement(coord: Vec2, p: &ParameterBlock) -> Vec2 {
    if !(p.progress > 0.0 && p.progress < 1.0) {
        return Vec2::ZERO;
    }
    let max_radius = p.size.length();
    if max_radius <= 0.0 {
        return Vec2::ZERO;
    }
    let to_pixel = coord - p.center;
    let dist = to_pixel.length();
    let dir = to_pixel.normalize_or_zero();
    match p.click_mode {
        1 => {
            let diff = dist - max_radius * p.progress;
            if diff.abs() < p.width {
                let wave = (diff / p.width * PI).sin() * p.strength * (1.0 - p.progress);
                dir * wave
            } else {
                Vec2::ZERO
            }
        }
        2 => {
            let decay = fluid_envelope(dist, max_radius, p.progress);
            let wave = (dist * FLUID_SPATIAL_FREQ - p.progress * FLUID_PHASE_SPEED * p.fluidity
                + p.seed * FLUID_SEED_PHASE)
                .sin();
            dir * wave * p.strength * decay
        }
        _ => Vec2::ZERO,
    }
}

/// Amplitude envelope of the fluid ripple: fades with distance from the
/// centre and with progress.
pub fn fluid_envelope(dist: f32, max_radius: f32, progress: f32) -> f32 {
    smoothstep(max_radius, 0.0, dist) * (1.0 - progress)
}

pub fn displacement(coord: Vec2, p: &ParameterBlock) -> Vec2 {
    morph_displacement(coord, p) + click_displacement(coord, p)
}

/// Symmetric spread of palette entry `i` across [-1, 1]. A single-entry
/// palette sits at the centre.
pub fn offset_factor(i: usize, count: usize) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    let factor = i as f32 / (count - 1) as f32;
    (factor - 0.5) * 2.0
}

/// Shade one output pixel. `sample` reads the content at a pixel-space
/// position.
pub fn shade(coord: Vec2, p: &ParameterBlock, sample: impl Fn(Vec2) -> Vec4) -> Vec4 {
    let disp = displacement(coord, p);
    let base = sample(coord - disp);

    let mask = if p.use_alpha_mask {
        smoothstep(MASK_ALPHA_LOW, MASK_ALPHA_HIGH, base.w)
    } else {
        1.0
    };

    let count = (p.color_count as usize).min(MAX_PALETTE_COLORS);
    if p.tilt.length() < TILT_EPSILON || count == 0 {
        return base;
    }

    let spread = (p.tilt * DISPERSION_TILT_GAIN + disp * DISPERSION_DISPLACEMENT_GAIN)
        * mask
        * p.chromatic_density;
    let mut acc = Vec4::ZERO;
    for i in 0..count {
        let offset = spread * offset_factor(i, count);
        acc += sample(coord - disp + offset) * p.color(i);
    }
    let mut out = acc / (count as f32 * BRIGHTNESS_RECOVERY);
    out.w = base.w;
    out
}

/// Run the compositor over every pixel of `content`.
pub fn compose(content: &Image, p: &ParameterBlock) -> Image {
    content.map_pixels(|coord, _| shade(coord, p, |pos| content.sample(pos)))
}

/// Something that can turn content plus a parameter block into a frame.
pub trait Compositor {
    fn compose(&self, content: &Image, params: &ParameterBlock) -> Image;

    fn name(&self) -> &'static str;
}

/// Full distortion pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderCompositor;

impl Compositor for ShaderCompositor {
    fn compose(&self, content: &Image, params: &ParameterBlock) -> Image {
        compose(content, params)
    }

    fn name(&self) -> &'static str {
        "shader"
    }
}

/// No-op fallback for hosts without per-pixel shading.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Compositor for Passthrough {
    fn compose(&self, content: &Image, _params: &ParameterBlock) -> Image {
        content.clone()
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
