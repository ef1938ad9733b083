//! Post filters applied after the compositor, always blur then saturation.

use crate::config::EffectConfig;
use crate::constants::{BLUR_RADIUS_TO_SIGMA, BLUR_SIGMA_BIAS};
use crate::image::Image;
use glam::Vec4;

/// One linear post pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PostStep {
    /// Gaussian blur, standard deviation in pixels.
    Blur { sigma: f32 },
    Saturate { amount: f32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostChain {
    steps: Vec<PostStep>,
}

impl PostChain {
    pub fn from_config(config: &EffectConfig) -> Self {
        let mut steps = Vec::new();
        let blur = config.blur_px();
        if blur > 0.0 {
            steps.push(PostStep::Blur {
                sigma: blur_radius_to_sigma(blur),
            });
        }
        if config.effects.vibrancy != 1.0 {
            steps.push(PostStep::Saturate {
                amount: config.effects.vibrancy,
            });
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[PostStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply(&self, image: Image) -> Image {
        self.steps.iter().fold(image, |img, step| match *step {
            PostStep::Blur { sigma } => gaussian_blur(&img, sigma),
            PostStep::Saturate { amount } => saturate(&img, amount),
        })
    }
}

/// Blur radius in px -> Gaussian standard deviation. Zero stays zero.
#[inline]
pub fn blur_radius_to_sigma(radius: f32) -> f32 {
    if radius > 0.0 {
        radius * BLUR_RADIUS_TO_SIGMA + BLUR_SIGMA_BIAS
    } else {
        0.0
    }
}

/// Normalized 1D Gaussian taps covering +-3 sigma.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 || !sigma.is_finite() {
        return vec![1.0];
    }
    let radius = (sigma * 3.0).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Mirror-repeat tiling: `.. 1 0 | 0 1 .. n-1 | n-1 n-2 ..`.
#[inline]
pub fn mirror_index(i: i64, n: usize) -> usize {
    let n = n as i64;
    let m = i.rem_euclid(2 * n);
    if m < n {
        m as usize
    } else {
        (2 * n - 1 - m) as usize
    }
}

/// Separable Gaussian blur with mirrored edges. Colour is filtered
/// premultiplied so transparent pixels do not bleed black.
pub fn gaussian_blur(image: &Image, sigma: f32) -> Image {
    if image.is_empty() {
        return image.clone();
    }
    let kernel = gaussian_kernel(sigma);
    if kernel.len() == 1 {
        return image.clone();
    }
    let (w, h) = (image.width(), image.height());
    let radius = (kernel.len() / 2) as i64;

    let premul: Vec<Vec4> = image
        .pixels()
        .iter()
        .map(|p| (p.truncate() * p.w).extend(p.w))
        .collect();

    let mut horizontal = vec![Vec4::ZERO; premul.len()];
    for y in 0..h as usize {
        let row = y * w as usize;
        for x in 0..w as usize {
            let mut acc = Vec4::ZERO;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = mirror_index(x as i64 + k as i64 - radius, w as usize);
                acc += premul[row + sx] * *weight;
            }
            horizontal[row + x] = acc;
        }
    }

    let mut out = Vec::with_capacity(premul.len());
    for y in 0..h as usize {
        for x in 0..w as usize {
            let mut acc = Vec4::ZERO;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = mirror_index(y as i64 + k as i64 - radius, h as usize);
                acc += horizontal[sy * w as usize + x] * *weight;
            }
            out.push(unpremultiply(acc));
        }
    }
    Image::from_pixels(w, h, out).unwrap_or_else(|_| image.clone())
}

#[inline]
fn unpremultiply(p: Vec4) -> Vec4 {
    if p.w <= 0.0 {
        Vec4::ZERO
    } else {
        (p.truncate() / p.w).extend(p.w)
    }
}

/// 4x5 colour matrix rows (R, G, B, A), offset column in [0, 1] units.
pub type ColorMatrix = [[f32; 5]; 4];

/// Luminance-preserving saturation matrix; 0 is greyscale, 1 is identity.
pub fn saturation_matrix(amount: f32) -> ColorMatrix {
    let inv = 1.0 - amount;
    let r = 0.213 * inv;
    let g = 0.715 * inv;
    let b = 0.072 * inv;
    [
        [r + amount, g, b, 0.0, 0.0],
        [r, g + amount, b, 0.0, 0.0],
        [r, g, b + amount, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]
}

#[inline]
pub fn apply_color_matrix(m: &ColorMatrix, c: Vec4) -> Vec4 {
    let row = |r: &[f32; 5]| r[0] * c.x + r[1] * c.y + r[2] * c.z + r[3] * c.w + r[4];
    Vec4::new(row(&m[0]), row(&m[1]), row(&m[2]), row(&m[3])).clamp(Vec4::ZERO, Vec4::ONE)
}

pub fn saturate(image: &Image, amount: f32) -> Image {
    let m = saturation_matrix(amount);
    image.map_pixels(|_, c| apply_color_matrix(&m, c))
}
