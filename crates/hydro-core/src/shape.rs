//! Clip region coverage for the effect surface.

use crate::config::ClipShape;
use crate::image::Image;
use glam::Vec2;

/// Signed distance from `p` to a rounded box centred at the origin.
#[inline]
pub fn rounded_box_sdf(p: Vec2, half: Vec2, radius: f32) -> f32 {
    let r = radius.min(half.x).min(half.y).max(0.0);
    let q = p.abs() - half + Vec2::splat(r);
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - r
}

/// Anti-aliased coverage of pixel-space point `p` for a shape filling `size`.
pub fn coverage(shape: ClipShape, density: f32, size: Vec2, p: Vec2) -> f32 {
    let (code, radius) = shape.code_and_radius(density);
    let half = size * 0.5;
    let radius = match code {
        2 => half.x.min(half.y),
        _ => radius,
    };
    (0.5 - rounded_box_sdf(p - half, half, radius)).clamp(0.0, 1.0)
}

/// Scale alpha by shape coverage; rectangles pass through untouched.
pub fn apply_clip(image: Image, shape: ClipShape, density: f32) -> Image {
    if shape == ClipShape::Rectangle {
        return image;
    }
    let size = Vec2::new(image.width() as f32, image.height() as f32);
    image.map_pixels(|p, mut c| {
        c.w *= coverage(shape, density, size, p);
        c
    })
}
