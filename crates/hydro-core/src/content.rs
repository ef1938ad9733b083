//! Content providers the compositor reads from.

use crate::image::Image;
use glam::{UVec2, Vec4};

/// Upstream collaborator exposing its current frame as a sampleable image.
pub trait ContentSource {
    /// The frame to distort, or `None` while nothing has been captured yet.
    fn current_frame(&mut self) -> Option<&Image>;

    /// Ask for frames of `size`. Sources that cannot rescale ignore this.
    fn resize(&mut self, _size: UVec2) {}
}

/// A fixed image, e.g. a decoded screenshot.
#[derive(Clone, Debug)]
pub struct StaticContent {
    image: Image,
}

impl StaticContent {
    pub fn new(image: Image) -> Self {
        Self { image }
    }
}

impl ContentSource for StaticContent {
    fn current_frame(&mut self) -> Option<&Image> {
        Some(&self.image)
    }
}

/// Procedural test card: colour bars over a checkerboard, a white text-like
/// strip, and a translucent band so alpha masking has something to act on.
#[derive(Clone, Debug)]
pub struct TestCard {
    size: UVec2,
    cached: Option<Image>,
}

const BARS: [Vec4; 6] = [
    Vec4::new(0.95, 0.95, 0.95, 1.0),
    Vec4::new(0.95, 0.85, 0.1, 1.0),
    Vec4::new(0.1, 0.85, 0.9, 1.0),
    Vec4::new(0.1, 0.8, 0.2, 1.0),
    Vec4::new(0.85, 0.15, 0.75, 1.0),
    Vec4::new(0.1, 0.2, 0.9, 1.0),
];

const CHECK: u32 = 32; // px

impl TestCard {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: UVec2::new(width, height),
            cached: None,
        }
    }

    pub fn generate(width: u32, height: u32) -> Image {
        let mut img = Image::new(width, height);
        let h = height.max(1) as f32;
        let w = width.max(1) as f32;
        for y in 0..height {
            let fy = y as f32 / h;
            for x in 0..width {
                let fx = x as f32 / w;
                let color = if (0.2..0.55).contains(&fy) {
                    let bar = ((fx * BARS.len() as f32) as usize).min(BARS.len() - 1);
                    BARS[bar]
                } else if (0.62..0.7).contains(&fy) {
                    // stripes of "glyphs"
                    let on = (x / 6) % 3 != 2 && (y / 3) % 2 == 0;
                    if on {
                        Vec4::ONE
                    } else {
                        Vec4::new(0.08, 0.08, 0.1, 1.0)
                    }
                } else if fy >= 0.8 {
                    // glass-like translucent band
                    Vec4::new(0.8, 0.85, 0.95, 0.25)
                } else {
                    let dark = ((x / CHECK) + (y / CHECK)) % 2 == 0;
                    if dark {
                        Vec4::new(0.12, 0.12, 0.14, 1.0)
                    } else {
                        Vec4::new(0.22, 0.22, 0.26, 1.0)
                    }
                };
                img.set(x, y, color);
            }
        }
        img
    }
}

impl ContentSource for TestCard {
    fn current_frame(&mut self) -> Option<&Image> {
        if self.size.x == 0 || self.size.y == 0 {
            return None;
        }
        let size = self.size;
        Some(
            self.cached
                .get_or_insert_with(|| TestCard::generate(size.x, size.y)),
        )
    }

    fn resize(&mut self, size: UVec2) {
        if size != self.size {
            self.size = size;
            self.cached = None;
        }
    }
}
