//! Host-side RGBA image used by the CPU compositor and post chain.
//!
//! Channels are straight (non-premultiplied) linear floats in [0, 1]. Pixel
//! `(x, y)` covers the square `[x, x+1) x [y, y+1)`, so its centre sits at
//! `(x + 0.5, y + 0.5)`, the same convention the fragment stage uses.

use crate::error::{HydroError, Result};
use glam::{UVec2, Vec2, Vec4};

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Image {
    /// Fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Vec4::ZERO)
    }

    pub fn filled(width: u32, height: u32, color: Vec4) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Vec4>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(HydroError::ImageSize {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return Err(HydroError::ImageSize {
                width,
                height,
                actual: bytes.len() / 4,
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Vec4::new(p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32) / 255.0)
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            let c = (p.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
            out.extend_from_slice(&[c.x as u8, c.y as u8, c.z as u8, c.w as u8]);
        }
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Vec4] {
        &mut self.pixels
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Vec4) {
        let w = self.width as usize;
        self.pixels[y as usize * w + x as usize] = color;
    }

    /// Bilinear sample at a pixel-space position, clamping to the edge.
    /// An empty image samples as transparent.
    pub fn sample(&self, pos: Vec2) -> Vec4 {
        if self.is_empty() {
            return Vec4::ZERO;
        }
        let u = pos.x - 0.5;
        let v = pos.y - 0.5;
        if !u.is_finite() || !v.is_finite() {
            return Vec4::ZERO;
        }
        let x0 = u.floor();
        let y0 = v.floor();
        let fx = u - x0;
        let fy = v - y0;
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let cx = |x: f32| (x as i64).clamp(0, max_x) as u32;
        let cy = |y: f32| (y as i64).clamp(0, max_y) as u32;
        let (xa, xb) = (cx(x0), cx(x0 + 1.0));
        let (ya, yb) = (cy(y0), cy(y0 + 1.0));
        let top = self.get(xa, ya).lerp(self.get(xb, ya), fx);
        let bottom = self.get(xa, yb).lerp(self.get(xb, yb), fx);
        top.lerp(bottom, fy)
    }

    /// Centre of pixel `(x, y)` in sampling space.
    #[inline]
    pub fn pixel_center(x: u32, y: u32) -> Vec2 {
        Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
    }

    pub fn map_pixels(&self, mut f: impl FnMut(Vec2, Vec4) -> Vec4) -> Image {
        let mut out = Vec::with_capacity(self.pixels.len());
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(f(Self::pixel_center(x, y), self.get(x, y)));
            }
        }
        Image {
            width: self.width,
            height: self.height,
            pixels: out,
        }
    }
}
