use super::helpers;
use wgpu;

pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Offscreen color targets at content resolution.
///
/// The compositor writes into `views[0]`; post passes ping-pong between the
/// two, so every pass reads one target and writes the other.
pub(crate) struct RenderTargets {
    textures: [wgpu::Texture; 2],
    pub(crate) views: [wgpu::TextureView; 2],
    pub(crate) width: u32,
    pub(crate) height: u32,
}

fn create_pair(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> ([wgpu::Texture; 2], [wgpu::TextureView; 2]) {
    let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    let (a, a_view) =
        helpers::create_color_texture(device, "target_a", width, height, TARGET_FORMAT, usage);
    let (b, b_view) =
        helpers::create_color_texture(device, "target_b", width, height, TARGET_FORMAT, usage);
    ([a, b], [a_view, b_view])
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (textures, views) = create_pair(device, width, height);
        Self {
            textures,
            views,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        for tex in &self.textures {
            tex.destroy();
        }
        (self.textures, self.views) = create_pair(device, width, height);
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub(crate) fn texel(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }
}
