//! wgpu renderer for `hydro_core` frames.
//!
//! Per frame: the compositor pass distorts the uploaded content into an
//! offscreen target, the post chain (blur, saturation) ping-pongs between two
//! targets, and the present pass draws the result onto the surface with the
//! layer transform and clip shape applied. An optional outer layer (the
//! shockwave) composites over the finished image before presenting.

use glam::Vec2;
use hydro_core::{EffectConfig, Frame, Image, PostChain, PostStep, HYDRO_WGSL, POST_WGSL};

mod helpers;
mod post;
mod targets;

use post::{Pass, PostResources, PostUniforms, ScheduledPass};
use targets::{RenderTargets, TARGET_FORMAT};

struct ContentTexture {
    tex: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// A second distortion applied over the finished inner image.
pub struct OuterLayer<'f> {
    pub frame: &'f Frame,
    pub chain: &'f PostChain,
}

/// Bind groups that reference the content texture or the offscreen targets.
struct SourceBindGroups {
    compositor: Option<wgpu::BindGroup>,
    // compositor reading an offscreen target, for the outer layer
    outer: [wgpu::BindGroup; 2],
    // [pass][src target]
    passes: [[wgpu::BindGroup; 2]; 3],
    present: [wgpu::BindGroup; 2],
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    compositor_pipeline: wgpu::RenderPipeline,
    compositor_uniforms: wgpu::Buffer,
    fallback: bool,

    targets: RenderTargets,
    content: Option<ContentTexture>,
    content_sampler: wgpu::Sampler,
    mirror_sampler: wgpu::Sampler,

    post: PostResources,
    bind_groups: SourceBindGroups,

    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'a>>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(target)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        // content is uploaded as-is, so prefer a non-sRGB swapchain
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let width = width.max(1);
        let height = height.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_WGSL.into()),
        });
        let post = post::create_post_resources(&device, &post_shader, TARGET_FORMAT, format);

        // A compositor that fails validation degrades to a plain copy.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let hydro_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("hydro_shader"),
            source: wgpu::ShaderSource::Wgsl(HYDRO_WGSL.into()),
        });
        let mut compositor_pipeline = helpers::make_post_pipeline(
            &device,
            &post.layout,
            &hydro_shader,
            "fs_hydro",
            TARGET_FORMAT,
            None,
        );
        let mut fallback = false;
        if let Some(err) = device.pop_error_scope().await {
            log::warn!("[gpu] compositor unavailable, passing content through: {err}");
            compositor_pipeline = helpers::make_post_pipeline(
                &device,
                &post.layout,
                &post_shader,
                "fs_passthrough",
                TARGET_FORMAT,
                None,
            );
            fallback = true;
        }
        let compositor_uniforms = helpers::create_uniform_buffer(
            &device,
            "hydro_uniforms",
            std::mem::size_of::<hydro_core::HydroUniforms>(),
        );

        let content_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("content_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        // blur taps past the edge reflect back into the image
        let mirror_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mirror_sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            address_mode_w: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let targets = RenderTargets::new(&device, width, height);
        let bind_groups = build_bind_groups(
            &device,
            &post,
            &targets,
            None,
            &compositor_uniforms,
            &content_sampler,
            &mirror_sampler,
        );
        log::info!("[gpu] surface {width}x{height} {format:?}");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            compositor_pipeline,
            compositor_uniforms,
            fallback,
            targets,
            content: None,
            content_sampler,
            mirror_sampler,
            post,
            bind_groups,
            width,
            height,
            clear_color: wgpu::Color::TRANSPARENT,
        })
    }

    /// True when the compositor pipeline failed and content is copied as-is.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload a content frame. Offscreen targets follow the content size.
    pub fn upload_content(&mut self, image: &Image) {
        if image.is_empty() {
            return;
        }
        let (w, h) = (image.width(), image.height());
        let reuse = self
            .content
            .as_ref()
            .is_some_and(|c| c.width == w && c.height == h);
        if !reuse {
            if let Some(old) = self.content.take() {
                old.tex.destroy();
            }
            let (tex, view) = helpers::create_color_texture(
                &self.device,
                "content_tex",
                w,
                h,
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            );
            self.content = Some(ContentTexture {
                tex,
                view,
                width: w,
                height: h,
            });
            self.targets.recreate(&self.device, w, h);
            self.rebuild_bind_groups();
            log::debug!("[gpu] content {w}x{h}");
        }
        let Some(content) = self.content.as_ref() else {
            return;
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &content.tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.to_rgba8(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn render(
        &mut self,
        frame: &Frame,
        config: &EffectConfig,
        chain: &PostChain,
    ) -> Result<(), wgpu::SurfaceError> {
        self.render_stacked(frame, config, chain, None)
    }

    /// Render `frame`, then let `outer` distort the finished image again
    /// before it is presented. Presentation uses the inner frame's layer
    /// transform and `config`'s clip shape.
    pub fn render_stacked(
        &mut self,
        frame: &Frame,
        config: &EffectConfig,
        chain: &PostChain,
        outer: Option<OuterLayer<'_>>,
    ) -> Result<(), wgpu::SurfaceError> {
        let surface_tex = self.surface.get_current_texture()?;
        let view = surface_tex
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.encoder("encoder");

        let (Some(content), Some(bg_compositor)) =
            (self.content.as_ref(), self.bind_groups.compositor.as_ref())
        else {
            // nothing uploaded yet: just clear
            let r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            drop(r);
            self.queue.submit(Some(encoder.finish()));
            surface_tex.present();
            return Ok(());
        };

        let image_size = Vec2::new(content.width as f32, content.height as f32);
        let plan = post::plan(chain.steps(), outer.as_ref().map(|o| o.chain.steps()));

        self.write_compositor_uniforms(frame, image_size);
        post::blit(
            &mut encoder,
            "compositor",
            &self.targets.views[0],
            wgpu::Color::TRANSPARENT,
            &self.compositor_pipeline,
            bg_compositor,
        );
        self.encode_post(&mut encoder, &plan.main, chain.steps());

        if let (Some(outer), Some(src)) = (outer.as_ref(), plan.outer_src) {
            // both layers share the uniform buffers; flush the inner one first
            self.queue.submit(Some(encoder.finish()));
            encoder = self.encoder("outer_encoder");
            self.write_compositor_uniforms(outer.frame, image_size);
            post::blit(
                &mut encoder,
                "outer_compositor",
                &self.targets.views[1 - src],
                wgpu::Color::TRANSPARENT,
                &self.compositor_pipeline,
                &self.bind_groups.outer[src],
            );
            self.encode_post(&mut encoder, &plan.outer, outer.chain.steps());
        }

        let (shape, radius) = config.shape.code_and_radius(config.density);
        let present = PostUniforms {
            surface_size: [self.width as f32, self.height as f32],
            image_size: image_size.to_array(),
            offset: frame.layer.offset.to_array(),
            scale: [frame.layer.scale_x, frame.layer.scale_y],
            shape,
            radius,
            ..PostUniforms::default()
        };
        self.queue
            .write_buffer(&self.post.present_uniforms, 0, bytemuck::bytes_of(&present));
        post::blit(
            &mut encoder,
            "present",
            &view,
            self.clear_color,
            &self.post.present_pipeline,
            &self.bind_groups.present[plan.present_src],
        );

        self.queue.submit(Some(encoder.finish()));
        surface_tex.present();
        Ok(())
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    fn write_compositor_uniforms(&self, frame: &Frame, image_size: Vec2) {
        let mut params = frame.params;
        if params.size == Vec2::ZERO {
            params.size = image_size;
        }
        self.queue.write_buffer(
            &self.compositor_uniforms,
            0,
            bytemuck::bytes_of(&params.to_uniforms()),
        );
    }

    fn encode_post(&self, encoder: &mut wgpu::CommandEncoder, passes: &[ScheduledPass], steps: &[PostStep]) {
        for scheduled in passes {
            let u = post::pass_uniforms(scheduled.pass, steps, self.targets.texel());
            let i = scheduled.pass.index();
            self.queue
                .write_buffer(&self.post.pass_uniforms[i], 0, bytemuck::bytes_of(&u));
            post::blit(
                encoder,
                "post",
                &self.targets.views[1 - scheduled.src],
                wgpu::Color::TRANSPARENT,
                self.post.pipeline(scheduled.pass),
                &self.bind_groups.passes[i][scheduled.src],
            );
        }
    }

    /// Reconfigure after `SurfaceError::Lost`/`Outdated`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn rebuild_bind_groups(&mut self) {
        self.bind_groups = build_bind_groups(
            &self.device,
            &self.post,
            &self.targets,
            self.content.as_ref().map(|c| &c.view),
            &self.compositor_uniforms,
            &self.content_sampler,
            &self.mirror_sampler,
        );
    }
}

fn build_bind_groups(
    device: &wgpu::Device,
    post: &PostResources,
    targets: &RenderTargets,
    content: Option<&wgpu::TextureView>,
    compositor_uniforms: &wgpu::Buffer,
    content_sampler: &wgpu::Sampler,
    mirror_sampler: &wgpu::Sampler,
) -> SourceBindGroups {
    let compositor = content.map(|view| {
        helpers::source_bind_group(
            device,
            "bg_compositor",
            &post.bgl,
            view,
            content_sampler,
            compositor_uniforms,
        )
    });
    let outer = [0, 1].map(|src| {
        helpers::source_bind_group(
            device,
            "bg_outer",
            &post.bgl,
            &targets.views[src],
            content_sampler,
            compositor_uniforms,
        )
    });
    let passes = Pass::ALL.map(|pass| {
        [0, 1].map(|src| {
            helpers::source_bind_group(
                device,
                "bg_post",
                &post.bgl,
                &targets.views[src],
                mirror_sampler,
                &post.pass_uniforms[pass.index()],
            )
        })
    });
    let present = [0, 1].map(|src| {
        helpers::source_bind_group(
            device,
            "bg_present",
            &post.bgl,
            &targets.views[src],
            content_sampler,
            &post.present_uniforms,
        )
    });
    SourceBindGroups {
        compositor,
        outer,
        passes,
        present,
    }
}
