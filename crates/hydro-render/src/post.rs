use hydro_core::PostStep;
use wgpu;

/// Mirrors `PostUniforms` in post.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PostUniforms {
    pub(crate) texel_step: [f32; 2],
    pub(crate) sigma: f32,
    pub(crate) stage: u32,
    pub(crate) surface_size: [f32; 2],
    pub(crate) image_size: [f32; 2],
    pub(crate) offset: [f32; 2],
    pub(crate) scale: [f32; 2],
    pub(crate) amount: f32,
    pub(crate) shape: i32,
    pub(crate) radius: f32,
    pub(crate) _pad: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pass {
    BlurH,
    BlurV,
    Saturate,
}

impl Pass {
    pub(crate) const ALL: [Pass; 3] = [Pass::BlurH, Pass::BlurV, Pass::Saturate];

    pub(crate) fn index(self) -> usize {
        match self {
            Pass::BlurH => 0,
            Pass::BlurV => 1,
            Pass::Saturate => 2,
        }
    }
}

/// One offscreen pass: read target `src`, write the other one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScheduledPass {
    pub(crate) pass: Pass,
    pub(crate) src: usize,
}

/// Expand post steps into ping-pong passes starting from target `start`;
/// the returned index is the target holding the result.
pub(crate) fn schedule(steps: &[PostStep], start: usize) -> (Vec<ScheduledPass>, usize) {
    let mut passes = Vec::with_capacity(steps.len() * 2);
    let mut src = start;
    let mut push = |pass| {
        passes.push(ScheduledPass { pass, src });
        src = 1 - src;
    };
    for step in steps {
        match step {
            PostStep::Blur { .. } => {
                push(Pass::BlurH);
                push(Pass::BlurV);
            }
            PostStep::Saturate { .. } => push(Pass::Saturate),
        }
    }
    (passes, src)
}

/// Offscreen work for one frame. The main compositor writes target 0 and its
/// post passes follow; an outer layer composites that result from
/// `outer_src` into the other target, then runs its own post passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FramePlan {
    pub(crate) main: Vec<ScheduledPass>,
    pub(crate) outer_src: Option<usize>,
    pub(crate) outer: Vec<ScheduledPass>,
    pub(crate) present_src: usize,
}

pub(crate) fn plan(main: &[PostStep], outer: Option<&[PostStep]>) -> FramePlan {
    let (main, main_end) = schedule(main, 0);
    match outer {
        Some(steps) => {
            let (outer, end) = schedule(steps, 1 - main_end);
            FramePlan {
                main,
                outer_src: Some(main_end),
                outer,
                present_src: end,
            }
        }
        None => FramePlan {
            main,
            outer_src: None,
            outer: Vec::new(),
            present_src: main_end,
        },
    }
}

/// Uniforms for an offscreen pass of `step` over a target with `texel` size.
pub(crate) fn pass_uniforms(pass: Pass, steps: &[PostStep], texel: [f32; 2]) -> PostUniforms {
    let mut u = PostUniforms::default();
    for step in steps {
        match (pass, step) {
            (Pass::BlurH, PostStep::Blur { sigma }) => {
                u.texel_step = [texel[0], 0.0];
                u.sigma = *sigma;
                u.stage = 0;
            }
            (Pass::BlurV, PostStep::Blur { sigma }) => {
                u.texel_step = [0.0, texel[1]];
                u.sigma = *sigma;
                u.stage = 1;
            }
            (Pass::Saturate, PostStep::Saturate { amount }) => u.amount = *amount,
            _ => {}
        }
    }
    u
}

pub(crate) struct PostResources {
    pub(crate) bgl: wgpu::BindGroupLayout, // tex+sampler+uniform
    pub(crate) layout: wgpu::PipelineLayout,
    pub(crate) pass_uniforms: [wgpu::Buffer; 3],
    pub(crate) present_uniforms: wgpu::Buffer,
    pub(crate) blur_pipeline: wgpu::RenderPipeline,
    pub(crate) saturate_pipeline: wgpu::RenderPipeline,
    pub(crate) present_pipeline: wgpu::RenderPipeline,
}

impl PostResources {
    pub(crate) fn pipeline(&self, pass: Pass) -> &wgpu::RenderPipeline {
        match pass {
            Pass::BlurH | Pass::BlurV => &self.blur_pipeline,
            Pass::Saturate => &self.saturate_pipeline,
        }
    }
}

pub(crate) fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("source_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

pub(crate) fn create_post_resources(
    device: &wgpu::Device,
    post_shader: &wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
    swap_format: wgpu::TextureFormat,
) -> PostResources {
    let bgl = create_bind_group_layout(device);
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_post"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let size = std::mem::size_of::<PostUniforms>();
    let pass_uniforms = [
        super::helpers::create_uniform_buffer(device, "blur_h_uniforms", size),
        super::helpers::create_uniform_buffer(device, "blur_v_uniforms", size),
        super::helpers::create_uniform_buffer(device, "saturate_uniforms", size),
    ];
    let present_uniforms = super::helpers::create_uniform_buffer(device, "present_uniforms", size);
    let blur_pipeline = super::helpers::make_post_pipeline(
        device,
        &layout,
        post_shader,
        "fs_blur",
        target_format,
        None,
    );
    let saturate_pipeline = super::helpers::make_post_pipeline(
        device,
        &layout,
        post_shader,
        "fs_saturate",
        target_format,
        None,
    );
    let present_pipeline = super::helpers::make_post_pipeline(
        device,
        &layout,
        post_shader,
        "fs_present",
        swap_format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
    );

    PostResources {
        bgl,
        layout,
        pass_uniforms,
        present_uniforms,
        blur_pipeline,
        saturate_pipeline,
        present_pipeline,
    }
}

pub(crate) fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    clear: wgpu::Color,
    pipeline: &wgpu::RenderPipeline,
    bg0: &wgpu::BindGroup,
) {
    let mut r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bg0, &[]);
    r.draw(0..3, 0..1);
    drop(r);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<PostUniforms>(), 64);
    }

    #[test]
    fn empty_chain_presents_compositor_output() {
        let (passes, present) = schedule(&[], 0);
        assert!(passes.is_empty());
        assert_eq!(present, 0);
    }

    #[test]
    fn blur_then_saturate_ping_pongs() {
        let steps = [PostStep::Blur { sigma: 2.0 }, PostStep::Saturate { amount: 1.3 }];
        let (passes, present) = schedule(&steps, 0);
        assert_eq!(
            passes,
            vec![
                ScheduledPass { pass: Pass::BlurH, src: 0 },
                ScheduledPass { pass: Pass::BlurV, src: 1 },
                ScheduledPass { pass: Pass::Saturate, src: 0 },
            ]
        );
        assert_eq!(present, 1);
    }

    #[test]
    fn outer_layer_reads_the_finished_main_image() {
        let main = [PostStep::Blur { sigma: 2.0 }];
        let outer = [PostStep::Saturate { amount: 1.2 }];
        let p = plan(&main, Some(&outer[..]));
        // blur H+V lands back in target 0
        assert_eq!(p.outer_src, Some(0));
        assert_eq!(p.outer, vec![ScheduledPass { pass: Pass::Saturate, src: 1 }]);
        assert_eq!(p.present_src, 0);

        let empty: [PostStep; 0] = [];
        let p = plan(&[], Some(&empty[..]));
        assert_eq!(p.outer_src, Some(0));
        assert!(p.outer.is_empty());
        assert_eq!(p.present_src, 1);
    }

    #[test]
    fn single_layer_plan_presents_main_result() {
        let steps = [PostStep::Saturate { amount: 0.5 }];
        let p = plan(&steps, None);
        assert_eq!(p.outer_src, None);
        assert!(p.outer.is_empty());
        assert_eq!(p.present_src, schedule(&steps, 0).1);
    }

    #[test]
    fn blur_uniforms_step_one_texel_per_axis() {
        let steps = [PostStep::Blur { sigma: 4.0 }];
        let h = pass_uniforms(Pass::BlurH, &steps, [0.01, 0.02]);
        let v = pass_uniforms(Pass::BlurV, &steps, [0.01, 0.02]);
        assert_eq!(h.texel_step, [0.01, 0.0]);
        assert_eq!(v.texel_step, [0.0, 0.02]);
        assert_eq!((h.stage, v.stage), (0, 1));
        assert_eq!(h.sigma, 4.0);
        let s = pass_uniforms(Pass::Saturate, &[PostStep::Saturate { amount: 0.5 }], [0.1, 0.1]);
        assert_eq!(s.amount, 0.5);
    }
}
