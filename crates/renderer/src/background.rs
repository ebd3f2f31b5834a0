use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::compile::{compile_background_fragment, compile_vertex_shader};
use crate::gpu::context::GpuContext;
use crate::gpu::uniforms::BackgroundUniforms;
use crate::scene::{FrameInput, RenderTarget, Scene};

/// Built-in background effect: a white page with per-pixel hash noise fading
/// toward one corner and a slow sin/cos-modulated green/blue falloff.
pub(crate) const DEFAULT_BACKGROUND_FRAGMENT: &str = r"float hash(vec2 co) {
    return fract(sin(dot(co.xy, vec2(12.9898, 78.233))) * 43758.5453);
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord / uResolution.xy;
    float x = uv.x;
    float y = uv.y;

    vec3 color = vec3(1.0);
    color += (hash(uv) - 0.5) * 0.3 * (1.0 - x * y);

    float t = uTime * 0.5;
    float mod1 = 0.5 + 0.5 * sin(t) * 2.8;
    float mod2 = 0.5 + 0.5 * cos(t) * 2.85;
    float mod3 = 0.5 + 0.5 * sin(t) * 2.79;
    float mod4 = 0.5 + 0.5 * cos(t) * 3.95;

    color.g *= 1.0 - pow(x, 4.5 + mod1) * pow(y, 3.6 + mod2);
    color.b *= 1.0 - pow(x, 2.8 + mod3) * pow(y, 2.8 + mod4);

    fragColor = vec4(color, 1.0);
}
";

/// Full-screen shader demo: one triangle, one uniform block, one draw call.
pub(crate) struct BackgroundScene {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: BackgroundUniforms,
}

impl BackgroundScene {
    /// Compiles the fragment source and builds the full-screen pipeline.
    pub fn new(ctx: &GpuContext, fragment_source: &str) -> Result<Self> {
        let device = ctx.device();
        let fragment_module = compile_background_fragment(device, fragment_source)
            .context("failed to compile background fragment shader")?;
        let vertex_module = compile_vertex_shader(device)?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("background uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("background pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("background pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: ctx.sample_count(),
                ..wgpu::MultisampleState::default()
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let size = ctx.size();
        let uniforms = BackgroundUniforms::new(size.width, size.height);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("background uniform buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("background uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
        })
    }
}

impl Scene for BackgroundScene {
    fn resize(&mut self, _device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.uniforms
            .set_resolution(size.width as f32, size.height as f32);
    }

    fn update(&mut self, queue: &wgpu::Queue, frame: &FrameInput) {
        self.uniforms
            .set_resolution(frame.size.width as f32, frame.size.height as f32);
        self.uniforms.update(&frame.time, frame.mouse);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: RenderTarget<'_>) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("background pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                depth_slice: None,
                resolve_target: target.resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
