use anyhow::Result;
use attractor::{Integrator, LorenzParams, LorenzState};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::gpu::context::GpuContext;
use crate::gpu::uniforms::SceneUniforms;
use crate::mesh::{uv_sphere, Vertex};
use crate::scene::{FrameInput, RenderTarget, Scene};

const SPHERE_RADIUS: f32 = 10.0;
const SPHERE_SECTORS: u32 = 32;
const SPHERE_STACKS: u32 = 32;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// WGSL pipeline for the traced point: one lit sphere, repositioned per frame.
const TRACER_SHADER_WGSL: &str = r"struct SceneUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    base_color: vec4<f32>,
    light_dir: vec4<f32>,
    ambient: vec4<f32>,
};

@group(0) @binding(0) var<uniform> scene: SceneUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = scene.model * vec4<f32>(vertex.position, 1.0);
    out.clip_position = scene.view_proj * world;
    out.world_normal = normalize((scene.model * vec4<f32>(vertex.normal, 0.0)).xyz);
    return out;
}

@fragment
fn fs_main(frag: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(frag.world_normal);
    let diffuse = max(dot(normal, -normalize(scene.light_dir.xyz)), 0.0) * scene.light_dir.w;
    let lit = scene.ambient.rgb * scene.ambient.w + vec3<f32>(diffuse, diffuse, diffuse);
    let shaded = scene.base_color.rgb * min(lit, vec3<f32>(1.0, 1.0, 1.0));
    return vec4<f32>(shaded, scene.base_color.a);
}
";

/// Translates a phase-space point into world space.
///
/// Coordinates map one-to-one: the attractor's bounded orbit stays well
/// inside the camera frustum without rescaling.
pub(crate) fn model_matrix(state: LorenzState) -> Mat4 {
    Mat4::from_translation(Vec3::new(state.x as f32, state.y as f32, state.z as f32))
}

/// Lorenz attractor demo: a sphere in a minimal lit 3D scene.
///
/// Every frame advances the integrator exactly one fixed step and rewrites
/// the model matrix from the new state; time and pointer inputs are unused
/// here, the motion comes entirely from the integrator.
pub(crate) struct TracerScene {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: SceneUniforms,
    depth: DepthTarget,
    sample_count: u32,
    camera: Camera,
    integrator: Integrator,
}

impl TracerScene {
    pub fn new(ctx: &GpuContext, params: LorenzParams, dt: f64, seed: LorenzState) -> Result<Self> {
        let device = ctx.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tracer shader"),
            source: wgpu::ShaderSource::Wgsl(TRACER_SHADER_WGSL.into()),
        });

        let (vertices, indices) = uv_sphere(SPHERE_RADIUS, SPHERE_SECTORS, SPHERE_STACKS);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tracer sphere vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tracer sphere indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Ambient 0xcccccc at 0.2, white directional from above at 0.6,
        // red sphere.
        let mut uniforms = SceneUniforms::new(
            [1.0, 0.0, 0.0, 1.0],
            [0.0, -1.0, 0.0, 0.6],
            [0.8, 0.8, 0.8, 0.2],
        );
        let camera = Camera::default();
        let size = ctx.size();
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
        uniforms.set_view_proj(camera.view_proj(aspect));
        uniforms.set_model(model_matrix(seed));

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tracer uniform buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tracer uniform layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tracer uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tracer pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tracer pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: ctx.sample_count(),
                ..wgpu::MultisampleState::default()
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
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

        let depth = DepthTarget::new(device, size, ctx.sample_count());

        Ok(Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            depth,
            sample_count: ctx.sample_count(),
            camera,
            integrator: Integrator::new(params, dt, seed),
        })
    }
}

impl Scene for TracerScene {
    fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.depth = DepthTarget::new(device, size, self.sample_count);
    }

    fn update(&mut self, queue: &wgpu::Queue, frame: &FrameInput) {
        // One fixed step per animation frame, regardless of wall-clock delta.
        let state = self.integrator.advance();
        self.uniforms.set_model(model_matrix(state));

        let aspect = frame.size.width.max(1) as f32 / frame.size.height.max(1) as f32;
        self.uniforms.set_view_proj(self.camera.view_proj(aspect));
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        if frame.time.frame_index % 600 == 0 {
            tracing::debug!(
                frame = frame.time.frame_index,
                x = state.x,
                y = state.y,
                z = state.z,
                "tracer position"
            );
        }
    }

    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: RenderTarget<'_>) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tracer pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                depth_slice: None,
                resolve_target: target.resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Depth buffer sized and sampled to match the swapchain.
struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, size: PhysicalSize<u32>, sample_count: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tracer depth"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attractor::DEFAULT_SEED;

    #[test]
    fn model_matrix_translates_to_the_state() {
        let matrix = model_matrix(LorenzState::new(1.0, -2.0, 3.0));
        let origin = matrix * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin.truncate(), Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn seed_position_is_near_the_origin() {
        let matrix = model_matrix(DEFAULT_SEED);
        let translation = matrix.w_axis.truncate();
        assert!(translation.length() < 1.0);
    }
}
