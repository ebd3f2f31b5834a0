use bytemuck::{Pod, Zeroable};

/// Interleaved vertex format for the attractor scene mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Generates a UV sphere centred on the origin.
///
/// Vertices are laid out stack-major with a duplicated seam column so texture
/// coordinates could be added later without re-indexing; pole caps skip their
/// degenerate triangle.
pub(crate) fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> (Vec<Vertex>, Vec<u32>) {
    assert!(sectors >= 3 && stacks >= 2, "sphere resolution too low");

    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
    for i in 0..=stacks {
        // Stack angle sweeps from +pi/2 (north pole) down to -pi/2.
        let stack_angle = std::f32::consts::FRAC_PI_2
            - std::f32::consts::PI * (i as f32) / (stacks as f32);
        let xz = stack_angle.cos();
        let y = stack_angle.sin();
        for j in 0..=sectors {
            let sector_angle = std::f32::consts::TAU * (j as f32) / (sectors as f32);
            let normal = [
                xz * sector_angle.cos(),
                y,
                xz * sector_angle.sin(),
            ];
            vertices.push(Vertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
            });
        }
    }

    let mut indices = Vec::with_capacity((stacks * sectors * 6) as usize);
    for i in 0..stacks {
        for j in 0..sectors {
            let k1 = i * (sectors + 1) + j;
            let k2 = k1 + sectors + 1;
            // Wound counter-clockwise as seen from outside the sphere.
            if i != 0 {
                indices.extend_from_slice(&[k1, k1 + 1, k2]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2 + 1, k2]);
            }
        }
    }

    (vertices, indices)
}
