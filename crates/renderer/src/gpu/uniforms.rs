use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::runtime::TimeSample;

/// CPU-side mirror of the background shader uniform block.
///
/// The layout matches the GLSL prelude injected by
/// [`crate::compile::wrap_background_fragment`] and therefore must observe
/// std140 alignment rules.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct BackgroundUniforms {
    pub resolution: [f32; 4],
    pub time: f32,
    pub time_delta: f32,
    pub frame: i32,
    pub _padding0: f32,
    pub mouse: [f32; 4],
}

unsafe impl Zeroable for BackgroundUniforms {}
unsafe impl Pod for BackgroundUniforms {}

impl BackgroundUniforms {
    /// Prepares a uniform block sized to the current surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32, 0.0, 0.0],
            time: 0.0,
            time_delta: 0.0,
            frame: 0,
            _padding0: 0.0,
            mouse: [0.0; 4],
        }
    }

    /// Writes the current surface dimensions into `uResolution`.
    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution[0] = width;
        self.resolution[1] = height;
    }

    /// Advances the per-frame values from the latest frame input.
    pub fn update(&mut self, time: &TimeSample, mouse: [f32; 4]) {
        self.time = time.seconds;
        self.time_delta = time.delta_seconds;
        self.frame = time.frame_index.min(i32::MAX as u64) as i32;
        self.mouse = mouse;
    }
}

/// Uniform block shared by the attractor scene's vertex and fragment stages.
///
/// Matches the WGSL `SceneUniforms` struct; mat4 columns are laid out the way
/// `glam::Mat4::to_cols_array_2d` produces them.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Sphere albedo.
    pub base_color: [f32; 4],
    /// xyz = direction the light travels, w = directional intensity.
    pub light_dir: [f32; 4],
    /// rgb = ambient color, w = ambient intensity.
    pub ambient: [f32; 4],
}

unsafe impl Zeroable for SceneUniforms {}
unsafe impl Pod for SceneUniforms {}

impl SceneUniforms {
    pub fn new(base_color: [f32; 4], light_dir: [f32; 4], ambient: [f32; 4]) -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            base_color,
            light_dir,
            ambient,
        }
    }

    pub fn set_view_proj(&mut self, view_proj: Mat4) {
        self.view_proj = view_proj.to_cols_array_2d();
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.model = model.to_cols_array_2d();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_uniforms_match_std140_block_size() {
        // vec4 + (float, float, int, pad) + vec4
        assert_eq!(std::mem::size_of::<BackgroundUniforms>(), 48);
    }

    #[test]
    fn scene_uniforms_match_wgsl_struct_size() {
        // two mat4x4 + three vec4
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 176);
    }

    #[test]
    fn background_update_clamps_frame_index() {
        let mut uniforms = BackgroundUniforms::new(100, 100);
        let sample = TimeSample {
            seconds: 1.0,
            delta_seconds: 0.016,
            frame_index: u64::MAX,
        };
        uniforms.update(&sample, [0.0; 4]);
        assert_eq!(uniforms.frame, i32::MAX);
    }
}
