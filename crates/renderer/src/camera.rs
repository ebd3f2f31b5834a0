use glam::{Mat4, Vec3};

/// Fixed perspective camera for the attractor scene.
///
/// The stock values place the eye far out on a diagonal looking back at the
/// origin, so the whole attractor stays in view while the sphere wanders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(-500.0, 400.0, -500.0),
            target: Vec3::ZERO,
            fov_y_degrees: 40.0,
            near: 1.0,
            far: 10_000.0,
        }
    }
}

impl Camera {
    /// Combined view-projection matrix for the given aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            self.near,
            self.far,
        );
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_center() {
        let camera = Camera::default();
        let clip = camera.view_proj(16.0 / 9.0) * camera.target.extend(1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        assert!(ndc_x.abs() < 1e-5, "target off-center: x={ndc_x}");
        assert!(ndc_y.abs() < 1e-5, "target off-center: y={ndc_y}");
    }

    #[test]
    fn view_proj_is_finite_for_degenerate_aspect() {
        let camera = Camera::default();
        let matrix = camera.view_proj(0.0);
        assert!(matrix.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
