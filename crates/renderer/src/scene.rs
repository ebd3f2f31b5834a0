use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::ElementState;

use crate::runtime::TimeSample;

/// Per-frame inputs handed to a scene by the window loop.
///
/// This is the explicit render-loop context object: everything a frame step
/// may read (elapsed time, pointer state, surface size) arrives here instead
/// of living in ambient globals.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameInput {
    pub time: TimeSample,
    /// Pointer uniform: xy = current position, zw = press anchor, both with a
    /// bottom-left origin.
    pub mouse: [f32; 4],
    pub size: PhysicalSize<u32>,
}

/// Color attachment pair for a frame: the render view plus an optional MSAA
/// resolve target.
pub(crate) struct RenderTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub resolve_target: Option<&'a wgpu::TextureView>,
}

/// Seam between the window loop and the two demos.
///
/// A scene owns its pipelines and buffers, consumes one [`FrameInput`] per
/// frame, and records its own render pass. Nothing in the loop knows which
/// demo is running.
pub(crate) trait Scene {
    /// Reacts to swapchain size changes (size-tracking resources only).
    fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>);
    /// Advances scene state and uploads per-frame uniforms.
    fn update(&mut self, queue: &wgpu::Queue, frame: &FrameInput);
    /// Records the scene's render pass into the encoder.
    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: RenderTarget<'_>);
}

/// Tracks cursor motion and drag state feeding the `uMouse` uniform.
///
/// Pointer events are written here by the event loop and read by the next
/// frame callback; both run on the same cooperative loop, so no
/// synchronisation is needed. Points are stored in the top-left window
/// coordinates winit delivers and flipped once in [`MouseState::as_uniform`].
#[derive(Default)]
pub(crate) struct MouseState {
    position: Option<[f32; 2]>,
    anchor: Option<[f32; 2]>,
    pressed: bool,
}

impl MouseState {
    /// Records the latest cursor position. A press that landed before the
    /// first cursor event anchors at this point.
    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let point = [position.x as f32, position.y as f32];
        self.position = Some(point);
        if self.pressed && self.anchor.is_none() {
            self.anchor = Some(point);
        }
    }

    /// Notes a primary-button transition; pressing anchors the drag at the
    /// current position, releasing clears it.
    pub fn handle_button(&mut self, state: ElementState) {
        self.pressed = state == ElementState::Pressed;
        self.anchor = if self.pressed { self.position } else { None };
    }

    /// Produces the four floats fed to `uMouse` (xy = position, zw = drag
    /// anchor), flipped to a bottom-left origin.
    pub fn as_uniform(&self, height: f32) -> [f32; 4] {
        let flip = |point: [f32; 2]| [point[0], height - point[1]];
        let [x, y] = self.position.map(flip).unwrap_or([0.0; 2]);
        let [anchor_x, anchor_y] = self.anchor.map(flip).unwrap_or([0.0; 2]);
        [x, y, anchor_x, anchor_y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_uniform_flips_to_bottom_left_origin() {
        let mut mouse = MouseState::default();
        mouse.handle_cursor_moved(PhysicalPosition::new(10.0, 30.0));
        let uniform = mouse.as_uniform(100.0);
        assert_eq!(uniform, [10.0, 70.0, 0.0, 0.0]);
    }

    #[test]
    fn press_anchors_at_current_position_until_release() {
        let mut mouse = MouseState::default();
        mouse.handle_cursor_moved(PhysicalPosition::new(5.0, 5.0));
        mouse.handle_button(ElementState::Pressed);
        mouse.handle_cursor_moved(PhysicalPosition::new(50.0, 20.0));
        let uniform = mouse.as_uniform(100.0);
        assert_eq!(uniform, [50.0, 80.0, 5.0, 95.0]);

        mouse.handle_button(ElementState::Released);
        let uniform = mouse.as_uniform(100.0);
        assert_eq!(uniform[2..], [0.0, 0.0]);
    }

    #[test]
    fn press_before_first_move_anchors_at_the_first_position() {
        let mut mouse = MouseState::default();
        mouse.handle_button(ElementState::Pressed);
        mouse.handle_cursor_moved(PhysicalPosition::new(12.0, 40.0));
        let uniform = mouse.as_uniform(100.0);
        assert_eq!(uniform, [12.0, 60.0, 12.0, 60.0]);
    }
}
