use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::background::{BackgroundScene, DEFAULT_BACKGROUND_FRAGMENT};
use crate::gpu::context::GpuContext;
use crate::runtime::{time_source_for_policy, BoxedTimeSource, RenderPolicy};
use crate::scene::{FrameInput, MouseState, RenderTarget, Scene};
use crate::tracer::TracerScene;
use crate::types::{DemoScene, RendererConfig};

/// Opens the demo window and drives the `winit` event loop.
///
/// A `WindowState` is created up-front and stored inside the event loop
/// closure. `winit` delivers events one by one; we respond to them and draw
/// another frame whenever a redraw is requested.
pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(format!("Chaoscope - {}", config.demo.label()))
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create demo window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), config)?;
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| {
            // Drive redraws via vblank by waiting between events.
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            state.mouse.handle_cursor_moved(position);
                        }
                        WindowEvent::MouseInput {
                            state: button_state,
                            button,
                            ..
                        } => {
                            if button == MouseButton::Left {
                                state.mouse.handle_button(button_state);
                            }
                        }
                        WindowEvent::Resized(new_size) => {
                            state.resize(new_size);
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            // Keep the current logical size when the scale factor changes.
                            let _ = inner_size_writer.request_inner_size(state.size());
                        }
                        WindowEvent::RedrawRequested => match state.render_frame() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size());
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting");
                                elwt.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                tracing::warn!("surface timeout; retrying next frame");
                            }
                            Err(other) => {
                                tracing::warn!(error = ?other, "surface error; retrying next frame");
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Schedule the next frame once winit is about to wait
                    // again; still mode stops after its single presented
                    // frame, and a capped loop sleeps until the deadline
                    // instead of polling.
                    if !state.wants_redraw() {
                        // Idle until an event arrives.
                    } else if state.pacing.ready_for_frame(Instant::now()) {
                        state.window().request_redraw();
                    } else if let Some(deadline) = state.pacing.next_deadline() {
                        elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

/// Aggregates everything a frame needs: the GPU context, the active scene,
/// pointer state, and the frame clock.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuContext,
    scene: Box<dyn Scene>,
    mouse: MouseState,
    time_source: BoxedTimeSource,
    pacing: FramePacing,
    still: bool,
    presented_still: bool,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuContext::new(window.as_ref(), size, config.antialiasing)?;

        let scene: Box<dyn Scene> = match &config.demo {
            DemoScene::Background { fragment } => {
                let source = match fragment {
                    Some(path) => fs::read_to_string(path).with_context(|| {
                        format!("failed to read shader at {}", path.display())
                    })?,
                    None => DEFAULT_BACKGROUND_FRAGMENT.to_string(),
                };
                Box::new(BackgroundScene::new(&gpu, &source)?)
            }
            DemoScene::Attractor { params, dt, seed } => {
                Box::new(TracerScene::new(&gpu, *params, *dt, *seed)?)
            }
        };

        let (pacing, still) = match config.policy {
            RenderPolicy::Animate { target_fps } => (FramePacing::new(target_fps), false),
            RenderPolicy::Still { .. } => (FramePacing::new(None), true),
        };

        Ok(Self {
            window,
            gpu,
            scene,
            mouse: MouseState::default(),
            time_source: time_source_for_policy(&config.policy),
            pacing,
            still,
            presented_still: false,
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    /// Cached physical size of the swapchain surface.
    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn wants_redraw(&self) -> bool {
        !(self.still && self.presented_still)
    }

    /// Reacts to platform resize events by updating the swapchain and the
    /// scene's size-tracking resources.
    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.scene.resize(self.gpu.device(), self.gpu.size());
        if self.still {
            // Re-render the still at the new size.
            self.presented_still = false;
        }
    }

    /// Records and submits a frame to the GPU.
    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.pacing.tick(Instant::now()) {
            return Ok(());
        }

        let size = self.gpu.size();
        let frame_input = FrameInput {
            time: self.time_source.sample(),
            mouse: self.mouse.as_uniform(size.height.max(1) as f32),
            size,
        };
        self.scene.update(self.gpu.queue(), &frame_input);

        let frame = self.gpu.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (attachment_view, resolve_target) = self.gpu.color_targets(&view);

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });
        self.scene.encode(
            &mut encoder,
            RenderTarget {
                view: attachment_view,
                resolve_target,
            },
        );

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        frame.present();
        if self.still {
            self.presented_still = true;
        }
        tracing::trace!(
            width = size.width,
            height = size.height,
            frame = frame_input.time.frame_index,
            "presented frame"
        );
        Ok(())
    }
}

/// Deadline-based FPS cap; uncapped when no interval is set.
///
/// The event loop asks `ready_for_frame` before requesting a redraw and
/// sleeps until `next_deadline` otherwise, so a cap limits CPU wakeups as
/// well as presented frames.
struct FramePacing {
    target_interval: Option<Duration>,
    next_deadline: Option<Instant>,
}

/// Slack applied when comparing against a deadline, absorbing timer jitter.
const PACING_TOLERANCE: Duration = Duration::from_micros(250);

impl FramePacing {
    fn new(target_fps: Option<f32>) -> Self {
        let target_interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        if let Some(interval) = target_interval {
            tracing::info!(?interval, "frame rate cap enabled");
        }
        Self {
            target_interval,
            next_deadline: None,
        }
    }

    /// Whether a frame at `now` is due.
    fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.target_interval, self.next_deadline) {
            (Some(_), Some(deadline)) => now + PACING_TOLERANCE >= deadline,
            _ => true,
        }
    }

    /// Deadline of the next due frame when a cap is active and satisfied.
    fn next_deadline(&self) -> Option<Instant> {
        self.target_interval.and(self.next_deadline)
    }

    /// Gates the frame at `now`; on render, schedules the next deadline.
    fn tick(&mut self, now: Instant) -> bool {
        let Some(interval) = self.target_interval else {
            return true;
        };
        if !self.ready_for_frame(now) {
            return false;
        }
        // Step from the missed deadline, but never fall behind wall time by
        // more than one interval after a long gap.
        let mut next = self
            .next_deadline
            .map(|deadline| deadline + interval)
            .unwrap_or(now + interval);
        if next <= now {
            next = now + interval;
        }
        self.next_deadline = Some(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_pacing_always_renders() {
        let mut pacing = FramePacing::new(None);
        let now = Instant::now();
        for i in 0..5 {
            assert!(pacing.tick(now + Duration::from_millis(i)));
        }
    }

    #[test]
    fn capped_pacing_skips_early_frames() {
        // 50 FPS cap polled at 100 FPS: every other frame renders.
        let mut pacing = FramePacing::new(Some(50.0));
        let start = Instant::now();
        assert!(pacing.tick(start));
        assert!(!pacing.tick(start + Duration::from_millis(10)));
        assert!(pacing.tick(start + Duration::from_millis(20)));
        assert!(!pacing.tick(start + Duration::from_millis(30)));
    }

    #[test]
    fn capped_pacing_sleeps_until_the_deadline_between_frames() {
        // 50 FPS cap: after a rendered frame the loop must not poll; it gets
        // a deadline one interval out and reports not-ready until then.
        let mut pacing = FramePacing::new(Some(50.0));
        let start = Instant::now();
        assert!(pacing.tick(start));

        let deadline = pacing.next_deadline().expect("cap must expose a deadline");
        let interval = Duration::from_secs_f32(1.0 / 50.0);
        assert_eq!(deadline, start + interval);
        assert!(!pacing.ready_for_frame(start + Duration::from_millis(5)));
        assert!(pacing.ready_for_frame(deadline));
    }

    #[test]
    fn uncapped_pacing_exposes_no_deadline() {
        let mut pacing = FramePacing::new(None);
        assert!(pacing.tick(Instant::now()));
        assert!(pacing.next_deadline().is_none());
        assert!(pacing.ready_for_frame(Instant::now()));
    }

    #[test]
    fn capped_pacing_renders_immediately_after_a_gap() {
        let mut pacing = FramePacing::new(Some(50.0));
        let start = Instant::now();
        assert!(pacing.tick(start));
        assert!(pacing.tick(start + Duration::from_millis(500)));
    }
}
