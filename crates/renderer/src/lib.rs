//! Renderer crate for the chaoscope demos.
//!
//! The module glues the winit window, the `wgpu` pipelines, and the two demo
//! scenes together. The overall flow is:
//!
//! ```text
//!   CLI / chaoscope
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          ▲                                      │
//!          │                                      └─▶ Scene::update() ─▶ GPU UBO
//! ```
//!
//! `WindowState` owns the GPU context, the pointer state, and the active
//! [`Scene`](scene::Scene) — either the full-screen background shader or the
//! Lorenz tracer. Background fragment shaders are wrapped at runtime so they
//! can be compiled as Vulkan GLSL and fed the expected uniforms.

mod background;
mod camera;
mod compile;
mod gpu;
mod mesh;
mod runtime;
mod scene;
mod tracer;
mod types;
mod window;

use anyhow::Result;

pub use camera::Camera;
pub use runtime::{
    time_source_for_policy, BoxedTimeSource, FixedTimeSource, RenderPolicy, SystemTimeSource,
    TimeSample, TimeSource,
};
pub use types::{Antialiasing, DemoScene, RendererConfig};

/// High-level entry point that owns the chosen configuration.
///
/// The heavy lifting lives inside the window loop; `Renderer` simply carries
/// the configuration and forwards the request.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the demo window and runs until it is closed.
    ///
    /// Returns an error if initialization fails — no rendering surface, no
    /// suitable adapter, or a fragment shader that does not compile. Once the
    /// frame loop is running the only recoverable faults are surface errors,
    /// which are handled in place.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(demo = self.config.demo.label(), "starting renderer");
        window::run(&self.config)
    }
}
