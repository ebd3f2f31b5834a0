use std::path::PathBuf;

use attractor::{LorenzParams, LorenzState, DEFAULT_DT, DEFAULT_SEED};

use crate::runtime::RenderPolicy;

/// Anti-aliasing policy for the render pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Auto
    }
}

/// Which demo the renderer should drive.
///
/// The two demos share nothing except the frame loop: the background demo is
/// a full-screen fragment shader fed time and pointer uniforms, the attractor
/// demo is a small 3D scene repositioned by the Lorenz integrator each frame.
#[derive(Debug, Clone)]
pub enum DemoScene {
    /// Full-screen animated shader.
    ///
    /// `fragment` points at a user-supplied GLSL file written against the
    /// `mainImage` entry point; `None` renders the built-in effect.
    Background { fragment: Option<PathBuf> },
    /// Lorenz attractor point animation.
    Attractor {
        params: LorenzParams,
        dt: f64,
        seed: LorenzState,
    },
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::Background { fragment: None }
    }
}

impl DemoScene {
    /// Stock attractor demo: default coefficients, Δt, and seed.
    pub fn attractor() -> Self {
        Self::Attractor {
            params: LorenzParams::default(),
            dt: DEFAULT_DT,
            seed: DEFAULT_SEED,
        }
    }

    /// Short label used in logs and the window title.
    pub fn label(&self) -> &'static str {
        match self {
            DemoScene::Background { .. } => "background",
            DemoScene::Attractor { .. } => "attractor",
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and tells the renderer which demo to
/// build, how large the window should be, and how frames should be paced.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Demo to build once the GPU context is up.
    pub demo: DemoScene,
    /// Frame pacing behaviour (animate vs single still frame).
    pub policy: RenderPolicy,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
}

impl Default for RendererConfig {
    /// A 720p window running the background demo.
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            demo: DemoScene::default(),
            policy: RenderPolicy::default(),
            antialiasing: Antialiasing::default(),
        }
    }
}
