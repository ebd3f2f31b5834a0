use std::borrow::Cow;

use anyhow::{anyhow, Result};
use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Wraps the user fragment with the uniform prelude and compiles it as GLSL.
///
/// The wrapped source is validated on the CPU first so a broken shader
/// surfaces a compiler message and aborts initialization instead of faulting
/// inside the GPU driver.
pub(crate) fn compile_background_fragment(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule> {
    let wrapped = wrap_background_fragment(source);
    validate_fragment_source(&wrapped)?;

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("background fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(wrapped),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Parses and validates a complete GLSL fragment shader without touching the
/// GPU. Returns the compiler message on failure.
pub(crate) fn validate_fragment_source(source: &str) -> Result<()> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(ShaderStage::Fragment), source)
        .map_err(|errors| anyhow!("fragment shader failed to parse: {errors:?}"))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| anyhow!("fragment shader failed validation: {error:?}"))?;

    Ok(())
}

/// Produces a self-contained GLSL fragment shader from demo shader code.
///
/// Steps performed:
///
/// 1. Strip `#version` directives and duplicate uniform declarations so we
///    can inject our own definitions.
/// 2. Prepend [`HEADER`] which declares the uniform block and macro aliases.
/// 3. Append [`FOOTER`] which remaps `gl_FragCoord` to a bottom-left origin,
///    calls `mainImage`, and writes to `outColor`.
pub(crate) fn wrap_background_fragment(source: &str) -> String {
    let mut sanitized = String::new();
    let mut skipped_version = false;
    for line in source.lines() {
        if !skipped_version && line.trim_start().starts_with("#version") {
            skipped_version = true;
            continue;
        }
        let trimmed = line.trim_start();
        let should_skip_uniform = trimmed.starts_with("uniform ")
            && (trimmed.contains("uResolution")
                || trimmed.contains("uTimeDelta")
                || trimmed.contains("uTime")
                || trimmed.contains("uFrame")
                || trimmed.contains("uMouse"));
        if should_skip_uniform {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{HEADER}\n#line 1\n{sanitized}{FOOTER}")
}

/// GLSL prologue injected ahead of every background fragment shader.
///
/// The uniform block layout must match `BackgroundUniforms` in
/// `gpu/uniforms.rs` and therefore observes std140 alignment rules.
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec4 _uResolution;
    float _uTime;
    float _uTimeDelta;
    int _uFrame;
    float _padding0;
    vec4 _uMouse;
} ubo;

// Map the demo uniform names to our UBO fields via macros to avoid clashes.
#define uResolution ubo._uResolution
#define uTime ubo._uTime
#define uTimeDelta ubo._uTimeDelta
#define uFrame ubo._uFrame
#define uMouse ubo._uMouse

vec4 chaoscope_gl_FragCoord;
#define gl_FragCoord chaoscope_gl_FragCoord
";

/// GLSL epilogue that remaps coordinates and delegates to `mainImage`.
const FOOTER: &str = r"void main() {
    // Capture the real builtin gl_FragCoord, then remap to a bottom-left
    // origin. We temporarily undef the macro to read the hardware builtin.
    #undef gl_FragCoord
    vec2 builtinFC = vec2(gl_FragCoord.x, gl_FragCoord.y);
    #define gl_FragCoord chaoscope_gl_FragCoord

    vec2 fragCoord = vec2(builtinFC.x, uResolution.y - builtinFC.y);
    chaoscope_gl_FragCoord = vec4(fragCoord, 0.0, 1.0);

    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    outColor = color;
}
";

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::DEFAULT_BACKGROUND_FRAGMENT;

    #[test]
    fn wrap_strips_version_and_duplicate_uniforms() {
        let source = r#"
            #version 300 es
            uniform float uTime;
            uniform vec4 uResolution;
            void mainImage(out vec4 fragColor, in vec2 fragCoord) {
                fragColor = vec4(fragCoord, 0.0, 1.0);
            }
        "#;

        let wrapped = wrap_background_fragment(source);
        assert!(!wrapped.contains("uniform float uTime"));
        assert!(!wrapped.contains("uniform vec4 uResolution"));
        assert!(wrapped.contains("mainImage"));
        assert_eq!(wrapped.matches("#version").count(), 1);
    }

    #[test]
    fn default_fragment_compiles() {
        let wrapped = wrap_background_fragment(DEFAULT_BACKGROUND_FRAGMENT);
        validate_fragment_source(&wrapped).expect("built-in fragment must validate");
    }

    #[test]
    fn minimal_fragment_compiles() {
        let wrapped = wrap_background_fragment(
            "void mainImage(out vec4 fragColor, in vec2 fragCoord) { fragColor = vec4(uTime); }",
        );
        validate_fragment_source(&wrapped).expect("minimal fragment must validate");
    }

    #[test]
    fn invalid_fragment_reports_failure_without_panicking() {
        let wrapped = wrap_background_fragment("this is not a shader");
        let result = validate_fragment_source(&wrapped);
        assert!(result.is_err());
    }

    #[test]
    fn vertex_shader_validates_standalone() {
        let mut frontend = glsl::Frontend::default();
        let module = frontend
            .parse(&glsl::Options::from(ShaderStage::Vertex), VERTEX_SHADER_GLSL)
            .expect("vertex shader must parse");
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .expect("vertex shader must validate");
    }
}
