//! On-disk configuration (`chaoscope.toml`).
//!
//! Every field has a default, so an absent or empty file behaves exactly like
//! running with no configuration at all. CLI flags always win over file
//! values; the merge happens in `run`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::paths::AppPaths;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub background: BackgroundConfig,
    pub attractor: AttractorConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    /// FPS cap; omit or set to 0 to render uncapped.
    pub fps: Option<f32>,
    /// Anti-aliasing mode (`auto`, `off`, or a sample count).
    pub antialias: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: None,
            antialias: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    /// Fragment shader path or name; the built-in effect when omitted.
    pub shader: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttractorConfig {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
    pub dt: f64,
    /// Starting point `[x, y, z]`.
    pub seed: Option<[f64; 3]>,
}

impl Default for AttractorConfig {
    fn default() -> Self {
        let params = attractor::LorenzParams::default();
        Self {
            sigma: params.sigma,
            rho: params.rho,
            beta: params.beta,
            dt: attractor::DEFAULT_DT,
            seed: None,
        }
    }
}

/// Loads the effective configuration.
///
/// An explicit path must exist; the default location is optional and silently
/// skipped when missing.
pub fn load_or_default(
    explicit: Option<&Path>,
    paths: &AppPaths,
) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit {
        return load(path);
    }
    let default_path = paths.config_file();
    if default_path.is_file() {
        return load(&default_path);
    }
    Ok(AppConfig::default())
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

fn parse(text: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.window.width == 0 || config.window.height == 0 {
        return Err(ConfigError::Invalid(
            "window dimensions must be greater than zero".to_string(),
        ));
    }
    if let Some(fps) = config.window.fps {
        if !fps.is_finite() || fps < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "window.fps must be a non-negative number, got {fps}"
            )));
        }
    }
    let attractor = &config.attractor;
    for (name, value) in [
        ("attractor.sigma", attractor.sigma),
        ("attractor.rho", attractor.rho),
        ("attractor.beta", attractor.beta),
    ] {
        if !value.is_finite() {
            return Err(ConfigError::Invalid(format!("{name} must be finite")));
        }
    }
    if !attractor.dt.is_finite() || attractor.dt <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "attractor.dt must be a positive number, got {}",
            attractor.dt
        )));
    }
    if let Some(seed) = attractor.seed {
        if seed.iter().any(|value| !value.is_finite()) {
            return Err(ConfigError::Invalid(
                "attractor.seed coordinates must be finite".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse_str(text: &str) -> Result<AppConfig, ConfigError> {
        parse(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_str("").unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(config.background.shader.is_none());
        assert_eq!(config.attractor.sigma, 10.0);
        assert_eq!(config.attractor.dt, 0.01);
    }

    #[test]
    fn parses_all_sections() {
        let config = parse_str(
            r#"
            [window]
            width = 1920
            height = 1080
            fps = 60.0
            antialias = "4"

            [background]
            shader = "plasma.frag"

            [attractor]
            rho = 26.5
            seed = [1.0, 2.0, 3.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.fps, Some(60.0));
        assert_eq!(config.window.antialias.as_deref(), Some("4"));
        assert_eq!(config.background.shader.as_deref(), Some("plasma.frag"));
        assert_eq!(config.attractor.rho, 26.5);
        // Unset coefficients keep their defaults.
        assert_eq!(config.attractor.sigma, 10.0);
        assert_eq!(config.attractor.seed, Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = parse_str("[window]\nwidht = 640\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_non_positive_dt() {
        let err = parse_str("[attractor]\ndt = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_window_dimension() {
        let err = parse_str("[window]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chaoscope.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[window]\nwidth = 640\nheight = 480").unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Path::new("/nonexistent/chaoscope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
