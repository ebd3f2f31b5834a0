use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::Antialiasing;

#[derive(Parser, Debug)]
#[command(
    name = "chaoscope",
    author,
    version,
    about = "Desktop viewer for the chaoscope visual demos",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub demo: Option<DemoCommand>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Window size override (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Render a single still frame instead of animating continuously.
    #[arg(long)]
    pub still: bool,

    /// Timestamp (seconds) to evaluate in still mode.
    #[arg(long, value_name = "SECONDS")]
    pub still_time: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Explicit configuration file path.
    #[arg(long, value_name = "FILE", env = "CHAOSCOPE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Demo to run; defaults to the background shader when omitted.
#[derive(Subcommand, Debug)]
pub enum DemoCommand {
    /// Full-screen animated shader background.
    Background(BackgroundArgs),
    /// Lorenz attractor point animation.
    Attractor(AttractorArgs),
}

#[derive(Parser, Debug, Default)]
pub struct BackgroundArgs {
    /// Fragment shader file, or a name resolved against the shader roots.
    #[arg(long, value_name = "SHADER")]
    pub shader: Option<String>,
}

#[derive(Parser, Debug, Default)]
pub struct AttractorArgs {
    /// Lorenz σ coefficient.
    #[arg(long, value_name = "SIGMA")]
    pub sigma: Option<f64>,

    /// Lorenz ρ coefficient.
    #[arg(long, value_name = "RHO")]
    pub rho: Option<f64>,

    /// Lorenz β coefficient.
    #[arg(long, value_name = "BETA")]
    pub beta: Option<f64>,

    /// Integration step size in simulated seconds.
    #[arg(long, value_name = "DT")]
    pub dt: Option<f64>,

    /// Starting point `X,Y,Z`, or `random`.
    #[arg(long, value_name = "X,Y,Z|random", value_parser = parse_seed)]
    pub seed: Option<SeedSpec>,
}

/// Starting point requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedSpec {
    Fixed { x: f64, y: f64, z: f64 },
    Random,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 0 || samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{w}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_seed(value: &str) -> Result<SeedSpec, String> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("random") {
        return Ok(SeedSpec::Random);
    }

    let parts: Vec<&str> = trimmed.split(',').collect();
    if parts.len() != 3 {
        return Err(format!(
            "invalid seed '{trimmed}'; expected X,Y,Z or 'random'"
        ));
    }

    let mut coords = [0.0_f64; 3];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        let parsed = part
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid seed coordinate '{}'", part.trim()))?;
        if !parsed.is_finite() {
            return Err(format!("seed coordinate '{}' is not finite", part.trim()));
        }
        *slot = parsed;
    }

    Ok(SeedSpec::Fixed {
        x: coords[0],
        y: coords[1],
        z: coords[2],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_antialias_variants() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("off").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size("1920X1080").unwrap(), (1920, 1080));
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("1280").is_err());
    }

    #[test]
    fn parses_seed_specs() {
        assert_eq!(parse_seed("random").unwrap(), SeedSpec::Random);
        assert_eq!(
            parse_seed("0.1, 0, 0").unwrap(),
            SeedSpec::Fixed {
                x: 0.1,
                y: 0.0,
                z: 0.0
            }
        );
        assert!(parse_seed("1,2").is_err());
        assert!(parse_seed("1,2,nan").is_err());
    }

    #[test]
    fn parses_attractor_subcommand() {
        let cli = Cli::try_parse_from([
            "chaoscope",
            "--size",
            "800x600",
            "attractor",
            "--rho",
            "26.5",
            "--seed",
            "random",
        ])
        .unwrap();
        assert_eq!(cli.run.size.as_deref(), Some("800x600"));
        match cli.demo {
            Some(DemoCommand::Attractor(args)) => {
                assert_eq!(args.rho, Some(26.5));
                assert_eq!(args.seed, Some(SeedSpec::Random));
            }
            other => panic!("unexpected demo command: {other:?}"),
        }
    }

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["chaoscope"]).unwrap();
        assert!(cli.demo.is_none());
        assert!(!cli.run.still);
    }
}
