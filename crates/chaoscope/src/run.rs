use anyhow::{anyhow, bail, Result};
use attractor::{LorenzParams, LorenzState, DEFAULT_SEED};
use rand::Rng;
use renderer::{Antialiasing, DemoScene, RenderPolicy, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{
    parse_antialias, parse_surface_size, AttractorArgs, Cli, DemoCommand, SeedSpec,
};
use crate::config::{self, AppConfig};
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    let config = config::load_or_default(cli.run.config.as_deref(), &paths)?;
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        data_dir = %paths.data_dir().display(),
        "resolved chaoscope directories"
    );

    let surface_size = match cli.run.size.as_deref() {
        Some(value) => parse_surface_size(value).map_err(|err| anyhow!(err))?,
        None => (config.window.width, config.window.height),
    };

    let target_fps = cli
        .run
        .fps
        .or(config.window.fps)
        .filter(|fps| *fps > 0.0);
    let policy = if cli.run.still {
        RenderPolicy::Still {
            time: cli.run.still_time,
        }
    } else {
        RenderPolicy::Animate { target_fps }
    };

    let antialiasing = match cli.run.antialias {
        Some(mode) => mode,
        None => match config.window.antialias.as_deref() {
            Some(value) => parse_antialias(value).map_err(|err| anyhow!(err))?,
            None => Antialiasing::default(),
        },
    };

    let demo = build_demo(&cli, &config, &paths)?;
    tracing::info!(
        demo = demo.label(),
        width = surface_size.0,
        height = surface_size.1,
        "bootstrapping chaoscope"
    );

    let mut renderer = Renderer::new(RendererConfig {
        surface_size,
        demo,
        policy,
        antialiasing,
    });
    renderer.run()
}

fn initialise_tracing() {
    let default_filter =
        "warn,chaoscope=info,renderer=info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_demo(cli: &Cli, config: &AppConfig, paths: &AppPaths) -> Result<DemoScene> {
    match &cli.demo {
        None => background_demo(None, config, paths),
        Some(DemoCommand::Background(args)) => {
            background_demo(args.shader.as_deref(), config, paths)
        }
        Some(DemoCommand::Attractor(args)) => attractor_demo(args, config),
    }
}

fn background_demo(
    shader: Option<&str>,
    config: &AppConfig,
    paths: &AppPaths,
) -> Result<DemoScene> {
    let handle = shader.or(config.background.shader.as_deref());
    let fragment = handle
        .map(|handle| paths.resolve_shader(handle))
        .transpose()?;
    if let Some(path) = &fragment {
        tracing::info!(shader = %path.display(), "using background shader");
    }
    Ok(DemoScene::Background { fragment })
}

fn attractor_demo(args: &AttractorArgs, config: &AppConfig) -> Result<DemoScene> {
    let params = LorenzParams {
        sigma: args.sigma.unwrap_or(config.attractor.sigma),
        rho: args.rho.unwrap_or(config.attractor.rho),
        beta: args.beta.unwrap_or(config.attractor.beta),
    };
    for (name, value) in [
        ("sigma", params.sigma),
        ("rho", params.rho),
        ("beta", params.beta),
    ] {
        if !value.is_finite() {
            bail!("{name} must be finite, got {value}");
        }
    }

    let dt = args.dt.unwrap_or(config.attractor.dt);
    if !dt.is_finite() || dt <= 0.0 {
        bail!("dt must be a positive number, got {dt}");
    }

    let seed = match args.seed {
        Some(SeedSpec::Fixed { x, y, z }) => LorenzState::new(x, y, z),
        Some(SeedSpec::Random) => random_seed(),
        None => config
            .attractor
            .seed
            .map(|[x, y, z]| LorenzState::new(x, y, z))
            .unwrap_or(DEFAULT_SEED),
    };

    tracing::info!(
        sigma = params.sigma,
        rho = params.rho,
        beta = params.beta,
        dt,
        x = seed.x,
        y = seed.y,
        z = seed.z,
        "configured attractor demo"
    );
    Ok(DemoScene::Attractor { params, dt, seed })
}

/// Draws a starting point from the attractor's bounding box; anything in
/// that region settles onto the butterfly within a few hundred steps.
fn random_seed() -> LorenzState {
    let mut rng = rand::thread_rng();
    LorenzState::new(
        rng.gen_range(-15.0..15.0),
        rng.gen_range(-20.0..20.0),
        rng.gen_range(5.0..35.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_override_config_values() {
        let args = AttractorArgs {
            rho: Some(26.5),
            seed: Some(SeedSpec::Fixed {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            }),
            ..AttractorArgs::default()
        };
        let mut config = AppConfig::default();
        config.attractor.rho = 99.0;
        config.attractor.beta = 2.0;

        let demo = attractor_demo(&args, &config).unwrap();
        match demo {
            DemoScene::Attractor { params, dt, seed } => {
                assert_eq!(params.rho, 26.5);
                assert_eq!(params.beta, 2.0);
                assert_eq!(dt, 0.01);
                assert_eq!((seed.x, seed.y, seed.z), (1.0, 2.0, 3.0));
            }
            other => panic!("unexpected demo: {other:?}"),
        }
    }

    #[test]
    fn defaults_to_the_canonical_seed() {
        let demo = attractor_demo(&AttractorArgs::default(), &AppConfig::default()).unwrap();
        match demo {
            DemoScene::Attractor { seed, .. } => {
                assert_eq!((seed.x, seed.y, seed.z), (0.1, 0.0, 0.0));
            }
            other => panic!("unexpected demo: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_dt() {
        let args = AttractorArgs {
            dt: Some(0.0),
            ..AttractorArgs::default()
        };
        assert!(attractor_demo(&args, &AppConfig::default()).is_err());
    }

    #[test]
    fn random_seed_stays_in_the_basin() {
        for _ in 0..32 {
            let seed = random_seed();
            assert!(seed.x.abs() <= 15.0);
            assert!(seed.y.abs() <= 20.0);
            assert!((5.0..=35.0).contains(&seed.z));
        }
    }
}
