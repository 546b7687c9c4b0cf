//! Twinkle CLI
//!
//! Run particle effects headless, check config files and browse presets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use twinkle_animation::FrameScheduler;
use twinkle_core::Size;
use twinkle_particles::{
    presets, ColorSpec, Direction, EffectType, EngineConfig, EngineStats, ParticleEngine,
    PoolStats, StaticContainer,
};

mod config;

use config::{ConfigFormat, DEFAULT_CONFIG_FILE};

/// Nominal frame length the simulator advances by
const FRAME_MS: f64 = 16.67;

#[derive(Parser)]
#[command(name = "twinkle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Twinkle particle engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate an effect headless and report engine statistics
    Run {
        /// Effect to run (ignored when --config is given)
        #[arg(default_value = "normal")]
        effect: EffectType,

        /// Config file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emission direction (upward, all, ambientField)
        #[arg(short, long)]
        direction: Option<Direction>,

        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        frames: u32,

        /// Surface width in pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Surface height in pixels
        #[arg(long, default_value = "720")]
        height: f32,

        /// Resize the surface to WIDTHxHEIGHT halfway through
        #[arg(long)]
        resize: Option<String>,

        /// Random seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Hardware concurrency used to size the particle cap
        #[arg(long)]
        cores: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a config file and show the settings it resolves to
    Check {
        /// Config file (.toml or .json)
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },

    /// Write a default config file
    Init {
        /// Effect the config starts from
        #[arg(default_value = "normal")]
        effect: EffectType,

        /// Start from the ambient weather defaults
        #[arg(short, long)]
        ambient: bool,

        /// Output path (.toml or .json)
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List effects with their palettes and ambient populations
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            effect,
            config,
            direction,
            frames,
            width,
            height,
            resize,
            seed,
            cores,
            json,
        } => {
            let mut engine_config = match config {
                Some(path) => config::load(&path)?,
                None => EngineConfig {
                    effect_type: effect,
                    ..Default::default()
                },
            };
            if let Some(direction) = direction {
                engine_config.direction = direction;
            }
            let resize = resize.as_deref().map(parse_size).transpose()?;
            let options = RunOptions {
                frames,
                size: Size::new(width, height),
                resize,
                seed,
                cores,
            };
            cmd_run(&engine_config, &options, json)
        }

        Commands::Check { path } => cmd_check(&path),

        Commands::Init {
            effect,
            ambient,
            output,
            force,
        } => cmd_init(effect, ambient, &output, force),

        Commands::Presets => cmd_presets(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// run
// ─────────────────────────────────────────────────────────────────────────────

struct RunOptions {
    frames: u32,
    size: Size,
    resize: Option<Size>,
    seed: Option<u64>,
    cores: Option<usize>,
}

/// Summary of a simulated run
#[derive(Debug, Serialize)]
struct RunReport {
    effect: String,
    direction: String,
    frames: u32,
    max_particles: usize,
    active: usize,
    peak_active: usize,
    ticks: u64,
    skipped: u64,
    spawn_events: u64,
    spawned: u64,
    culled: u64,
    trimmed: u64,
    pool_allocated: usize,
    pool_free: usize,
    draw_commands: usize,
}

impl RunReport {
    fn new(
        config: &EngineConfig,
        frames: u32,
        engine: &ParticleEngine,
        peak_active: usize,
    ) -> Self {
        let EngineStats {
            ticks,
            skipped,
            spawn_events,
            spawned,
            culled,
            trimmed,
        } = engine.stats();
        let PoolStats {
            allocated, free, ..
        } = engine.pool_stats();
        Self {
            effect: config.effect_type.to_string(),
            direction: config.direction.to_string(),
            frames,
            max_particles: engine.max_particles(),
            active: engine.active_count(),
            peak_active,
            ticks,
            skipped,
            spawn_events,
            spawned,
            culled,
            trimmed,
            pool_allocated: allocated,
            pool_free: free,
            draw_commands: engine.with_commands(|commands| commands.len()),
        }
    }
}

fn cmd_run(config: &EngineConfig, options: &RunOptions, json: bool) -> Result<()> {
    if !config.enabled {
        warn!("Effect is disabled in the config; nothing will be drawn");
    }

    let scheduler = FrameScheduler::new();
    let host = Rc::new(StaticContainer::new(
        options.size.width,
        options.size.height,
    ));
    let mut engine = ParticleEngine::new(host.clone(), scheduler.handle());
    if let Some(seed) = options.seed {
        engine = engine.with_seed(seed);
    }
    if options.cores.is_some() {
        engine = engine.with_hardware_concurrency(options.cores);
    }

    info!(
        "Running {} ({}) on {}x{} for {} frames",
        config.effect_type,
        config.direction,
        options.size.width,
        options.size.height,
        options.frames
    );

    engine.start(config);

    let halfway = options.frames / 2;
    let mut peak_active = 0;
    for frame in 0..options.frames {
        if frame == halfway {
            if let Some(size) = options.resize {
                info!("Resizing surface to {}x{}", size.width, size.height);
                host.set_size(size.width, size.height);
                engine.request_resize();
            }
        }
        scheduler.tick(f64::from(frame) * FRAME_MS);
        peak_active = peak_active.max(engine.active_count());
    }

    debug!(settings = ?engine.settings(), "final settings");
    let report = RunReport::new(config, options.frames, &engine, peak_active);
    engine.stop();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Effect:         {} ({})", report.effect, report.direction);
    println!("Frames:         {} ({} ticks, {} skipped)", report.frames, report.ticks, report.skipped);
    println!("Particle cap:   {}", report.max_particles);
    println!("Active:         {} (peak {})", report.active, report.peak_active);
    println!(
        "Spawned:        {} in {} events",
        report.spawned, report.spawn_events
    );
    println!("Culled:         {}", report.culled);
    println!("Trimmed by cap: {}", report.trimmed);
    println!(
        "Pool:           {} allocated, {} free",
        report.pool_allocated, report.pool_free
    );
    println!("Draw commands:  {} (last frame)", report.draw_commands);
}

/// Parse `WIDTHxHEIGHT`
fn parse_size(input: &str) -> Result<Size> {
    let (width, height) = input
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("Invalid size '{}', expected WIDTHxHEIGHT", input))?;
    let width: f32 = width.trim().parse()?;
    let height: f32 = height.trim().parse()?;
    if !(width > 0.0 && height > 0.0) {
        anyhow::bail!("Invalid size '{}', both sides must be positive", input);
    }
    Ok(Size::new(width, height))
}

// ─────────────────────────────────────────────────────────────────────────────
// check / init / presets
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_check(path: &Path) -> Result<()> {
    info!("Checking {}", path.display());

    // Clamped or replaced values are reported as warnings while sanitizing
    let config = config::load(path)?;
    let settings = config.sanitize();

    println!("Effect:       {}", settings.effect);
    println!("Direction:    {}", settings.direction);
    println!("Enabled:      {}", settings.enabled);
    if settings.direction.is_ambient() {
        let preset = presets::ambient(settings.effect);
        println!("Population:   {}", preset.population);
    } else {
        println!(
            "Emission:     {} per event, {} events/s",
            settings.particle_count, settings.spawn_rate
        );
        println!("Lifetime:     {} ms", settings.lifetime_ms);
        println!("Clip follow:  {}", settings.clip_path_follow);
    }
    println!("Speed:        {}", settings.speed);
    println!("Gravity:      {}", settings.gravity);
    println!("Wind:         {}", settings.wind);
    println!("Intensity:    {}%", settings.intensity);
    println!("Colors:       {}", describe_colors(&settings.color));

    info!("Config OK");
    Ok(())
}

fn describe_colors(spec: &ColorSpec) -> String {
    match spec {
        ColorSpec::Static(palette) => join_colors(palette.swatches()),
        ColorSpec::Custom(colors) => format!("custom {}", join_colors(colors)),
        ColorSpec::Adaptive {
            base,
            intensity,
            variation,
        } => format!(
            "adaptive from {} (intensity {}, variation {})",
            base, intensity, variation
        ),
    }
}

fn join_colors(colors: &[twinkle_particles::Rgb]) -> String {
    colors
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn cmd_init(effect: EffectType, ambient: bool, output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists. Pass --force to overwrite it.",
            output.display()
        );
    }

    let config = if ambient {
        EngineConfig::ambient(effect)
    } else {
        EngineConfig {
            effect_type: effect,
            ..Default::default()
        }
    };
    let format = ConfigFormat::from_path(output)?;
    fs::write(output, config::render(&config, format)?)?;

    info!("Wrote {} config to {}", effect, output.display());
    Ok(())
}

fn cmd_presets() -> Result<()> {
    println!("Effects:");
    println!();
    for effect in EffectType::ALL {
        let ambient = presets::ambient(effect);
        println!("  {:<11} {}", effect.as_str(), join_colors(presets::palette(effect)));
        println!(
            "  {:<11} ambient: {} particles, size {}-{}{}{}",
            "",
            ambient.population,
            ambient.min_size,
            ambient.max_size,
            if ambient.flicker { ", flicker" } else { "" },
            if ambient.rising { ", rising" } else { "" },
        );
    }
    println!();
    println!("Directions: {}, {}, {}", Direction::Upward, Direction::All, Direction::AmbientField);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640x480").unwrap(), Size::new(640.0, 480.0));
        assert_eq!(parse_size("1920X1080").unwrap(), Size::new(1920.0, 1080.0));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x480").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "twinkle", "run", "snow", "-d", "ambientField", "--frames", "30", "--seed", "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                effect,
                direction,
                frames,
                seed,
                ..
            } => {
                assert_eq!(effect, EffectType::Snow);
                assert_eq!(direction, Some(Direction::AmbientField));
                assert_eq!(frames, 30);
                assert_eq!(seed, Some(7));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_effect() {
        assert!(Cli::try_parse_from(["twinkle", "run", "confetti"]).is_err());
    }

    #[test]
    fn test_run_report() {
        let scheduler = FrameScheduler::new();
        let host = Rc::new(StaticContainer::new(800.0, 600.0));
        let mut engine = ParticleEngine::new(host, scheduler.handle())
            .with_seed(3)
            .with_hardware_concurrency(Some(8));
        let config = EngineConfig::ambient(EffectType::Snow);
        engine.start(&config);
        for frame in 0..5u32 {
            scheduler.tick(f64::from(frame) * FRAME_MS);
        }

        let report = RunReport::new(&config, 5, &engine, engine.active_count());
        assert_eq!(report.effect, "snow");
        assert_eq!(report.direction, "ambientField");
        assert_eq!(report.active, 80);
        assert_eq!(report.ticks, 5);
        assert!(report.draw_commands > 0);
    }

    #[test]
    fn test_describe_colors() {
        let spec = ColorSpec::Adaptive {
            base: "#ff0000".into(),
            intensity: 1.0,
            variation: 0.3,
        };
        assert!(describe_colors(&spec).starts_with("adaptive from #ff0000"));
    }
}
