use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use orb_tracer::{render_parallel, SceneDescription, DEFAULT_BUCKET_SIZE};
use std::path::PathBuf;
use std::time::Instant;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Render a sphere scene with the orb path tracer
#[derive(Debug, Parser)]
#[command(name = "orb", version, about)]
struct Args {
    /// Scene file (JSON); the built-in demo scene is used when omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Output image (.png, .jpg, ...)
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum bounce depth
    #[arg(long)]
    depth: Option<u32>,

    /// Disable explicit light sampling
    #[arg(long)]
    no_light_sampling: bool,

    /// Bucket size in pixels
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Worker threads (0 = one per core)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Frame number, changes the sampling pattern
    #[arg(long, default_value_t = 0)]
    frame: u32,

    /// Write the scene as JSON to this path and exit
    #[arg(long)]
    dump_scene: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let mut scene = match &args.scene {
        Some(path) => SceneDescription::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => {
            log::info!("No scene given, using the built-in demo scene");
            SceneDescription::default_scene()
        }
    };
    apply_overrides(&mut scene, &args);
    scene.validate().context("Invalid render settings")?;

    if let Some(path) = &args.dump_scene {
        std::fs::write(path, scene.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote scene to {}", path.display());
        return Ok(());
    }

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let start = Instant::now();
    let world = scene.build_world().context("Failed to build world")?;
    let camera = scene.build_camera();
    log::info!(
        "Scene ready in {:?}: {} spheres, {} lights",
        start.elapsed(),
        world.len(),
        world.batch().emissive_count()
    );

    let config = &scene.render;
    log::info!(
        "Rendering {}x{} @ {} spp, depth {}, on {} threads",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        rayon::current_num_threads()
    );

    let start = Instant::now();
    let image = render_parallel(&camera, &world, config, args.bucket_size, args.frame);
    let elapsed = start.elapsed();
    let rays = u64::from(config.width) * u64::from(config.height) * u64::from(config.samples_per_pixel);
    log::info!(
        "Rendered in {:?} ({:.2} M primary rays/s)",
        elapsed,
        rays as f64 / elapsed.as_secs_f64().max(1e-9) / 1e6
    );

    image
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}

/// Command line settings win over the scene file.
fn apply_overrides(scene: &mut SceneDescription, args: &Args) {
    let render = &mut scene.render;
    if let Some(width) = args.width {
        render.width = width;
    }
    if let Some(height) = args.height {
        render.height = height;
    }
    if let Some(spp) = args.spp {
        render.samples_per_pixel = spp;
    }
    if let Some(depth) = args.depth {
        render.max_depth = depth;
    }
    if args.no_light_sampling {
        render.light_sampling = false;
    }
}
