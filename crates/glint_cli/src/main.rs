//! Glint command-line renderer.
//!
//! Renders a built-in preset or a JSON scene file and writes the image to
//! disk. Set `RUST_LOG=debug` to follow bucket progress.

mod presets;
mod scene_file;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use glint_renderer::{
    render, render_buckets, save_image, CancelToken, RenderConfig, ShadingMode,
    DEFAULT_BUCKET_SIZE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use presets::{Preset, SceneSetup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Shading {
    /// Full path tracing
    Path,
    /// Surface normals as colors
    Normals,
}

impl From<Shading> for ShadingMode {
    fn from(shading: Shading) -> Self {
        match shading {
            Shading::Path => ShadingMode::PathTraced,
            Shading::Normals => ShadingMode::Normals,
        }
    }
}

/// Offline Monte Carlo renderer for sphere scenes.
#[derive(Debug, Parser)]
#[command(name = "glint", version, about)]
struct Args {
    /// Built-in scene to render
    #[arg(long, value_enum, default_value_t = Preset::Materials)]
    preset: Preset,

    /// JSON scene file; replaces the preset
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Image width in pixels; height follows the camera's aspect ratio
    #[arg(short, long, default_value_t = 400)]
    width: u32,

    /// Samples per pixel
    #[arg(short, long, default_value_t = 100)]
    samples: u32,

    /// Maximum number of bounces per path
    #[arg(short = 'd', long, default_value_t = 50)]
    max_depth: u32,

    /// Seed for sampling and for the random layout of the cover preset
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the scene's shading mode
    #[arg(long, value_enum)]
    shading: Option<Shading>,

    /// Worker threads for bucket rendering (defaults to all cores)
    #[arg(short = 'j', long, conflicts_with = "single_threaded")]
    threads: Option<usize>,

    /// Render on the calling thread, scanline by scanline
    #[arg(long)]
    single_threaded: bool,

    /// Bucket edge length in pixels
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Give up if rendering takes longer than this many seconds
    #[arg(long, conflicts_with = "single_threaded")]
    time_limit: Option<f64>,

    /// Output image; `.ppm` is written as plain text, other extensions use their image format
    #[arg(short, long, default_value = "output.ppm")]
    output: PathBuf,
}

fn load_setup(args: &Args) -> Result<SceneSetup> {
    match &args.scene {
        Some(path) => scene_file::load_scene(path)
            .with_context(|| format!("Failed to load scene file {}", path.display())),
        None => args
            .preset
            .build(args.seed)
            .with_context(|| format!("Failed to build preset {:?}", args.preset)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    log::info!("Starting Glint");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the thread pool")?;
    }

    let start = std::time::Instant::now();
    let setup = load_setup(&args)?;
    log::info!("Scene built in {:?}", start.elapsed());

    let camera = setup.camera.build().context("Invalid camera")?;

    let mut config = RenderConfig::default()
        .with_width_and_aspect(args.width, setup.camera.aspect_ratio)
        .with_quality(args.samples, args.max_depth)
        .with_shading(args.shading.map_or(setup.shading, ShadingMode::from))
        .with_seed(args.seed);
    config.bucket_size = args.bucket_size;

    let image = if args.single_threaded {
        let mut rng = StdRng::seed_from_u64(args.seed);
        render(&camera, &setup.world, &config, &mut rng)?
    } else {
        let cancel = match args.time_limit {
            Some(secs) => CancelToken::with_deadline(
                Duration::try_from_secs_f64(secs).context("Invalid time limit")?,
            ),
            None => CancelToken::new(),
        };
        render_buckets(&camera, &setup.world, &config, &cancel)?
    };

    save_image(&image, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["glint"]);
        assert_eq!(args.preset, Preset::Materials);
        assert_eq!(args.width, 400);
        assert_eq!(args.samples, 100);
        assert_eq!(args.max_depth, 50);
        assert_eq!(args.bucket_size, DEFAULT_BUCKET_SIZE);
        assert!(!args.single_threaded);
        assert_eq!(args.output, PathBuf::from("output.ppm"));
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "glint", "--preset", "cover", "-w", "1200", "-s", "500", "-d", "10", "--seed", "7",
            "--shading", "normals", "-j", "4", "--time-limit", "2.5", "-o", "cover.png",
        ]);
        assert_eq!(args.preset, Preset::Cover);
        assert_eq!(args.width, 1200);
        assert_eq!(args.samples, 500);
        assert_eq!(args.max_depth, 10);
        assert_eq!(args.seed, 7);
        assert_eq!(args.shading, Some(Shading::Normals));
        assert_eq!(args.threads, Some(4));
        assert_eq!(args.time_limit, Some(2.5));
        assert_eq!(args.output, PathBuf::from("cover.png"));
    }

    #[test]
    fn test_single_threaded_rejects_bucket_options() {
        for flag in [["-j", "4"], ["--time-limit", "1.5"]] {
            let result = Args::try_parse_from(["glint", "--single-threaded", flag[0], flag[1]]);
            assert_eq!(
                result.unwrap_err().kind(),
                clap::error::ErrorKind::ArgumentConflict
            );
        }

        assert!(Args::try_parse_from(["glint", "--single-threaded", "-s", "4"]).is_ok());
    }

    #[test]
    fn test_preset_renders_end_to_end() {
        let args = Args::parse_from(["glint", "--preset", "normals", "-w", "16", "-s", "2"]);
        let setup = load_setup(&args).unwrap();
        let camera = setup.camera.build().unwrap();
        let config = RenderConfig::default()
            .with_width_and_aspect(args.width, setup.camera.aspect_ratio)
            .with_quality(args.samples, args.max_depth)
            .with_shading(setup.shading);

        let mut rng = StdRng::seed_from_u64(0);
        let image = render(&camera, &setup.world, &config, &mut rng).unwrap();

        assert_eq!((image.width, image.height), (16, 9));
    }
}
