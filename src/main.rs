use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use atlas_generator::distance::DistanceMode;
use atlas_generator::export::write_atlas;
use atlas_generator::filter::Smoothing;
use atlas_generator::pipeline::DEFAULT_SIZE;
use atlas_generator::{generate_atlas, AtlasError, Geography, GenerationParams};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SmoothingArg {
    /// Gaussian blur (see --sigma)
    Gaussian,
    /// Two passes of a 3x3 mean
    Box,
    None,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DistanceArg {
    /// Exact when compiled in, otherwise approximate
    Auto,
    Exact,
    Approximate,
}

impl From<DistanceArg> for DistanceMode {
    fn from(arg: DistanceArg) -> Self {
        match arg {
            DistanceArg::Auto => DistanceMode::Auto,
            DistanceArg::Exact => DistanceMode::Exact,
            DistanceArg::Approximate => DistanceMode::Approximate,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "atlas_generator")]
#[command(about = "Generate elevation and province rasters from authored vector geography")]
struct Args {
    /// Width of the rasters in pixels
    #[arg(short = 'W', long, default_value_t = DEFAULT_SIZE)]
    width: usize,

    /// Height of the rasters in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_SIZE)]
    height: usize,

    /// Geography JSON document (embedded Mediterranean if not specified)
    #[arg(long)]
    geography: Option<PathBuf>,

    /// Directory for heightmap.png, provinces.png and atlas.json
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Width of the shoreline ramp in pixels
    #[arg(long, default_value = "6")]
    coastal_width: f32,

    /// Smoothing applied after the coastal blend
    #[arg(long, value_enum, default_value = "gaussian")]
    smoothing: SmoothingArg,

    /// Gaussian smoothing sigma in pixels
    #[arg(long, default_value = "1.5")]
    sigma: f32,

    /// Coast distance transform
    #[arg(long, value_enum, default_value = "auto")]
    distance: DistanceArg,

    /// Disable continental-scale undulation of the land floor
    #[arg(long)]
    no_continental_variation: bool,
}

impl Args {
    fn params(&self) -> GenerationParams {
        let smoothing = match self.smoothing {
            SmoothingArg::Gaussian => Smoothing::Gaussian { sigma: self.sigma },
            SmoothingArg::Box => Smoothing::Box { passes: 2 },
            SmoothingArg::None => Smoothing::None,
        };
        GenerationParams {
            coastal_width: self.coastal_width,
            smoothing,
            continental_variation: !self.no_continental_variation,
            distance: self.distance.into(),
        }
    }
}

fn run(args: &Args) -> Result<(), AtlasError> {
    let geography = match &args.geography {
        Some(path) => {
            info!(path = %path.display(), "loading geography");
            Geography::load(path)?
        }
        None => Geography::mediterranean(),
    };

    let atlas = generate_atlas(&geography, args.width, args.height, &args.params())?;
    let files = write_atlas(&atlas, &args.out_dir)?;

    info!(
        elevation = %files.elevation.display(),
        provinces = %files.provinces.display(),
        summary = %files.summary.display(),
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(width = args.width, height = args.height, "atlas generator");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "atlas generation failed");
            ExitCode::FAILURE
        }
    }
}
