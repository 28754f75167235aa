#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{error::Error, fmt::Display, path::PathBuf};

use chromaseg::{ColorSpace, KmeansOptions, SegmentPipeline};
use clap::{Parser, ValueEnum};
use log::info;

#[derive(Copy, Clone, ValueEnum)]
enum CliColorSpace {
    Oklab,
    Lab,
    Srgb,
}

impl From<CliColorSpace> for ColorSpace {
    fn from(value: CliColorSpace) -> Self {
        match value {
            CliColorSpace::Oklab => ColorSpace::Oklab,
            CliColorSpace::Lab => ColorSpace::Lab,
            CliColorSpace::Srgb => ColorSpace::Srgb,
        }
    }
}

impl Display for CliColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CliColorSpace::Oklab => "oklab",
                CliColorSpace::Lab => "lab",
                CliColorSpace::Srgb => "srgb",
            }
        )
    }
}

/// Segments an image into `k` color regions with k-means.
#[derive(Parser)]
pub struct Options {
    /// The number of segments.
    #[arg(short, long, default_value_t = SegmentPipeline::DEFAULT_K)]
    k: usize,

    #[arg(long, default_value_t = KmeansOptions::DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = CliColorSpace::Srgb)]
    colorspace: CliColorSpace,

    /// Number of worker threads, 0 uses all cores and 1 runs single-threaded.
    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    /// Log each iteration.
    #[arg(long)]
    verbose: bool,

    input: PathBuf,

    /// Defaults to `<input stem>_segmented_k<k>.png` in the current directory.
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let Options {
        k,
        max_iterations,
        seed,
        colorspace,
        threads,
        verbose,
        input,
        output,
    } = Options::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if verbose {
        "debug"
    } else {
        "info"
    }))
    .init();

    let image = image::open(&input)?.into_rgb8();
    info!("image size: {}x{}", image.width(), image.height());

    let mut pipeline = SegmentPipeline::try_from(&image)?;
    pipeline
        .options(KmeansOptions::new(k).max_iterations(max_iterations).seed(seed))
        .colorspace(colorspace.into());

    let segmented = match threads {
        0 => pipeline.segmented_rgbimage_par()?,
        1 => pipeline.segmented_rgbimage()?,
        t => rayon::ThreadPoolBuilder::new()
            .num_threads(t.into())
            .build()?
            .install(|| pipeline.segmented_rgbimage_par())?,
    };

    let output = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map_or_else(|| "output".into(), |s| s.to_string_lossy());
        PathBuf::from(format!("{stem}_segmented_k{k}.png"))
    });

    segmented.save(&output)?;
    info!("segmented image saved to {}", output.display());

    Ok(())
}
