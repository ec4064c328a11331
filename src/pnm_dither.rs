//! pnm-dither - Reduce a graymap to a few bits per sample

use clap::Parser;
use pnmkit::cli::{self, parse_gamma};
use pnmkit::{DitherMode, Ditherer, FloatRaster, Gamma, PnmError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pnm-dither", about = "Dither a binary PGM image")]
struct Args {
    /// Input image file (P5)
    input: PathBuf,
    /// Output image file
    output: PathBuf,
    /// 1 replaces the image with a horizontal gradient
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    gradient: u8,
    /// 0 none, 1 ordered, 2 random, 3 floyd-steinberg, 4 jjn, 5 sierra, 6 atkinson, 7 halftone
    mode: DitherMode,
    /// Output bits per sample
    #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
    bits: u8,
    /// Gamma of the input (0 = sRGB)
    #[arg(value_parser = parse_gamma)]
    gamma: Gamma,
    /// Seed for random dithering; fresh entropy when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), PnmError> {
    cli::init_logging();
    let args = Args::parse();

    let src = cli::load(&args.input)?;
    let mut image = FloatRaster::from_raster(&src)?;
    if args.gradient == 1 {
        image.fill_gradient();
    }

    let ditherer = Ditherer::new(args.mode)
        .with_bits(args.bits)
        .with_gamma(args.gamma);
    match args.seed {
        Some(seed) => ditherer.dither_with_rng(&mut image, &mut StdRng::seed_from_u64(seed))?,
        None => ditherer.dither(&mut image)?,
    }

    cli::save(&args.output, &image.to_raster(src.max_color())?)
}
