//! pnm-levels - Brightness and contrast correction

use clap::Parser;
use pnmkit::levels::{self, Correction};
use pnmkit::{cli, LevelsMode, PnmError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pnm-levels", about = "Adjust offset and contrast of a binary PGM/PPM image")]
struct Args {
    /// Input image file (P5 or P6)
    input: PathBuf,
    /// Output image file
    output: PathBuf,
    /// 0 manual RGB, 1 manual YCbCr.601, 2 auto RGB, 3 auto YCbCr.601,
    /// 4 auto RGB skipping outliers, 5 auto YCbCr.601 skipping outliers
    mode: LevelsMode,
    /// Subtracted from every sample (manual modes)
    #[arg(allow_negative_numbers = true, requires = "factor")]
    offset: Option<i32>,
    /// Multiplier applied after the offset (manual modes)
    factor: Option<f32>,
}

fn main() -> Result<(), PnmError> {
    cli::init_logging();
    let args = Args::parse();

    let manual = match (args.offset, args.factor) {
        (Some(offset), Some(factor)) => Some(Correction::new(offset, factor)?),
        _ => None,
    };

    let mut image = cli::load(&args.input)?;
    let correction = levels::adjust(&mut image, args.mode, manual)?;
    cli::save(&args.output, &image)?;

    if !args.mode.is_manual() {
        println!("{} {}", correction.offset, correction.factor);
    }
    Ok(())
}
