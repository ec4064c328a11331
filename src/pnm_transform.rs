//! pnm-transform - Invert, flip or rotate a PNM image

use clap::Parser;
use pnmkit::{cli, PnmError, Transform};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pnm-transform", about = "Apply a lossless transform to a binary PGM/PPM image")]
struct Args {
    /// Input image file (P5 or P6)
    input: PathBuf,
    /// Output image file
    output: PathBuf,
    /// 0 invert, 1 horizontal flip, 2 vertical flip, 3 rotate right, 4 rotate left
    transform: Transform,
}

fn main() -> Result<(), PnmError> {
    cli::init_logging();
    let args = Args::parse();

    let mut image = cli::load(&args.input)?;
    args.transform.apply(&mut image)?;
    cli::save(&args.output, &image)
}
