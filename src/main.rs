//! pnm-resize - Scale a PNM image with a gamma-aware filter

use clap::Parser;
use pnmkit::cli::{self, parse_gamma};
use pnmkit::{Filter, Gamma, PnmError, Resampler};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pnm-resize", about = "Resize a binary PGM/PPM image")]
struct Args {
    /// Input image file (P5 or P6)
    input: PathBuf,
    /// Output image file
    output: PathBuf,
    /// Target width in pixels
    width: usize,
    /// Target height in pixels
    height: usize,
    /// Gamma of the input (0 = sRGB)
    #[arg(value_parser = parse_gamma)]
    gamma: Gamma,
    /// Filter: 0 nearest, 1 bilinear, 2 lanczos3, 3 bc-spline
    filter: Filter,
    /// B parameter of the B-C spline
    #[arg(allow_negative_numbers = true, requires = "c")]
    b: Option<f64>,
    /// C parameter of the B-C spline
    #[arg(allow_negative_numbers = true)]
    c: Option<f64>,
}

fn main() -> Result<(), PnmError> {
    cli::init_logging();
    let args = Args::parse();

    let filter = match (args.filter, args.b, args.c) {
        (Filter::BcSpline { .. }, Some(b), Some(c)) => Filter::BcSpline { b, c },
        (_, None, None) => args.filter,
        (other, _, _) => {
            return Err(PnmError::InvalidArgument(format!(
                "B and C apply only to the bc-spline filter, not {other:?}"
            )))
        }
    };

    let src = cli::load(&args.input)?;
    let out = Resampler::new(filter)
        .with_gamma(args.gamma)
        .resample(&src, args.width, args.height)?;
    cli::save(&args.output, &out)
}
