//! pnm-convert - Convert a pixmap between color spaces

use clap::Parser;
use pnmkit::color::{self, ColorSpace};
use pnmkit::{cli, PnmError, Raster, Result};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pnm-convert", about = "Convert a binary PPM image between color spaces")]
struct Args {
    /// Source color space: RGB, HSL, HSV, YCbCr.601, YCbCr.709, YCoCg, CMY
    #[arg(short, long)]
    from: ColorSpace,
    /// Target color space
    #[arg(short, long)]
    to: ColorSpace,
    /// Input file count (1 = one P6, 3 = name_1/_2/_3 P5 planes) and path
    #[arg(short, long, num_args = 2, value_names = ["COUNT", "PATH"], required = true)]
    input: Vec<String>,
    /// Output file count and path, as for --input
    #[arg(short, long, num_args = 2, value_names = ["COUNT", "PATH"], required = true)]
    output: Vec<String>,
}

/// `[count, path]` pair from the command line.
fn file_set(values: &[String]) -> Result<(bool, PathBuf)> {
    let [count, path] = values else {
        return Err(PnmError::InvalidArgument("expected <count> <path>".to_string()));
    };
    match count.as_str() {
        "1" => Ok((false, PathBuf::from(path))),
        "3" => Ok((true, PathBuf::from(path))),
        other => Err(PnmError::InvalidArgument(format!("file count must be 1 or 3, got '{other}'"))),
    }
}

fn read_image(planes: bool, path: &Path) -> Result<Raster> {
    if !planes {
        return cli::load(path);
    }
    let [a, b, c] = color::plane_paths(path)?;
    color::merge_planes(&[cli::load(&a)?, cli::load(&b)?, cli::load(&c)?])
}

fn write_image(planes: bool, path: &Path, image: &Raster) -> Result<()> {
    if !planes {
        return cli::save(path, image);
    }
    let paths = color::plane_paths(path)?;
    let split = color::split_planes(image)?;
    for (path, plane) in paths.iter().zip(&split) {
        cli::save(path, plane)?;
    }
    Ok(())
}

fn main() -> std::result::Result<(), PnmError> {
    cli::init_logging();
    let args = Args::parse();

    let (planes_in, input) = file_set(&args.input)?;
    let (planes_out, output) = file_set(&args.output)?;

    let mut image = read_image(planes_in, &input)?;
    color::convert(&mut image, args.from, args.to)?;
    write_image(planes_out, &output, &image)
}
