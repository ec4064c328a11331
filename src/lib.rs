//! Gamma-aware resampling, dithering and tonal tools for binary PNM images.

pub mod cli;
pub mod color;
pub mod dither;
pub mod gamma;
pub mod kernel;
pub mod levels;
pub mod pnm;
pub mod raster;
pub mod resample;
pub mod transform;

pub use color::ColorSpace;
pub use dither::{DitherMode, Ditherer};
pub use gamma::Gamma;
pub use kernel::Filter;
pub use levels::{Correction, LevelsMode};
pub use raster::{FloatRaster, Format, Raster};
pub use resample::Resampler;
pub use transform::Transform;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PnmError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Size mismatch: expected {expected} bytes of pixel data, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("Allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Source image too small: {width}x{height}")]
    SourceTooSmall { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, PnmError>;
