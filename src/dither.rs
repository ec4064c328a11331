//! Bit-depth reduction for grayscale images.
//!
//! Two families are provided. Ordered, halftone and random dithering perturb
//! each pixel by a threshold and quantize it independently. Error diffusion
//! scans the image in raster order and pushes each pixel's quantization
//! residual onto neighbours that have not been visited yet.
//!
//! All decisions are made in linear light: a value snaps to whichever of its
//! two bracketing levels is closer once both are gamma-decoded.

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gamma::Gamma;
use crate::raster::{try_filled, FloatRaster};
use crate::{PnmError, Result};

/// An error diffusion kernel.
///
/// Each tap is `(dx, dy, weight)`; a neighbour receives
/// `residual * weight / divisor`. Taps only point right on the current row
/// or onto later rows.
#[derive(Debug, Clone, Copy)]
pub struct DiffusionKernel {
    pub taps: &'static [(i32, i32, u8)],
    pub divisor: u8,
}

impl DiffusionKernel {
    /// Fraction of the residual that is passed on.
    pub fn total(&self) -> f32 {
        let sum: u32 = self.taps.iter().map(|&(_, _, w)| w as u32).sum();
        sum as f32 / self.divisor as f32
    }
}

/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: DiffusionKernel = DiffusionKernel {
    taps: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
};

/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1
/// ```
pub const JARVIS_JUDICE_NINKE: DiffusionKernel = DiffusionKernel {
    taps: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
};

/// ```text
///            X   5   3
///    2   4   5   4   2
///        2   3   2
/// ```
pub const SIERRA: DiffusionKernel = DiffusionKernel {
    taps: &[
        (1, 0, 5),
        (2, 0, 3),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 5),
        (1, 1, 4),
        (2, 1, 2),
        (-1, 2, 2),
        (0, 2, 3),
        (1, 2, 2),
    ],
    divisor: 32,
};

/// Six taps of 1/8 each: only 3/4 of the residual is diffused, the rest is dropped.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub const ATKINSON: DiffusionKernel = DiffusionKernel {
    taps: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
    divisor: 8,
};

const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 48, 12, 60, 3, 51, 15, 63],
    [32, 16, 44, 28, 35, 19, 47, 31],
    [8, 56, 4, 52, 11, 59, 7, 55],
    [40, 24, 36, 20, 43, 27, 39, 23],
    [2, 50, 14, 62, 1, 49, 13, 61],
    [34, 18, 46, 30, 33, 17, 45, 29],
    [10, 58, 6, 54, 9, 57, 5, 53],
    [42, 26, 38, 22, 41, 25, 37, 21],
];

/// Clustered-dot screen. Both screens are indexed `[x][y]`.
const HALFTONE_4X4: [[u8; 4]; 4] = [
    [6, 12, 10, 3],
    [11, 15, 13, 7],
    [9, 14, 5, 1],
    [4, 8, 2, 0],
];

/// Dithering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherMode {
    /// Plain nearest-level quantization.
    None,
    /// 8x8 Bayer threshold matrix.
    Ordered,
    /// Uniform random threshold; the only non-deterministic mode.
    Random,
    FloydSteinberg,
    JarvisJudiceNinke,
    Sierra,
    Atkinson,
    /// 4x4 clustered-dot threshold matrix.
    Halftone,
}

impl DitherMode {
    /// Diffusion kernel for error diffusion modes.
    pub fn kernel(self) -> Option<&'static DiffusionKernel> {
        match self {
            DitherMode::FloydSteinberg => Some(&FLOYD_STEINBERG),
            DitherMode::JarvisJudiceNinke => Some(&JARVIS_JUDICE_NINKE),
            DitherMode::Sierra => Some(&SIERRA),
            DitherMode::Atkinson => Some(&ATKINSON),
            _ => None,
        }
    }
}

impl FromStr for DitherMode {
    type Err = PnmError;

    /// Accepts the numeric codes `0..=7` or the mode names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(DitherMode::None),
            "1" | "ordered" | "bayer" => Ok(DitherMode::Ordered),
            "2" | "random" => Ok(DitherMode::Random),
            "3" | "floyd-steinberg" | "fs" => Ok(DitherMode::FloydSteinberg),
            "4" | "jjn" | "jarvis" => Ok(DitherMode::JarvisJudiceNinke),
            "5" | "sierra" => Ok(DitherMode::Sierra),
            "6" | "atkinson" => Ok(DitherMode::Atkinson),
            "7" | "halftone" => Ok(DitherMode::Halftone),
            other => Err(PnmError::InvalidArgument(format!("unknown dither mode '{other}'"))),
        }
    }
}

/// Evenly spaced output levels for a bit depth.
#[derive(Debug, Clone, Copy)]
struct Levels {
    step: f32,
    gamma: Gamma,
}

impl Levels {
    fn new(bits: u8, gamma: Gamma) -> Self {
        Self { step: 1.0 / ((1u32 << bits) - 1) as f32, gamma }
    }

    /// The representable levels just below and above `v`.
    fn bracket(&self, v: f32) -> (f32, f32) {
        let v = v.clamp(0.0, 1.0);
        let lower = ((v / self.step).floor() * self.step).min(1.0);
        let upper = ((v / self.step).ceil() * self.step).min(1.0);
        (lower, upper)
    }

    /// Pick a level by comparing a linear-light value against the linear midpoint.
    fn choose(&self, (lower, upper): (f32, f32), linear: f32) -> f32 {
        let mid = (self.gamma.decode(lower) + self.gamma.decode(upper)) / 2.0;
        if linear < mid {
            lower
        } else {
            upper
        }
    }
}

/// Reduces a [`FloatRaster`] to `2^bits` levels in place.
#[derive(Debug, Clone, Copy)]
pub struct Ditherer {
    mode: DitherMode,
    bits: u8,
    gamma: Gamma,
}

impl Ditherer {
    pub fn new(mode: DitherMode) -> Self {
        Self { mode, bits: 1, gamma: Gamma::default() }
    }

    pub fn with_bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    /// Dither with a freshly seeded random source (only used by [`DitherMode::Random`]).
    pub fn dither(&self, image: &mut FloatRaster) -> Result<()> {
        let mut rng = StdRng::from_entropy();
        self.dither_with_rng(image, &mut rng)
    }

    /// Dither, drawing random thresholds from `rng`.
    pub fn dither_with_rng<R: Rng>(&self, image: &mut FloatRaster, rng: &mut R) -> Result<()> {
        if self.bits == 0 || self.bits > 8 {
            return Err(PnmError::InvalidArgument(format!(
                "bit depth must be in 1..=8, got {}",
                self.bits
            )));
        }

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            mode = ?self.mode,
            bits = self.bits,
            gamma = ?self.gamma,
            "Dithering"
        );

        let levels = Levels::new(self.bits, self.gamma);
        match self.mode {
            DitherMode::None => self.quantize(image, levels),
            DitherMode::Ordered => self.threshold(image, levels, |x, y| {
                (BAYER_8X8[x % 8][y % 8] as f32 + 0.5) / 64.0 - 0.5
            }),
            DitherMode::Halftone => self.threshold(image, levels, |x, y| {
                (HALFTONE_4X4[x % 4][y % 4] as f32 + 0.5) / 16.0 - 0.5
            }),
            DitherMode::Random => self.threshold(image, levels, |_, _| rng.gen_range(-0.5f32..0.5)),
            DitherMode::FloydSteinberg
            | DitherMode::JarvisJudiceNinke
            | DitherMode::Sierra
            | DitherMode::Atkinson => {
                if let Some(kernel) = self.mode.kernel() {
                    self.diffuse(image, levels, kernel)?;
                }
            }
        }
        Ok(())
    }

    fn quantize(&self, image: &mut FloatRaster, levels: Levels) {
        for v in image.data_mut() {
            let bracket = levels.bracket(*v);
            *v = levels.choose(bracket, self.gamma.decode(*v));
        }
    }

    /// Offset each pixel by `threshold(x, y)` times the linear gap between its
    /// bracketing levels, then quantize.
    fn threshold(&self, image: &mut FloatRaster, levels: Levels, mut threshold: impl FnMut(usize, usize) -> f32) {
        let width = image.width();
        if width == 0 {
            return;
        }
        for (y, row) in image.data_mut().chunks_exact_mut(width).enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                let (lower, upper) = levels.bracket(*v);
                let gap = self.gamma.decode(upper) - self.gamma.decode(lower);
                let shifted = self.gamma.decode(*v) + gap * threshold(x, y);
                *v = levels.choose((lower, upper), shifted);
            }
        }
    }

    fn diffuse(&self, image: &mut FloatRaster, levels: Levels, kernel: &DiffusionKernel) -> Result<()> {
        let (width, height) = (image.width(), image.height());
        // allocate before the image is touched
        let mut errors: Vec<f32> = try_filled(width * height)?;
        let divisor = kernel.divisor as f32;
        let data = image.data_mut();

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let value = self.gamma.decode(data[idx]) + errors[idx];
                let bracket = levels.bracket(self.gamma.encode(value));
                let new_val = levels.choose(bracket, value);
                data[idx] = new_val;

                let residual = value - self.gamma.decode(new_val);
                for &(dx, dy, weight) in kernel.taps {
                    let nx = x as i64 + dx as i64;
                    let ny = y + dy as usize;
                    if nx < 0 || nx >= width as i64 || ny >= height {
                        continue;
                    }
                    errors[ny * width + nx as usize] += residual * weight as f32 / divisor;
                }
            }
        }
        Ok(())
    }
}
