//! Brightness and contrast correction, manual or stretched from the histogram.

use std::str::FromStr;

use crate::color::ColorSpace;
use crate::raster::{Format, Raster};
use crate::{PnmError, Result};

/// Fraction of samples ignored at each end of the histogram by the skipping modes.
const SKIP_FRACTION: f64 = 0.0039;

/// `s -> round(clamp(max(0, s - offset) * factor, 0, 255))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub offset: i32,
    pub factor: f32,
}

impl Correction {
    /// Validated manual correction: offset in `-255..=255`, factor in `0..=255`.
    pub fn new(offset: i32, factor: f32) -> Result<Self> {
        if !(-255..=255).contains(&offset) {
            return Err(PnmError::InvalidArgument(format!(
                "offset must be in [-255, 255], got {offset}"
            )));
        }
        if !(0.0..=255.0).contains(&factor) {
            return Err(PnmError::InvalidArgument(format!(
                "factor must be in [0, 255], got {factor}"
            )));
        }
        Ok(Self { offset, factor })
    }

    /// Stretch `min..=max` onto the full `0..=255` range.
    pub fn stretch(min: u8, max: u8) -> Self {
        let factor = if max > min { 255.0 / (max - min) as f32 } else { 1.0 };
        Self { offset: min as i32, factor }
    }

    #[inline]
    pub fn apply(&self, sample: u8) -> u8 {
        let shifted = (sample as i32 - self.offset).max(0) as f32;
        (shifted * self.factor).clamp(0.0, 255.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelsMode {
    ManualRgb,
    ManualLuma,
    AutoRgb,
    AutoLuma,
    AutoRgbSkip,
    AutoLumaSkip,
}

impl LevelsMode {
    pub fn is_manual(self) -> bool {
        matches!(self, LevelsMode::ManualRgb | LevelsMode::ManualLuma)
    }

    /// Operates on the Y'CbCr (BT.601) luma channel instead of every sample.
    pub fn is_luma(self) -> bool {
        matches!(
            self,
            LevelsMode::ManualLuma | LevelsMode::AutoLuma | LevelsMode::AutoLumaSkip
        )
    }

    fn skips_outliers(self) -> bool {
        matches!(self, LevelsMode::AutoRgbSkip | LevelsMode::AutoLumaSkip)
    }
}

impl FromStr for LevelsMode {
    type Err = PnmError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(LevelsMode::ManualRgb),
            "1" => Ok(LevelsMode::ManualLuma),
            "2" => Ok(LevelsMode::AutoRgb),
            "3" => Ok(LevelsMode::AutoLuma),
            "4" => Ok(LevelsMode::AutoRgbSkip),
            "5" => Ok(LevelsMode::AutoLumaSkip),
            other => Err(PnmError::InvalidArgument(format!("unknown levels mode '{other}'"))),
        }
    }
}

/// Darkest and brightest values: the first bins from either end at which
/// `skip` samples have been counted.
fn histogram_bounds(histogram: &[usize; 256], skip: usize) -> Option<(u8, u8)> {
    let target = skip.max(1);
    let mut seen = 0;
    let min = (0..=255u8).find(|&i| {
        seen += histogram[i as usize];
        seen >= target
    })?;
    seen = 0;
    let max = (0..=255u8).rev().find(|&i| {
        seen += histogram[i as usize];
        seen >= target
    })?;
    Some((min, max.max(min)))
}

fn for_each_target(raster: &mut Raster, luma: bool, mut f: impl FnMut(&mut u8)) {
    if luma {
        raster.data_mut().chunks_exact_mut(3).for_each(|px| f(&mut px[0]));
    } else {
        raster.data_mut().iter_mut().for_each(f);
    }
}

/// Apply `mode` to an 8-bit raster and return the correction that was used.
///
/// Manual modes take their correction from `manual`; automatic modes derive it
/// from the image and ignore `manual`.
pub fn adjust(raster: &mut Raster, mode: LevelsMode, manual: Option<Correction>) -> Result<Correction> {
    raster.ensure_8bit("levels")?;
    let luma = mode.is_luma();
    if luma && raster.format() != Format::Pixmap {
        return Err(PnmError::InvalidArgument(
            "luma correction requires a P6 image".to_string(),
        ));
    }

    if mode.is_manual() && manual.is_none() {
        return Err(PnmError::InvalidArgument(
            "manual levels need an offset and a factor".to_string(),
        ));
    }

    if luma {
        for px in raster.data_mut().chunks_exact_mut(3) {
            px.copy_from_slice(&ColorSpace::YCbCr601.from_rgb([px[0], px[1], px[2]]));
        }
    }

    let correction = if let (true, Some(manual)) = (mode.is_manual(), manual) {
        manual
    } else {
        let mut histogram = [0usize; 256];
        let mut count = 0;
        for_each_target(raster, luma, |s| {
            histogram[*s as usize] += 1;
            count += 1;
        });
        let skip = if mode.skips_outliers() {
            (SKIP_FRACTION * count as f64) as usize
        } else {
            0
        };
        match histogram_bounds(&histogram, skip) {
            Some((min, max)) => Correction::stretch(min, max),
            None => Correction::stretch(0, 255),
        }
    };

    tracing::debug!(?mode, offset = correction.offset, factor = correction.factor, "Adjusting levels");
    for_each_target(raster, luma, |s| *s = correction.apply(*s));

    if luma {
        for px in raster.data_mut().chunks_exact_mut(3) {
            px.copy_from_slice(&ColorSpace::YCbCr601.to_rgb([px[0], px[1], px[2]]));
        }
    }
    Ok(correction)
}
