//! Lossless geometric transforms and inversion, applied in place.

use std::str::FromStr;

use crate::raster::{try_filled, Raster};
use crate::{PnmError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Invert,
    FlipHorizontal,
    FlipVertical,
    RotateRight,
    RotateLeft,
}

impl Transform {
    pub fn apply(self, raster: &mut Raster) -> Result<()> {
        tracing::debug!(
            transform = ?self,
            width = raster.width(),
            height = raster.height(),
            "Applying transform"
        );
        match self {
            Transform::Invert => invert(raster),
            Transform::FlipHorizontal => flip_horizontal(raster),
            Transform::FlipVertical => flip_vertical(raster),
            Transform::RotateRight => rotate_right(raster)?,
            Transform::RotateLeft => rotate_left(raster)?,
        }
        Ok(())
    }
}

impl FromStr for Transform {
    type Err = PnmError;

    /// Accepts the numeric codes `0..=4` or the transform names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "invert" => Ok(Transform::Invert),
            "1" | "flip-horizontal" | "hflip" => Ok(Transform::FlipHorizontal),
            "2" | "flip-vertical" | "vflip" => Ok(Transform::FlipVertical),
            "3" | "rotate-right" | "cw" => Ok(Transform::RotateRight),
            "4" | "rotate-left" | "ccw" => Ok(Transform::RotateLeft),
            other => Err(PnmError::InvalidArgument(format!("unknown transform '{other}'"))),
        }
    }
}

/// Replace every sample `s` with `max_color - s`.
pub fn invert(raster: &mut Raster) {
    let max = raster.max_color();
    if raster.bytes_per_sample() == 1 {
        let max = max as u8;
        for b in raster.data_mut() {
            *b = max.saturating_sub(*b);
        }
    } else {
        for pair in raster.data_mut().chunks_exact_mut(2) {
            let v = u16::from_be_bytes([pair[0], pair[1]]);
            pair.copy_from_slice(&max.saturating_sub(v).to_be_bytes());
        }
    }
}

/// Mirror left to right.
pub fn flip_horizontal(raster: &mut Raster) {
    let stride = raster.pixel_stride();
    let row_len = raster.row_stride();
    let width = raster.width();
    if row_len == 0 {
        return;
    }
    for row in raster.data_mut().chunks_exact_mut(row_len) {
        for x in 0..width / 2 {
            let (left, right) = row.split_at_mut((width - 1 - x) * stride);
            left[x * stride..(x + 1) * stride].swap_with_slice(&mut right[..stride]);
        }
    }
}

/// Mirror top to bottom.
pub fn flip_vertical(raster: &mut Raster) {
    let row_len = raster.row_stride();
    let height = raster.height();
    let data = raster.data_mut();
    for y in 0..height / 2 {
        let (top, bottom) = data.split_at_mut((height - 1 - y) * row_len);
        top[y * row_len..(y + 1) * row_len].swap_with_slice(&mut bottom[..row_len]);
    }
}

/// Swap rows and columns through a scratch buffer.
pub fn transpose(raster: &mut Raster) -> Result<()> {
    let stride = raster.pixel_stride();
    let (width, height) = (raster.width(), raster.height());
    let mut scratch: Vec<u8> = try_filled(raster.data().len())?;
    {
        let data = raster.data();
        for y in 0..height {
            for x in 0..width {
                let from = (y * width + x) * stride;
                let to = (x * height + y) * stride;
                scratch[to..to + stride].copy_from_slice(&data[from..from + stride]);
            }
        }
    }
    raster.data_mut().copy_from_slice(&scratch);
    raster.swap_dimensions();
    Ok(())
}

/// Quarter turn clockwise.
pub fn rotate_right(raster: &mut Raster) -> Result<()> {
    transpose(raster)?;
    flip_horizontal(raster);
    Ok(())
}

/// Quarter turn counter-clockwise.
pub fn rotate_left(raster: &mut Raster) -> Result<()> {
    transpose(raster)?;
    flip_vertical(raster);
    Ok(())
}
