//! Raster containers: the 8/16-bit PNM picture and the float working form used by dithering.

use crate::{PnmError, Result};

/// Binary PNM flavour, which also fixes the channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// P5, one gray channel
    Graymap,
    /// P6, three interleaved RGB channels
    Pixmap,
}

impl Format {
    pub fn channels(self) -> usize {
        match self {
            Format::Graymap => 1,
            Format::Pixmap => 3,
        }
    }

    pub fn magic(self) -> &'static str {
        match self {
            Format::Graymap => "P5",
            Format::Pixmap => "P6",
        }
    }
}

/// Allocate a default-filled buffer, reporting failure instead of aborting.
pub(crate) fn try_filled<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| PnmError::AllocationFailed {
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    buf.resize(len, T::default());
    Ok(buf)
}

pub(crate) fn payload_len(format: Format, width: usize, height: usize, max_color: u16) -> Result<usize> {
    let bytes_per_sample = if max_color > 255 { 2 } else { 1 };
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(format.channels()))
        .and_then(|n| n.checked_mul(bytes_per_sample))
        .ok_or_else(|| PnmError::InvalidArgument(format!("{width}x{height} image is too large")))
}

/// An 8- or 16-bit PNM image held in memory.
///
/// Samples are stored row-major with interleaved channels. When `max_color`
/// exceeds 255 every sample takes two big-endian bytes, as on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    format: Format,
    width: usize,
    height: usize,
    max_color: u16,
    data: Vec<u8>,
}

impl Raster {
    /// Create a black raster.
    pub fn new(format: Format, width: usize, height: usize, max_color: u16) -> Result<Self> {
        if max_color == 0 {
            return Err(PnmError::InvalidArgument("max color must be positive".into()));
        }
        let len = payload_len(format, width, height, max_color)?;
        let data = try_filled(len)?;
        Ok(Self { format, width, height, max_color, data })
    }

    /// Wrap an existing sample buffer, checking it matches the declared geometry.
    pub fn from_samples(
        format: Format,
        width: usize,
        height: usize,
        max_color: u16,
        data: Vec<u8>,
    ) -> Result<Self> {
        if max_color == 0 {
            return Err(PnmError::InvalidArgument("max color must be positive".into()));
        }
        let expected = payload_len(format, width, height, max_color)?;
        if data.len() != expected {
            return Err(PnmError::SizeMismatch { expected, actual: data.len() });
        }
        Ok(Self { format, width, height, max_color, data })
    }

    /// 8-bit graymap from raw bytes.
    pub fn gray(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        Self::from_samples(Format::Graymap, width, height, 255, data)
    }

    /// 8-bit pixmap from interleaved RGB bytes.
    pub fn rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        Self::from_samples(Format::Pixmap, width, height, 255, data)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_color(&self) -> u16 {
        self.max_color
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    pub fn bytes_per_sample(&self) -> usize {
        if self.max_color > 255 {
            2
        } else {
            1
        }
    }

    /// Bytes occupied by one pixel (all channels).
    pub fn pixel_stride(&self) -> usize {
        self.channels() * self.bytes_per_sample()
    }

    /// Bytes occupied by one row.
    pub fn row_stride(&self) -> usize {
        self.width * self.pixel_stride()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: usize, y: usize, channel: usize) -> usize {
        assert!(
            x < self.width && y < self.height && channel < self.channels(),
            "sample ({x}, {y}, {channel}) out of bounds for {}x{}x{}",
            self.width,
            self.height,
            self.channels()
        );
        ((y * self.width + x) * self.channels() + channel) * self.bytes_per_sample()
    }

    /// Read one sample.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates or channel are out of range.
    pub fn sample(&self, x: usize, y: usize, channel: usize) -> u16 {
        let i = self.offset(x, y, channel);
        if self.bytes_per_sample() == 1 {
            self.data[i] as u16
        } else {
            u16::from_be_bytes([self.data[i], self.data[i + 1]])
        }
    }

    /// Write one sample, clamped to `max_color`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates or channel are out of range.
    pub fn set_sample(&mut self, x: usize, y: usize, channel: usize, value: u16) {
        let i = self.offset(x, y, channel);
        let value = value.min(self.max_color);
        if self.bytes_per_sample() == 1 {
            self.data[i] = value as u8;
        } else {
            self.data[i..i + 2].copy_from_slice(&value.to_be_bytes());
        }
    }

    /// Swap width and height; the caller has already reordered the samples.
    pub(crate) fn swap_dimensions(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
    }

    pub(crate) fn ensure_8bit(&self, what: &str) -> Result<()> {
        if self.bytes_per_sample() != 1 {
            return Err(PnmError::InvalidArgument(format!(
                "{what} supports only 8-bit images (max color {})",
                self.max_color
            )));
        }
        Ok(())
    }
}

/// Single-channel float image, values nominally in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatRaster {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl FloatRaster {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or_else(|| PnmError::InvalidArgument(format!("{width}x{height} image is too large")))?;
        Ok(Self { width, height, data: try_filled(len)? })
    }

    pub fn from_values(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        let expected = width.saturating_mul(height);
        if data.len() != expected {
            return Err(PnmError::SizeMismatch { expected, actual: data.len() });
        }
        Ok(Self { width, height, data })
    }

    /// Normalize a graymap into `[0, 1]` by dividing by its max color.
    pub fn from_raster(raster: &Raster) -> Result<Self> {
        if raster.format() != Format::Graymap {
            return Err(PnmError::InvalidArgument(
                "float conversion requires a P5 graymap".into(),
            ));
        }
        let mut out = Self::new(raster.width(), raster.height())?;
        let max = raster.max_color() as f32;
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                out.data[y * out.width + x] = raster.sample(x, y, 0) as f32 / max;
            }
        }
        Ok(out)
    }

    /// Scale back to integer samples, rounding and clamping.
    pub fn to_raster(&self, max_color: u16) -> Result<Raster> {
        let mut out = Raster::new(Format::Graymap, self.width, self.height, max_color)?;
        let max = max_color as f32;
        for y in 0..self.height {
            for x in 0..self.width {
                let v = self.data[y * self.width + x].clamp(0.0, 1.0);
                out.set_sample(x, y, 0, (v * max).round() as u16);
            }
        }
        Ok(out)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x]
    }

    /// Replace the contents with a left-to-right ramp from 0 to 1.
    pub fn fill_gradient(&mut self) {
        let span = self.width.saturating_sub(1);
        for row in self.data.chunks_exact_mut(self.width.max(1)) {
            for (x, v) in row.iter_mut().enumerate() {
                *v = if span == 0 { 0.0 } else { x as f32 / span as f32 };
            }
        }
    }
}
