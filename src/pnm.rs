//! Binary PNM (P5/P6) header parsing, decoding and encoding.

use std::path::Path;

use crate::raster::{payload_len, Format, Raster};
use crate::{PnmError, Result};

/// Parsed PNM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    pub width: usize,
    pub height: usize,
    pub max_color: u16,
    /// Offset of the first payload byte.
    pub data_offset: usize,
}

impl Header {
    /// Payload size in bytes declared by this header.
    pub fn payload_len(&self) -> Result<usize> {
        payload_len(self.format, self.width, self.height, self.max_color)
    }
}

/// Skip whitespace and `#` comments. Returns whether anything was skipped.
fn skip_separators(bytes: &[u8], pos: &mut usize) -> bool {
    let start = *pos;
    while let Some(&b) = bytes.get(*pos) {
        if b.is_ascii_whitespace() {
            *pos += 1;
        } else if b == b'#' {
            while let Some(&c) = bytes.get(*pos) {
                *pos += 1;
                if c == b'\n' || c == b'\r' {
                    break;
                }
            }
        } else {
            break;
        }
    }
    *pos > start
}

fn next_number(bytes: &[u8], pos: &mut usize, name: &str) -> Result<usize> {
    if !skip_separators(bytes, pos) {
        return Err(PnmError::Parse(format!("expected whitespace before {name}")));
    }
    let start = *pos;
    while bytes.get(*pos).is_some_and(u8::is_ascii_digit) {
        *pos += 1;
    }
    if start == *pos {
        return Err(PnmError::Parse(format!("expected {name}")));
    }
    // digits are ASCII, so this cannot fail
    let digits = std::str::from_utf8(&bytes[start..*pos]).unwrap_or_default();
    digits
        .parse()
        .map_err(|_| PnmError::Parse(format!("{name} {digits} is out of range")))
}

/// Parse a P5/P6 header and check that enough payload follows it.
pub fn read_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < 2 || bytes[0] != b'P' {
        return Err(PnmError::Parse("missing PNM magic".into()));
    }
    let format = match bytes[1] {
        b'5' => Format::Graymap,
        b'6' => Format::Pixmap,
        other => {
            return Err(PnmError::Parse(format!(
                "unsupported PNM variant P{}",
                other as char
            )))
        }
    };

    let mut pos = 2;
    let width = next_number(bytes, &mut pos, "width")?;
    let height = next_number(bytes, &mut pos, "height")?;
    let max_color = next_number(bytes, &mut pos, "max color")?;

    // exactly one whitespace byte separates the header from the payload
    match bytes.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => return Err(PnmError::Parse("expected whitespace after max color".into())),
    }

    if width == 0 || height == 0 {
        return Err(PnmError::Parse(format!("invalid dimensions {width}x{height}")));
    }
    let max_color = match u16::try_from(max_color) {
        Ok(m) if m > 0 => m,
        _ => return Err(PnmError::Parse(format!("max color {max_color} not in 1..=65535"))),
    };

    let header = Header { format, width, height, max_color, data_offset: pos };
    let expected = header
        .payload_len()
        .map_err(|_| PnmError::Parse(format!("dimensions {width}x{height} overflow")))?;
    let actual = bytes.len() - pos;
    if actual < expected {
        return Err(PnmError::SizeMismatch { expected, actual });
    }
    Ok(header)
}

/// Decode a whole PNM file held in memory. Trailing bytes are ignored.
pub fn decode(bytes: &[u8]) -> Result<Raster> {
    let header = read_header(bytes)?;
    let len = header.payload_len()?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| PnmError::AllocationFailed { bytes: len })?;
    data.extend_from_slice(&bytes[header.data_offset..header.data_offset + len]);
    Raster::from_samples(header.format, header.width, header.height, header.max_color, data)
}

/// Encode a raster as a binary PNM file.
pub fn encode(raster: &Raster) -> Result<Vec<u8>> {
    let header = format!(
        "{}\n{} {}\n{}\n",
        raster.format().magic(),
        raster.width(),
        raster.height(),
        raster.max_color()
    );
    let len = header.len() + raster.data().len();
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| PnmError::AllocationFailed { bytes: len })?;
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(raster.data());
    Ok(out)
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Raster> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let raster = decode(&bytes)?;
    tracing::trace!(
        path = %path.display(),
        format = raster.format().magic(),
        width = raster.width(),
        height = raster.height(),
        max_color = raster.max_color(),
        "Read image"
    );
    Ok(raster)
}

/// Write a raster. The file is only created once encoding has succeeded.
pub fn write_file(path: impl AsRef<Path>, raster: &Raster) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(raster)?;
    std::fs::write(path, bytes)?;
    tracing::trace!(path = %path.display(), "Wrote image");
    Ok(())
}
