//! Per-pixel color-space conversion for 8-bit pixmaps.
//!
//! Every space stores three channels scaled to `0..=255`. Hue is mapped from
//! `0..360` degrees onto `0..=255`; chroma channels of the luma/chroma spaces
//! are offset by 128.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::raster::{Format, Raster};
use crate::{PnmError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    Hsl,
    Hsv,
    YCbCr601,
    YCbCr709,
    YCoCg,
    Cmy,
}

/// Luma coefficients `(kr, kb)` for the Y'CbCr variants.
const BT601: (f32, f32) = (0.299, 0.114);
const BT709: (f32, f32) = (0.2126, 0.0722);

#[inline]
fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn unit(v: u8) -> f32 {
    v as f32 / 255.0
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 7] = [
        ColorSpace::Rgb,
        ColorSpace::Hsl,
        ColorSpace::Hsv,
        ColorSpace::YCbCr601,
        ColorSpace::YCbCr709,
        ColorSpace::YCoCg,
        ColorSpace::Cmy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorSpace::Rgb => "RGB",
            ColorSpace::Hsl => "HSL",
            ColorSpace::Hsv => "HSV",
            ColorSpace::YCbCr601 => "YCbCr.601",
            ColorSpace::YCbCr709 => "YCbCr.709",
            ColorSpace::YCoCg => "YCoCg",
            ColorSpace::Cmy => "CMY",
        }
    }

    /// Convert one pixel of this space into RGB.
    pub fn to_rgb(self, px: [u8; 3]) -> [u8; 3] {
        match self {
            ColorSpace::Rgb => px,
            ColorSpace::Hsl => hsl_to_rgb(px),
            ColorSpace::Hsv => hsv_to_rgb(px),
            ColorSpace::YCbCr601 => ycbcr_to_rgb(px, BT601),
            ColorSpace::YCbCr709 => ycbcr_to_rgb(px, BT709),
            ColorSpace::YCoCg => {
                let y = px[0] as f32;
                let co = px[1] as f32 - 128.0;
                let cg = px[2] as f32 - 128.0;
                [to_byte(y + co - cg), to_byte(y + cg), to_byte(y - co - cg)]
            }
            ColorSpace::Cmy => px.map(|c| 255 - c),
        }
    }

    /// Convert one RGB pixel into this space.
    pub fn from_rgb(self, px: [u8; 3]) -> [u8; 3] {
        match self {
            ColorSpace::Rgb => px,
            ColorSpace::Hsl => rgb_to_hsl(px),
            ColorSpace::Hsv => rgb_to_hsv(px),
            ColorSpace::YCbCr601 => rgb_to_ycbcr(px, BT601),
            ColorSpace::YCbCr709 => rgb_to_ycbcr(px, BT709),
            ColorSpace::YCoCg => {
                let [r, g, b] = px.map(|c| c as f32);
                [
                    to_byte(0.25 * r + 0.5 * g + 0.25 * b),
                    to_byte(0.5 * r - 0.5 * b + 128.0),
                    to_byte(-0.25 * r + 0.5 * g - 0.25 * b + 128.0),
                ]
            }
            ColorSpace::Cmy => px.map(|c| 255 - c),
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorSpace {
    type Err = PnmError;

    /// Case-insensitive; `YCbCr.601` and `YCbCr_601` are both accepted.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', ".").as_str() {
            "rgb" => Ok(ColorSpace::Rgb),
            "hsl" => Ok(ColorSpace::Hsl),
            "hsv" => Ok(ColorSpace::Hsv),
            "ycbcr.601" => Ok(ColorSpace::YCbCr601),
            "ycbcr.709" => Ok(ColorSpace::YCbCr709),
            "ycocg" => Ok(ColorSpace::YCoCg),
            "cmy" => Ok(ColorSpace::Cmy),
            _ => Err(PnmError::InvalidArgument(format!("unknown color space '{s}'"))),
        }
    }
}

fn rgb_to_ycbcr(px: [u8; 3], (kr, kb): (f32, f32)) -> [u8; 3] {
    let [r, g, b] = px.map(|c| c as f32);
    let y = kr * r + (1.0 - kr - kb) * g + kb * b;
    let cb = (b - y) / (2.0 * (1.0 - kb)) + 128.0;
    let cr = (r - y) / (2.0 * (1.0 - kr)) + 128.0;
    [to_byte(y), to_byte(cb), to_byte(cr)]
}

fn ycbcr_to_rgb(px: [u8; 3], (kr, kb): (f32, f32)) -> [u8; 3] {
    let y = px[0] as f32;
    let cb = px[1] as f32 - 128.0;
    let cr = px[2] as f32 - 128.0;
    let kg = 1.0 - kr - kb;
    let r = y + 2.0 * (1.0 - kr) * cr;
    let b = y + 2.0 * (1.0 - kb) * cb;
    let g = (y - kr * r - kb * b) / kg;
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// Hue in `[0, 1)` turns, or 0 for achromatic pixels.
fn hue(r: f32, g: f32, b: f32, max: f32, delta: f32) -> f32 {
    if delta <= 0.0 {
        return 0.0;
    }
    let sextant = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    sextant / 6.0
}

/// Hue turns to a byte; a full turn wraps back to 0.
fn hue_byte(h: f32) -> u8 {
    let v = (h * 255.0).round();
    if v >= 255.0 {
        0
    } else {
        v as u8
    }
}

fn rgb_to_hsl(px: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = px.map(unit);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;
    let s = if delta <= 0.0 {
        0.0
    } else if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    [hue_byte(hue(r, g, b, max, delta)), to_byte(s * 255.0), to_byte(l * 255.0)]
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn hsl_to_rgb(px: [u8; 3]) -> [u8; 3] {
    let [h, s, l] = px.map(unit);
    if s == 0.0 {
        let v = to_byte(l * 255.0);
        return [v, v, v];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        to_byte(hue_channel(p, q, h + 1.0 / 3.0) * 255.0),
        to_byte(hue_channel(p, q, h) * 255.0),
        to_byte(hue_channel(p, q, h - 1.0 / 3.0) * 255.0),
    ]
}

fn rgb_to_hsv(px: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = px.map(unit);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let s = if max <= 0.0 { 0.0 } else { delta / max };
    [hue_byte(hue(r, g, b, max, delta)), to_byte(s * 255.0), to_byte(max * 255.0)]
}

fn hsv_to_rgb(px: [u8; 3]) -> [u8; 3] {
    let [h, s, v] = px.map(unit);
    let h6 = (h * 6.0).rem_euclid(6.0);
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [to_byte(r * 255.0), to_byte(g * 255.0), to_byte(b * 255.0)]
}

/// Re-express every pixel of an 8-bit pixmap, going through RGB.
pub fn convert(raster: &mut Raster, from: ColorSpace, to: ColorSpace) -> Result<()> {
    if raster.format() != Format::Pixmap {
        return Err(PnmError::InvalidArgument(
            "color conversion requires a P6 image".to_string(),
        ));
    }
    raster.ensure_8bit("color conversion")?;
    tracing::debug!(%from, %to, width = raster.width(), height = raster.height(), "Converting color space");
    if from == to {
        return Ok(());
    }
    for px in raster.data_mut().chunks_exact_mut(3) {
        let rgb = from.to_rgb([px[0], px[1], px[2]]);
        px.copy_from_slice(&to.from_rgb(rgb));
    }
    Ok(())
}

/// Split a pixmap into one graymap per channel.
pub fn split_planes(raster: &Raster) -> Result<[Raster; 3]> {
    if raster.format() != Format::Pixmap {
        return Err(PnmError::InvalidArgument("only P6 images can be split".to_string()));
    }
    raster.ensure_8bit("plane splitting")?;
    let (w, h) = (raster.width(), raster.height());
    let mut planes = [
        Raster::new(Format::Graymap, w, h, raster.max_color())?,
        Raster::new(Format::Graymap, w, h, raster.max_color())?,
        Raster::new(Format::Graymap, w, h, raster.max_color())?,
    ];
    for (i, px) in raster.data().chunks_exact(3).enumerate() {
        for (plane, &v) in planes.iter_mut().zip(px) {
            plane.data_mut()[i] = v;
        }
    }
    Ok(planes)
}

/// Interleave three graymaps of identical geometry into a pixmap.
pub fn merge_planes(planes: &[Raster; 3]) -> Result<Raster> {
    let [first, ..] = planes;
    for plane in planes {
        if plane.format() != Format::Graymap {
            return Err(PnmError::InvalidArgument("planes must be P5 images".to_string()));
        }
        plane.ensure_8bit("plane merging")?;
        if (plane.width(), plane.height(), plane.max_color())
            != (first.width(), first.height(), first.max_color())
        {
            return Err(PnmError::InvalidArgument(format!(
                "plane geometry differs: {}x{} vs {}x{}",
                plane.width(),
                plane.height(),
                first.width(),
                first.height()
            )));
        }
    }
    let mut out = Raster::new(Format::Pixmap, first.width(), first.height(), first.max_color())?;
    for (i, px) in out.data_mut().chunks_exact_mut(3).enumerate() {
        for (c, plane) in planes.iter().enumerate() {
            px[c] = plane.data()[i];
        }
    }
    Ok(out)
}

/// `dir/name.ext` becomes `dir/name_1.ext`, `dir/name_2.ext`, `dir/name_3.ext`.
pub fn plane_paths(path: &Path) -> Result<[PathBuf; 3]> {
    let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) else {
        return Err(PnmError::InvalidArgument(format!(
            "'{}' needs a file extension to derive plane names",
            path.display()
        )));
    };
    let stem = stem.to_string_lossy();
    let ext = ext.to_string_lossy();
    Ok([1, 2, 3].map(|i| path.with_file_name(format!("{stem}_{i}.{ext}"))))
}
