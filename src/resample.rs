//! Gamma-aware image resampling.

use rayon::prelude::*;

use crate::gamma::Gamma;
use crate::kernel::Filter;
use crate::raster::{try_filled, Raster};
use crate::{PnmError, Result};

/// Source pixels contributing to one output coordinate along one axis.
#[derive(Debug, Clone, PartialEq)]
struct AxisTaps {
    first: usize,
    weights: Vec<f64>,
}

/// Kernel taps for every output index along an axis.
///
/// Output index `i` maps to the continuous source coordinate
/// `(i + 0.5) * src / dst - 0.5`. Neighbours outside `0..src` are left out
/// rather than padded.
fn axis_taps(filter: Filter, src: usize, dst: usize) -> Vec<AxisTaps> {
    let ratio = src as f64 / dst as f64;
    let radius = filter.radius() as i64;
    let last = src as i64 - 1;

    (0..dst)
        .map(|i| {
            let center = (i as f64 + 0.5) * ratio - 0.5;
            let base = center.floor() as i64;
            let lo = (base - radius + 1).max(0);
            let hi = (base + radius).min(last);
            let weights = (lo..=hi).map(|s| filter.weight(center - s as f64)).collect();
            AxisTaps { first: lo as usize, weights }
        })
        .collect()
}

/// 16.16 fixed-point source index for nearest-neighbour scaling.
fn nearest_indices(src: usize, dst: usize) -> Vec<usize> {
    let ratio = ((src as u64) << 16) / dst as u64 + 1;
    (0..dst as u64)
        .map(|i| (((i * ratio) >> 16) as usize).min(src - 1))
        .collect()
}

#[inline]
fn put_sample(row: &mut [u8], index: usize, bytes_per_sample: usize, value: u16) {
    if bytes_per_sample == 1 {
        row[index] = value as u8;
    } else {
        row[index..index + 2].copy_from_slice(&value.to_be_bytes());
    }
}

/// Resizes rasters with a chosen [`Filter`], blending in linear light.
#[derive(Debug, Clone, Copy)]
pub struct Resampler {
    filter: Filter,
    gamma: Gamma,
}

impl Resampler {
    pub fn new(filter: Filter) -> Self {
        Self { filter, gamma: Gamma::default() }
    }

    pub fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    /// Produce a new `width` x `height` raster with the source's format and max color.
    pub fn resample(&self, src: &Raster, width: usize, height: usize) -> Result<Raster> {
        if width == 0 || height == 0 {
            return Err(PnmError::InvalidArgument(format!(
                "target size {width}x{height} must be non-empty"
            )));
        }
        if src.width() == 0 || src.height() == 0 {
            return Err(PnmError::SourceTooSmall { width: src.width(), height: src.height() });
        }

        tracing::debug!(
            src_width = src.width(),
            src_height = src.height(),
            width,
            height,
            filter = ?self.filter,
            gamma = ?self.gamma,
            "Resampling"
        );

        let mut out = Raster::new(src.format(), width, height, src.max_color())?;
        match self.filter {
            Filter::Nearest => self.nearest(src, &mut out),
            _ => self.convolve(src, &mut out)?,
        }
        Ok(out)
    }

    fn nearest(&self, src: &Raster, out: &mut Raster) {
        let stride = src.pixel_stride();
        let src_row = src.row_stride();
        let cols = nearest_indices(src.width(), out.width());
        let rows = nearest_indices(src.height(), out.height());
        let data = src.data();
        let out_row = out.row_stride();

        out.data_mut()
            .par_chunks_mut(out_row)
            .zip(rows.par_iter())
            .for_each(|(row, &sy)| {
                let line = &data[sy * src_row..(sy + 1) * src_row];
                for (pixel, &sx) in row.chunks_exact_mut(stride).zip(&cols) {
                    pixel.copy_from_slice(&line[sx * stride..(sx + 1) * stride]);
                }
            });
    }

    fn convolve(&self, src: &Raster, out: &mut Raster) -> Result<()> {
        let channels = src.channels();
        let src_width = src.width();
        let max = src.max_color() as f32;
        let gamma = self.gamma;

        // linearize every source sample once
        let mut linear: Vec<f32> = try_filled(src_width * src.height() * channels)?;
        for y in 0..src.height() {
            for x in 0..src_width {
                for c in 0..channels {
                    linear[(y * src_width + x) * channels + c] =
                        gamma.decode(src.sample(x, y, c) as f32 / max);
                }
            }
        }

        let cols = axis_taps(self.filter, src_width, out.width());
        let rows = axis_taps(self.filter, src.height(), out.height());
        let bytes_per_sample = out.bytes_per_sample();
        let out_row = out.row_stride();

        out.data_mut()
            .par_chunks_mut(out_row)
            .zip(rows.par_iter())
            .for_each(|(row, ty)| {
                for (x, tx) in cols.iter().enumerate() {
                    for c in 0..channels {
                        let mut sum = 0.0f64;
                        let mut weight_total = 0.0f64;
                        for (j, wy) in ty.weights.iter().enumerate() {
                            let line = (ty.first + j) * src_width;
                            for (i, wx) in tx.weights.iter().enumerate() {
                                let w = wx * wy;
                                let s = linear[(line + tx.first + i) * channels + c];
                                sum += s as f64 * w;
                                weight_total += w;
                            }
                        }
                        let value = if weight_total == 0.0 { 0.0 } else { sum / weight_total };
                        let encoded = gamma.encode((value as f32).clamp(0.0, 1.0));
                        let sample = (encoded * max).round().clamp(0.0, max) as u16;
                        put_sample(row, (x * channels + c) * bytes_per_sample, bytes_per_sample, sample);
                    }
                }
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Format;

    const FILTERS: [Filter; 4] = [
        Filter::Nearest,
        Filter::Bilinear,
        Filter::Lanczos3,
        Filter::BcSpline { b: 0.0, c: 0.5 },
    ];

    fn test_pattern(format: Format, width: usize, height: usize) -> Raster {
        let channels = format.channels();
        let data = (0..width * height * channels)
            .map(|i| ((i * 37 + i / 7 * 11) % 256) as u8)
            .collect();
        Raster::from_samples(format, width, height, 255, data).unwrap()
    }

    #[test]
    fn test_identity_resample_within_one() {
        for format in [Format::Graymap, Format::Pixmap] {
            let src = test_pattern(format, 9, 7);
            for filter in FILTERS {
                for gamma in [Gamma::Srgb, Gamma::Power(2.2)] {
                    let out = Resampler::new(filter).with_gamma(gamma).resample(&src, 9, 7).unwrap();
                    for (a, b) in src.data().iter().zip(out.data()) {
                        assert!(
                            (*a as i32 - *b as i32).abs() <= 1,
                            "{filter:?} {gamma:?}: {a} vs {b}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_weights_sum_to_integral_inside() {
        // downscale 40 -> 13 gives a spread of fractional offsets; these
        // kernels are partitions of unity, so the 1-D sum is 1 within 1e-3
        let filters = [
            Filter::Bilinear,
            Filter::BcSpline { b: 0.0, c: 0.5 },
            Filter::BcSpline { b: 1.0 / 3.0, c: 1.0 / 3.0 },
        ];
        for filter in filters {
            let taps = axis_taps(filter, 40, 13);
            for t in &taps[2..11] {
                let s: f64 = t.weights.iter().sum();
                assert!((s - filter.integral()).abs() < 1e-3, "{filter:?}: {s}");
                // the 2-D total is the square of the 1-D sum
                assert!((s * s - filter.integral().powi(2)).abs() < 2e-3, "{filter:?}: {s}");
            }
        }
    }

    #[test]
    fn test_lanczos_weights_close_to_integral() {
        // discrete Lanczos-3 sums ripple around the integral, so 1e-3 does not hold
        let filter = Filter::Lanczos3;
        for t in &axis_taps(filter, 40, 13)[2..11] {
            let s: f64 = t.weights.iter().sum();
            assert!((s - filter.integral()).abs() < 3e-3, "{s}");
            assert!((s * s - filter.integral().powi(2)).abs() < 6e-3, "{s}");
        }
    }

    #[test]
    fn test_taps_clipped_at_border() {
        let taps = axis_taps(Filter::Lanczos3, 10, 10);
        assert_eq!(taps[0].first, 0);
        assert_eq!(taps[0].weights.len(), 4);
        assert_eq!(taps[9].first, 7);
        assert_eq!(taps[9].weights.len(), 3);
    }

    #[test]
    fn test_bilinear_downsample_is_linear_light_average() {
        let src = Raster::gray(2, 2, vec![0, 64, 128, 255]).unwrap();
        let out = Resampler::new(Filter::Bilinear)
            .with_gamma(Gamma::Srgb)
            .resample(&src, 1, 1)
            .unwrap();

        let g = Gamma::Srgb;
        let mean = [0.0f32, 64.0, 128.0, 255.0].iter().map(|&s| g.to_linear(s)).sum::<f32>() / 4.0;
        let expected = g.to_display(mean).round() as u8;
        assert_eq!(expected, 153);
        assert_eq!(out.data(), &[expected]);
    }

    #[test]
    fn test_nearest_upsample_single_pixel() {
        let src = Raster::gray(1, 1, vec![200]).unwrap();
        let out = Resampler::new(Filter::Nearest).resample(&src, 3, 3).unwrap();
        assert_eq!(out.data(), &[200; 9]);
    }

    #[test]
    fn test_nearest_fixed_point_indices() {
        assert_eq!(nearest_indices(4, 2), vec![0, 2]);
        assert_eq!(nearest_indices(2, 4), vec![0, 0, 1, 1]);
        assert_eq!(nearest_indices(5, 5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_nearest_copies_whole_pixels() {
        let src = Raster::rgb(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let out = Resampler::new(Filter::Nearest).resample(&src, 4, 1).unwrap();
        assert_eq!(out.data(), &[1, 2, 3, 1, 2, 3, 4, 5, 6, 4, 5, 6]);
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let src = Raster::rgb(5, 4, [10u8, 120, 250].repeat(20)).unwrap();
        for filter in FILTERS {
            let out = Resampler::new(filter).resample(&src, 11, 3).unwrap();
            for px in out.data().chunks_exact(3) {
                assert_eq!(px, &[10, 120, 250], "{filter:?}");
            }
        }
    }

    #[test]
    fn test_sixteen_bit_preserved() {
        let mut src = Raster::new(Format::Graymap, 2, 2, 1000).unwrap();
        for (i, v) in [0u16, 1000, 1000, 0].into_iter().enumerate() {
            src.set_sample(i % 2, i / 2, 0, v);
        }
        let out = Resampler::new(Filter::Bilinear)
            .with_gamma(Gamma::Power(1.0))
            .resample(&src, 1, 1)
            .unwrap();
        assert_eq!(out.max_color(), 1000);
        assert_eq!(out.sample(0, 0, 0), 500);
    }

    #[test]
    fn test_deterministic() {
        let src = test_pattern(Format::Pixmap, 13, 9);
        let r = Resampler::new(Filter::Lanczos3).with_gamma(Gamma::Power(2.2));
        assert_eq!(r.resample(&src, 7, 17).unwrap(), r.resample(&src, 7, 17).unwrap());
    }

    #[test]
    fn test_rejects_empty_target() {
        let src = Raster::gray(1, 1, vec![0]).unwrap();
        let err = Resampler::new(Filter::Bilinear).resample(&src, 0, 4).unwrap_err();
        assert!(matches!(err, PnmError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_empty_source() {
        let src = Raster::gray(0, 3, vec![]).unwrap();
        let err = Resampler::new(Filter::Lanczos3).resample(&src, 2, 2).unwrap_err();
        assert!(matches!(err, PnmError::SourceTooSmall { width: 0, height: 3 }));
    }
}
