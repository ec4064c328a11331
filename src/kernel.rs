//! Resampling kernels.
//!
//! Each kernel maps a signed distance (in source pixels) to a weight and is
//! zero outside its support radius. The resampler forms two-dimensional
//! weights as the product of the 1-D weight along each axis.

use std::f64::consts::PI;
use std::str::FromStr;

use crate::PnmError;

/// Lanczos lobes
const LANCZOS_A: f64 = 3.0;

/// Analytic integral of the Lanczos-3 kernel over its support.
const LANCZOS3_INTEGRAL: f64 = 0.997_055_3;

/// Interpolation filter used by [`crate::Resampler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// Pick the nearest sample, selected with 16.16 fixed-point stepping.
    Nearest,
    /// Tent filter, radius 1.
    Bilinear,
    /// Windowed sinc with three lobes.
    Lanczos3,
    /// Mitchell-Netravali cubic family, radius 2.
    BcSpline { b: f64, c: f64 },
}

impl Filter {
    /// The B-C spline with the classic `B = 0, C = 0.5` parameters.
    pub const fn bc_spline() -> Self {
        Filter::BcSpline { b: 0.0, c: 0.5 }
    }

    /// Distance beyond which [`Filter::weight`] is zero.
    pub fn radius(&self) -> usize {
        match self {
            Filter::Nearest => 0,
            Filter::Bilinear => 1,
            Filter::Lanczos3 => 3,
            Filter::BcSpline { .. } => 2,
        }
    }

    /// 1-D weight at signed distance `d`.
    pub fn weight(&self, d: f64) -> f64 {
        match *self {
            Filter::Nearest => {
                if d.abs() < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Filter::Bilinear => tent(d),
            Filter::Lanczos3 => lanczos3(d),
            Filter::BcSpline { b, c } => bc_spline(d, b, c),
        }
    }

    /// Integral of the 1-D kernel over the real line.
    pub fn integral(&self) -> f64 {
        match self {
            Filter::Lanczos3 => LANCZOS3_INTEGRAL,
            _ => 1.0,
        }
    }
}

impl FromStr for Filter {
    type Err = PnmError;

    /// Accepts the numeric codes `0..=3` or the filter names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "nearest" => Ok(Filter::Nearest),
            "1" | "bilinear" => Ok(Filter::Bilinear),
            "2" | "lanczos" | "lanczos3" => Ok(Filter::Lanczos3),
            "3" | "bc" | "bcspline" | "bc-spline" | "mitchell" => Ok(Filter::bc_spline()),
            other => Err(PnmError::InvalidArgument(format!("unknown filter '{other}'"))),
        }
    }
}

fn tent(d: f64) -> f64 {
    let d = d.abs();
    if d < 1.0 {
        1.0 - d
    } else {
        0.0
    }
}

/// Normalized sinc, `sin(pi x) / (pi x)`.
fn sinc(x: f64) -> f64 {
    let x = x * PI;
    if x.abs() < 0.01 {
        // Taylor series, avoids 0/0
        return 1.0 + x * x * (-1.0 / 6.0 + x * x / 120.0);
    }
    x.sin() / x
}

fn lanczos3(d: f64) -> f64 {
    if d.abs() < LANCZOS_A {
        sinc(d) * sinc(d / LANCZOS_A)
    } else {
        0.0
    }
}

fn bc_spline(d: f64, b: f64, c: f64) -> f64 {
    let x = d.abs();
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x.powi(3) + (-18.0 + 12.0 * b + 6.0 * c) * x.powi(2)
            + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x.powi(3)
            + (6.0 * b + 30.0 * c) * x.powi(2)
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Filter; 4] = [
        Filter::Nearest,
        Filter::Bilinear,
        Filter::Lanczos3,
        Filter::BcSpline { b: 0.0, c: 0.5 },
    ];

    #[test]
    fn test_zero_outside_support() {
        for f in ALL {
            let r = f.radius() as f64;
            for d in [r + 0.5, r + 1.0, -(r + 0.75), 10.0] {
                assert_eq!(f.weight(d), 0.0, "{f:?} at {d}");
            }
        }
    }

    #[test]
    fn test_unit_weight_at_origin() {
        for f in ALL {
            assert!((f.weight(0.0) - 1.0).abs() < 1e-12, "{f:?}");
        }
    }

    #[test]
    fn test_sinc_taylor_branch_is_continuous() {
        let inside = sinc(0.0031);
        let outside = sinc(0.0033);
        assert!((inside - outside).abs() < 1e-4);
        assert!(inside <= 1.0 && inside > 0.9999);
    }

    #[test]
    fn test_lanczos_zero_at_integers() {
        for i in 1..3 {
            assert!(lanczos3(i as f64).abs() < 1e-12);
            assert!(lanczos3(-(i as f64)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bc_spline_pieces_meet() {
        let (b, c) = (1.0 / 3.0, 1.0 / 3.0);
        let below = bc_spline(1.0 - 1e-9, b, c);
        let above = bc_spline(1.0 + 1e-9, b, c);
        assert!((below - above).abs() < 1e-6);
        assert!(bc_spline(2.0 - 1e-9, b, c).abs() < 1e-6);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2".parse::<Filter>().unwrap(), Filter::Lanczos3);
        assert_eq!("Bilinear".parse::<Filter>().unwrap(), Filter::Bilinear);
        assert_eq!("3".parse::<Filter>().unwrap(), Filter::bc_spline());
        assert!("7".parse::<Filter>().is_err());
    }
}
