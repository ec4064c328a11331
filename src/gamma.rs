//! Transfer between display-encoded samples and linear light.

use crate::{PnmError, Result};

/// Gamma parameters below this magnitude select the sRGB curve.
const SRGB_SENTINEL_EPS: f32 = 1e-6;

/// A display transfer function.
///
/// `Power(g)` requires `g > 0`; [`Gamma::from_param`] validates this, the
/// conversion methods assume it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gamma {
    /// Piecewise sRGB curve
    #[default]
    Srgb,
    /// Pure power law, `linear = encoded^g`
    Power(f32),
}

impl Gamma {
    /// Interpret a command-line gamma value: 0 selects sRGB.
    pub fn from_param(gamma: f32) -> Result<Self> {
        if gamma.abs() < SRGB_SENTINEL_EPS {
            Ok(Gamma::Srgb)
        } else if gamma > 0.0 && gamma.is_finite() {
            Ok(Gamma::Power(gamma))
        } else {
            Err(PnmError::InvalidArgument(format!(
                "gamma must be 0 (sRGB) or positive, got {gamma}"
            )))
        }
    }

    /// Encoded `[0, 1]` to linear `[0, 1]`.
    #[inline]
    pub fn decode(self, encoded: f32) -> f32 {
        let v = encoded.clamp(0.0, 1.0);
        let linear = match self {
            Gamma::Srgb => {
                if v <= 0.04045 {
                    v / 12.92
                } else {
                    ((v + 0.055) / 1.055).powf(2.4)
                }
            }
            Gamma::Power(g) => v.powf(g),
        };
        linear.clamp(0.0, 1.0)
    }

    /// Linear `[0, 1]` to encoded `[0, 1]`.
    #[inline]
    pub fn encode(self, linear: f32) -> f32 {
        let l = linear.clamp(0.0, 1.0);
        let encoded = match self {
            Gamma::Srgb => {
                if l <= 0.003_130_8 {
                    l * 12.92
                } else {
                    1.055 * l.powf(1.0 / 2.4) - 0.055
                }
            }
            Gamma::Power(g) => l.powf(1.0 / g),
        };
        encoded.clamp(0.0, 1.0)
    }

    /// Display sample on the 0..255 scale to linear light.
    pub fn to_linear(self, sample: f32) -> f32 {
        self.decode(sample / 255.0)
    }

    /// Linear light to a display sample on the 0..255 scale.
    pub fn to_display(self, linear: f32) -> f32 {
        (255.0 * self.encode(linear)).clamp(0.0, 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_param() {
        assert_eq!(Gamma::from_param(0.0).unwrap(), Gamma::Srgb);
        assert_eq!(Gamma::from_param(2.2).unwrap(), Gamma::Power(2.2));
        assert!(Gamma::from_param(-1.0).is_err());
        assert!(Gamma::from_param(f32::NAN).is_err());
    }

    #[test]
    fn test_srgb_endpoints_and_midpoint() {
        let g = Gamma::Srgb;
        assert_eq!(g.to_linear(0.0), 0.0);
        assert!((g.to_linear(255.0) - 1.0).abs() < 1e-6);
        // 50% linear is roughly 188 in sRGB
        assert!((g.to_display(0.5) - 187.5).abs() < 0.5);
    }

    #[test]
    fn test_round_trip_all_samples() {
        for gamma in [Gamma::Srgb, Gamma::Power(2.2), Gamma::Power(1.0), Gamma::Power(0.5)] {
            for s in 0..=255u16 {
                let back = gamma.to_display(gamma.to_linear(s as f32)).round();
                assert_eq!(back, s as f32, "{gamma:?} sample {s}");
            }
        }
    }

    #[test]
    fn test_power_law() {
        let g = Gamma::Power(2.0);
        assert!((g.to_linear(127.5) - 0.25).abs() < 1e-6);
        assert!((g.to_display(0.25) - 127.5).abs() < 1e-3);
    }

    #[test]
    fn test_results_are_clamped() {
        assert_eq!(Gamma::Srgb.to_display(2.0), 255.0);
        assert_eq!(Gamma::Srgb.to_display(-1.0), 0.0);
        assert_eq!(Gamma::Power(2.2).to_linear(300.0), 1.0);
    }
}
