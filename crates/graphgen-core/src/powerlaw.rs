//! Truncated continuous power-law distribution shared by every sampler.

use rand::Rng;

use crate::errors::{ErrorInfo, GraphGenError};

const MEAN_BISECTION_STEPS: usize = 200;
const EXPONENT_EPSILON: f64 = 1e-12;

/// Density `p(x) ∝ x^-exponent` restricted to `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLaw {
    exponent: f64,
    low: f64,
    high: f64,
}

impl PowerLaw {
    /// Creates a distribution over `[low, high]`.
    pub fn new(exponent: f64, low: f64, high: f64) -> Result<Self, GraphGenError> {
        if !exponent.is_finite() {
            return Err(GraphGenError::Configuration(
                ErrorInfo::new("powerlaw-exponent", "power-law exponent must be finite")
                    .with_context("exponent", exponent),
            ));
        }
        if !(low.is_finite() && high.is_finite()) || low <= 0.0 || high < low {
            return Err(GraphGenError::Configuration(
                ErrorInfo::new(
                    "powerlaw-support",
                    "power-law support must satisfy 0 < low <= high",
                )
                .with_context("low", low)
                .with_context("high", high),
            ));
        }
        Ok(Self {
            exponent,
            low,
            high,
        })
    }

    /// Solves for the lower cut-off in `[1, high]` that yields the requested mean.
    pub fn with_mean(exponent: f64, high: f64, mean: f64) -> Result<Self, GraphGenError> {
        let widest = Self::new(exponent, 1.0, high)?;
        if mean > high + 1e-9 {
            return Err(GraphGenError::Configuration(
                ErrorInfo::new("mean-above-support", "requested mean exceeds the upper bound")
                    .with_context("mean", mean)
                    .with_context("high", high),
            ));
        }
        if mean < widest.mean() - 1e-9 {
            return Err(GraphGenError::Configuration(
                ErrorInfo::new(
                    "mean-below-support",
                    "requested mean is smaller than the mean reachable with a lower cut-off of 1",
                )
                .with_context("mean", mean)
                .with_context("exponent", exponent)
                .with_context("minimum-mean", widest.mean())
                .with_hint("raise the average or lower the exponent"),
            ));
        }
        if (high - mean).abs() < 1e-9 {
            return Self::new(exponent, high, high);
        }

        let (mut lo, mut hi) = (1.0_f64, high);
        for _ in 0..MEAN_BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if Self::new(exponent, mid, high)?.mean() < mean {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Self::new(exponent, 0.5 * (lo + hi), high)
    }

    /// Exponent of the density (the density decays as `x^-exponent`).
    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Lower bound of the support.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound of the support.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Closed-form mean of the truncated distribution.
    pub fn mean(&self) -> f64 {
        if self.high - self.low < 1e-12 {
            return self.low;
        }
        moment_integral(1.0 - self.exponent, self.low, self.high)
            / moment_integral(-self.exponent, self.low, self.high)
    }

    /// Draws one value by inverse transform sampling.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.high - self.low < 1e-12 {
            return self.low;
        }
        let u: f64 = rng.gen();
        let shape = 1.0 - self.exponent;
        let value = if shape.abs() < EXPONENT_EPSILON {
            self.low * (self.high / self.low).powf(u)
        } else {
            let a = self.low.powf(shape);
            let b = self.high.powf(shape);
            (a + u * (b - a)).powf(1.0 / shape)
        };
        value.clamp(self.low, self.high)
    }

    /// Draws one value rounded to the nearest integer in `[ceil(low), floor(high)]`.
    ///
    /// A support holding no integer yields `ceil(low)`.
    pub fn sample_rounded<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let lo = self.low.ceil().max(1.0);
        let hi = self.high.floor().max(lo);
        self.sample(rng).round().clamp(lo, hi) as usize
    }
}

/// `∫_a^b x^p dx`.
fn moment_integral(p: f64, a: f64, b: f64) -> f64 {
    if (p + 1.0).abs() < EXPONENT_EPSILON {
        (b / a).ln()
    } else {
        (b.powf(p + 1.0) - a.powf(p + 1.0)) / (p + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngHandle;

    #[test]
    fn uniform_exponent_mean_is_midpoint() {
        let law = PowerLaw::new(0.0, 2.0, 4.0).unwrap();
        assert!((law.mean() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn solved_cutoff_reproduces_mean() {
        for exponent in [2.0, 2.5, 3.0] {
            let law = PowerLaw::with_mean(exponent, 50.0, 8.0).unwrap();
            assert!((law.mean() - 8.0).abs() < 1e-6, "exponent {exponent}");
            assert!(law.low() >= 1.0 && law.low() <= 8.0);
        }
    }

    #[test]
    fn samples_stay_inside_support() {
        let law = PowerLaw::new(2.0, 3.0, 20.0).unwrap();
        let mut rng = RngHandle::from_seed(5);
        for _ in 0..1_000 {
            let x = law.sample(&mut rng);
            assert!((3.0..=20.0).contains(&x));
            let k = law.sample_rounded(&mut rng);
            assert!((3..=20).contains(&k));
        }
    }

    #[test]
    fn rounded_samples_respect_fractional_bounds() {
        let law = PowerLaw::new(2.0, 2.4, 9.7).unwrap();
        let mut rng = RngHandle::from_seed(17);
        for _ in 0..2_000 {
            let k = law.sample_rounded(&mut rng);
            assert!((3..=9).contains(&k), "sample {k} outside [3, 9]");
        }
    }

    #[test]
    fn unreachable_mean_is_rejected() {
        let err = PowerLaw::with_mean(2.0, 20.0, 1.5).unwrap_err();
        assert_eq!(err.info().code, "mean-below-support");
        let err = PowerLaw::with_mean(2.0, 20.0, 21.0).unwrap_err();
        assert_eq!(err.info().code, "mean-above-support");
    }
}
