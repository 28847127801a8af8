//! Square 2D Gaussian weight matrices.
//!
//! Weights follow the raw density `exp(-(dx² + dy²) / 2σ²) / sqrt(2πσ²)` and
//! are not normalized to sum to one. Blurring with these weights scales
//! brightness by the kernel sum; matching tolerances downstream depend on that
//! scaling, so it is kept as is.

use crate::util::{KeystableError, KeystableResult};
use std::f64::consts::PI;

/// Odd-sized square Gaussian weight matrix, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    size: usize,
    sigma: f64,
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// Builds a `size x size` kernel with spread `sigma`.
    ///
    /// `size` must be odd and positive; `sigma` must be finite and positive.
    pub fn new(size: usize, sigma: f64) -> KeystableResult<Self> {
        validate_size(size)?;
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(KeystableError::InvalidParameter {
                name: "sigma",
                reason: "must be finite and positive",
            });
        }

        let half = (size / 2) as isize;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let norm = (2.0 * PI * sigma * sigma).sqrt();
        let mut weights = Vec::with_capacity(size * size);
        for dy in -half..=half {
            for dx in -half..=half {
                let r2 = (dx * dx + dy * dy) as f64;
                weights.push((-r2 / two_sigma_sq).exp() / norm);
            }
        }

        Ok(Self {
            size,
            sigma,
            weights,
        })
    }

    /// Side length of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half the side length, rounded down.
    pub fn half(&self) -> usize {
        self.size / 2
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Row-major weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight at offset `(dx, dy)` from the center, if inside the kernel.
    pub fn weight(&self, dx: isize, dy: isize) -> Option<f64> {
        let half = self.half() as isize;
        if dx.abs() > half || dy.abs() > half {
            return None;
        }
        let idx = (dy + half) as usize * self.size + (dx + half) as usize;
        self.weights.get(idx).copied()
    }

    /// Sum of all weights; the brightness gain applied by a blur.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Rejects zero, even, and unaddressably large window sizes.
pub(crate) fn validate_size(size: usize) -> KeystableResult<()> {
    if size == 0 {
        return Err(KeystableError::InvalidParameter {
            name: "size",
            reason: "must be positive",
        });
    }
    if size % 2 == 0 {
        return Err(KeystableError::InvalidParameter {
            name: "size",
            reason: "must be odd",
        });
    }
    let fits = size
        .checked_mul(size)
        .and_then(|cells| cells.checked_mul(std::mem::size_of::<f64>()))
        .is_some_and(|bytes| bytes <= isize::MAX as usize);
    if !fits {
        return Err(KeystableError::InvalidParameter {
            name: "size",
            reason: "too large",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::GaussianKernel;
    use crate::util::KeystableError;

    #[test]
    fn center_weight_is_density_peak() {
        let kernel = GaussianKernel::new(5, 1.0).unwrap();
        let expected = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
        assert!((kernel.weight(0, 0).unwrap() - expected).abs() < 1e-12);
        assert_eq!(kernel.weights().len(), 25);
        assert_eq!(kernel.weight(3, 0), None);
    }

    #[test]
    fn weights_are_not_sum_normalized() {
        let kernel = GaussianKernel::new(5, 1.0).unwrap();
        // (1 + 2e^-0.5 + 2e^-2)^2 / sqrt(2π)
        assert!((kernel.sum() - 2.461035).abs() < 1e-5, "sum = {}", kernel.sum());
    }

    #[test]
    fn symmetric_under_half_turn() {
        for (size, sigma) in [(3, 0.5), (5, 1.0), (7, 2.3)] {
            let kernel = GaussianKernel::new(size, sigma).unwrap();
            let w = kernel.weights();
            assert!(w.iter().all(|&v| v >= 0.0));
            for i in 0..w.len() {
                assert_eq!(w[i], w[w.len() - 1 - i]);
            }
        }
    }

    #[test]
    fn rejects_invalid_geometry() {
        assert!(matches!(
            GaussianKernel::new(0, 1.0),
            Err(KeystableError::InvalidParameter { name: "size", .. })
        ));
        assert!(matches!(
            GaussianKernel::new(4, 1.0),
            Err(KeystableError::InvalidParameter { name: "size", .. })
        ));
        assert_eq!(
            GaussianKernel::new(usize::MAX, 1.0).unwrap_err(),
            KeystableError::InvalidParameter {
                name: "size",
                reason: "too large",
            }
        );
        assert!(matches!(
            GaussianKernel::new(3, 0.0),
            Err(KeystableError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            GaussianKernel::new(3, f64::NAN),
            Err(KeystableError::InvalidParameter { name: "sigma", .. })
        ));
    }
}
