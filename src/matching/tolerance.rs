//! Per-attribute tolerance windows for keypoint matching.

use crate::keypoint::Keypoint;
use crate::util::math::within;
use crate::util::{KeystableError, KeystableResult};

/// Per-attribute half-widths of the match window.
///
/// Two values match when `|a - b| < tolerance`. A zero tolerance still admits
/// exactly equal values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tolerance {
    pub gradient_magnitude: f64,
    pub gradient_orientation: f64,
    pub descriptor_mean: f64,
}

impl Tolerance {
    /// Builds a tolerance, rejecting negative or NaN widths.
    pub fn new(
        gradient_magnitude: f64,
        gradient_orientation: f64,
        descriptor_mean: f64,
    ) -> KeystableResult<Self> {
        for value in [gradient_magnitude, gradient_orientation, descriptor_mean] {
            if value.is_nan() || value < 0.0 {
                return Err(KeystableError::InvalidParameter {
                    name: "tolerance",
                    reason: "must be non-negative",
                });
            }
        }
        Ok(Self {
            gradient_magnitude,
            gradient_orientation,
            descriptor_mean,
        })
    }

    /// Same width for all three attributes.
    pub fn uniform(width: f64) -> KeystableResult<Self> {
        Self::new(width, width, width)
    }

    /// True when `a` and `b` agree on all three attributes.
    pub fn admits(&self, a: &Keypoint, b: &Keypoint) -> bool {
        within(a.gradient_magnitude, b.gradient_magnitude, self.gradient_magnitude)
            && within(
                a.gradient_orientation,
                b.gradient_orientation,
                self.gradient_orientation,
            )
            && within(a.descriptor_mean, b.descriptor_mean, self.descriptor_mean)
    }
}
