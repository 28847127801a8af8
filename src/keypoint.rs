//! Keypoint record produced by detection and consumed by matching.

/// Pixel location flagged by gradient strength, with its attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    /// X coordinate (column).
    pub x: usize,
    /// Y coordinate (row).
    pub y: usize,
    /// Mean of R+G+B over the descriptor window, per channel sample.
    pub descriptor_mean: f64,
    /// Sobel gradient magnitude on the red channel.
    pub gradient_magnitude: f64,
    /// Gradient orientation in degrees, in `(-180, 180]`.
    pub gradient_orientation: f64,
}
