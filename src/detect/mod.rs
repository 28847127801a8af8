//! Single-scale keypoint detection and the multi-scale `Detector`.
//!
//! A single-scale pass blurs the input with a `(size, sigma)` Gaussian, then
//! walks the interior pixels in row-major order. A pixel becomes a keypoint
//! when its red-channel Sobel magnitude on the blurred buffer is strictly
//! above the threshold; its descriptor is the mean intensity of a
//! `size x size` window on the same blurred buffer.

pub(crate) mod stability;

use crate::feature::descriptor::window_mean;
use crate::feature::gradient::gradient_interior;
use crate::filter::gaussian::validate_size;
use crate::filter::gaussian_blur;
use crate::image::{ImageSource, PixelBuffer};
use crate::keypoint::Keypoint;
use crate::trace::{trace_debug, trace_span};
use crate::util::{KeystableError, KeystableResult};

pub use stability::filter_stable;

/// Detection parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectConfig {
    /// Gradient magnitude a pixel must strictly exceed.
    pub gradient_threshold: f64,
    /// Base kernel size (odd). Stable detection uses `size`, `size + 2`,
    /// `size + 4`.
    pub size: usize,
    /// Gaussian spread used for every scale.
    pub sigma: f64,
    /// Evaluate scales on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            gradient_threshold: 500.0,
            size: 5,
            sigma: 1.0,
            parallel: false,
        }
    }
}

impl DetectConfig {
    /// Kernel sizes used by stable detection.
    pub fn scale_sizes(&self) -> KeystableResult<[usize; 3]> {
        let largest = self
            .size
            .checked_add(4)
            .ok_or(KeystableError::InvalidParameter {
                name: "size",
                reason: "too large",
            })?;
        Ok([self.size, self.size + 2, largest])
    }
}

/// Lazy row-major scan of an already blurred buffer.
pub struct KeypointScan<'a> {
    buffer: &'a PixelBuffer,
    threshold: f64,
    half: usize,
    x0: usize,
    x1: usize,
    y1: usize,
    x: usize,
    y: usize,
}

impl<'a> KeypointScan<'a> {
    fn new(buffer: &'a PixelBuffer, threshold: f64, size: usize) -> Self {
        let half = size / 2;
        // The Sobel stencil needs one pixel of margin even for 1x1 windows.
        let margin = half.max(1);
        let x1 = buffer.width().saturating_sub(margin);
        let y1 = buffer.height().saturating_sub(margin);
        Self {
            buffer,
            threshold,
            half,
            x0: margin,
            x1,
            y1,
            x: margin,
            y: margin,
        }
    }
}

impl Iterator for KeypointScan<'_> {
    type Item = Keypoint;

    fn next(&mut self) -> Option<Keypoint> {
        if self.x0 >= self.x1 {
            return None;
        }
        while self.y < self.y1 {
            let (x, y) = (self.x, self.y);
            self.x += 1;
            if self.x >= self.x1 {
                self.x = self.x0;
                self.y += 1;
            }

            let gradient = gradient_interior(self.buffer, x, y);
            if gradient.magnitude > self.threshold {
                return Some(Keypoint {
                    x,
                    y,
                    descriptor_mean: window_mean(self.buffer, x, y, self.half),
                    gradient_magnitude: gradient.magnitude,
                    gradient_orientation: gradient.orientation_deg,
                });
            }
        }
        None
    }
}

/// Scans a blurred buffer for keypoints without blurring it again.
///
/// Only pixels in `[size / 2, dim - size / 2)` on both axes are visited.
pub fn scan_keypoints(
    blurred: &PixelBuffer,
    gradient_threshold: f64,
    size: usize,
) -> KeystableResult<KeypointScan<'_>> {
    validate_size(size)?;
    Ok(KeypointScan::new(blurred, gradient_threshold, size))
}

/// Blurs `buffer` with `(size, sigma)` and returns every keypoint found.
pub fn detect_keypoints(
    buffer: &PixelBuffer,
    gradient_threshold: f64,
    size: usize,
    sigma: f64,
) -> KeystableResult<Vec<Keypoint>> {
    let _span = trace_span!("detect", size = size).entered();
    let blurred = gaussian_blur(buffer, size, sigma)?;
    let keypoints: Vec<Keypoint> = scan_keypoints(&blurred, gradient_threshold, size)?.collect();
    trace_debug!("keypoints_detected", count = keypoints.len(), size = size);
    Ok(keypoints)
}

/// Keypoint detector bound to a `DetectConfig`.
#[derive(Clone, Debug, Default)]
pub struct Detector {
    cfg: DetectConfig,
}

impl Detector {
    pub fn new(cfg: DetectConfig) -> Self {
        Self { cfg }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: DetectConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &DetectConfig {
        &self.cfg
    }

    /// Single-scale detection at the base kernel size.
    pub fn detect(&self, buffer: &PixelBuffer) -> KeystableResult<Vec<Keypoint>> {
        detect_keypoints(
            buffer,
            self.cfg.gradient_threshold,
            self.cfg.size,
            self.cfg.sigma,
        )
    }

    /// Keypoints that are stable across the three configured scales.
    pub fn detect_stable(&self, buffer: &PixelBuffer) -> KeystableResult<Vec<Keypoint>> {
        self.detect_stable_with_sizes(buffer, &self.cfg.scale_sizes()?)
    }

    /// Keypoints that are stable across an explicit list of kernel sizes.
    pub fn detect_stable_with_sizes(
        &self,
        buffer: &PixelBuffer,
        sizes: &[usize],
    ) -> KeystableResult<Vec<Keypoint>> {
        stability::filter_stable_with(
            buffer,
            self.cfg.gradient_threshold,
            sizes,
            self.cfg.sigma,
            self.cfg.parallel,
        )
    }

    /// Acquires an image from `source` and runs stable detection on it.
    ///
    /// Acquisition failures surface as `CollaboratorFailure`.
    pub fn detect_stable_from<S: ImageSource + ?Sized>(
        &self,
        source: &S,
    ) -> KeystableResult<Vec<Keypoint>> {
        let buffer = source.get_pixel_buffer().map_err(|err| match err {
            err @ KeystableError::CollaboratorFailure { .. } => err,
            other => KeystableError::collaborator("image source", other),
        })?;
        self.detect_stable(&buffer)
    }
}
