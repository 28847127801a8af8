//! Window mean of summed RGB intensity.

use crate::filter::gaussian::validate_size;
use crate::image::PixelBuffer;
use crate::util::KeystableResult;

/// Mean channel intensity over a `window x window` neighborhood of `(x, y)`.
///
/// R, G and B of every sampled cell are summed and divided by three times the
/// cell count. Samples outside the image replicate the nearest edge pixel.
pub fn descriptor_mean(
    buffer: &PixelBuffer,
    x: usize,
    y: usize,
    window: usize,
) -> KeystableResult<f64> {
    validate_size(window)?;
    Ok(window_mean(buffer, x, y, window / 2))
}

/// Descriptor mean for a pre-validated half window.
#[inline]
pub(crate) fn window_mean(buffer: &PixelBuffer, x: usize, y: usize, half: usize) -> f64 {
    let half = half as isize;
    let (cx, cy) = (x as isize, y as isize);

    let mut sum = 0u64;
    let mut count = 0u64;
    for ky in -half..=half {
        for kx in -half..=half {
            let px = buffer.pixel_clamped(cx + kx, cy + ky);
            sum += u64::from(px[0]) + u64::from(px[1]) + u64::from(px[2]);
            count += 3;
        }
    }
    sum as f64 / count as f64
}
