//! Direct 2D convolution of RGBA buffers with a Gaussian kernel.
//!
//! Out-of-range samples replicate the nearest edge pixel. Each output channel
//! is rounded half-to-even and clamped to `[0, 255]`; alpha is always 255.

use crate::filter::gaussian::GaussianKernel;
use crate::image::{PixelBuffer, CHANNELS};
use crate::trace::trace_span;
use crate::util::math::clamp_channel;
use crate::util::KeystableResult;

/// Blurs `buffer` with a freshly generated `(size, sigma)` kernel.
pub fn gaussian_blur(
    buffer: &PixelBuffer,
    size: usize,
    sigma: f64,
) -> KeystableResult<PixelBuffer> {
    let kernel = GaussianKernel::new(size, sigma)?;
    convolve(buffer, &kernel)
}

/// Convolves `buffer` with `kernel`, producing a buffer of the same size.
pub fn convolve(buffer: &PixelBuffer, kernel: &GaussianKernel) -> KeystableResult<PixelBuffer> {
    let width = buffer.width();
    let height = buffer.height();
    let _span = trace_span!(
        "blur",
        width = width,
        height = height,
        size = kernel.size()
    )
    .entered();

    let half = kernel.half() as isize;
    let weights = kernel.weights();
    let mut out = Vec::with_capacity(width * height * CHANNELS);

    for y in 0..height as isize {
        for x in 0..width as isize {
            let (mut r, mut g, mut b) = (0.0f64, 0.0f64, 0.0f64);
            let mut k = 0usize;
            for ky in -half..=half {
                for kx in -half..=half {
                    let px = buffer.pixel_clamped(x + kx, y + ky);
                    let w = weights[k];
                    r += f64::from(px[0]) * w;
                    g += f64::from(px[1]) * w;
                    b += f64::from(px[2]) * w;
                    k += 1;
                }
            }
            out.extend_from_slice(&[clamp_channel(r), clamp_channel(g), clamp_channel(b), 255]);
        }
    }

    PixelBuffer::from_rgba(out, width, height)
}
