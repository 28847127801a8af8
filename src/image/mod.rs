//! RGBA pixel buffers and the image acquisition contract.
//!
//! `PixelBuffer` is an owned, row-major, tightly packed RGBA8 buffer. Every
//! filtering step produces a fresh buffer of the same dimensions; buffers are
//! never mutated after construction.

use crate::util::{KeystableError, KeystableResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 4;

/// Owned RGBA8 image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Wraps interleaved RGBA samples (`width * height * 4` bytes).
    pub fn from_rgba(data: Vec<u8>, width: usize, height: usize) -> KeystableResult<Self> {
        let needed = sample_len(width, height, CHANNELS)?;
        if data.len() < needed {
            return Err(KeystableError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(KeystableError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a buffer from interleaved RGB samples; alpha is set opaque.
    pub fn from_rgb(rgb: &[u8], width: usize, height: usize) -> KeystableResult<Self> {
        let needed = sample_len(width, height, 3)?;
        if rgb.len() != needed {
            return Err(KeystableError::BufferTooSmall {
                needed,
                got: rgb.len(),
            });
        }
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for px in rgb.chunks_exact(3) {
            data.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Self::from_rgba(data, width, height)
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> KeystableResult<Self>
    where
        F: FnMut(usize, usize) -> [u8; 4],
    {
        let needed = sample_len(width, height, CHANNELS)?;
        let mut data = Vec::with_capacity(needed);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::from_rgba(data, width, height)
    }

    /// Builds a buffer filled with a single color.
    pub fn uniform(width: usize, height: usize, rgba: [u8; 4]) -> KeystableResult<Self> {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the interleaved RGBA samples.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer and returns the interleaved RGBA samples.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns the RGBA value at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * CHANNELS;
        let px = self.data.get(idx..idx + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns the RGBA value at `(x, y)` with coordinates clamped to the
    /// nearest edge pixel (edge-replicate boundary).
    #[inline]
    pub(crate) fn pixel_clamped(&self, x: isize, y: isize) -> &[u8] {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        let idx = (cy * self.width + cx) * CHANNELS;
        &self.data[idx..idx + CHANNELS]
    }

    /// Returns the red sample at `(x, y)`; caller guarantees bounds.
    #[inline]
    pub(crate) fn red(&self, x: usize, y: usize) -> i32 {
        i32::from(self.data[(y * self.width + x) * CHANNELS])
    }
}

fn sample_len(width: usize, height: usize, channels: usize) -> KeystableResult<usize> {
    if width == 0 || height == 0 {
        return Err(KeystableError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(KeystableError::InvalidDimensions { width, height })
}

/// Supplies raw RGBA pixels for an image handle.
///
/// Implementations wrap whatever the host uses to decode or capture images.
/// Failures are reported as `KeystableError::CollaboratorFailure` by the
/// pipeline and are never retried.
pub trait ImageSource {
    /// Acquires the full-resolution RGBA pixel buffer.
    fn get_pixel_buffer(&self) -> KeystableResult<PixelBuffer>;
}

impl ImageSource for PixelBuffer {
    fn get_pixel_buffer(&self) -> KeystableResult<PixelBuffer> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::PixelBuffer;
    use crate::util::KeystableError;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = PixelBuffer::from_rgba(vec![0u8; 15], 2, 2).unwrap_err();
        assert_eq!(err, KeystableError::BufferTooSmall { needed: 16, got: 15 });
        let err = PixelBuffer::from_rgba(vec![0u8; 20], 2, 2).unwrap_err();
        assert_eq!(
            err,
            KeystableError::InvalidDimensions {
                width: 2,
                height: 2
            }
        );
        let err = PixelBuffer::from_rgba(Vec::new(), 0, 3).unwrap_err();
        assert_eq!(
            err,
            KeystableError::InvalidDimensions {
                width: 0,
                height: 3
            }
        );
    }

    #[test]
    fn rgb_input_gets_opaque_alpha() {
        let buf = PixelBuffer::from_rgb(&[1, 2, 3, 4, 5, 6], 2, 1).unwrap();
        assert_eq!(buf.pixel(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(buf.pixel(1, 0), Some([4, 5, 6, 255]));
        assert_eq!(buf.pixel(2, 0), None);
    }

    #[test]
    fn clamped_access_replicates_edges() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| [(x + 10 * y) as u8, 0, 0, 255]).unwrap();
        assert_eq!(buf.pixel_clamped(-4, -1)[0], 0);
        assert_eq!(buf.pixel_clamped(7, 0)[0], 2);
        assert_eq!(buf.pixel_clamped(1, 9)[0], 11);
    }
}
