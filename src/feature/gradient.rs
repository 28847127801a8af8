//! 3x3 Sobel gradient on the red channel.
//!
//! Green and blue are ignored. Sums are taken in integers, so a flat
//! neighborhood yields exactly zero magnitude and orientation.

use crate::image::PixelBuffer;
use crate::util::math::rad_to_deg;

/// Gradient magnitude and orientation at one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    /// `sqrt(gx² + gy²)`.
    pub magnitude: f64,
    /// `atan2(gy, gx)` in degrees, in `(-180, 180]`.
    pub orientation_deg: f64,
}

/// Computes the Sobel gradient at `(x, y)`.
///
/// Returns `None` when the 3x3 neighborhood leaves the image, i.e. when the
/// pixel lies on the outermost row or column.
pub fn gradient_at(buffer: &PixelBuffer, x: usize, y: usize) -> Option<Gradient> {
    if x == 0 || y == 0 || x + 1 >= buffer.width() || y + 1 >= buffer.height() {
        return None;
    }
    Some(gradient_interior(buffer, x, y))
}

/// Sobel gradient without bounds checks; `(x, y)` must be an interior pixel.
#[inline]
pub(crate) fn gradient_interior(buffer: &PixelBuffer, x: usize, y: usize) -> Gradient {
    let p = |dx: isize, dy: isize| {
        buffer.red((x as isize + dx) as usize, (y as isize + dy) as usize)
    };

    let gx = -p(-1, -1) + p(1, -1) - 2 * p(-1, 0) + 2 * p(1, 0) - p(-1, 1) + p(1, 1);
    let gy = -p(-1, -1) - 2 * p(0, -1) - p(1, -1) + p(-1, 1) + 2 * p(0, 1) + p(1, 1);

    let (gx, gy) = (f64::from(gx), f64::from(gy));
    Gradient {
        magnitude: gx.hypot(gy),
        orientation_deg: rad_to_deg(gy.atan2(gx)),
    }
}
