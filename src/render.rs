//! Visualization contract for detected keypoints.

use crate::image::PixelBuffer;
use crate::keypoint::Keypoint;
use crate::util::KeystableResult;

/// Radius, in pixels, of the marker drawn around each keypoint.
pub const MARKER_RADIUS: i32 = 5;

/// Draws an image with its keypoints marked.
///
/// Styling and output format belong to the implementation; the detector only
/// hands over the source pixels and the keypoint locations.
pub trait RenderSink {
    fn render(&mut self, image: &PixelBuffer, keypoints: &[Keypoint]) -> KeystableResult<()>;
}
