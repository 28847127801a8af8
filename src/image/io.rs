//! Image decoding and overlay rendering via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageSource, PixelBuffer};
use crate::keypoint::Keypoint;
use crate::render::{RenderSink, MARKER_RADIUS};
use crate::util::{KeystableError, KeystableResult};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_circle_mut;
use std::path::{Path, PathBuf};

const MARKER_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Creates a pixel buffer from an RGBA image buffer.
pub fn buffer_from_rgba_image(img: &RgbaImage) -> KeystableResult<PixelBuffer> {
    PixelBuffer::from_rgba(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Creates a pixel buffer from a decoded image of any color type.
pub fn buffer_from_dynamic_image(img: &image::DynamicImage) -> KeystableResult<PixelBuffer> {
    buffer_from_rgba_image(&img.to_rgba8())
}

/// Converts a pixel buffer back into an `image` RGBA buffer.
pub fn rgba_image_from_buffer(buffer: &PixelBuffer) -> KeystableResult<RgbaImage> {
    let width = u32::try_from(buffer.width()).map_err(|_| KeystableError::InvalidDimensions {
        width: buffer.width(),
        height: buffer.height(),
    })?;
    let height = u32::try_from(buffer.height()).map_err(|_| KeystableError::InvalidDimensions {
        width: buffer.width(),
        height: buffer.height(),
    })?;
    RgbaImage::from_raw(width, height, buffer.as_raw().to_vec()).ok_or(
        KeystableError::BufferTooSmall {
            needed: buffer.width() * buffer.height() * 4,
            got: buffer.as_raw().len(),
        },
    )
}

/// Loads an image from disk as RGBA.
pub fn load_rgba_image<P: AsRef<Path>>(path: P) -> KeystableResult<PixelBuffer> {
    let img = image::open(path).map_err(|err| KeystableError::ImageIo {
        reason: err.to_string(),
    })?;
    buffer_from_dynamic_image(&img)
}

/// Image source backed by a file on disk.
#[derive(Clone, Debug)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FileImageSource {
    fn get_pixel_buffer(&self) -> KeystableResult<PixelBuffer> {
        load_rgba_image(&self.path)
            .map_err(|err| KeystableError::collaborator("image source", err))
    }
}

/// Render sink that writes the image with red keypoint circles to a file.
///
/// The output format is inferred from the file extension.
#[derive(Clone, Debug)]
pub struct OverlayFileSink {
    path: PathBuf,
}

impl OverlayFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Draws a hollow circle around every keypoint, two pixels thick.
pub fn draw_keypoints(image: &PixelBuffer, keypoints: &[Keypoint]) -> KeystableResult<RgbaImage> {
    let mut canvas = rgba_image_from_buffer(image)?;
    for kp in keypoints {
        let center = (kp.x as i32, kp.y as i32);
        draw_hollow_circle_mut(&mut canvas, center, MARKER_RADIUS, MARKER_COLOR);
        draw_hollow_circle_mut(&mut canvas, center, MARKER_RADIUS + 1, MARKER_COLOR);
    }
    Ok(canvas)
}

impl RenderSink for OverlayFileSink {
    fn render(&mut self, image: &PixelBuffer, keypoints: &[Keypoint]) -> KeystableResult<()> {
        let canvas = draw_keypoints(image, keypoints)?;
        canvas
            .save(&self.path)
            .map_err(|err| KeystableError::collaborator("render sink", err))
    }
}
