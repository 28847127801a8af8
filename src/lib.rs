//! Keystable detects keypoints that survive several Gaussian blur scales and
//! matches them against a reference set with per-attribute tolerances.
//!
//! The pipeline is: Gaussian blur, red-channel Sobel gradient threshold,
//! window-mean intensity descriptor, then a cross-scale stability filter.
//! Scales can be evaluated in parallel with the `rayon` feature.

pub mod detect;
pub mod feature;
pub mod filter;
pub mod image;
mod keypoint;
pub mod lowlevel;
pub mod matching;
pub mod render;
pub mod store;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use detect::{DetectConfig, Detector};
pub use crate::image::{ImageSource, PixelBuffer};
pub use keypoint::Keypoint;
pub use matching::{match_keypoints, sort_keypoints, Matcher, Tolerance};
pub use render::RenderSink;
pub use store::{match_against_store, KeypointStore, MemoryStore};
pub use util::{KeystableError, KeystableResult};
