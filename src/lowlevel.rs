//! Building blocks for custom detection pipelines.
//!
//! Most users should prefer `Detector` and `Matcher`. These functions expose
//! each stage on its own: kernel generation, blur, per-pixel measurements,
//! single-scale scanning and stability merging.

pub use crate::detect::stability::STABILITY_EPSILON;
pub use crate::detect::{detect_keypoints, filter_stable, scan_keypoints, KeypointScan};
pub use crate::feature::{descriptor_mean, gradient_at, Gradient};
pub use crate::filter::blur::convolve;
pub use crate::filter::{gaussian_blur, GaussianKernel};
pub use crate::matching::sort::{attribute_cmp, sorted_keypoints};
pub use crate::store::{AttributeBounds, AttributeRange, StoredKeypoint};
