//! Total ordering of keypoints by their matching attributes.

use crate::keypoint::Keypoint;
use std::cmp::Ordering;

/// Ascending by magnitude, then orientation, then descriptor mean.
pub fn attribute_cmp(a: &Keypoint, b: &Keypoint) -> Ordering {
    a.gradient_magnitude
        .total_cmp(&b.gradient_magnitude)
        .then_with(|| a.gradient_orientation.total_cmp(&b.gradient_orientation))
        .then_with(|| a.descriptor_mean.total_cmp(&b.descriptor_mean))
}

/// Sorts in place; points with equal attributes keep their relative order.
pub fn sort_keypoints(keypoints: &mut [Keypoint]) {
    keypoints.sort_by(attribute_cmp);
}

/// Returns `keypoints` sorted by `attribute_cmp`.
pub fn sorted_keypoints(mut keypoints: Vec<Keypoint>) -> Vec<Keypoint> {
    sort_keypoints(&mut keypoints);
    keypoints
}
