//! Multi-scale stability filtering.
//!
//! Detection runs once per kernel size. Keypoints are grouped by exact pixel
//! coordinate; a coordinate survives only if every scale detected it and each
//! of its three attributes stays within `STABILITY_EPSILON` of the cross-scale
//! mean. Survivors are emitted once, with averaged attributes, in row-major
//! order. Everything else is dropped without error.

use crate::detect::detect_keypoints;
use crate::image::PixelBuffer;
use crate::keypoint::Keypoint;
use crate::trace::{trace_event, trace_span};
use crate::util::math::mean;
use crate::util::{KeystableError, KeystableResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Maximum absolute deviation from the cross-scale mean, per attribute.
pub const STABILITY_EPSILON: f64 = 1.0;

/// Stable keypoints of `buffer` across `sizes`, detected sequentially.
pub fn filter_stable(
    buffer: &PixelBuffer,
    gradient_threshold: f64,
    sizes: &[usize],
    sigma: f64,
) -> KeystableResult<Vec<Keypoint>> {
    filter_stable_with(buffer, gradient_threshold, sizes, sigma, false)
}

pub(crate) fn filter_stable_with(
    buffer: &PixelBuffer,
    gradient_threshold: f64,
    sizes: &[usize],
    sigma: f64,
    parallel: bool,
) -> KeystableResult<Vec<Keypoint>> {
    if sizes.is_empty() {
        return Err(KeystableError::InvalidParameter {
            name: "sizes",
            reason: "at least one kernel size is required",
        });
    }
    let _span = trace_span!(
        "stability_filter",
        scales = sizes.len(),
        parallel = parallel
    )
    .entered();

    let per_scale = detect_per_scale(buffer, gradient_threshold, sizes, sigma, parallel)?;
    let candidates: usize = per_scale.iter().map(Vec::len).sum();
    let stable = merge_stable(per_scale, sizes.len());

    trace_event!(
        "stable_keypoints",
        count = stable.len(),
        candidates = candidates
    );
    Ok(stable)
}

#[cfg(feature = "rayon")]
fn detect_per_scale(
    buffer: &PixelBuffer,
    gradient_threshold: f64,
    sizes: &[usize],
    sigma: f64,
    parallel: bool,
) -> KeystableResult<Vec<Vec<Keypoint>>> {
    if parallel {
        return sizes
            .par_iter()
            .map(|&size| detect_keypoints(buffer, gradient_threshold, size, sigma))
            .collect();
    }
    detect_sequential(buffer, gradient_threshold, sizes, sigma)
}

#[cfg(not(feature = "rayon"))]
fn detect_per_scale(
    buffer: &PixelBuffer,
    gradient_threshold: f64,
    sizes: &[usize],
    sigma: f64,
    _parallel: bool,
) -> KeystableResult<Vec<Vec<Keypoint>>> {
    detect_sequential(buffer, gradient_threshold, sizes, sigma)
}

fn detect_sequential(
    buffer: &PixelBuffer,
    gradient_threshold: f64,
    sizes: &[usize],
    sigma: f64,
) -> KeystableResult<Vec<Vec<Keypoint>>> {
    sizes
        .iter()
        .map(|&size| detect_keypoints(buffer, gradient_threshold, size, sigma))
        .collect()
}

/// Groups per-scale detections by coordinate and keeps the stable ones.
pub(crate) fn merge_stable(per_scale: Vec<Vec<Keypoint>>, scales: usize) -> Vec<Keypoint> {
    // Keyed by (y, x) so output follows row-major order.
    let mut groups: BTreeMap<(usize, usize), Vec<Keypoint>> = BTreeMap::new();
    for kp in per_scale.into_iter().flatten() {
        groups.entry((kp.y, kp.x)).or_default().push(kp);
    }

    groups
        .into_iter()
        .filter(|(_, group)| group.len() >= scales)
        .filter_map(|((y, x), group)| average_if_stable(x, y, &group))
        .collect()
}

fn average_if_stable(x: usize, y: usize, group: &[Keypoint]) -> Option<Keypoint> {
    let descriptor_mean = mean(group.iter().map(|kp| kp.descriptor_mean))?;
    let gradient_magnitude = mean(group.iter().map(|kp| kp.gradient_magnitude))?;
    let gradient_orientation = mean(group.iter().map(|kp| kp.gradient_orientation))?;

    let stable = group.iter().all(|kp| {
        (kp.descriptor_mean - descriptor_mean).abs() < STABILITY_EPSILON
            && (kp.gradient_magnitude - gradient_magnitude).abs() < STABILITY_EPSILON
            && (kp.gradient_orientation - gradient_orientation).abs() < STABILITY_EPSILON
    });

    stable.then_some(Keypoint {
        x,
        y,
        descriptor_mean,
        gradient_magnitude,
        gradient_orientation,
    })
}

#[cfg(test)]
mod tests {
    use super::merge_stable;
    use crate::keypoint::Keypoint;

    fn kp(x: usize, y: usize, d: f64, m: f64, o: f64) -> Keypoint {
        Keypoint {
            x,
            y,
            descriptor_mean: d,
            gradient_magnitude: m,
            gradient_orientation: o,
        }
    }

    #[test]
    fn keeps_coordinates_seen_at_every_scale() {
        let per_scale = vec![
            vec![kp(3, 4, 10.0, 600.0, 45.0), kp(7, 1, 1.0, 1.0, 1.0)],
            vec![kp(3, 4, 10.5, 600.5, 45.5)],
            vec![kp(3, 4, 10.0, 600.0, 45.0)],
        ];
        let stable = merge_stable(per_scale, 3);
        assert_eq!(stable.len(), 1);
        let s = stable[0];
        assert_eq!((s.x, s.y), (3, 4));
        assert!((s.descriptor_mean - 61.0 / 6.0).abs() < 1e-12);
        assert!((s.gradient_magnitude - 1800.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn drops_groups_with_a_drifting_attribute() {
        let per_scale = vec![
            vec![kp(2, 2, 10.0, 600.0, 0.0)],
            vec![kp(2, 2, 10.0, 600.0, 0.0)],
            vec![kp(2, 2, 10.0, 600.0, 3.0)],
        ];
        // Orientation mean is 1.0; the last member deviates by 2.0.
        assert!(merge_stable(per_scale, 3).is_empty());
    }

    #[test]
    fn deviation_of_exactly_epsilon_is_unstable() {
        let per_scale = vec![
            vec![kp(1, 1, 0.0, 500.0, 0.0)],
            vec![kp(1, 1, 2.0, 500.0, 0.0)],
        ];
        assert!(merge_stable(per_scale, 2).is_empty());
    }

    #[test]
    fn output_is_row_major() {
        let per_scale = vec![vec![
            kp(5, 1, 0.0, 1.0, 0.0),
            kp(2, 3, 0.0, 1.0, 0.0),
            kp(1, 1, 0.0, 1.0, 0.0),
        ]];
        let coords: Vec<_> = merge_stable(per_scale, 1)
            .iter()
            .map(|k| (k.x, k.y))
            .collect();
        assert_eq!(coords, vec![(1, 1), (5, 1), (2, 3)]);
    }
}
