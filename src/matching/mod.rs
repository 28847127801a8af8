//! Tolerance-window keypoint matching.
//!
//! The reference set is sorted by `(gradient_magnitude, gradient_orientation,
//! descriptor_mean)` and each query takes the first reference point, in that
//! order, whose three attributes all fall inside the tolerance windows. Only
//! the query is reported; queries without a partner are left out.

pub mod sort;
mod tolerance;

pub use sort::{sort_keypoints, sorted_keypoints};
pub use tolerance::Tolerance;

use crate::keypoint::Keypoint;
use crate::trace::{trace_event, trace_span};

/// Matcher over a pre-sorted reference set.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    reference: Vec<Keypoint>,
    tolerance: Tolerance,
}

impl Matcher {
    /// Takes ownership of `reference` and sorts it.
    pub fn new(mut reference: Vec<Keypoint>) -> Self {
        sort_keypoints(&mut reference);
        Self {
            reference,
            tolerance: Tolerance::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Reference keypoints in sorted order.
    pub fn reference(&self) -> &[Keypoint] {
        &self.reference
    }

    /// First reference point, in sorted order, inside the tolerance of `query`.
    pub fn find(&self, query: &Keypoint) -> Option<&Keypoint> {
        self.reference
            .iter()
            .find(|point| self.tolerance.admits(point, query))
    }

    /// Queries that have at least one reference partner, in query order.
    pub fn match_queries(&self, queries: &[Keypoint]) -> Vec<Keypoint> {
        let _span = trace_span!(
            "match_keypoints",
            reference = self.reference.len(),
            queries = queries.len()
        )
        .entered();

        let matches: Vec<Keypoint> = queries
            .iter()
            .filter(|query| self.find(query).is_some())
            .copied()
            .collect();

        trace_event!("matches", count = matches.len(), queries = queries.len());
        matches
    }
}

/// Matches `queries` against `reference` with a one-off `Matcher`.
pub fn match_keypoints(
    reference: &[Keypoint],
    queries: &[Keypoint],
    tolerance: Tolerance,
) -> Vec<Keypoint> {
    Matcher::new(reference.to_vec())
        .with_tolerance(tolerance)
        .match_queries(queries)
}
