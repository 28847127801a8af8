//! Keypoint persistence contract and an in-memory table.
//!
//! A store holds one record type: the three matching attributes of a keypoint
//! plus a synthetic identifier. Pixel coordinates are not persisted. Queries
//! combine three independent range predicates, one per attribute, so a
//! store-backed match agrees with `Matcher` on which queries have a partner.
//!
//! With the `persist` feature, `MemoryStore` snapshots to and from JSON files.

use crate::keypoint::Keypoint;
use crate::matching::Tolerance;
use crate::trace::{trace_event, trace_span};
use crate::util::math::within;
use crate::util::{KeystableError, KeystableResult};
#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "persist")]
use std::path::Path;

const STORE: &str = "keypoint store";

/// Persisted keypoint attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct StoredKeypoint {
    pub id: u64,
    pub gradient_magnitude: f64,
    pub gradient_orientation: f64,
    pub descriptor_mean: f64,
}

/// Open interval `(center - tolerance, center + tolerance)`, plus `center`
/// itself when the tolerance is zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeRange {
    pub center: f64,
    pub tolerance: f64,
}

impl AttributeRange {
    pub fn contains(&self, value: f64) -> bool {
        within(value, self.center, self.tolerance)
    }
}

/// Conjunction of one range per attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeBounds {
    pub gradient_magnitude: AttributeRange,
    pub gradient_orientation: AttributeRange,
    pub descriptor_mean: AttributeRange,
}

impl AttributeBounds {
    /// Tolerance windows centered on `query`.
    pub fn around(query: &Keypoint, tolerance: &Tolerance) -> Self {
        Self {
            gradient_magnitude: AttributeRange {
                center: query.gradient_magnitude,
                tolerance: tolerance.gradient_magnitude,
            },
            gradient_orientation: AttributeRange {
                center: query.gradient_orientation,
                tolerance: tolerance.gradient_orientation,
            },
            descriptor_mean: AttributeRange {
                center: query.descriptor_mean,
                tolerance: tolerance.descriptor_mean,
            },
        }
    }

    pub fn contains(&self, row: &StoredKeypoint) -> bool {
        self.gradient_magnitude.contains(row.gradient_magnitude)
            && self.gradient_orientation.contains(row.gradient_orientation)
            && self.descriptor_mean.contains(row.descriptor_mean)
    }
}

/// Structured keypoint storage.
///
/// Failures are reported as `CollaboratorFailure` and are not retried.
pub trait KeypointStore {
    /// Creates the keypoint table if it does not exist.
    fn create_schema(&mut self) -> KeystableResult<()>;

    /// Appends `keypoints`, assigning fresh identifiers; returns the count.
    fn insert_many(&mut self, keypoints: &[Keypoint]) -> KeystableResult<usize>;

    /// Rows whose attributes all fall inside `bounds`, in insertion order.
    fn query_within_tolerance(
        &self,
        bounds: &AttributeBounds,
    ) -> KeystableResult<Vec<StoredKeypoint>>;
}

/// In-memory keypoint table.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct MemoryStore {
    #[cfg_attr(feature = "persist", serde(skip, default = "schema_present"))]
    schema: bool,
    next_id: u64,
    rows: Vec<StoredKeypoint>,
}

#[cfg(feature = "persist")]
fn schema_present() -> bool {
    true
}

impl MemoryStore {
    /// Empty store without a schema; call `create_schema` before inserting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with the schema already created.
    pub fn with_schema() -> Self {
        Self {
            schema: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[StoredKeypoint] {
        &self.rows
    }

    fn require_schema(&self) -> KeystableResult<()> {
        if self.schema {
            Ok(())
        } else {
            Err(KeystableError::collaborator(STORE, "schema not created"))
        }
    }

    /// Loads a JSON snapshot, or starts an empty store if `path` is absent.
    #[cfg(feature = "persist")]
    pub fn open<P: AsRef<Path>>(path: P) -> KeystableResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::with_schema());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|err| KeystableError::collaborator(STORE, err))?;
        serde_json::from_str(&text).map_err(|err| KeystableError::collaborator(STORE, err))
    }

    /// Writes a JSON snapshot to `path`.
    #[cfg(feature = "persist")]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> KeystableResult<()> {
        self.require_schema()?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| KeystableError::collaborator(STORE, err))?;
        std::fs::write(path, json).map_err(|err| KeystableError::collaborator(STORE, err))
    }
}

impl KeypointStore for MemoryStore {
    fn create_schema(&mut self) -> KeystableResult<()> {
        self.schema = true;
        Ok(())
    }

    fn insert_many(&mut self, keypoints: &[Keypoint]) -> KeystableResult<usize> {
        self.require_schema()?;
        self.rows.reserve(keypoints.len());
        for kp in keypoints {
            self.next_id += 1;
            self.rows.push(StoredKeypoint {
                id: self.next_id,
                gradient_magnitude: kp.gradient_magnitude,
                gradient_orientation: kp.gradient_orientation,
                descriptor_mean: kp.descriptor_mean,
            });
        }
        Ok(keypoints.len())
    }

    fn query_within_tolerance(
        &self,
        bounds: &AttributeBounds,
    ) -> KeystableResult<Vec<StoredKeypoint>> {
        self.require_schema()?;
        Ok(self
            .rows
            .iter()
            .filter(|row| bounds.contains(row))
            .copied()
            .collect())
    }
}

/// Queries with at least one stored partner inside `tolerance`, in query order.
pub fn match_against_store<S: KeypointStore + ?Sized>(
    store: &S,
    queries: &[Keypoint],
    tolerance: &Tolerance,
) -> KeystableResult<Vec<Keypoint>> {
    let _span = trace_span!("match_store", queries = queries.len()).entered();
    let mut matches = Vec::new();
    for query in queries {
        let bounds = AttributeBounds::around(query, tolerance);
        if !store.query_within_tolerance(&bounds)?.is_empty() {
            matches.push(*query);
        }
    }
    trace_event!("matches", count = matches.len(), queries = queries.len());
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::{KeypointStore, MemoryStore};
    use crate::keypoint::Keypoint;
    use crate::util::KeystableError;

    #[test]
    fn insert_requires_schema() {
        let mut store = MemoryStore::new();
        let kp = Keypoint {
            x: 1,
            y: 1,
            descriptor_mean: 1.0,
            gradient_magnitude: 2.0,
            gradient_orientation: 3.0,
        };
        assert!(matches!(
            store.insert_many(&[kp]),
            Err(KeystableError::CollaboratorFailure { .. })
        ));
        store.create_schema().unwrap();
        assert_eq!(store.insert_many(&[kp, kp]).unwrap(), 2);
        let ids: Vec<u64> = store.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
