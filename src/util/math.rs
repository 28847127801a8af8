//! Numeric helpers shared by the detector and the matcher.

/// Converts radians to degrees.
#[inline]
pub(crate) fn rad_to_deg(angle_rad: f64) -> f64 {
    angle_rad.to_degrees()
}

/// Arithmetic mean of `values`, or `None` for an empty iterator.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Returns true when `|a - b| < tolerance`, or when `a == b` exactly.
///
/// The equality clause lets a zero tolerance act as an exact-match window.
#[inline]
pub(crate) fn within(a: f64, b: f64, tolerance: f64) -> bool {
    let diff = (a - b).abs();
    diff < tolerance || diff == 0.0
}

/// Rounds and clamps an accumulated channel value into `u8`.
///
/// Half-way values round to even.
#[inline]
pub(crate) fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}
