//! Shared numeric conventions for 1D signals.

/// Guard for every normalization division
pub const NORMALIZE_EPSILON: f64 = 1e-9;

/// Min-max normalize to [0, 1]
///
/// A zero-range signal maps to all zeros instead of dividing by zero.
pub fn normalize_unit_range(values: &[f64]) -> Vec<f64> {
    let (min, max) = value_range(values);
    let range = (max - min).max(NORMALIZE_EPSILON);
    values.iter().map(|v| (v - min) / range).collect()
}

/// (min, max) of the finite values; (0, 0) when there are none
pub fn value_range(values: &[f64]) -> (f64, f64) {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    let Some(first) = finite.next() else {
        return (0.0, 0.0);
    };
    finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// True when the signal has no usable spread
pub fn is_flat(values: &[f64]) -> bool {
    let (min, max) = value_range(values);
    max - min < NORMALIZE_EPSILON
}
