use crate::distance::helpers::coordinate_pairs;
use crate::distance::types::{Distance, Result};

/// Computes the Euclidean distance between two vectors.
///
/// # Examples
///
/// ```
/// use opforest_core::{DistanceError, euclidean_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = euclidean_distance(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0])?;
///     assert!((distance.value() - 7.071_068).abs() < 1e-6);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`DistanceError::ZeroLength`] when any input is empty.
/// - [`DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`DistanceError::NonFinite`] when a value is NaN or infinite.
///
/// [`DistanceError::ZeroLength`]: crate::DistanceError::ZeroLength
/// [`DistanceError::DimensionMismatch`]: crate::DistanceError::DimensionMismatch
/// [`DistanceError::NonFinite`]: crate::DistanceError::NonFinite
pub fn euclidean_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    Ok(Distance::new(squared_sum(left, right)?.sqrt() as f32))
}

/// Computes the squared Euclidean distance between two vectors.
///
/// Squaring preserves the ordering of Euclidean distances, so the bottleneck
/// forest built on it selects the same parents; costs differ by the square.
///
/// # Errors
///
/// Same as [`euclidean_distance`].
pub fn squared_euclidean_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    Ok(Distance::new(squared_sum(left, right)? as f32))
}

fn squared_sum(left: &[f32], right: &[f32]) -> Result<f64> {
    Ok(coordinate_pairs(left, right)?
        .map(|(l, r)| (l - r) * (l - r))
        .sum())
}
