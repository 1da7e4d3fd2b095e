use crate::distance::helpers::coordinate_pairs;
use crate::distance::types::{Distance, DistanceError, Result, VectorKind};

/// Computes the cosine distance (`1 - cosine similarity`) between two vectors.
///
/// # Examples
///
/// ```
/// use opforest_core::{DistanceError, cosine_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let orthogonal = cosine_distance(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0])?;
///     assert!((orthogonal.value() - 1.0).abs() < 1e-6);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`DistanceError::ZeroLength`] when any input is empty.
/// - [`DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`DistanceError::NonFinite`] when a value is NaN or infinite.
/// - [`DistanceError::ZeroMagnitude`] when either vector has zero L2 norm.
pub fn cosine_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    let mut dot = 0.0f64;
    let mut left_squares = 0.0f64;
    let mut right_squares = 0.0f64;
    for (l, r) in coordinate_pairs(left, right)? {
        dot += l * r;
        left_squares += l * l;
        right_squares += r * r;
    }

    if left_squares == 0.0 {
        return Err(DistanceError::ZeroMagnitude {
            which: VectorKind::Left,
        });
    }
    if right_squares == 0.0 {
        return Err(DistanceError::ZeroMagnitude {
            which: VectorKind::Right,
        });
    }

    let similarity = dot / (left_squares.sqrt() * right_squares.sqrt());
    // Theoretical range is [-1, 1], but numerical noise can spill over.
    let similarity = similarity.clamp(-1.0, 1.0);

    Ok(Distance::new((1.0 - similarity) as f32))
}
