//! Input checks shared by the built-in metrics.

use super::types::{DistanceError, Result, VectorKind};

fn check_vector(values: &[f32], which: VectorKind) -> Result<()> {
    if values.is_empty() {
        return Err(DistanceError::ZeroLength);
    }
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(DistanceError::NonFinite {
            which,
            index,
            value: values.get(index).copied().unwrap_or(f32::NAN),
        }),
        None => Ok(()),
    }
}

/// Checks that both vectors are non-empty, finite and of equal length, then
/// yields their coordinates widened to `f64` for accumulation.
pub(crate) fn coordinate_pairs<'a>(
    left: &'a [f32],
    right: &'a [f32],
) -> Result<impl Iterator<Item = (f64, f64)> + 'a> {
    check_vector(left, VectorKind::Left)?;
    check_vector(right, VectorKind::Right)?;
    if left.len() != right.len() {
        return Err(DistanceError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left
        .iter()
        .zip(right)
        .map(|(&l, &r)| (f64::from(l), f64::from(r))))
}
