//! Coordinate-wise metrics: city block, Chebyshev, Canberra and Bray–Curtis.

use crate::distance::helpers::coordinate_pairs;
use crate::distance::types::{Distance, DistanceError, Result};

/// Computes the city block (Manhattan, L1) distance.
///
/// # Examples
/// ```
/// use opforest_core::cityblock_distance;
///
/// let distance = cityblock_distance(&[1.0, 2.0], &[4.0, 6.0])?;
/// assert_eq!(distance.value(), 7.0);
/// # Ok::<(), opforest_core::DistanceError>(())
/// ```
///
/// # Errors
///
/// Returns [`DistanceError::ZeroLength`], [`DistanceError::DimensionMismatch`]
/// or [`DistanceError::NonFinite`] for invalid inputs.
pub fn cityblock_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    let sum: f64 = coordinate_pairs(left, right)?.map(|(l, r)| (l - r).abs()).sum();
    Ok(Distance::new(sum as f32))
}

/// Computes the Chebyshev (L∞) distance.
///
/// # Errors
///
/// Returns [`DistanceError::ZeroLength`], [`DistanceError::DimensionMismatch`]
/// or [`DistanceError::NonFinite`] for invalid inputs.
pub fn chebyshev_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    let max = coordinate_pairs(left, right)?
        .map(|(l, r)| (l - r).abs())
        .fold(0.0f64, f64::max);
    Ok(Distance::new(max as f32))
}

/// Computes the Canberra distance.
///
/// Coordinates where both values are zero contribute nothing.
///
/// # Errors
///
/// Returns [`DistanceError::ZeroLength`], [`DistanceError::DimensionMismatch`]
/// or [`DistanceError::NonFinite`] for invalid inputs.
pub fn canberra_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    let sum: f64 = coordinate_pairs(left, right)?
        .map(|(l, r)| {
            let denominator = l.abs() + r.abs();
            if denominator == 0.0 {
                0.0
            } else {
                (l - r).abs() / denominator
            }
        })
        .sum();
    Ok(Distance::new(sum as f32))
}

/// Computes the Bray–Curtis dissimilarity `Σ|l - r| / Σ|l + r|`.
///
/// # Errors
///
/// Returns [`DistanceError::ZeroDenominator`] when `Σ|l + r|` is zero, in
/// addition to the usual input validation errors.
pub fn braycurtis_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    let (numerator, denominator) = coordinate_pairs(left, right)?.fold(
        (0.0f64, 0.0f64),
        |(numerator, denominator), (l, r)| {
            (numerator + (l - r).abs(), denominator + (l + r).abs())
        },
    );
    if denominator == 0.0 {
        return Err(DistanceError::ZeroDenominator {
            metric: "braycurtis",
        });
    }
    Ok(Distance::new((numerator / denominator) as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![0.0_f32, 0.0], vec![3.0_f32, -4.0], 4.0_f32)]
    #[case(vec![1.0_f32, 1.0, 1.0], vec![1.0_f32, 1.0, 1.0], 0.0_f32)]
    fn chebyshev_takes_largest_coordinate_gap(
        #[case] left: Vec<f32>,
        #[case] right: Vec<f32>,
        #[case] expected: f32,
    ) {
        let distance = chebyshev_distance(&left, &right).expect("valid input");
        assert!((distance.value() - expected).abs() < 1e-6);
    }

    #[test]
    fn canberra_skips_double_zero_coordinates() {
        let distance = canberra_distance(&[0.0, 1.0], &[0.0, 3.0]).expect("valid input");
        assert!((distance.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn braycurtis_rejects_zero_denominator() {
        let err = braycurtis_distance(&[0.0, 0.0], &[0.0, 0.0]).expect_err("undefined");
        assert_eq!(
            err,
            DistanceError::ZeroDenominator {
                metric: "braycurtis"
            }
        );
    }

    #[test]
    fn braycurtis_matches_reference_value() {
        // |1-2| + |2-4| = 3 over |1+2| + |2+4| = 9.
        let distance = braycurtis_distance(&[1.0, 2.0], &[2.0, 4.0]).expect("valid input");
        assert!((distance.value() - 1.0 / 3.0).abs() < 1e-6);
    }
}
