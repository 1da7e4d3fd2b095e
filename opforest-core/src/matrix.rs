//! Dense row-major feature storage shared by training and classification.

use crate::error::DataError;

/// Validated dense matrix of `f32` feature vectors.
///
/// Every row has the same positive dimension and every value is finite.
///
/// # Examples
/// ```
/// use opforest_core::FeatureMatrix;
///
/// let matrix = FeatureMatrix::try_from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0]])?;
/// assert_eq!(matrix.rows(), 2);
/// assert_eq!(matrix.dimension(), 2);
/// assert_eq!(matrix.row(1), Some(&[2.0, 3.0][..]));
/// # Ok::<(), opforest_core::DataError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    dimension: usize,
    values: Vec<f32>,
}

impl FeatureMatrix {
    /// Builds a matrix from a flat row-major buffer.
    ///
    /// # Errors
    /// Returns [`DataError::EmptyData`] when `rows == 0`,
    /// [`DataError::ZeroDimension`] when `dimension == 0`,
    /// [`DataError::ValueCountMismatch`] when the buffer length is not
    /// `rows * dimension`, and [`DataError::NonFinite`] for NaN or infinite
    /// values.
    pub fn try_new(rows: usize, dimension: usize, values: Vec<f32>) -> Result<Self, DataError> {
        if rows == 0 {
            return Err(DataError::EmptyData);
        }
        if dimension == 0 {
            return Err(DataError::ZeroDimension);
        }
        if rows.checked_mul(dimension) != Some(values.len()) {
            return Err(DataError::ValueCountMismatch {
                rows,
                dimension,
                values: values.len(),
            });
        }
        if let Some(position) = values.iter().position(|value| !value.is_finite()) {
            return Err(DataError::NonFinite {
                row: position / dimension,
                column: position % dimension,
                value: values[position],
            });
        }
        Ok(Self {
            rows,
            dimension,
            values,
        })
    }

    /// Builds a matrix by copying nested rows.
    ///
    /// # Errors
    /// Returns [`DataError::EmptyData`] for an empty slice,
    /// [`DataError::ZeroDimension`] when the first row is empty,
    /// [`DataError::RaggedRow`] when a row's length differs from the first
    /// row's, and [`DataError::NonFinite`] for NaN or infinite values.
    pub fn try_from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, DataError> {
        let Some((first, rest)) = rows.split_first() else {
            return Err(DataError::EmptyData);
        };
        let dimension = first.as_ref().len();
        if dimension == 0 {
            return Err(DataError::ZeroDimension);
        }
        for (offset, row) in rest.iter().enumerate() {
            let actual = row.as_ref().len();
            if actual != dimension {
                return Err(DataError::RaggedRow {
                    row: offset + 1,
                    expected: dimension,
                    actual,
                });
            }
        }
        let mut values = Vec::with_capacity(rows.len().saturating_mul(dimension));
        for row in rows {
            values.extend_from_slice(row.as_ref());
        }
        Self::try_new(rows.len(), dimension, values)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the dimensionality of each row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the underlying row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Returns row `index`, or `None` when out of bounds.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dimension;
        self.values.get(start..start + self.dimension)
    }

    /// Iterates over rows in order.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.values.chunks_exact(self.dimension)
    }

    /// Copies the rows back into nested vectors.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.iter_rows().map(<[f32]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn try_from_rows_copies_values_in_order() {
        let matrix = FeatureMatrix::try_from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])
            .expect("uniform rows must be accepted");
        assert_eq!(matrix.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(matrix.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn try_from_rows_reports_first_ragged_row() {
        let err = FeatureMatrix::try_from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0]])
            .expect_err("ragged rows must fail");
        assert_eq!(
            err,
            DataError::RaggedRow {
                row: 2,
                expected: 2,
                actual: 1
            }
        );
    }

    #[rstest]
    #[case::empty(0, 2, vec![], DataError::EmptyData)]
    #[case::zero_dimension(2, 0, vec![], DataError::ZeroDimension)]
    #[case::short_buffer(2, 2, vec![1.0; 3], DataError::ValueCountMismatch { rows: 2, dimension: 2, values: 3 })]
    fn try_new_rejects_malformed_buffers(
        #[case] rows: usize,
        #[case] dimension: usize,
        #[case] values: Vec<f32>,
        #[case] expected: DataError,
    ) {
        let err = FeatureMatrix::try_new(rows, dimension, values).expect_err("buffer is malformed");
        assert_eq!(err, expected);
    }

    #[test]
    fn try_new_locates_non_finite_values() {
        let err = FeatureMatrix::try_new(2, 3, vec![0.0, 0.0, 0.0, 0.0, f32::INFINITY, 0.0])
            .expect_err("infinite values must fail");
        assert!(matches!(
            err,
            DataError::NonFinite {
                row: 1,
                column: 1,
                value
            } if value.is_infinite()
        ));
    }

    #[test]
    fn row_returns_none_out_of_bounds() {
        let matrix = FeatureMatrix::try_from_rows(&[[1.0_f32]]).expect("single row is valid");
        assert_eq!(matrix.row(0), Some(&[1.0][..]));
        assert_eq!(matrix.row(1), None);
    }
}
