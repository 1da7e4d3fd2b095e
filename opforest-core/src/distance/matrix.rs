//! Dense row-major distance matrices.

use crate::error::DataError;

/// A dense `rows × cols` matrix of pairwise distances.
///
/// Pairwise matrices produced by [`crate::MetricChain::pairwise`] are square,
/// symmetric and carry zeros on the diagonal. Cross matrices produced by
/// [`crate::MetricChain::cross`] hold one row per query.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl DistanceMatrix {
    /// Builds a matrix from precomputed rows.
    ///
    /// An empty slice yields a `0 × 0` matrix.
    ///
    /// # Errors
    /// Returns [`DataError::RaggedRow`] when rows differ in length and
    /// [`DataError::NonFinite`] when an entry is NaN or infinite.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::DistanceMatrix;
    ///
    /// let matrix = DistanceMatrix::try_from_rows(&[[0.0, 2.0], [2.0, 0.0]])?;
    /// assert!(matrix.is_square());
    /// assert_eq!(matrix.get(0, 1), Some(2.0));
    /// # Ok::<(), opforest_core::DataError>(())
    /// ```
    pub fn try_from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, DataError> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut values = Vec::with_capacity(rows.len() * cols);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(DataError::RaggedRow {
                    row: row_index,
                    expected: cols,
                    actual: row.len(),
                });
            }
            if let Some((column, value)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(DataError::NonFinite {
                    row: row_index,
                    column,
                    value: *value,
                });
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            values,
        })
    }

    /// Assembles a matrix from already validated rows of equal length.
    pub(crate) fn from_row_vectors(rows: Vec<Vec<f32>>, cols: usize) -> Self {
        let row_count = rows.len();
        let values = rows.into_iter().flatten().collect();
        Self {
            rows: row_count,
            cols,
            values,
        }
    }

    /// Mirrors per-row upper triangles into a symmetric matrix with a zero
    /// diagonal. Row `i` of `upper` holds the distances to `i + 1..n`.
    pub(crate) fn from_upper_triangle(upper: &[Vec<f32>]) -> Self {
        let n = upper.len();
        let mut values = vec![0.0; n * n];
        for (i, row) in upper.iter().enumerate() {
            for (offset, &value) in row.iter().enumerate() {
                let j = i + 1 + offset;
                values[i * n + j] = value;
                values[j * n + i] = value;
            }
        }
        Self {
            rows: n,
            cols: n,
            values,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `true` when the matrix has as many rows as columns.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns the entry at `(row, col)` when both indices are in range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            self.values.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Returns row `index` when it exists.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        self.values.get(start..start + self.cols)
    }

    /// Iterates over rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on zero; an empty-column matrix has no entries.
        self.values.chunks_exact(self.cols.max(1))
    }

    /// Returns the row-major backing buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
