//! The set of class labels seen during training and the reserved sentinel
//! that stands for "unknown".

use crate::error::{OpfError, Result};

/// Default distance between the smallest real label and the sentinel.
pub const DEFAULT_SENTINEL_MARGIN: i64 = 999;

/// Sorted distinct training labels plus the unknown-label sentinel.
///
/// # Examples
/// ```
/// use opforest_core::LabelUniverse;
///
/// let universe = LabelUniverse::from_labels(&[3, 1, 3, 2], 999)?;
/// assert_eq!(universe.labels(), &[1, 2, 3]);
/// assert_eq!(universe.unknown(), -998);
/// assert!(!universe.contains(universe.unknown()));
/// # Ok::<(), opforest_core::OpfError>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LabelUniverse {
    labels: Vec<i64>,
    unknown: i64,
    margin: i64,
}

impl LabelUniverse {
    /// Collects the distinct labels and places the sentinel at
    /// `min(labels) - margin`.
    ///
    /// # Errors
    /// - [`OpfError::EmptyTrainingSet`] when `labels` is empty.
    /// - [`OpfError::InvalidSentinelMargin`] when `margin < 1`.
    /// - [`OpfError::SentinelOverflow`] when the subtraction overflows.
    /// - [`OpfError::LabelCollision`] if the sentinel equals a real label.
    pub fn from_labels(labels: &[i64], margin: i64) -> Result<Self> {
        if margin < 1 {
            return Err(OpfError::InvalidSentinelMargin { got: margin });
        }
        let mut distinct = labels.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        let Some(&min_label) = distinct.first() else {
            return Err(OpfError::EmptyTrainingSet);
        };
        let unknown = min_label
            .checked_sub(margin)
            .ok_or(OpfError::SentinelOverflow { min_label, margin })?;
        Self::from_parts(distinct, unknown, margin)
    }

    /// Rebuilds a universe from persisted parts, re-checking that the
    /// sentinel lies outside the label set.
    ///
    /// # Errors
    /// Returns [`OpfError::LabelCollision`] when `unknown` is one of `labels`.
    pub(crate) fn from_parts(labels: Vec<i64>, unknown: i64, margin: i64) -> Result<Self> {
        if labels.binary_search(&unknown).is_ok() {
            return Err(OpfError::LabelCollision { sentinel: unknown });
        }
        Ok(Self {
            labels,
            unknown,
            margin,
        })
    }

    /// Distinct labels in ascending order.
    #[must_use]
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Number of distinct classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.labels.len()
    }

    /// The reserved "unknown" label.
    #[must_use]
    pub fn unknown(&self) -> i64 {
        self.unknown
    }

    /// The margin the sentinel was derived with.
    #[must_use]
    pub fn margin(&self) -> i64 {
        self.margin
    }

    /// Returns `true` when `label` was observed in training.
    #[must_use]
    pub fn contains(&self, label: i64) -> bool {
        self.labels.binary_search(&label).is_ok()
    }
}
