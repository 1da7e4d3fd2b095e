//! Deterministic synthetic datasets for classifier tests and benchmarks.

use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Feature rows paired with their class labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelledSamples {
    /// One feature vector per sample.
    pub features: Vec<Vec<f32>>,
    /// Class label of each sample.
    pub labels: Vec<i64>,
}

impl LabelledSamples {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Splits samples into `(train, test)` by alternating consecutive
    /// pairs: samples `0, 1` train, `2, 3` test, `4, 5` train, and so on.
    /// Both halves of a two-class interleaved dataset keep both classes.
    ///
    /// # Examples
    /// ```
    /// use opforest_test_support::datasets::two_clusters;
    ///
    /// let (train, test) = two_clusters(4, 1, 10.0, 1.0, 3).split_pairs();
    /// assert_eq!(train.labels, vec![0, 1, 0, 1]);
    /// assert_eq!(test.labels, vec![0, 1, 0, 1]);
    /// ```
    #[must_use]
    pub fn split_pairs(self) -> (Self, Self) {
        let mut train = Self::default();
        let mut test = Self::default();
        for (index, (row, label)) in self.features.into_iter().zip(self.labels).enumerate() {
            let target = if (index / 2) % 2 == 0 {
                &mut train
            } else {
                &mut test
            };
            target.features.push(row);
            target.labels.push(label);
        }
        (train, test)
    }
}

/// Two classes of `per_class` points each, scattered uniformly within
/// `spread` of centres placed `separation` apart along every axis.
///
/// Samples are interleaved by class (label `0`, then `1`, then `0`, ...).
///
/// # Examples
/// ```
/// use opforest_test_support::datasets::two_clusters;
///
/// let samples = two_clusters(20, 2, 100.0, 1.0, 7);
/// assert_eq!(samples.len(), 40);
/// assert_eq!(&samples.labels[..4], &[0, 1, 0, 1]);
/// ```
#[must_use]
pub fn two_clusters(
    per_class: usize,
    dimension: usize,
    separation: f32,
    spread: f32,
    seed: u64,
) -> LabelledSamples {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut samples = LabelledSamples::default();
    for _ in 0..per_class {
        for (label, centre) in [(0_i64, 0.0_f32), (1, separation)] {
            let row = (0..dimension)
                .map(|_| centre + rng.gen_range(-spread..=spread))
                .collect();
            samples.features.push(row);
            samples.labels.push(label);
        }
    }
    samples
}

/// `count` one-dimensional points at `0, 1, 2, ...` with labels chosen by
/// `label_of(index)`.
#[must_use]
pub fn unit_line(count: usize, label_of: impl Fn(usize) -> i64) -> LabelledSamples {
    let mut samples = LabelledSamples::default();
    let mut coordinate = 0.0_f32;
    for index in 0..count {
        samples.features.push(vec![coordinate]);
        samples.labels.push(label_of(index));
        coordinate += 1.0;
    }
    samples
}
