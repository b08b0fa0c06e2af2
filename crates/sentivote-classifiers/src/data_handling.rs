//! Labels, samples and sample sets shared by every classifier.
//!
//! A [`SampleSet`] keeps feature vectors and their ground-truth labels in
//! parallel, in a fixed order, so callers can split it deterministically into
//! train/test ranges or cross-validation folds.
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};
use crate::features::FeatureVector;

/// Sentiment category, e.g. `pos` or `neg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Label(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

/// A borrowed (feature vector, label) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub vector: &'a FeatureVector,
    pub label: &'a Label,
}

/// Ordered sequence of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    vectors: Vec<FeatureVector>,
    labels: Vec<Label>,
}

impl SampleSet {
    /// Pair `vectors` with `labels`.
    ///
    /// Both sequences must have the same length and every vector the same
    /// dimension.
    pub fn new(vectors: Vec<FeatureVector>, labels: Vec<Label>) -> Result<Self> {
        if vectors.len() != labels.len() {
            return Err(SentimentError::invalid_data(format!(
                "{} feature vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        if let Some(first) = vectors.first() {
            let expected = first.len();
            if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
                return Err(SentimentError::DimensionMismatch {
                    expected,
                    got: bad.len(),
                });
            }
        }
        Ok(Self { vectors, labels })
    }

    /// Lengths are already known to agree (vectors produced by one feature space).
    pub(crate) fn from_parts(vectors: Vec<FeatureVector>, labels: Vec<Label>) -> Self {
        debug_assert_eq!(vectors.len(), labels.len());
        Self { vectors, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Dimension of the feature vectors, `None` for an empty set.
    pub fn n_features(&self) -> Option<usize> {
        self.vectors.first().map(FeatureVector::len)
    }

    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, index: usize) -> Option<Sample<'_>> {
        Some(Sample {
            vector: self.vectors.get(index)?,
            label: self.labels.get(index)?,
        })
    }

    /// Samples in stored order; pairs are built on demand.
    pub fn iter(&self) -> impl Iterator<Item = Sample<'_>> + '_ {
        self.vectors
            .iter()
            .zip(self.labels.iter())
            .map(|(vector, label)| Sample { vector, label })
    }

    /// Split into `[0, mid)` and `[mid, len)`. `mid` is clamped to the length.
    pub fn split_at(&self, mid: usize) -> (SampleSet, SampleSet) {
        let mid = mid.min(self.len());
        (self.range(0..mid), self.range(mid..self.len()))
    }

    pub fn range(&self, range: Range<usize>) -> SampleSet {
        SampleSet {
            vectors: self.vectors[range.clone()].to_vec(),
            labels: self.labels[range].to_vec(),
        }
    }

    /// Copy the samples at `indices`, in the given order.
    pub fn subset(&self, indices: &[usize]) -> SampleSet {
        SampleSet {
            vectors: indices.iter().map(|&i| self.vectors[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }

    /// Number of samples per label, keyed in sorted label order.
    pub fn label_counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct labels in sorted order.
    pub fn distinct_labels(&self) -> Vec<Label> {
        self.label_counts().into_keys().collect()
    }

    /// Contiguous (train, test) pairs for k-fold cross validation.
    pub fn kfold(&self, k: usize) -> Result<Vec<(SampleSet, SampleSet)>> {
        let folds = kfold_ranges(self.len(), k)?;
        Ok(folds
            .into_iter()
            .map(|test| {
                let train_idx: Vec<usize> = (0..self.len())
                    .filter(|i| !test.contains(i))
                    .collect();
                (self.subset(&train_idx), self.range(test))
            })
            .collect())
    }
}

/// Partition `0..n` into `k` contiguous folds; the first `n % k` folds get
/// one extra element.
pub fn kfold_ranges(n: usize, k: usize) -> Result<Vec<Range<usize>>> {
    if k < 2 {
        return Err(SentimentError::invalid_data(format!(
            "k-fold needs at least 2 folds, got {k}"
        )));
    }
    if n < k {
        return Err(SentimentError::invalid_data(format!(
            "cannot split {n} samples into {k} folds"
        )));
    }
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    Ok((0..k)
        .map(|fold| {
            let size = base + usize::from(fold < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect())
}
