//! Helpers shared by the model adapters: label encoding, record conversion
//! and the bookkeeping for a fitted model.
use ndarray::Array2;

use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError, Stage};
use crate::features::FeatureVector;

/// Dense class indices for a set of labels, in sorted label order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<Label>,
}

impl LabelEncoder {
    pub fn fit(labels: &[Label]) -> Self {
        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn encode(&self, label: &Label) -> Option<usize> {
        self.classes.binary_search(label).ok()
    }

    /// Encode labels the encoder was fitted on.
    pub fn encode_all(&self, labels: &[Label]) -> Vec<usize> {
        labels
            .iter()
            .map(|l| self.encode(l).unwrap_or_default())
            .collect()
    }

    /// Out-of-range indices decode to the last class.
    pub fn decode(&self, class: usize) -> Label {
        let idx = class.min(self.classes.len().saturating_sub(1));
        self.classes[idx].clone()
    }
}

/// Trained state of an adapter: the native model plus what is needed to
/// validate and decode predictions.
#[derive(Debug)]
pub(crate) struct Fitted<M> {
    pub model: M,
    pub encoder: LabelEncoder,
    pub n_features: usize,
}

impl<M> Fitted<M> {
    pub fn decode_all(&self, classes: impl IntoIterator<Item = usize>) -> Vec<Label> {
        classes.into_iter().map(|c| self.encoder.decode(c)).collect()
    }
}

/// Ensure a sample set can be trained on; returns its feature dimension.
pub(crate) fn check_training_set(name: &str, samples: &SampleSet) -> Result<usize> {
    if samples.is_empty() {
        return Err(SentimentError::model(
            name,
            Stage::Train,
            "training set is empty",
        ));
    }
    match samples.n_features() {
        Some(0) | None => Err(SentimentError::model(
            name,
            Stage::Train,
            "training samples have no features",
        )),
        Some(n) => Ok(n),
    }
}

pub(crate) fn check_dimensions(vectors: &[FeatureVector], n_features: usize) -> Result<()> {
    match vectors.iter().find(|v| v.len() != n_features) {
        Some(bad) => Err(SentimentError::DimensionMismatch {
            expected: n_features,
            got: bad.len(),
        }),
        None => Ok(()),
    }
}

/// Convert feature vectors into a dense 0/1 record matrix.
pub(crate) fn to_records(vectors: &[FeatureVector], n_features: usize) -> Result<Array2<f64>> {
    check_dimensions(vectors, n_features)?;
    Ok(Array2::from_shape_fn((vectors.len(), n_features), |(i, j)| {
        if vectors[i].as_slice()[j] {
            1.0
        } else {
            0.0
        }
    }))
}

/// Feature vectors as `f32` rows.
pub(crate) fn to_rows(vectors: &[FeatureVector], n_features: usize) -> Result<Vec<Vec<f32>>> {
    check_dimensions(vectors, n_features)?;
    Ok(vectors
        .iter()
        .map(|v| v.iter().map(|b| if b { 1.0 } else { 0.0 }).collect())
        .collect())
}

/// Per-row index of the highest score; `scores` holds one column per class.
/// The lowest class index wins ties.
pub(crate) fn argmax_rows(scores: &[Vec<f64>], n_rows: usize) -> Vec<usize> {
    (0..n_rows)
        .map(|row| {
            let mut best = 0;
            for class in 1..scores.len() {
                if scores[class][row] > scores[best][row] {
                    best = class;
                }
            }
            best
        })
        .collect()
}
