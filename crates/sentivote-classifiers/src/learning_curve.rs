//! Cross-validated learning curves.
//!
//! For every training size and every fold a fresh classifier is trained on the
//! first `size` samples of the fold's training part, then scored on that
//! training subset and on the held-out fold. The (size, fold) grid is
//! evaluated on the rayon pool.

use itertools_num::linspace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data_handling::SampleSet;
use crate::error::{Result, SentimentError};
use crate::metrics::accuracy;
use crate::models::classifier_trait::ClassifierModel;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LearningCurveOptions {
    /// Number of cross-validation folds.
    pub folds: usize,
    /// Number of training sizes, spaced evenly between `min_fraction` and 1.
    pub points: usize,
    /// Smallest training size as a fraction of the largest.
    pub min_fraction: f64,
}

impl Default for LearningCurveOptions {
    fn default() -> Self {
        LearningCurveOptions {
            folds: 5,
            points: 10,
            min_fraction: 0.05,
        }
    }
}

impl LearningCurveOptions {
    fn validate(&self) -> Result<()> {
        if self.points == 0 {
            return Err(SentimentError::config("learning curve needs at least one point"));
        }
        if !(self.min_fraction > 0.0 && self.min_fraction <= 1.0) {
            return Err(SentimentError::config(format!(
                "min_fraction must be in (0, 1], got {}",
                self.min_fraction
            )));
        }
        Ok(())
    }
}

/// Accuracy scores indexed `[size][fold]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningCurve {
    pub name: String,
    pub train_sizes: Vec<usize>,
    pub train_scores: Vec<Vec<f64>>,
    pub test_scores: Vec<Vec<f64>>,
}

impl LearningCurve {
    pub fn train_mean(&self) -> Vec<f64> {
        self.train_scores.iter().map(|s| s.iter().mean()).collect()
    }

    pub fn train_std(&self) -> Vec<f64> {
        self.train_scores
            .iter()
            .map(|s| s.iter().population_std_dev())
            .collect()
    }

    pub fn test_mean(&self) -> Vec<f64> {
        self.test_scores.iter().map(|s| s.iter().mean()).collect()
    }

    pub fn test_std(&self) -> Vec<f64> {
        self.test_scores
            .iter()
            .map(|s| s.iter().population_std_dev())
            .collect()
    }
}

/// Distinct absolute training sizes for `max_size` available samples.
pub fn train_sizes(max_size: usize, options: &LearningCurveOptions) -> Vec<usize> {
    let mut sizes: Vec<usize> = linspace(options.min_fraction, 1.0, options.points)
        .map(|fraction| ((fraction * max_size as f64).round() as usize).clamp(1, max_size))
        .collect();
    sizes.dedup();
    sizes
}

/// Compute a learning curve for classifiers produced by `build`.
///
/// `build` is called once per (size, fold) cell so no trained state is
/// shared between cells.
pub fn learning_curve<F>(
    name: &str,
    build: F,
    samples: &SampleSet,
    options: &LearningCurveOptions,
) -> Result<LearningCurve>
where
    F: Fn() -> Box<dyn ClassifierModel> + Sync,
{
    options.validate()?;
    let folds = samples.kfold(options.folds)?;
    let max_size = folds
        .iter()
        .map(|(train, _)| train.len())
        .min()
        .unwrap_or_default();
    let sizes = train_sizes(max_size, options);
    log::debug!("[{}] learning curve sizes {:?}", name, sizes);

    let cells: Vec<(usize, usize)> = (0..sizes.len())
        .flat_map(|s| (0..folds.len()).map(move |f| (s, f)))
        .collect();

    let scores: Vec<(f64, f64)> = cells
        .par_iter()
        .map(|&(s, f)| {
            let (train, test) = &folds[f];
            let subset = train.range(0..sizes[s]);
            let mut model = build();
            model.train(&subset)?;
            let fitted = model.predict_batch(subset.vectors())?;
            let held_out = model.predict_batch(test.vectors())?;
            let train_score = accuracy(subset.labels(), &fitted)?;
            let test_score = accuracy(test.labels(), &held_out)?;
            Ok((train_score, test_score))
        })
        .collect::<Result<_>>()?;

    let mut curve = LearningCurve {
        name: name.to_string(),
        train_sizes: sizes.clone(),
        train_scores: vec![Vec::with_capacity(folds.len()); sizes.len()],
        test_scores: vec![Vec::with_capacity(folds.len()); sizes.len()],
    };
    for (&(s, _), (train_score, test_score)) in cells.iter().zip(scores) {
        curve.train_scores[s].push(train_score);
        curve.test_scores[s].push(test_score);
    }
    Ok(curve)
}
