//! Evaluation metrics over predicted labels.
//!
//! Everything here consumes plain label slices (ground truth first, then
//! predictions) so that any [`ClassifierModel`](crate::models::ClassifierModel)
//! output can be scored, including the voting ensemble itself.

use std::fmt;

use linfa::dataset::Pr;
use linfa::metrics::{BinaryClassification, ToConfusionMatrix};
use ndarray::Array1;

use crate::data_handling::Label;
use crate::error::{Result, SentimentError};

fn check_lengths(truth: &[Label], predicted: &[Label]) -> Result<()> {
    if truth.len() != predicted.len() {
        return Err(SentimentError::invalid_data(format!(
            "{} true labels but {} predictions",
            truth.len(),
            predicted.len()
        )));
    }
    Ok(())
}

fn metric_error(e: linfa::Error) -> SentimentError {
    SentimentError::invalid_data(format!("metric evaluation failed: {}", e))
}

/// Share of `observed` equal to `target`, scored as the accuracy of a linfa
/// confusion matrix against a constant ground truth. 0.0 when nothing matches
/// or `observed` is empty.
fn share_matching<L: linfa::Label>(observed: Vec<L>, target: L) -> Result<f64> {
    let expected = Array1::from_elem(observed.len(), target);
    let observed = Array1::from(observed);
    let share = observed
        .confusion_matrix(&expected)
        .map_err(metric_error)?
        .accuracy();
    // linfa drops pairs whose truth is not among the observed classes
    Ok(if share.is_nan() { 0.0 } else { f64::from(share) })
}

/// Fraction of predictions equal to the truth; 0.0 for no samples.
pub fn accuracy(truth: &[Label], predicted: &[Label]) -> Result<f64> {
    check_lengths(truth, predicted)?;
    let hits: Vec<bool> = truth.iter().zip(predicted).map(|(t, p)| t == p).collect();
    share_matching(hits, true)
}

/// Predictions made for samples whose truth is `label` (recall side) or
/// truths of samples predicted as `label` (precision side).
fn paired_with<'a>(keys: &'a [Label], values: &'a [Label], label: &Label) -> Vec<&'a str> {
    keys.iter()
        .zip(values)
        .filter(|(k, _)| *k == label)
        .map(|(_, v)| v.as_str())
        .collect()
}

/// Counts of (true label, predicted label) pairs for display.
///
/// Rows are true labels, columns predicted labels, both in sorted order over
/// every label seen on either side. Scores come from [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: Vec<Label>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        check_lengths(truth, predicted)?;
        let mut labels: Vec<Label> = truth.iter().chain(predicted).cloned().collect();
        labels.sort();
        labels.dedup();

        let n = labels.len();
        let mut counts = vec![vec![0; n]; n];
        for (t, p) in truth.iter().zip(predicted) {
            // both labels were collected above
            if let (Ok(i), Ok(j)) = (labels.binary_search(t), labels.binary_search(p)) {
                counts[i][j] += 1;
            }
        }
        Ok(ConfusionMatrix { labels, counts })
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Raw counts, `rows()[truth][predicted]`.
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn count(&self, truth: &Label, predicted: &Label) -> usize {
        match (
            self.labels.binary_search(truth),
            self.labels.binary_search(predicted),
        ) {
            (Ok(i), Ok(j)) => self.counts[i][j],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.as_str().len())
            .chain(self.counts.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(4);

        write!(f, "{:>width$}", "", width = width)?;
        for label in &self.labels {
            write!(f, " {:>width$}", label.as_str(), width = width)?;
        }
        writeln!(f, "   <- predicted")?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{:>width$}", label.as_str(), width = width)?;
            for count in row {
                write!(f, " {:>width$}", count, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-label precision, recall, F1 and support plus overall accuracy and
/// macro / support-weighted averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub per_label: Vec<LabelMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub support: usize,
}

impl ClassificationReport {
    /// Scores every label seen in `truth` or `predicted`, in sorted order.
    pub fn new(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        check_lengths(truth, predicted)?;
        let mut labels: Vec<&Label> = truth.iter().chain(predicted).collect();
        labels.sort();
        labels.dedup();

        let per_label = labels
            .into_iter()
            .map(|label| {
                let recall = share_matching(paired_with(truth, predicted, label), label.as_str())?;
                let precision =
                    share_matching(paired_with(predicted, truth, label), label.as_str())?;
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                Ok(LabelMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support: truth.iter().filter(|t| *t == label).count(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let support = truth.len();
        let n = per_label.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: per_label.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: per_label.iter().map(|m| m.recall).sum::<f64>() / n,
            f1: per_label.iter().map(|m| m.f1).sum::<f64>() / n,
        };
        let weighted = |value: fn(&LabelMetrics) -> f64| {
            if support == 0 {
                return 0.0;
            }
            per_label
                .iter()
                .map(|m| value(m) * m.support as f64)
                .sum::<f64>()
                / support as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
        };

        Ok(ClassificationReport {
            accuracy: accuracy(truth, predicted)?,
            per_label,
            macro_avg,
            weighted_avg,
            support,
        })
    }

    pub fn get(&self, label: &Label) -> Option<&LabelMetrics> {
        self.per_label.iter().find(|m| &m.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_label
            .iter()
            .map(|m| m.label.as_str().len())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support",
            width = width
        )?;
        writeln!(f)?;
        for m in &self.per_label {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support,
                width = width
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.support,
            width = width
        )?;
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.support,
                width = width
            )?;
        }
        Ok(())
    }
}

/// Receiver operating characteristic for one positive label.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Score threshold at each point; the first is `+inf`.
    pub thresholds: Vec<f64>,
    area: f64,
}

impl RocCurve {
    /// Area under the curve by the trapezoidal rule.
    pub fn auc(&self) -> f64 {
        self.area
    }
}

// linfa only emits the (0, 0) corner when the lowest score is above zero, so
// scores in [0, 1] are moved into (0.5, 1] before ranking.
fn to_probability(score: f64) -> Result<Pr> {
    if !(0.0..=1.0).contains(&score) {
        return Err(SentimentError::invalid_data(format!(
            "score {} is outside [0, 1]",
            score
        )));
    }
    Pr::try_from((0.5 + score / 2.0) as f32)
        .map_err(|p| SentimentError::invalid_data(format!("{} is not a probability", p)))
}

fn from_probability(p: f32) -> f64 {
    2.0 * (f64::from(p) - 0.5)
}

/// ROC points at every distinct score, highest first.
///
/// Scores must lie in `[0, 1]`. Fails when `truth` has no positive or no
/// negative sample, since one of the rates is undefined then.
pub fn roc_curve(truth: &[Label], scores: &[f64], positive: &Label) -> Result<RocCurve> {
    if truth.len() != scores.len() {
        return Err(SentimentError::invalid_data(format!(
            "{} true labels but {} scores",
            truth.len(),
            scores.len()
        )));
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(SentimentError::invalid_data("scores contain NaN"));
    }
    let n_pos = truth.iter().filter(|l| *l == positive).count();
    let n_neg = truth.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(SentimentError::invalid_data(format!(
            "ROC needs both '{}' and other samples ({} positive, {} negative)",
            positive, n_pos, n_neg
        )));
    }

    let probabilities = scores
        .iter()
        .map(|&s| to_probability(s))
        .collect::<Result<Vec<Pr>>>()?;
    let is_positive: Vec<bool> = truth.iter().map(|l| l == positive).collect();
    let roc = probabilities
        .as_slice()
        .roc(is_positive.as_slice())
        .map_err(metric_error)?;

    // linfa ranks upwards and counts the samples below each threshold; the
    // complements give the rates at or above it
    let mut curve = RocCurve {
        fpr: Vec::new(),
        tpr: Vec::new(),
        thresholds: vec![f64::INFINITY],
        area: f64::from(roc.area_under_curve()),
    };
    for (tp_below, fp_below) in roc.get_curve().into_iter().rev() {
        curve.tpr.push(1.0 - f64::from(tp_below));
        curve.fpr.push(1.0 - f64::from(fp_below));
    }
    curve
        .thresholds
        .extend(roc.get_thresholds().into_iter().rev().map(from_probability));
    Ok(curve)
}
