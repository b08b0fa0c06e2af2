use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError, Stage};
use crate::features::FeatureVector;

/// Uniform train/predict contract over every learning algorithm.
///
/// Adapters are created untrained. `train` replaces any previous fit
/// entirely; predicting before a successful `train` returns
/// [`SentimentError::NotTrained`]. Prediction never mutates trained state,
/// so it may be called repeatedly from report and plotting code.
pub trait ClassifierModel: Send + Sync {
    /// Fit the model on `samples`, discarding earlier training.
    fn train(&mut self, samples: &SampleSet) -> Result<()>;

    /// Predict one label per vector, in input order.
    fn predict_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<Label>>;

    fn predict(&self, vector: &FeatureVector) -> Result<Label> {
        self.predict_batch(std::slice::from_ref(vector))?
            .pop()
            .ok_or_else(|| SentimentError::model(self.name(), Stage::Predict, "no label returned"))
    }

    /// Score per vector for ROC analysis; higher means more `positive`.
    ///
    /// The default is the hard prediction: 1.0 when the predicted label is
    /// `positive`, 0.0 otherwise.
    fn decision_scores(&self, vectors: &[FeatureVector], positive: &Label) -> Result<Vec<f64>> {
        Ok(self
            .predict_batch(vectors)?
            .iter()
            .map(|l| if l == positive { 1.0 } else { 0.0 })
            .collect())
    }

    fn is_trained(&self) -> bool;

    /// Drop trained state.
    fn reset(&mut self);

    /// Name used in reports.
    fn name(&self) -> &str;

    /// Algorithm kind, as written in the ensemble configuration.
    fn kind(&self) -> &str;
}
