use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError};
use crate::features::FeatureVector;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_dimensions, check_training_set};

/// Baseline 1-nearest-neighbour classifier over Hamming distance.
///
/// Predicts the label of the closest training vector; on equal distance the
/// earliest training sample wins.
pub struct NearestMatchClassifier {
    name: String,
    prototypes: Option<SampleSet>,
}

impl NearestMatchClassifier {
    pub fn new<S: Into<String>>(name: S) -> Self {
        NearestMatchClassifier {
            name: name.into(),
            prototypes: None,
        }
    }
}

impl ClassifierModel for NearestMatchClassifier {
    fn train(&mut self, samples: &SampleSet) -> Result<()> {
        self.prototypes = None;
        check_training_set(&self.name, samples)?;
        self.prototypes = Some(samples.clone());
        Ok(())
    }

    fn predict_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<Label>> {
        let prototypes = self
            .prototypes
            .as_ref()
            .ok_or_else(|| SentimentError::not_trained(&self.name))?;
        check_dimensions(vectors, prototypes.n_features().unwrap_or_default())?;

        Ok(vectors
            .iter()
            .map(|query| {
                prototypes
                    .iter()
                    .min_by_key(|s| s.vector.hamming(query))
                    .map(|s| s.label.clone())
                    .unwrap_or_else(|| prototypes.labels()[0].clone())
            })
            .collect())
    }

    fn is_trained(&self) -> bool {
        self.prototypes.is_some()
    }

    fn reset(&mut self) {
        self.prototypes = None;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "nearest_match"
    }
}
