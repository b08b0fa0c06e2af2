use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::Array1;

use crate::config::{DecisionTreeParams, SplitCriterion};
use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError, Stage};
use crate::features::FeatureVector;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_training_set, to_records, Fitted, LabelEncoder};

/// CART decision tree from `linfa-trees`.
pub struct DecisionTreeClassifier {
    name: String,
    params: DecisionTreeParams,
    fitted: Option<Fitted<DecisionTree<f64, usize>>>,
}

impl DecisionTreeClassifier {
    pub fn new<S: Into<String>>(name: S, params: DecisionTreeParams) -> Self {
        DecisionTreeClassifier {
            name: name.into(),
            params,
            fitted: None,
        }
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn train(&mut self, samples: &SampleSet) -> Result<()> {
        self.fitted = None;
        let n_features = check_training_set(&self.name, samples)?;
        let records = to_records(samples.vectors(), n_features)?;
        let encoder = LabelEncoder::fit(samples.labels());
        let targets = Array1::from_vec(encoder.encode_all(samples.labels()));
        let dataset = Dataset::new(records, targets);

        let split_quality = match self.params.split_quality {
            SplitCriterion::Gini => SplitQuality::Gini,
            SplitCriterion::Entropy => SplitQuality::Entropy,
        };
        let model = DecisionTree::<f64, usize>::params()
            .split_quality(split_quality)
            .max_depth(self.params.max_depth)
            .min_weight_split(self.params.min_weight_split)
            .min_weight_leaf(self.params.min_weight_leaf)
            .fit(&dataset)
            .map_err(|e| SentimentError::model(&self.name, Stage::Train, e))?;

        log::debug!(
            "[{}] tree depth {} with {} leaves",
            self.name,
            model.max_depth(),
            model.num_leaves()
        );

        self.fitted = Some(Fitted {
            model,
            encoder,
            n_features,
        });
        Ok(())
    }

    fn predict_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<Label>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| SentimentError::not_trained(&self.name))?;
        let records = to_records(vectors, fitted.n_features)?;
        let classes: Array1<usize> = fitted.model.predict(&records);
        Ok(fitted.decode_all(classes.iter().copied()))
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    fn reset(&mut self) {
        self.fitted = None;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "decision_tree"
    }
}
