use std::panic::{catch_unwind, AssertUnwindSafe};

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;

use crate::config::GbdtParams;
use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError, Stage};
use crate::features::FeatureVector;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{argmax_rows, check_training_set, to_rows, Fitted, LabelEncoder};

/// Gradient Boosting Decision Tree (GBDT) classifier
///
/// Trains one log-likelihood booster per label (label = 1, rest = -1) and
/// predicts the label whose booster scores highest.
pub struct GbdtClassifier {
    name: String,
    params: GbdtParams,
    fitted: Option<Fitted<Vec<GBDT>>>,
}

impl GbdtClassifier {
    pub fn new<S: Into<String>>(name: S, params: GbdtParams) -> Self {
        GbdtClassifier {
            name: name.into(),
            params,
            fitted: None,
        }
    }

    fn config(&self, feature_size: usize) -> Config {
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.num_boost_round as usize);
        config.set_debug(self.params.debug);
        config.set_training_optimization_level(self.params.training_optimization_level);
        config.set_loss("LogLikelyhood");
        config
    }

    fn fit_one(&self, rows: &[Vec<f32>], targets: impl Iterator<Item = bool>) -> Result<GBDT> {
        let config = self.config(rows.first().map(Vec::len).unwrap_or_default());

        let mut train_x = DataVec::new();
        for (row, positive) in rows.iter().zip(targets) {
            let label = if positive { 1.0 } else { -1.0 };
            train_x.push(Data::new_training_data(row.clone(), 1.0, label, None));
        }

        // gbdt asserts on degenerate input instead of returning errors
        catch_unwind(AssertUnwindSafe(|| {
            let mut gbdt = GBDT::new(&config);
            gbdt.fit(&mut train_x);
            gbdt
        }))
        .map_err(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "gbdt panicked during fit".to_string());
            SentimentError::model(&self.name, Stage::Train, message)
        })
    }
}

impl ClassifierModel for GbdtClassifier {
    fn train(&mut self, samples: &SampleSet) -> Result<()> {
        self.fitted = None;
        let n_features = check_training_set(&self.name, samples)?;
        let rows = to_rows(samples.vectors(), n_features)?;
        let encoder = LabelEncoder::fit(samples.labels());
        let classes = encoder.encode_all(samples.labels());

        let mut boosters = Vec::new();
        if encoder.n_classes() > 1 {
            for class in 0..encoder.n_classes() {
                log::debug!(
                    "[{}] boosting {} rounds for '{}'",
                    self.name,
                    self.params.num_boost_round,
                    encoder.decode(class)
                );
                boosters.push(self.fit_one(&rows, classes.iter().map(|&c| c == class))?);
            }
        }

        self.fitted = Some(Fitted {
            model: boosters,
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
        let rows = to_rows(vectors, fitted.n_features)?;
        if fitted.model.is_empty() {
            return Ok(fitted.decode_all(vec![0; vectors.len()]));
        }

        let mut test_x = DataVec::new();
        for row in rows {
            test_x.push(Data::new_test_data(row, None));
        }
        let scores: Vec<Vec<f64>> = fitted
            .model
            .iter()
            .map(|gbdt| gbdt.predict(&test_x).into_iter().map(f64::from).collect())
            .collect();
        Ok(fitted.decode_all(argmax_rows(&scores, vectors.len())))
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
        "gbdt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(bits: &[u8]) -> FeatureVector {
        FeatureVector::new(bits.iter().map(|&b| b == 1).collect())
    }

    #[test]
    fn test_gbdt_classifier() {
        let mut vectors = Vec::new();
        let mut labels: Vec<Label> = Vec::new();
        for i in 0..10 {
            // label perfectly correlated with the first feature
            let pos = i % 2 == 0;
            vectors.push(fv(&[u8::from(pos), (i % 3 == 0) as u8, 1]));
            labels.push(if pos { "pos".into() } else { "neg".into() });
        }
        let samples = SampleSet::new(vectors, labels).unwrap();

        let params = GbdtParams {
            max_depth: 3,
            num_boost_round: 5,
            ..GbdtParams::default()
        };
        let mut classifier = GbdtClassifier::new("gbdt", params);
        classifier.train(&samples).unwrap();

        let predictions = classifier.predict_batch(samples.vectors()).unwrap();
        assert_eq!(predictions, samples.labels());
    }

    #[test]
    fn predict_before_train_fails() {
        let classifier = GbdtClassifier::new("gbdt", GbdtParams::default());
        assert!(matches!(
            classifier.predict(&fv(&[1, 0])),
            Err(SentimentError::NotTrained { name }) if name == "gbdt"
        ));
    }
}
