//! Naive Bayes adapters backed by `linfa-bayes`.
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_bayes::{GaussianNb, MultinomialNb};
use ndarray::{Array1, Array2, Axis};

use crate::config::{GaussianNbParams, MultinomialNbParams};
use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError, Stage};
use crate::features::FeatureVector;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_training_set, to_records, Fitted, LabelEncoder};

fn encoded_dataset(samples: &SampleSet, n_features: usize) -> Result<(Array2<f64>, Array1<usize>, LabelEncoder)> {
    let records = to_records(samples.vectors(), n_features)?;
    let encoder = LabelEncoder::fit(samples.labels());
    let targets = Array1::from_vec(encoder.encode_all(samples.labels()));
    Ok((records, targets, encoder))
}

/// Multinomial naive Bayes over word-present counts.
pub struct MultinomialNbClassifier {
    name: String,
    params: MultinomialNbParams,
    fitted: Option<Fitted<MultinomialNb<f64, usize>>>,
}

impl MultinomialNbClassifier {
    pub fn new<S: Into<String>>(name: S, params: MultinomialNbParams) -> Self {
        MultinomialNbClassifier {
            name: name.into(),
            params,
            fitted: None,
        }
    }
}

impl ClassifierModel for MultinomialNbClassifier {
    fn train(&mut self, samples: &SampleSet) -> Result<()> {
        self.fitted = None;
        let n_features = check_training_set(&self.name, samples)?;
        let (records, targets, encoder) = encoded_dataset(samples, n_features)?;
        let dataset = Dataset::new(records, targets);

        let model = MultinomialNb::<f64, usize>::params()
            .alpha(self.params.alpha)
            .fit(&dataset)
            .map_err(|e| SentimentError::model(&self.name, Stage::Train, e))?;

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
        "multinomial_nb"
    }
}

/// With no spread in any feature linfa smooths the variances by zero and the
/// likelihoods turn into NaN; only the class priors are left to decide then.
enum GaussianModel {
    Majority(usize),
    Fitted(GaussianNb<f64, usize>),
}

fn majority_class(targets: &Array1<usize>, n_classes: usize) -> usize {
    let mut counts = vec![0usize; n_classes];
    for &class in targets {
        counts[class] += 1;
    }
    // max_by_key keeps the last maximum, so walk backwards to favour the first class
    (0..n_classes).rev().max_by_key(|&c| counts[c]).unwrap_or(0)
}

/// Gaussian naive Bayes; treats each 0/1 feature as normally distributed.
pub struct GaussianNbClassifier {
    name: String,
    params: GaussianNbParams,
    fitted: Option<Fitted<GaussianModel>>,
}

impl GaussianNbClassifier {
    pub fn new<S: Into<String>>(name: S, params: GaussianNbParams) -> Self {
        GaussianNbClassifier {
            name: name.into(),
            params,
            fitted: None,
        }
    }
}

impl ClassifierModel for GaussianNbClassifier {
    fn train(&mut self, samples: &SampleSet) -> Result<()> {
        self.fitted = None;
        let n_features = check_training_set(&self.name, samples)?;
        let (records, targets, encoder) = encoded_dataset(samples, n_features)?;
        let spread = records
            .var_axis(Axis(0), 0.0)
            .iter()
            .fold(0.0_f64, |acc, &v| acc.max(v));

        let model = if spread > 0.0 {
            let dataset = Dataset::new(records, targets);
            GaussianModel::Fitted(
                GaussianNb::<f64, usize>::params()
                    .var_smoothing(self.params.var_smoothing)
                    .fit(&dataset)
                    .map_err(|e| SentimentError::model(&self.name, Stage::Train, e))?,
            )
        } else {
            log::warn!(
                "[{}] every feature is constant over {} samples; predicting the most frequent label",
                self.name,
                samples.len()
            );
            GaussianModel::Majority(majority_class(&targets, encoder.n_classes()))
        };

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
        match &fitted.model {
            GaussianModel::Majority(class) => {
                Ok(fitted.decode_all(std::iter::repeat(*class).take(records.nrows())))
            }
            GaussianModel::Fitted(model) => {
                let classes: Array1<usize> = model.predict(&records);
                Ok(fitted.decode_all(classes.iter().copied()))
            }
        }
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
        "gaussian_nb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> SampleSet {
        let rows: [(&[u8], &str); 6] = [
            (&[1, 1, 0, 0], "pos"),
            (&[1, 0, 0, 0], "pos"),
            (&[0, 1, 0, 0], "pos"),
            (&[0, 0, 1, 1], "neg"),
            (&[0, 0, 1, 0], "neg"),
            (&[0, 0, 0, 1], "neg"),
        ];
        SampleSet::new(
            rows.iter()
                .map(|(bits, _)| FeatureVector::new(bits.iter().map(|&b| b == 1).collect()))
                .collect(),
            rows.iter().map(|(_, l)| Label::from(*l)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn multinomial_separates_toy_data() {
        let mut clf = MultinomialNbClassifier::new("mnb", MultinomialNbParams::default());
        clf.train(&toy()).unwrap();
        let q = FeatureVector::new(vec![true, true, false, false]);
        assert_eq!(clf.predict(&q).unwrap(), Label::from("pos"));
        let q = FeatureVector::new(vec![false, false, true, true]);
        assert_eq!(clf.predict(&q).unwrap(), Label::from("neg"));
    }

    #[test]
    fn gaussian_predicts_batch_in_order() {
        let mut clf = GaussianNbClassifier::new("gnb", GaussianNbParams::default());
        let samples = toy();
        clf.train(&samples).unwrap();
        let preds = clf
            .predict_batch(&[
                FeatureVector::new(vec![true, true, false, false]),
                FeatureVector::new(vec![false, false, true, true]),
            ])
            .unwrap();
        assert_eq!(preds, vec![Label::from("pos"), Label::from("neg")]);
    }

    #[test]
    fn gaussian_falls_back_to_majority_without_spread() {
        let row = FeatureVector::new(vec![true, false, true]);
        let samples = SampleSet::new(
            vec![row.clone(), row.clone(), row.clone()],
            vec![Label::from("pos"), Label::from("neg"), Label::from("pos")],
        )
        .unwrap();
        let mut clf = GaussianNbClassifier::new("gnb", GaussianNbParams::default());
        clf.train(&samples).unwrap();
        let preds = clf
            .predict_batch(&[row, FeatureVector::new(vec![false, true, false])])
            .unwrap();
        assert_eq!(preds, vec![Label::from("pos"), Label::from("pos")]);
    }

    #[test]
    fn gaussian_trains_on_one_sample() {
        let samples = SampleSet::new(
            vec![FeatureVector::new(vec![true, false, true])],
            vec![Label::from("neg")],
        )
        .unwrap();
        let mut clf = GaussianNbClassifier::new("gnb", GaussianNbParams::default());
        clf.train(&samples).unwrap();
        let q = FeatureVector::new(vec![false, true, false]);
        assert_eq!(clf.predict(&q).unwrap(), Label::from("neg"));
    }

    #[test]
    fn majority_ties_go_to_first_class() {
        assert_eq!(majority_class(&Array1::from_vec(vec![1, 0, 1, 0]), 2), 0);
        assert_eq!(majority_class(&Array1::from_vec(vec![1, 1, 0]), 2), 1);
    }

    #[test]
    fn untrained_and_reset_fail() {
        let mut clf = MultinomialNbClassifier::new("mnb", MultinomialNbParams::default());
        let q = FeatureVector::new(vec![true, false, false, false]);
        assert!(matches!(clf.predict(&q), Err(SentimentError::NotTrained { .. })));
        clf.train(&toy()).unwrap();
        assert!(clf.is_trained());
        clf.reset();
        assert!(matches!(clf.predict(&q), Err(SentimentError::NotTrained { .. })));
    }
}
