use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::Svm;
use ndarray::Array1;

use crate::config::{SvmKernel, SvmParams};
use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError, Stage};
use crate::features::FeatureVector;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{argmax_rows, check_training_set, to_records, Fitted, LabelEncoder};

/// Binary SVMs with Platt-scaled probabilities.
///
/// Two labels are handled by one model scoring the second (sorted) label;
/// more labels use one model per label and the most probable wins. A
/// training set with a single label needs no model at all.
enum SvmModels {
    Constant,
    Binary(Svm<f64, Pr>),
    OneVsRest(Vec<Svm<f64, Pr>>),
}

pub struct SvmClassifier {
    name: String,
    params: SvmParams,
    fitted: Option<Fitted<SvmModels>>,
}

impl SvmClassifier {
    pub fn new<S: Into<String>>(name: S, params: SvmParams) -> Self {
        SvmClassifier {
            name: name.into(),
            params,
            fitted: None,
        }
    }

    fn fit_binary(&self, records: &ndarray::Array2<f64>, targets: Vec<bool>) -> Result<Svm<f64, Pr>> {
        let (c1, c2) = self.params.c;
        let params = Svm::<f64, Pr>::params()
            .eps(self.params.eps)
            .pos_neg_weights(c1, c2);

        // Chain the kernel configuration based on the kernel type
        let params = match self.params.kernel {
            SvmKernel::Linear => params.linear_kernel(),
            SvmKernel::Gauss { eps } => params.gaussian_kernel(eps),
            SvmKernel::Poly { constant, degree } => params.polynomial_kernel(constant, degree),
        };

        let dataset = Dataset::new(records.clone(), Array1::from_vec(targets));
        params
            .fit(&dataset)
            .map_err(|e| SentimentError::model(&self.name, Stage::Train, e))
    }
}

fn probabilities(model: &Svm<f64, Pr>, records: &ndarray::Array2<f64>) -> Vec<f64> {
    let probs: Array1<Pr> = model.predict(records);
    probs.iter().map(|p| **p as f64).collect()
}

impl ClassifierModel for SvmClassifier {
    fn train(&mut self, samples: &SampleSet) -> Result<()> {
        self.fitted = None;
        let n_features = check_training_set(&self.name, samples)?;
        let records = to_records(samples.vectors(), n_features)?;
        let encoder = LabelEncoder::fit(samples.labels());
        let classes = encoder.encode_all(samples.labels());

        let model = match encoder.n_classes() {
            1 => SvmModels::Constant,
            2 => SvmModels::Binary(
                self.fit_binary(&records, classes.iter().map(|&c| c == 1).collect())?,
            ),
            n => {
                let mut models = Vec::with_capacity(n);
                for class in 0..n {
                    log::debug!(
                        "[{}] fitting one-vs-rest model for '{}'",
                        self.name,
                        encoder.decode(class)
                    );
                    let targets = classes.iter().map(|&c| c == class).collect();
                    models.push(self.fit_binary(&records, targets)?);
                }
                SvmModels::OneVsRest(models)
            }
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

        let classes: Vec<usize> = match &fitted.model {
            SvmModels::Constant => vec![0; vectors.len()],
            SvmModels::Binary(model) => probabilities(model, &records)
                .into_iter()
                .map(|p| usize::from(p > 0.5))
                .collect(),
            SvmModels::OneVsRest(models) => {
                let scores: Vec<Vec<f64>> =
                    models.iter().map(|m| probabilities(m, &records)).collect();
                argmax_rows(&scores, vectors.len())
            }
        };
        Ok(fitted.decode_all(classes))
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
        "svm"
    }
}
