use crate::config::{ClassifierSpec, ModelType};
use crate::models::bayes::{GaussianNbClassifier, MultinomialNbClassifier};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::GbdtClassifier;
use crate::models::nearest::NearestMatchClassifier;
use crate::models::svm::SvmClassifier;
use crate::models::tree::DecisionTreeClassifier;

/// Build an untrained, boxed classifier from a configuration entry.
pub fn build_model(spec: &ClassifierSpec) -> Box<dyn ClassifierModel> {
    let name = spec.name.as_str();
    match &spec.model {
        ModelType::MultinomialNb(params) => {
            Box::new(MultinomialNbClassifier::new(name, params.clone()))
        }
        ModelType::GaussianNb(params) => Box::new(GaussianNbClassifier::new(name, params.clone())),
        ModelType::Svm(params) => Box::new(SvmClassifier::new(name, params.clone())),
        ModelType::DecisionTree(params) => {
            Box::new(DecisionTreeClassifier::new(name, params.clone()))
        }
        ModelType::Gbdt(params) => Box::new(GbdtClassifier::new(name, params.clone())),
        ModelType::NearestMatch => Box::new(NearestMatchClassifier::new(name)),
    }
}
