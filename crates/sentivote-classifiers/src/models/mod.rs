//! Classifier adapters.
//!
//! Each submodule wraps one learning algorithm behind the
//! [`ClassifierModel`](classifier_trait::ClassifierModel) trait;
//! [`factory::build_model`] turns a configuration entry into a boxed adapter.
pub mod bayes;
pub mod gbdt;
pub mod nearest;
pub mod svm;
pub mod tree;
pub mod utils;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::ClassifierModel;
pub use factory::build_model;
