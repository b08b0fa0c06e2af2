//! Error types for sentivote-classifiers.
//!
//! Every fallible operation in the crate returns [`Result`], whose error is
//! the [`SentimentError`] enum. Variants carry the sub-classifier name and
//! the stage that failed so callers can tell which component broke.

use std::fmt;
use std::io;

use thiserror::Error;

/// Stage of a classifier's lifecycle in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Train,
    Predict,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Train => write!(f, "training"),
            Stage::Predict => write!(f, "prediction"),
        }
    }
}

/// A single sub-classifier's training failure, collected by the ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingFailure {
    pub name: String,
    pub message: String,
}

impl fmt::Display for TrainingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum SentimentError {
    /// Malformed or inconsistent ensemble/feature configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Prediction requested before training
    #[error("classifier '{name}' has not been trained")]
    NotTrained { name: String },

    /// Prediction requested from an ensemble without sub-classifiers
    #[error("ensemble has no sub-classifiers to vote")]
    EmptyEnsemble,

    /// One or more sub-classifiers failed to train
    #[error(
        "training failed for {} sub-classifier(s): {}",
        .failures.len(),
        join_failures(.failures)
    )]
    Training { failures: Vec<TrainingFailure> },

    /// A single adapter failed inside its underlying learning algorithm
    #[error("classifier '{name}' failed during {stage}: {message}")]
    Model {
        name: String,
        stage: Stage,
        message: String,
    },

    #[error("feature vector has {got} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SentimentError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SentimentError::Config(msg.into())
    }

    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        SentimentError::InvalidData(msg.into())
    }

    pub fn not_trained<S: Into<String>>(name: S) -> Self {
        SentimentError::NotTrained { name: name.into() }
    }

    pub fn model<N: Into<String>, M: ToString>(name: N, stage: Stage, message: M) -> Self {
        SentimentError::Model {
            name: name.into(),
            stage,
            message: message.to_string(),
        }
    }
}

fn join_failures(failures: &[TrainingFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SentimentError>;
