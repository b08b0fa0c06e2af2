//! sentivote-classifiers: ensemble sentiment classification for labelled
//! text corpora.
//!
//! Documents are reduced to binary word-presence vectors over a fixed
//! vocabulary ([`features`]), paired with their labels ([`data_handling`])
//! and fed to a [`VotingEnsemble`](ensemble::VotingEnsemble) of
//! heterogeneous classifiers ([`models`]) declared in an
//! [`EnsembleConfig`](config::EnsembleConfig). The [`metrics`],
//! [`learning_curve`] and [`report`] modules evaluate any
//! [`ClassifierModel`](models::ClassifierModel) through its public
//! predict interface.
pub mod config;
pub mod corpus;
pub mod data_handling;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod learning_curve;
pub mod metrics;
pub mod models;
pub mod report;

pub use error::{Result, SentimentError};
