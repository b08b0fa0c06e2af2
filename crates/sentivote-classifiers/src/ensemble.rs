//! Weighted plurality voting over heterogeneous sub-classifiers.
//!
//! A [`VotingEnsemble`] owns its sub-classifiers in declaration order. Every
//! member is trained on the same [`SampleSet`]; a prediction polls each member
//! and returns the label with the largest total vote weight. Ties go to the
//! tied label that the earliest-declared member voted for.

use std::time::Instant;

use rayon::prelude::*;

use crate::config::EnsembleConfig;
use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError, TrainingFailure};
use crate::features::FeatureVector;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::build_model;

struct Member {
    name: String,
    weight: f64,
    model: Box<dyn ClassifierModel>,
}

impl Member {
    fn train(&mut self, samples: &SampleSet) -> std::result::Result<(), TrainingFailure> {
        let start_time = Instant::now();
        let outcome = self.model.train(samples);
        match outcome {
            Ok(()) => {
                log::info!("[{}] trained in {:?}", self.name, start_time.elapsed());
                Ok(())
            }
            Err(err) => {
                let message = match err {
                    SentimentError::Model { message, .. } => message,
                    other => other.to_string(),
                };
                log::warn!("[{}] training failed: {}", self.name, message);
                Err(TrainingFailure {
                    name: self.name.clone(),
                    message,
                })
            }
        }
    }
}

/// Ensemble of named sub-classifiers combined by weighted plurality vote.
pub struct VotingEnsemble {
    members: Vec<Member>,
    parallel: bool,
    trained: bool,
}

impl Default for VotingEnsemble {
    fn default() -> Self {
        VotingEnsemble::new(true)
    }
}

impl VotingEnsemble {
    /// Name under which the ensemble itself appears in reports.
    pub const NAME: &'static str = "voting";

    /// An ensemble without members; add them with [`VotingEnsemble::push`].
    pub fn new(parallel: bool) -> Self {
        VotingEnsemble {
            members: Vec::new(),
            parallel,
            trained: false,
        }
    }

    /// Instantiate one untrained adapter per configured entry, keeping the
    /// declared order.
    pub fn from_config(config: &EnsembleConfig) -> Result<Self> {
        config.validate()?;
        let mut ensemble = VotingEnsemble::new(config.parallel_training);
        for spec in &config.classifiers {
            ensemble.push(spec.name.clone(), spec.weight, build_model(spec))?;
        }
        if ensemble.is_empty() {
            log::warn!("ensemble configuration declares no classifiers");
        }
        Ok(ensemble)
    }

    /// Append a sub-classifier. Names must be unique and weights positive.
    ///
    /// Adding a member invalidates earlier training.
    pub fn push<S: Into<String>>(
        &mut self,
        name: S,
        weight: f64,
        model: Box<dyn ClassifierModel>,
    ) -> Result<()> {
        let name = name.into();
        if self.members.iter().any(|m| m.name == name) {
            return Err(SentimentError::config(format!(
                "duplicate classifier name '{}'",
                name
            )));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(SentimentError::config(format!(
                "classifier '{}' has invalid weight {}; weights must be positive",
                name, weight
            )));
        }
        self.trained = false;
        self.members.push(Member {
            name,
            weight,
            model,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn parallel_training(&self) -> bool {
        self.parallel
    }

    /// Sub-classifier names in declared order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Sub-classifiers in declared order.
    pub fn sub_classifiers(&self) -> impl Iterator<Item = (&str, &dyn ClassifierModel)> + '_ {
        self.members
            .iter()
            .map(|m| (m.name.as_str(), m.model.as_ref()))
    }

    pub fn sub_classifier(&self, name: &str) -> Option<&dyn ClassifierModel> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.model.as_ref())
    }

    pub fn weight(&self, name: &str) -> Option<f64> {
        self.members.iter().find(|m| m.name == name).map(|m| m.weight)
    }

    /// The ensemble followed by every sub-classifier, for reports and plots.
    pub fn classifiers(&self) -> Vec<(&str, &dyn ClassifierModel)> {
        let mut all: Vec<(&str, &dyn ClassifierModel)> =
            vec![(Self::NAME, self as &dyn ClassifierModel)];
        all.extend(self.sub_classifiers());
        all
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.members.is_empty() {
            return Err(SentimentError::EmptyEnsemble);
        }
        if !self.trained {
            return Err(SentimentError::not_trained(Self::NAME));
        }
        Ok(())
    }

    /// Individual predictions per input: `result[i][j]` is the vote of the
    /// j-th declared member for `vectors[i]`.
    pub fn votes_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<Vec<Label>>> {
        self.ensure_ready()?;
        let mut rows: Vec<Vec<Label>> = (0..vectors.len())
            .map(|_| Vec::with_capacity(self.members.len()))
            .collect();
        for member in &self.members {
            let labels = member.model.predict_batch(vectors)?;
            if labels.len() != vectors.len() {
                return Err(SentimentError::invalid_data(format!(
                    "classifier '{}' returned {} labels for {} inputs",
                    member.name,
                    labels.len(),
                    vectors.len()
                )));
            }
            for (row, label) in rows.iter_mut().zip(labels) {
                row.push(label);
            }
        }
        Ok(rows)
    }

    /// Each member's prediction for one vector, as `(name, label)` pairs in
    /// declared order.
    pub fn votes(&self, vector: &FeatureVector) -> Result<Vec<(&str, Label)>> {
        let row = self
            .votes_batch(std::slice::from_ref(vector))?
            .pop()
            .unwrap_or_default();
        Ok(self.names().zip(row).collect())
    }

    /// Winning label and its share of the total vote weight.
    pub fn predict_with_confidence(&self, vector: &FeatureVector) -> Result<(Label, f64)> {
        let row = self
            .votes_batch(std::slice::from_ref(vector))?
            .pop()
            .unwrap_or_default();
        self.tally(&row).ok_or(SentimentError::EmptyEnsemble)
    }

    /// Weighted plurality over one row of votes in declared order.
    fn tally(&self, row: &[Label]) -> Option<(Label, f64)> {
        let mut totals: Vec<(&Label, f64)> = Vec::new();
        for (label, member) in row.iter().zip(&self.members) {
            match totals.iter_mut().find(|(l, _)| *l == label) {
                Some((_, total)) => *total += member.weight,
                None => totals.push((label, member.weight)),
            }
        }
        let total_weight: f64 = totals.iter().map(|(_, w)| w).sum();

        // strict comparison keeps the first-voted label on ties
        let mut best: Option<(&Label, f64)> = None;
        for (label, weight) in totals {
            if best.map_or(true, |(_, w)| weight > w) {
                best = Some((label, weight));
            }
        }
        log::trace!("vote {:?} -> {:?}", row, best);
        best.map(|(label, weight)| (label.clone(), weight / total_weight))
    }

    fn share_of(&self, row: &[Label], positive: &Label) -> f64 {
        let total: f64 = self.members.iter().map(|m| m.weight).sum();
        let for_positive: f64 = row
            .iter()
            .zip(&self.members)
            .filter(|(label, _)| *label == positive)
            .map(|(_, m)| m.weight)
            .sum();
        for_positive / total
    }
}

impl ClassifierModel for VotingEnsemble {
    /// Train every member on `samples`.
    ///
    /// All members are attempted even when some fail. On any failure every
    /// member is reset and the collected failures are returned together.
    fn train(&mut self, samples: &SampleSet) -> Result<()> {
        self.trained = false;
        if self.members.is_empty() {
            log::warn!("training an ensemble without sub-classifiers");
            self.trained = true;
            return Ok(());
        }

        log::info!(
            "Training {} sub-classifiers on {} samples{}",
            self.members.len(),
            samples.len(),
            if self.parallel { " in parallel" } else { "" }
        );
        let start_time = Instant::now();

        let outcomes: Vec<std::result::Result<(), TrainingFailure>> = if self.parallel {
            self.members
                .par_iter_mut()
                .map(|member| member.train(samples))
                .collect()
        } else {
            self.members
                .iter_mut()
                .map(|member| member.train(samples))
                .collect()
        };

        let failures: Vec<TrainingFailure> =
            outcomes.into_iter().filter_map(|o| o.err()).collect();
        if !failures.is_empty() {
            self.reset();
            return Err(SentimentError::Training { failures });
        }

        self.trained = true;
        log::info!("Ensemble training completed in {:?}", start_time.elapsed());
        Ok(())
    }

    fn predict_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<Label>> {
        self.votes_batch(vectors)?
            .iter()
            .map(|row| {
                self.tally(row)
                    .map(|(label, _)| label)
                    .ok_or(SentimentError::EmptyEnsemble)
            })
            .collect()
    }

    /// Share of the total vote weight cast for `positive`.
    fn decision_scores(&self, vectors: &[FeatureVector], positive: &Label) -> Result<Vec<f64>> {
        Ok(self
            .votes_batch(vectors)?
            .iter()
            .map(|row| self.share_of(row, positive))
            .collect())
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn reset(&mut self) {
        for member in &mut self.members {
            member.model.reset();
        }
        self.trained = false;
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> &str {
        Self::NAME
    }
}
