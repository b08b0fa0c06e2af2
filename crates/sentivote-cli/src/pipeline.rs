use anyhow::{Context, Result};
use sentivote_classifiers::corpus::{Document, ReviewCorpus, ReviewDataset};
use sentivote_classifiers::data_handling::{Label, SampleSet};
use sentivote_classifiers::ensemble::VotingEnsemble;
use sentivote_classifiers::features::FeatureSpace;
use sentivote_classifiers::metrics::accuracy;
use sentivote_classifiers::models::ClassifierModel;

use crate::input::RunSettings;

/// Load, shuffle and featurize the review corpus.
pub fn load_dataset(settings: &RunSettings) -> Result<ReviewDataset> {
    let mut corpus = ReviewCorpus::from_dir(&settings.corpus)
        .with_context(|| format!("Failed to load corpus from {:?}", settings.corpus))?;
    corpus.shuffle(settings.seed);
    log::info!("Categories: {:?}", corpus.label_counts());

    let dataset = ReviewDataset::new(corpus, &settings.feature_options())?;
    log::info!("Using {} features", dataset.features().len());
    Ok(dataset)
}

/// First `train_size` samples for training, the rest held out.
pub fn split(settings: &RunSettings, samples: &SampleSet) -> Result<(SampleSet, SampleSet)> {
    let (train, test) = samples.split_at(settings.train_size);
    if train.is_empty() || test.is_empty() {
        anyhow::bail!(
            "A train size of {} leaves no {} samples out of {}",
            settings.train_size,
            if train.is_empty() { "training" } else { "held-out" },
            samples.len()
        );
    }
    Ok((train, test))
}

/// An ensemble trained on the training split, the vocabulary its inputs were
/// extracted with, and the held-out samples.
pub struct TrainedRun {
    pub ensemble: VotingEnsemble,
    pub feature_space: FeatureSpace,
    pub train: SampleSet,
    pub test: SampleSet,
}

impl TrainedRun {
    /// Classify raw review text through the run's own vocabulary.
    pub fn classify_text(&self, text: &str) -> Result<Label> {
        let vector = self.feature_space.extract(&Document::from_text(text));
        Ok(self.ensemble.predict(&vector)?)
    }

    pub fn train_accuracy(&self) -> Result<f64> {
        let predicted = self.ensemble.predict_batch(self.train.vectors())?;
        Ok(accuracy(self.train.labels(), &predicted)?)
    }

    pub fn test_accuracy(&self) -> Result<f64> {
        let predicted = self.ensemble.predict_batch(self.test.vectors())?;
        Ok(accuracy(self.test.labels(), &predicted)?)
    }
}

pub fn train_ensemble(settings: &RunSettings, dataset: &ReviewDataset) -> Result<TrainedRun> {
    let config = settings.ensemble_config()?;
    log::debug!("Ensemble configuration:\n{}", config.to_json_pretty()?);
    let mut ensemble = VotingEnsemble::from_config(&config)?;
    let (train, test) = split(settings, dataset.get_samples())?;

    log::info!(
        "Creating classifiers: {} training / {} held-out samples",
        train.len(),
        test.len()
    );
    ensemble
        .train(&train)
        .context("Failed to train the voting ensemble")?;

    Ok(TrainedRun {
        ensemble,
        feature_space: dataset.feature_space().clone(),
        train,
        test,
    })
}
