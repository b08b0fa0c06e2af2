use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use sentivote_classifiers::config::EnsembleConfig;
use sentivote_classifiers::features::FeatureOptions;
use sentivote_classifiers::learning_curve::LearningCurveOptions;

pub const DEFAULT_ENSEMBLE_FILE: &str = "voting.json";

/// Settings shared by every subcommand, resolved from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub corpus: PathBuf,
    /// Explicit ensemble file; `None` means the default file, if present.
    pub ensemble: Option<PathBuf>,
    pub vocabulary_size: usize,
    pub train_size: usize,
    pub seed: u64,
    pub output: Option<PathBuf>,
    pub only: Vec<String>,
    pub positive: Option<String>,
    pub learning: LearningCurveOptions,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            corpus: PathBuf::from("movie_reviews"),
            ensemble: None,
            vocabulary_size: 3000,
            train_size: 1900,
            seed: 42,
            output: None,
            only: Vec::new(),
            positive: None,
            learning: LearningCurveOptions::default(),
        }
    }
}

impl RunSettings {
    /// Apply the arguments present on a subcommand over the defaults.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut settings = RunSettings::default();

        if let Some(corpus) = try_get::<PathBuf>(matches, "corpus") {
            settings.corpus = corpus.clone();
        }
        if !settings.corpus.is_dir() {
            anyhow::bail!("Corpus directory does not exist: {:?}", settings.corpus);
        }

        settings.ensemble = try_get::<PathBuf>(matches, "ensemble").cloned();
        if let Some(n) = try_get::<usize>(matches, "vocabulary_size") {
            settings.vocabulary_size = *n;
        }
        if let Some(k) = try_get::<usize>(matches, "train_size") {
            settings.train_size = *k;
        }
        if let Some(seed) = try_get::<u64>(matches, "seed") {
            settings.seed = *seed;
        }
        settings.output = try_get::<PathBuf>(matches, "output_file").cloned();
        settings.positive = try_get::<String>(matches, "positive").cloned();
        if let Ok(Some(names)) = matches.try_get_many::<String>("only") {
            settings.only = names.cloned().collect();
        }
        if let Some(folds) = try_get::<usize>(matches, "folds") {
            settings.learning.folds = *folds;
        }
        if let Some(points) = try_get::<usize>(matches, "points") {
            settings.learning.points = *points;
        }

        Ok(settings)
    }

    pub fn feature_options(&self) -> FeatureOptions {
        FeatureOptions::with_vocabulary_size(self.vocabulary_size)
    }

    /// Load the ensemble declaration, narrowed by `--only`.
    ///
    /// An explicitly named file must exist. Without one, `voting.json` in
    /// the working directory is used when present, otherwise the built-in
    /// ensemble.
    pub fn ensemble_config(&self) -> Result<EnsembleConfig> {
        let mut config = match &self.ensemble {
            Some(path) => load_config(path)?,
            None if Path::new(DEFAULT_ENSEMBLE_FILE).is_file() => {
                load_config(Path::new(DEFAULT_ENSEMBLE_FILE))?
            }
            None => {
                log::warn!(
                    "No ensemble file provided and no {} found; using the built-in ensemble",
                    DEFAULT_ENSEMBLE_FILE
                );
                EnsembleConfig::default()
            }
        };

        if !self.only.is_empty() {
            for name in &self.only {
                if !config.classifiers.iter().any(|c| &c.name == name) {
                    anyhow::bail!("--only names unknown classifier '{}'", name);
                }
            }
            config.retain_named(&self.only);
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<EnsembleConfig> {
    log::info!("Loading ensemble from {:?}", path);
    EnsembleConfig::load(path).with_context(|| format!("Failed to load ensemble file: {:?}", path))
}

/// `get_one` that tolerates arguments the subcommand does not define.
fn try_get<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, id: &str) -> Option<&'a T> {
    matches.try_get_one::<T>(id).ok().flatten()
}
