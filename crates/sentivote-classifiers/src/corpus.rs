//! Review documents and the labelled review corpus.
//!
//! A corpus on disk follows the `movie_reviews` layout: one directory per
//! label under a root, each holding one `.txt` file per review.
//!
//! ```text
//! reviews/
//!   neg/cv000_29416.txt
//!   pos/cv000_29590.txt
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use unicode_segmentation::UnicodeSegmentation;
use walkdir::WalkDir;

use crate::data_handling::{Label, SampleSet};
use crate::error::{Result, SentimentError};
use crate::features::{FeatureOptions, FeatureSpace};

/// Lowercased token sequence of one review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    tokens: Vec<String>,
}

impl Document {
    /// Split raw text into Unicode words.
    pub fn from_text(text: &str) -> Self {
        Self {
            tokens: text.unicode_words().map(str::to_lowercase).collect(),
        }
    }

    /// Use already tokenized words as-is, apart from lowercasing.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Documents with their ground-truth labels, in a fixed order.
#[derive(Debug, Clone, Default)]
pub struct ReviewCorpus {
    documents: Vec<Document>,
    labels: Vec<Label>,
}

impl ReviewCorpus {
    pub fn new(documents: Vec<Document>, labels: Vec<Label>) -> Result<Self> {
        if documents.len() != labels.len() {
            return Err(SentimentError::invalid_data(format!(
                "{} documents but {} labels",
                documents.len(),
                labels.len()
            )));
        }
        Ok(Self { documents, labels })
    }

    /// Load every `*.txt` file below `root/<label>/`.
    ///
    /// Label directories and files are visited in name order, so loading is
    /// deterministic. Hidden directories are skipped.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let mut label_dirs = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() && !name.starts_with('.') {
                label_dirs.push((name, entry.path()));
            }
        }
        label_dirs.sort();

        let mut documents = Vec::new();
        let mut labels = Vec::new();
        for (name, dir) in &label_dirs {
            let label = Label::new(name.as_str());
            let mut count = 0usize;
            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some("txt")
                {
                    continue;
                }
                let text = fs::read_to_string(path)?;
                documents.push(Document::from_text(&text));
                labels.push(label.clone());
                count += 1;
            }
            log::debug!("Loaded {} documents labelled '{}'", count, label);
        }

        if documents.is_empty() {
            return Err(SentimentError::invalid_data(format!(
                "no labelled .txt documents found under {}",
                root.display()
            )));
        }

        log::info!(
            "Loaded {} documents in {} categories from {}",
            documents.len(),
            label_dirs.len(),
            root.display()
        );
        Ok(Self { documents, labels })
    }

    /// Reorder documents with a seeded shuffle; same seed, same order.
    pub fn shuffle(&mut self, seed: u64) {
        let mut order: Vec<usize> = (0..self.documents.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        self.documents = order.iter().map(|&i| self.documents[i].clone()).collect();
        self.labels = order.iter().map(|&i| self.labels[i].clone()).collect();
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn label_counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// A corpus together with its feature space.
///
/// Exposes the realized vocabulary through [`features`](Self::features) and
/// the labelled feature vectors through [`get_samples`](Self::get_samples),
/// which are extracted on first access and cached.
#[derive(Debug)]
pub struct ReviewDataset {
    corpus: ReviewCorpus,
    feature_space: FeatureSpace,
    samples: OnceLock<SampleSet>,
}

impl ReviewDataset {
    pub fn new(corpus: ReviewCorpus, options: &FeatureOptions) -> Result<Self> {
        let feature_space = FeatureSpace::with_options(corpus.documents(), options)?;
        Ok(Self {
            corpus,
            feature_space,
            samples: OnceLock::new(),
        })
    }

    /// The vocabulary, in feature index order.
    pub fn features(&self) -> &[String] {
        self.feature_space.vocabulary()
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.feature_space
    }

    pub fn corpus(&self) -> &ReviewCorpus {
        &self.corpus
    }

    pub fn get_samples(&self) -> &SampleSet {
        self.samples.get_or_init(|| {
            log::debug!("Extracting features for {} documents", self.corpus.len());
            SampleSet::from_parts(
                self.feature_space.extract_all(self.corpus.documents()),
                self.corpus.labels().to_vec(),
            )
        })
    }
}
