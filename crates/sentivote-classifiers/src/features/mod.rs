//! Binary bag-of-words features.
//!
//! A [`FeatureSpace`] picks the N most frequent informative words of a corpus
//! as its vocabulary and maps any [`Document`] onto a [`FeatureVector`] of
//! word-present flags, one per vocabulary entry.
pub mod stopwords;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::corpus::Document;
use crate::error::{Result, SentimentError};

/// Word-present flags indexed by vocabulary position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FeatureVector(Vec<bool>);

impl FeatureVector {
    pub fn new(bits: Vec<bool>) -> Self {
        FeatureVector(bits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// Number of positions where the two vectors differ. Extra trailing
    /// positions of the longer vector count as differences.
    pub fn hamming(&self, other: &FeatureVector) -> usize {
        let common = self
            .0
            .iter()
            .zip(other.0.iter())
            .filter(|(a, b)| a != b)
            .count();
        common + self.len().abs_diff(other.len())
    }
}

impl From<Vec<bool>> for FeatureVector {
    fn from(bits: Vec<bool>) -> Self {
        FeatureVector(bits)
    }
}

/// Vocabulary selection policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOptions {
    /// Maximum number of vocabulary words (N).
    pub vocabulary_size: usize,
    /// Shorter tokens are never counted.
    pub min_word_length: usize,
    /// Skip English stop words.
    pub remove_stopwords: bool,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            vocabulary_size: 3000,
            min_word_length: 2,
            remove_stopwords: true,
        }
    }
}

impl FeatureOptions {
    pub fn with_vocabulary_size(vocabulary_size: usize) -> Self {
        Self {
            vocabulary_size,
            ..Self::default()
        }
    }

    /// Whether `token` may become a vocabulary word.
    pub fn is_informative(&self, token: &str) -> bool {
        token.chars().count() >= self.min_word_length
            && token.chars().any(char::is_alphabetic)
            && !(self.remove_stopwords && stopwords::is_stopword(token))
    }
}

/// Fixed vocabulary plus the word → index lookup used by [`extract`](Self::extract).
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    options: FeatureOptions,
}

impl FeatureSpace {
    /// Build a vocabulary of the `size` most frequent informative words.
    pub fn build(corpus: &[Document], size: usize) -> Result<Self> {
        Self::with_options(corpus, &FeatureOptions::with_vocabulary_size(size))
    }

    /// Build a vocabulary with an explicit selection policy.
    ///
    /// Counts are corpus-wide token occurrences. Words with equal counts keep
    /// the order in which they were first seen, so the same corpus always
    /// produces the same vocabulary and index assignment.
    pub fn with_options(corpus: &[Document], options: &FeatureOptions) -> Result<Self> {
        if options.vocabulary_size == 0 {
            return Err(SentimentError::config(
                "vocabulary size must be a positive integer",
            ));
        }

        // word -> (count, first-seen position)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut seen = 0usize;
        for doc in corpus {
            for token in doc.tokens() {
                if !options.is_informative(token) {
                    continue;
                }
                let entry = counts.entry(token.as_str()).or_insert_with(|| {
                    seen += 1;
                    (0, seen)
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(word, (count, first))| (word, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(options.vocabulary_size);

        let vocabulary: Vec<String> = ranked.into_iter().map(|(w, _, _)| w.to_string()).collect();
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();

        log::debug!(
            "Built vocabulary of {} words (requested {}) from {} documents",
            vocabulary.len(),
            options.vocabulary_size,
            corpus.len()
        );

        Ok(Self {
            vocabulary,
            index,
            options: options.clone(),
        })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn options(&self) -> &FeatureOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Map a document onto the vocabulary. Unknown words are ignored.
    pub fn extract(&self, doc: &Document) -> FeatureVector {
        let mut bits = vec![false; self.vocabulary.len()];
        for token in doc.tokens() {
            if let Some(&i) = self.index.get(token.as_str()) {
                bits[i] = true;
            }
        }
        FeatureVector(bits)
    }

    pub fn extract_all(&self, docs: &[Document]) -> Vec<FeatureVector> {
        docs.iter().map(|d| self.extract(d)).collect()
    }
}
