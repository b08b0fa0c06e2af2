//! Integration tests for configuration loading and corpus handling.

use std::fs;
use std::path::Path;

use sentivote_classifiers::config::{EnsembleConfig, ModelType, SvmKernel};
use sentivote_classifiers::corpus::{Document, ReviewCorpus, ReviewDataset};
use sentivote_classifiers::data_handling::Label;
use sentivote_classifiers::error::SentimentError;
use sentivote_classifiers::features::{FeatureOptions, FeatureSpace};

// ---------------------------------------------------------------------------
// EnsembleConfig
// ---------------------------------------------------------------------------

const VOTING_JSON: &str = r#"{
    "parallel_training": false,
    "classifiers": [
        { "name": "bayes", "kind": "Multinomial_NB", "params": { "alpha": 0.5 } },
        { "name": "svm_rbf", "kind": "svm", "weight": 2.0,
          "params": { "kernel": { "type": "gauss", "eps": 30.0 } } },
        { "name": "nearest", "kind": "nearest_match" }
    ]
}"#;

#[test]
fn load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voting.json");
    fs::write(&path, VOTING_JSON).unwrap();

    let config = EnsembleConfig::load(&path).unwrap();
    assert!(!config.parallel_training);
    let names: Vec<&str> = config.classifiers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["bayes", "svm_rbf", "nearest"]);

    match &config.classifiers[0].model {
        ModelType::MultinomialNb(p) => assert_eq!(p.alpha, 0.5),
        other => panic!("unexpected model {other:?}"),
    }
    match &config.classifiers[1].model {
        ModelType::Svm(p) => assert_eq!(p.kernel, SvmKernel::Gauss { eps: 30.0 }),
        other => panic!("unexpected model {other:?}"),
    }
    assert_eq!(config.classifiers[1].weight, 2.0);
    assert_eq!(config.classifiers[2].model, ModelType::NearestMatch);
}

#[test]
fn config_round_trips_through_json() {
    let config = EnsembleConfig::from_json_str(VOTING_JSON).unwrap();
    let reparsed = EnsembleConfig::from_json_str(&config.to_json_pretty().unwrap()).unwrap();
    assert_eq!(config, reparsed);
}

#[test]
fn missing_config_file_is_a_config_error() {
    let err = EnsembleConfig::load("/nonexistent/voting.json").unwrap_err();
    assert!(matches!(err, SentimentError::Config(_)));
}

#[test]
fn malformed_and_inconsistent_configs_fail_fast() {
    let cases = [
        "{ not json",
        r#"{ "classifiers": [ { "name": "a", "kind": "svm", "params": { "gamma": 1 } } ] }"#,
        r#"{ "classifiers": [ { "name": "a", "kind": "svm" }, { "name": "a", "kind": "gbdt" } ] }"#,
        r#"{ "classifiers": [ { "name": "a", "kind": "svm", "weight": -1.0 } ] }"#,
        r#"{ "classifiers": [ { "name": "", "kind": "svm" } ] }"#,
        r#"{ "classifiers": [ { "name": "t", "kind": "decision_tree", "params": { "max_depth": 0 } } ] }"#,
        r#"{ "classifers": [] }"#,
    ];
    for json in cases {
        assert!(
            matches!(EnsembleConfig::from_json_str(json), Err(SentimentError::Config(_))),
            "accepted: {json}"
        );
    }
}

#[test]
fn retain_named_keeps_declared_order() {
    let mut config = EnsembleConfig::default();
    config.retain_named(&["gbdt".to_string(), "svm".to_string()]);
    let names: Vec<&str> = config.classifiers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["svm", "gbdt"]);
}

// ---------------------------------------------------------------------------
// Corpus and features
// ---------------------------------------------------------------------------

fn write_review(root: &Path, label: &str, file: &str, text: &str) {
    let dir = root.join(label);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), text).unwrap();
}

fn review_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_review(dir.path(), "pos", "cv001.txt", "A wonderful, moving film. Wonderful acting!");
    write_review(dir.path(), "pos", "cv000.txt", "Great plot and great music.");
    write_review(dir.path(), "neg", "cv000.txt", "A boring, dull film. Boring!");
    write_review(dir.path(), "neg", "notes.md", "ignored");
    fs::create_dir_all(dir.path().join(".cache")).unwrap();
    dir
}

#[test]
fn corpus_loads_sorted_labels_and_files() {
    let dir = review_tree();
    let corpus = ReviewCorpus::from_dir(dir.path()).unwrap();
    assert_eq!(corpus.len(), 3);
    assert_eq!(
        corpus.labels(),
        &[Label::from("neg"), Label::from("pos"), Label::from("pos")]
    );
    assert_eq!(corpus.documents()[1].tokens()[0], "great");
    assert_eq!(corpus.label_counts()[&Label::from("pos")], 2);
}

#[test]
fn empty_corpus_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pos")).unwrap();
    assert!(matches!(
        ReviewCorpus::from_dir(dir.path()),
        Err(SentimentError::InvalidData(_))
    ));
}

#[test]
fn seeded_shuffle_is_reproducible() {
    let dir = review_tree();
    let mut a = ReviewCorpus::from_dir(dir.path()).unwrap();
    let mut b = ReviewCorpus::from_dir(dir.path()).unwrap();
    a.shuffle(42);
    b.shuffle(42);
    assert_eq!(a.documents(), b.documents());
    assert_eq!(a.labels(), b.labels());
}

#[test]
fn dataset_exposes_features_and_cached_samples() {
    let dir = review_tree();
    let corpus = ReviewCorpus::from_dir(dir.path()).unwrap();
    let dataset = ReviewDataset::new(corpus, &FeatureOptions::with_vocabulary_size(3)).unwrap();

    // "a" and "and" are stop words; ties keep first-seen order
    assert_eq!(dataset.features(), &["boring", "film", "great"]);

    let samples = dataset.get_samples();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples.n_features(), Some(3));
    assert!(std::ptr::eq(samples, dataset.get_samples()));
}

#[test]
fn vocabulary_is_deterministic_and_extraction_stable() {
    let docs: Vec<Document> = ["the cat sat", "the dog sat", "a cat ran", "dog dog cat"]
        .iter()
        .map(|t| Document::from_text(t))
        .collect();
    let first = FeatureSpace::build(&docs, 10).unwrap();
    let second = FeatureSpace::build(&docs, 10).unwrap();
    assert_eq!(first.vocabulary(), second.vocabulary());
    assert_eq!(first.vocabulary(), &["cat", "dog", "sat", "ran"]);
    assert_eq!(first.extract(&docs[3]), first.extract(&docs[3]));

    assert!(matches!(
        FeatureSpace::build(&docs, 0),
        Err(SentimentError::Config(_))
    ));
}
