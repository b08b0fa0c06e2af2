//! Integration tests driving the subcommand functions directly.

use std::fs;
use std::path::Path;

use sentivote_cli::commands::{features, report, train};
use sentivote_cli::input::RunSettings;
use sentivote_cli::pipeline::{load_dataset, split, train_ensemble};

fn write_corpus(root: &Path) {
    let reviews = [
        ("pos", "An uplifting, beautiful story."),
        ("pos", "Beautiful music and an uplifting ending."),
        ("pos", "Beautiful, funny and uplifting."),
        ("pos", "Funny dialogue, beautiful photography."),
        ("neg", "A dreary, pointless story."),
        ("neg", "Pointless plot and dreary music."),
        ("neg", "Dreary, slow and pointless."),
        ("neg", "Slow pacing, pointless photography."),
    ];
    for (i, (label, text)) in reviews.iter().enumerate() {
        let dir = root.join(label);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("review{}.txt", i)), text).unwrap();
    }
}

fn settings(root: &Path) -> RunSettings {
    let ensemble = root.join("ensemble.json");
    fs::write(
        &ensemble,
        r#"{ "classifiers": [
            { "name": "nb", "kind": "multinomial_nb" },
            { "name": "nearest", "kind": "nearest_match" }
        ] }"#,
    )
    .unwrap();
    RunSettings {
        corpus: root.to_path_buf(),
        ensemble: Some(ensemble),
        vocabulary_size: 50,
        train_size: 6,
        ..RunSettings::default()
    }
}

#[test]
fn features_prints_indexed_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let mut out = Vec::new();
    features::run(&settings(dir.path()), &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Features:"));
    // most frequent words first
    let top: Vec<&str> = lines.take(2).collect();
    assert!(top.contains(&"0 - beautiful") || top.contains(&"0 - pointless"));
}

#[test]
fn same_seed_gives_same_split() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let settings = settings(dir.path());

    let a = load_dataset(&settings).unwrap();
    let b = load_dataset(&settings).unwrap();
    assert_eq!(a.features(), b.features());
    let (train_a, test_a) = split(&settings, a.get_samples()).unwrap();
    let (train_b, test_b) = split(&settings, b.get_samples()).unwrap();
    assert_eq!(train_a, train_b);
    assert_eq!(test_a, test_b);
    assert_eq!((train_a.len(), test_a.len()), (6, 2));
}

#[test]
fn trained_run_keeps_declared_order() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let settings = settings(dir.path());
    let dataset = load_dataset(&settings).unwrap();

    let run = train_ensemble(&settings, &dataset).unwrap();
    assert_eq!(run.ensemble.names().collect::<Vec<_>>(), vec!["nb", "nearest"]);
    assert_eq!(run.train_accuracy().unwrap(), 1.0);
}

#[test]
fn trained_run_classifies_raw_text() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let settings = settings(dir.path());
    let dataset = load_dataset(&settings).unwrap();

    let run = train_ensemble(&settings, &dataset).unwrap();
    assert_eq!(run.feature_space.vocabulary(), dataset.features());
    let label = run.classify_text("Beautiful, uplifting and funny.").unwrap();
    assert_eq!(label.as_str(), "pos");
}

#[test]
fn train_and_report_write_summaries() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let settings = settings(dir.path());

    let mut out = Vec::new();
    train::run(&settings, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Train accuracy: 1.0000"));

    let mut out = Vec::new();
    report::run(&settings, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("SUMMARY FOR CLASSIFIER").count(), 3);
    assert!(text.contains("weighted avg"));
}
