//! Integration tests for the voting ensemble and the adapter contract.

use sentivote_classifiers::config::{ClassifierSpec, EnsembleConfig, ModelType};
use sentivote_classifiers::corpus::Document;
use sentivote_classifiers::data_handling::{Label, SampleSet};
use sentivote_classifiers::ensemble::VotingEnsemble;
use sentivote_classifiers::error::{Result, SentimentError};
use sentivote_classifiers::features::{FeatureSpace, FeatureVector};
use sentivote_classifiers::models::nearest::NearestMatchClassifier;
use sentivote_classifiers::models::{build_model, ClassifierModel};

// ---------------------------------------------------------------------------
// Stub sub-classifiers
// ---------------------------------------------------------------------------

/// Votes for a fixed label, or fails to train when `label` is `None`.
struct Stub {
    name: &'static str,
    label: Option<&'static str>,
    trained: bool,
}

fn stub(name: &'static str, label: &'static str) -> Box<dyn ClassifierModel> {
    Box::new(Stub {
        name,
        label: Some(label),
        trained: false,
    })
}

fn broken(name: &'static str) -> Box<dyn ClassifierModel> {
    Box::new(Stub {
        name,
        label: None,
        trained: false,
    })
}

impl ClassifierModel for Stub {
    fn train(&mut self, _samples: &SampleSet) -> Result<()> {
        self.trained = false;
        if self.label.is_none() {
            return Err(SentimentError::InvalidData(format!("{} cannot learn", self.name)));
        }
        self.trained = true;
        Ok(())
    }

    fn predict_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<Label>> {
        match (self.trained, self.label) {
            (true, Some(label)) => Ok(vec![Label::from(label); vectors.len()]),
            _ => Err(SentimentError::not_trained(self.name)),
        }
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn reset(&mut self) {
        self.trained = false;
    }

    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> &str {
        "stub"
    }
}

fn fv(bits: &[u8]) -> FeatureVector {
    FeatureVector::new(bits.iter().map(|&b| b == 1).collect())
}

fn toy_samples() -> SampleSet {
    SampleSet::new(
        vec![
            fv(&[1, 1, 0, 0]),
            fv(&[1, 0, 0, 0]),
            fv(&[0, 1, 0, 0]),
            fv(&[0, 0, 1, 1]),
            fv(&[0, 0, 1, 0]),
            fv(&[0, 0, 0, 1]),
        ],
        vec![
            "pos".into(),
            "pos".into(),
            "pos".into(),
            "neg".into(),
            "neg".into(),
            "neg".into(),
        ],
    )
    .unwrap()
}

fn ensemble_of(members: Vec<(&str, Box<dyn ClassifierModel>)>) -> VotingEnsemble {
    let mut ensemble = VotingEnsemble::new(false);
    for (name, model) in members {
        ensemble.push(name, 1.0, model).unwrap();
    }
    ensemble
}

// ---------------------------------------------------------------------------
// Voting rule
// ---------------------------------------------------------------------------

#[test]
fn majority_wins() {
    let mut ensemble = ensemble_of(vec![
        ("one", stub("one", "A")),
        ("two", stub("two", "A")),
        ("three", stub("three", "B")),
    ]);
    ensemble.train(&toy_samples()).unwrap();
    assert_eq!(ensemble.predict(&fv(&[1, 0, 0, 0])).unwrap(), Label::from("A"));
}

#[test]
fn tie_goes_to_earliest_declared() {
    let mut ensemble = ensemble_of(vec![("x", stub("x", "A")), ("y", stub("y", "B"))]);
    ensemble.train(&toy_samples()).unwrap();
    assert_eq!(ensemble.predict(&fv(&[0, 0, 0, 0])).unwrap(), Label::from("A"));

    let mut reversed = ensemble_of(vec![("y", stub("y", "B")), ("x", stub("x", "A"))]);
    reversed.train(&toy_samples()).unwrap();
    assert_eq!(reversed.predict(&fv(&[0, 0, 0, 0])).unwrap(), Label::from("B"));
}

#[test]
fn configured_weights_reach_the_ensemble() {
    let config = EnsembleConfig {
        parallel_training: false,
        classifiers: vec![
            ClassifierSpec::new("nb", ModelType::KINDS[0].parse().unwrap()).with_weight(2.5),
            ClassifierSpec::new("nearest", ModelType::NearestMatch),
        ],
    };
    let ensemble = VotingEnsemble::from_config(&config).unwrap();
    assert!(!ensemble.parallel_training());
    assert_eq!(ensemble.weight("nb"), Some(2.5));
    assert_eq!(ensemble.weight("nearest"), Some(1.0));
    assert_eq!(ensemble.weight("svm"), None);

    let zero = ClassifierSpec::new("nb", ModelType::NearestMatch).with_weight(0.0);
    assert!(matches!(zero.validate(), Err(SentimentError::Config(_))));
}

#[test]
fn batch_prediction_preserves_input_order() {
    let nn: Box<dyn ClassifierModel> = Box::new(NearestMatchClassifier::new("nn"));
    let mut ensemble = ensemble_of(vec![("nn", nn)]);
    let samples = toy_samples();
    ensemble.train(&samples).unwrap();
    let predictions = ensemble
        .predict_batch(&[fv(&[0, 0, 1, 1]), fv(&[1, 1, 0, 0]), fv(&[0, 0, 0, 1])])
        .unwrap();
    assert_eq!(
        predictions,
        vec![Label::from("neg"), Label::from("pos"), Label::from("neg")]
    );
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[test]
fn training_failures_are_aggregated() {
    let mut ensemble = ensemble_of(vec![
        ("good", stub("good", "A")),
        ("bad", broken("bad")),
        ("worse", broken("worse")),
    ]);
    let err = ensemble.train(&toy_samples()).unwrap_err();
    match err {
        SentimentError::Training { failures } => {
            let names: Vec<&str> = failures.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["bad", "worse"]);
            assert!(failures[0].message.contains("bad cannot learn"));
        }
        other => panic!("expected training error, got {other:?}"),
    }

    // nothing stays half-trained
    assert!(!ensemble.is_trained());
    assert!(ensemble.sub_classifiers().all(|(_, m)| !m.is_trained()));
    assert!(matches!(
        ensemble.predict(&fv(&[1, 0, 0, 0])),
        Err(SentimentError::NotTrained { .. })
    ));
}

#[test]
fn parallel_training_collects_the_same_failures() {
    let mut ensemble = VotingEnsemble::new(true);
    assert!(ensemble.parallel_training());
    ensemble.push("ok", 1.0, stub("ok", "A")).unwrap();
    ensemble.push("bad", 1.0, broken("bad")).unwrap();
    let err = ensemble.train(&toy_samples()).unwrap_err();
    assert!(matches!(err, SentimentError::Training { ref failures } if failures.len() == 1));
    assert!(ensemble.sub_classifier("ok").map_or(false, |m| !m.is_trained()));
}

#[test]
fn empty_ensemble_cannot_predict() {
    let config = EnsembleConfig::from_json_str(r#"{ "classifiers": [] }"#).unwrap();
    let mut ensemble = VotingEnsemble::from_config(&config).unwrap();
    assert!(matches!(
        ensemble.predict(&fv(&[1])),
        Err(SentimentError::EmptyEnsemble)
    ));
    ensemble.train(&toy_samples()).unwrap();
    assert!(matches!(
        ensemble.predict(&fv(&[1])),
        Err(SentimentError::EmptyEnsemble)
    ));
}

#[test]
fn every_kind_refuses_to_predict_untrained() {
    for kind in ModelType::KINDS {
        let spec = ClassifierSpec::new(kind, kind.parse().unwrap());
        let model = build_model(&spec);
        match model.predict(&fv(&[1, 0, 0, 0])) {
            Err(SentimentError::NotTrained { name }) => assert_eq!(name, kind),
            other => panic!("{kind}: expected NotTrained, got {other:?}"),
        }
    }

    let ensemble = VotingEnsemble::from_config(&EnsembleConfig::default()).unwrap();
    assert!(matches!(
        ensemble.predict(&fv(&[1, 0, 0, 0])),
        Err(SentimentError::NotTrained { .. })
    ));
}

#[test]
fn unknown_kind_is_rejected_before_training() {
    let json = r#"{ "classifiers": [ { "name": "rf", "kind": "random_forest" } ] }"#;
    let err = EnsembleConfig::from_json_str(json).unwrap_err();
    assert!(matches!(err, SentimentError::Config(ref msg) if msg.contains("random_forest")));
}

// ---------------------------------------------------------------------------
// Degenerate training sets
// ---------------------------------------------------------------------------

#[test]
fn every_kind_trains_on_a_single_sample() {
    let samples = SampleSet::new(vec![fv(&[1, 0, 1])], vec!["neg".into()]).unwrap();
    for kind in ModelType::KINDS {
        let mut model = build_model(&ClassifierSpec::new(kind, kind.parse().unwrap()));
        model
            .train(&samples)
            .unwrap_or_else(|e| panic!("{kind}: training failed: {e}"));
        let predicted = model
            .predict_batch(&[fv(&[0, 1, 0]), fv(&[1, 0, 1])])
            .unwrap_or_else(|e| panic!("{kind}: prediction failed: {e}"));
        assert_eq!(predicted, vec![Label::from("neg"); 2], "{kind}");
    }
}

#[test]
fn every_kind_survives_identical_rows() {
    let row = fv(&[0, 1, 1, 0]);
    let samples = SampleSet::new(
        vec![row.clone(); 4],
        vec!["pos".into(), "neg".into(), "pos".into(), "neg".into()],
    )
    .unwrap();
    for kind in ModelType::KINDS {
        let mut model = build_model(&ClassifierSpec::new(kind, kind.parse().unwrap()));
        // training may refuse; a trained model must still predict known labels
        if model.train(&samples).is_err() {
            assert!(!model.is_trained(), "{kind}");
            continue;
        }
        let predicted = model
            .predict_batch(&[row.clone(), fv(&[1, 0, 0, 1])])
            .unwrap_or_else(|e| panic!("{kind}: prediction failed: {e}"));
        for label in &predicted {
            assert!(label.as_str() == "pos" || label.as_str() == "neg", "{kind}: {label}");
        }
    }
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn nearest_match_end_to_end() {
    let docs: Vec<Document> = [
        "good great good",
        "bad boring bad",
        "good bad boring boring",
        "great good bad",
    ]
    .iter()
    .map(|t| Document::from_text(t))
    .collect();

    let space = FeatureSpace::build(&docs, 4).unwrap();
    assert_eq!(space.vocabulary(), &["good", "bad", "boring", "great"]);

    let doc1 = space.extract(&docs[0]);
    let doc2 = space.extract(&docs[1]);
    assert_eq!(doc1, fv(&[1, 0, 0, 1]));
    assert_eq!(doc2, fv(&[0, 1, 1, 0]));

    let samples = SampleSet::new(vec![doc1, doc2], vec!["positive".into(), "negative".into()])
        .unwrap();
    let mut nn = NearestMatchClassifier::new("nearest");
    nn.train(&samples).unwrap();
    assert_eq!(nn.predict(&fv(&[1, 0, 0, 0])).unwrap(), Label::from("positive"));
}

#[test]
fn default_ensemble_learns_separable_data() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut samples_v = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..4 {
        for (bits, label) in toy_samples().iter().map(|s| (s.vector.clone(), s.label.clone())) {
            samples_v.push(bits);
            labels.push(label);
        }
    }
    let samples = SampleSet::new(samples_v, labels).unwrap();

    let mut config = EnsembleConfig::default();
    config.classifiers.push(ClassifierSpec::new("nearest", ModelType::NearestMatch));
    let mut ensemble = VotingEnsemble::from_config(&config).unwrap();
    ensemble.train(&samples).unwrap();

    let names: Vec<&str> = ensemble.classifiers().iter().map(|(n, _)| *n).collect();
    assert_eq!(
        names,
        vec!["voting", "multinomial_nb", "gaussian_nb", "svm", "decision_tree", "gbdt", "nearest"]
    );

    let (label, share) = ensemble.predict_with_confidence(&fv(&[1, 1, 0, 0])).unwrap();
    assert_eq!(label, Label::from("pos"));
    assert!(share > 0.5);
    assert_eq!(ensemble.predict(&fv(&[0, 0, 1, 1])).unwrap(), Label::from("neg"));
}
