use std::io::Write;

use anyhow::Result;
use sentivote_classifiers::metrics::{ClassificationReport, ConfusionMatrix};

use crate::input::RunSettings;
use crate::pipeline::{load_dataset, train_ensemble};

/// Print metrics and the confusion matrix of the ensemble and of every
/// sub-classifier on the held-out samples.
pub fn run<W: Write>(settings: &RunSettings, out: &mut W) -> Result<()> {
    let dataset = load_dataset(settings)?;
    let run = train_ensemble(settings, &dataset)?;

    log::info!("Samples: {}", run.test.len());
    log::info!("Categories: {:?}", run.test.label_counts());

    for (name, classifier) in run.ensemble.classifiers() {
        let predicted = classifier.predict_batch(run.test.vectors())?;
        let matrix = ConfusionMatrix::new(run.test.labels(), &predicted)?;
        let metrics = ClassificationReport::new(run.test.labels(), &predicted)?;

        writeln!(out, "-----------------")?;
        writeln!(out, "SUMMARY FOR CLASSIFIER: {}", name)?;
        writeln!(out, "Metrics:")?;
        write!(out, "{}", metrics)?;
        writeln!(out, "Confusion matrix:")?;
        write!(out, "{}", matrix)?;
    }
    Ok(())
}
