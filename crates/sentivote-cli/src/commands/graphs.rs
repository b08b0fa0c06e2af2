use std::path::PathBuf;

use anyhow::{Context, Result};
use maud::html;
use sentivote_classifiers::data_handling::Label;
use sentivote_classifiers::metrics::{roc_curve, ClassificationReport, ConfusionMatrix};
use sentivote_classifiers::report::plots::plot_roc_curves;
use sentivote_classifiers::report::report::{confusion_table, metrics_table};
use sentivote_classifiers::report::{Report, ReportSection};

use crate::input::RunSettings;
use crate::pipeline::{load_dataset, train_ensemble};

pub const DEFAULT_OUTPUT: &str = "sentivote_graphs.html";

/// Write confusion matrices and ROC curves for the held-out samples to an
/// HTML page; returns the path written.
pub fn run(settings: &RunSettings) -> Result<PathBuf> {
    let dataset = load_dataset(settings)?;
    let run = train_ensemble(settings, &dataset)?;

    let labels = run.test.distinct_labels();
    let positive = match &settings.positive {
        Some(name) => {
            let label = Label::new(name.as_str());
            if !labels.contains(&label) {
                anyhow::bail!("Positive label '{}' not among held-out labels {:?}", name, labels);
            }
            label
        }
        None => labels
            .last()
            .cloned()
            .context("No held-out samples to plot")?,
    };
    log::info!("Plotting ROC curves with '{}' as the positive label", positive);

    let mut matrices = ReportSection::new("Confusion matrices");
    let mut rocs = Vec::new();
    for (name, classifier) in run.ensemble.classifiers() {
        let predicted = classifier.predict_batch(run.test.vectors())?;
        let matrix = ConfusionMatrix::new(run.test.labels(), &predicted)?;
        let metrics = ClassificationReport::new(run.test.labels(), &predicted)?;
        matrices.add_content(html! {
            h3 { (name) }
            (confusion_table(&matrix))
            (metrics_table(&metrics))
        });

        let scores = classifier.decision_scores(run.test.vectors(), &positive)?;
        let roc = roc_curve(run.test.labels(), &scores, &positive)
            .with_context(|| format!("Failed to compute ROC for {}", name))?;
        log::info!("[{}] AUC = {:.3}", name, roc.auc());
        rocs.push((name.to_string(), roc));
    }

    let mut roc_section = ReportSection::new("Receiver Operating Characteristics");
    roc_section.add_content(html! {
        p {
            "Sub-classifier curves use hard predictions; the voting curve uses the share of votes for '"
            (positive.as_str()) "'."
        }
    });
    roc_section.add_plot(plot_roc_curves(&rocs, "Receiver Operating Characteristics"));

    let mut report = Report::new(
        "sentivote graphs",
        clap::crate_version!(),
        &format!("{} held-out reviews from {:?}", run.test.len(), settings.corpus),
    );
    report.add_section(matrices);
    report.add_section(roc_section);

    let path = settings
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    report.save_to_file(&path)?;
    Ok(path)
}
