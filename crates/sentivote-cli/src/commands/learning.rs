use std::path::PathBuf;

use anyhow::{Context, Result};
use maud::html;
use sentivote_classifiers::learning_curve::learning_curve;
use sentivote_classifiers::models::build_model;
use sentivote_classifiers::report::plots::plot_learning_curves;
use sentivote_classifiers::report::{Report, ReportSection};
use tqdm::tqdm;

use crate::input::RunSettings;
use crate::pipeline::load_dataset;

pub const DEFAULT_OUTPUT: &str = "sentivote_learning.html";

/// Cross-validated learning curves of every sub-classifier over all samples.
pub fn run(settings: &RunSettings) -> Result<PathBuf> {
    let dataset = load_dataset(settings)?;
    let samples = dataset.get_samples();
    let config = settings.ensemble_config()?;
    let options = &settings.learning;

    let mut curves = Vec::with_capacity(config.classifiers.len());
    for spec in tqdm(config.classifiers.iter()).desc(Some("Calculating learning curves")) {
        let curve = learning_curve(&spec.name, || build_model(spec), samples, options)
            .with_context(|| format!("Learning curve failed for {}", spec.name))?;
        curves.push(curve);
    }

    let mut section = ReportSection::new("Learning curves");
    section.add_content(html! {
        p {
            (options.folds) "-fold cross validation over " (samples.len())
            " samples. Dotted lines are training accuracy; bands show ±σ across folds."
        }
    });
    section.add_plot(plot_learning_curves(&curves, "Learning curve for classifiers"));

    let mut report = Report::new(
        "sentivote learning curves",
        clap::crate_version!(),
        &format!("{} features, {} training sizes", dataset.features().len(), options.points),
    );
    report.add_section(section);

    let path = settings
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    report.save_to_file(&path)?;
    Ok(path)
}
