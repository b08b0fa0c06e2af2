use std::io::Write;

use anyhow::Result;

use crate::input::RunSettings;
use crate::pipeline::{load_dataset, train_ensemble};

/// Build and train the ensemble, then print train and held-out accuracy.
pub fn run<W: Write>(settings: &RunSettings, out: &mut W) -> Result<()> {
    let dataset = load_dataset(settings)?;
    let start_time = std::time::Instant::now();
    let run = train_ensemble(settings, &dataset)?;
    log::info!("Done in {:?}", start_time.elapsed());

    let train_accuracy = run.train_accuracy()?;
    let test_accuracy = run.test_accuracy()?;
    log::info!(
        "Voting accuracy: {:.4} (train), {:.4} (held-out)",
        train_accuracy,
        test_accuracy
    );

    writeln!(out, "Sub-classifiers: {}", run.ensemble.names().collect::<Vec<_>>().join(", "))?;
    writeln!(out, "Train accuracy: {:.4}", train_accuracy)?;
    writeln!(out, "Held-out accuracy: {:.4}", test_accuracy)?;
    Ok(())
}
