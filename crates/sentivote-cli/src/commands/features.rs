use std::io::Write;

use anyhow::Result;

use crate::input::RunSettings;
use crate::pipeline::load_dataset;

/// Print the vocabulary, one `index - word` line per feature.
pub fn run<W: Write>(settings: &RunSettings, out: &mut W) -> Result<()> {
    let dataset = load_dataset(settings)?;
    writeln!(out, "Features:")?;
    for (i, word) in dataset.features().iter().enumerate() {
        writeln!(out, "{} - {}", i, word)?;
    }
    Ok(())
}
