use std::fs;
use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::error::Result;
use crate::metrics::{ClassificationReport, ConfusionMatrix};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; color: #222; }
header { border-bottom: 2px solid #1f77b4; margin-bottom: 1.5em; }
section { margin-bottom: 2.5em; }
table { border-collapse: collapse; margin: 1em 0; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.8em; text-align: right; }
th { background: #f3f6fa; }
.diag { background: #dff0d8; font-weight: bold; }
.meta { color: #777; font-size: 0.9em; }
"#;

enum Block {
    Content(Markup),
    Plot(Plot),
}

/// A titled part of a [`Report`], holding HTML snippets and plots in the
/// order they were added.
pub struct ReportSection {
    title: String,
    blocks: Vec<Block>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.blocks.push(Block::Content(content));
    }

    pub fn add_plot(&mut self, plot: Plot) {
        self.blocks.push(Block::Plot(plot));
    }

    fn render(&self, section_index: usize) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for (i, block) in self.blocks.iter().enumerate() {
                    @match block {
                        Block::Content(markup) => { (markup) }
                        Block::Plot(plot) => {
                            @let id = format!("plot-{}-{}", section_index, i);
                            (PreEscaped(plot.to_inline_html(Some(id.as_str()))))
                        }
                    }
                }
            }
        }
    }
}

/// Standalone HTML page; plotly.js is loaded from its CDN.
pub struct Report {
    title: String,
    version: String,
    subtitle: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str, version: &str, subtitle: &str) -> Self {
        Report {
            title: title.to_string(),
            version: version.to_string(),
            subtitle: subtitle.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_JS) {}
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    header {
                        h1 { (self.title) }
                        p { (self.subtitle) }
                        p.meta { "version " (self.version) " · generated " (generated) }
                    }
                    @for (i, section) in self.sections.iter().enumerate() {
                        (section.render(i))
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render())?;
        log::info!("Report written to {}", path.display());
        Ok(())
    }
}

/// Confusion matrix as an HTML table; rows are true labels.
pub fn confusion_table(matrix: &ConfusionMatrix) -> Markup {
    html! {
        table {
            tr {
                th { "true \\ predicted" }
                @for label in matrix.labels() {
                    th { (label.as_str()) }
                }
            }
            @for (i, (label, row)) in matrix.labels().iter().zip(matrix.rows()).enumerate() {
                tr {
                    th { (label.as_str()) }
                    @for (j, count) in row.iter().enumerate() {
                        @if i == j {
                            td.diag { (count) }
                        } @else {
                            td { (count) }
                        }
                    }
                }
            }
        }
    }
}

/// Per-label precision / recall / F1 table with accuracy and averages.
pub fn metrics_table(report: &ClassificationReport) -> Markup {
    html! {
        table {
            tr {
                th { "" }
                th { "precision" }
                th { "recall" }
                th { "f1-score" }
                th { "support" }
            }
            @for m in &report.per_label {
                tr {
                    th { (m.label.as_str()) }
                    td { (format!("{:.3}", m.precision)) }
                    td { (format!("{:.3}", m.recall)) }
                    td { (format!("{:.3}", m.f1)) }
                    td { (m.support) }
                }
            }
            tr {
                th { "accuracy" }
                td {}
                td {}
                td { (format!("{:.3}", report.accuracy)) }
                td { (report.support) }
            }
            @for (name, avg) in [("macro avg", report.macro_avg), ("weighted avg", report.weighted_avg)] {
                tr {
                    th { (name) }
                    td { (format!("{:.3}", avg.precision)) }
                    td { (format!("{:.3}", avg.recall)) }
                    td { (format!("{:.3}", avg.f1)) }
                    td { (report.support) }
                }
            }
        }
    }
}
