//! HTML reports with embedded plotly figures.
//!
//! [`plots`] turns evaluation results into `plotly::Plot`s and
//! [`report`] lays them out, together with metric tables, in a standalone
//! HTML page rendered with `maud`.
pub mod plots;
pub mod report;

pub use report::{Report, ReportSection};
