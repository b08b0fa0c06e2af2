//! One module per subcommand. Text output goes to the writer passed in;
//! HTML output goes to the file named by `--output`.
pub mod features;
pub mod graphs;
pub mod learning;
pub mod report;
pub mod train;
