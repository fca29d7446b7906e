//! The `swimmer` command: load a source file, prepare the chart data, print it.

pub mod cli;
mod report;

pub use report::write_text_report;
