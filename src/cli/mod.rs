//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Report formatting (table, CSV, JSON)
//! - Field listing output

mod args;
mod output;

pub use args::Args;
pub use output::{write_field_table, ReportFormat, ReportFormatter};
