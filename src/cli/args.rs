//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

use super::ReportFormat;
use crate::clean::CleanConfig;

/// Clean a shapefile's attribute data: prune fields to an allow-list,
/// delete city-owned records, delete duplicate owners.
#[derive(Parser, Debug)]
#[command(name = "shpclean")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Shapefile to clean (.shp path)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Base directory for resolving a relative dataset path
    #[arg(short = 'w', long = "workspace", value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Owner-name field used for filtering and duplicate detection
    #[arg(long = "owner-field", value_name = "NAME", default_value = crate::clean::OWNER_FIELD)]
    pub owner_field: String,

    /// Extra field names to keep during pruning (repeatable)
    #[arg(long = "keep", value_name = "NAME")]
    pub keep: Vec<String>,

    /// List the dataset's fields and exit without changing anything
    #[arg(long = "list-fields")]
    pub list_fields: bool,

    /// Run every phase and report counts without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Continue with later phases after a phase fails
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Report format for stdout
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormat,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Build the cleanup configuration these arguments describe.
    pub fn to_config(&self) -> CleanConfig {
        let mut config = CleanConfig::new(self.dataset.clone());
        if let Some(workspace) = &self.workspace {
            config.workspace = workspace.clone();
        }
        config.owner_field = self.owner_field.clone();
        config.keep_fields.extend(self.keep.iter().cloned());
        config.dry_run = self.dry_run;
        config.keep_going = self.keep_going;
        config
    }
}
