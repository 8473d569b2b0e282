//! shpclean CLI entry point.

use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shpclean::clean::{self, CleanConfig};
use shpclean::cli::{write_field_table, Args, ReportFormatter};
use shpclean::dataset::Dataset;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let config = args.to_config();

    // Handle the info-only command
    if args.list_fields {
        list_fields(&config)?;
        return Ok(());
    }

    let report = clean::run(&config);

    let formatter = ReportFormatter::new(args.format);
    formatter.write(&report, &mut io::stdout())?;

    if report.has_failures() {
        process::exit(1);
    }
    Ok(())
}

fn list_fields(config: &CleanConfig) -> Result<()> {
    let path = config.dataset_path();
    let dataset = Dataset::open(&path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let mut stdout = io::stdout();
    write_field_table(dataset.fields(), &mut stdout)?;
    writeln!(stdout, "{} records", dataset.record_count())?;
    Ok(())
}
