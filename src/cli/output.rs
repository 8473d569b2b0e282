//! Report and field-listing output.

use std::io::{self, Write};

use clap::ValueEnum;
use comfy_table::{Cell, Table};

use crate::clean::CleanReport;
use crate::dataset::Field;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Pretty-printed table (default)
    Table,
    /// Comma-separated values
    Csv,
    /// JSON Lines (one JSON object per phase)
    Json,
}

/// Formats a cleanup report for output.
pub struct ReportFormatter {
    format: ReportFormat,
}

impl ReportFormatter {
    /// Create a new formatter with the specified format.
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a report and write it to the given writer.
    pub fn write<W: Write>(&self, report: &CleanReport, writer: &mut W) -> io::Result<()> {
        match self.format {
            ReportFormat::Table => self.write_table(report, writer),
            ReportFormat::Csv => self.write_csv(report, writer),
            ReportFormat::Json => self.write_json(report, writer),
        }
    }

    fn write_table<W: Write>(&self, report: &CleanReport, writer: &mut W) -> io::Result<()> {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("phase"),
            Cell::new("status"),
            Cell::new("removed"),
            Cell::new("detail"),
        ]);

        for phase in &report.phases {
            table.add_row(vec![
                Cell::new(phase.phase),
                Cell::new(phase.status),
                Cell::new(phase.removed),
                Cell::new(&phase.detail),
            ]);
        }

        writeln!(writer, "{table}")
    }

    fn write_csv<W: Write>(&self, report: &CleanReport, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "phase,status,removed,detail")?;

        for phase in &report.phases {
            let detail = if phase.detail.contains(',')
                || phase.detail.contains('"')
                || phase.detail.contains('\n')
            {
                format!("\"{}\"", phase.detail.replace('"', "\"\""))
            } else {
                phase.detail.clone()
            };
            writeln!(
                writer,
                "{},{},{},{}",
                phase.phase, phase.status, phase.removed, detail
            )?;
        }

        Ok(())
    }

    fn write_json<W: Write>(&self, report: &CleanReport, writer: &mut W) -> io::Result<()> {
        for phase in &report.phases {
            let line = serde_json::to_string(phase).map_err(io::Error::from)?;
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

/// Print the schema as a table (name, type, length, decimals).
pub fn write_field_table<W: Write>(fields: &[Field], writer: &mut W) -> io::Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("field"),
        Cell::new("type"),
        Cell::new("length"),
        Cell::new("decimals"),
    ]);

    for field in fields {
        table.add_row(vec![
            Cell::new(&field.name),
            Cell::new(field.kind),
            Cell::new(field.length),
            Cell::new(field.decimals),
        ]);
    }

    writeln!(writer, "{table}")
}
