//! Error types for shpclean.

use thiserror::Error;

/// Main error type for shpclean operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading or validating the dataset files
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Error mutating the attribute schema
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Error during cursor iteration or predicate binding
    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to opening and validating the shapefile triple.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// File not found
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Invalid file format
    #[error("invalid .{file} format: {reason}")]
    InvalidFormat { file: &'static str, reason: String },

    /// Truncated record
    #[error("truncated record {record} in .{file}: expected {expected} bytes, got {actual}")]
    TruncatedRecord {
        file: &'static str,
        record: usize,
        expected: usize,
        actual: usize,
    },

    /// Attribute table and geometry file disagree on the record count
    #[error("record count mismatch: {dbf} attribute records, {shp} geometry records")]
    RecordCountMismatch { dbf: usize, shp: usize },
}

/// Errors related to schema mutation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Field name not present in the schema
    #[error("unknown field: {name}")]
    UnknownField { name: String },

    /// Deletion rejected because it would leave the table without fields
    #[error("deleting {count} fields would leave the table without any fields")]
    EmptySchema { count: usize },
}

/// Errors related to update cursors.
#[derive(Error, Debug)]
pub enum CursorError {
    /// Cursor or clause references a field the schema does not have
    #[error("unknown field: {name}")]
    UnknownField { name: String },

    /// delete_row called before next() positioned the cursor on a row
    #[error("cursor is not positioned on a row")]
    NotOnRow,
}

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;
