//! Shapefile dataset access.
//!
//! A dataset is the .shp/.shx/.dbf triple addressed by its .shp path. The
//! whole triple is loaded on open, mutated in memory (schema edits and row
//! tombstones), and rewritten on save with records compacted, renumbered,
//! and the header extent refreshed.

mod cursor;
mod dbf;
mod field;
mod shp;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use cursor::UpdateCursor;
pub use field::{Field, FieldKind};
pub use shp::BoundingBox;

use dbf::DbfTable;
use shp::ShpFile;

use crate::error::{DatasetError, Error, Result, SchemaError};
use crate::query::WhereClause;

/// An open shapefile dataset.
#[derive(Debug)]
pub struct Dataset {
    shp_path: PathBuf,
    shx_path: PathBuf,
    dbf_path: PathBuf,
    table: DbfTable,
    shapes: ShpFile,
}

impl Dataset {
    /// Open the dataset at the given .shp path. The .dbf sidecar is
    /// required; a missing .shx is tolerated since the index is rebuilt on
    /// save anyway.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let shp_path = path.as_ref().to_path_buf();
        let is_shp = shp_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("shp"));
        if !is_shp {
            return Err(DatasetError::InvalidFormat {
                file: "shp",
                reason: format!("dataset path must point at a .shp file: {}", shp_path.display()),
            }
            .into());
        }

        let dbf_path = shp_path.with_extension("dbf");
        let shx_path = shp_path.with_extension("shx");

        let shp_bytes = read_file(&shp_path)?;
        let dbf_bytes = read_file(&dbf_path)?;

        let table = DbfTable::parse(&dbf_bytes)?;
        let shapes = ShpFile::parse(&shp_bytes)?;

        if table.rows.len() != shapes.records.len() {
            return Err(DatasetError::RecordCountMismatch {
                dbf: table.rows.len(),
                shp: shapes.records.len(),
            }
            .into());
        }
        if !shx_path.exists() {
            debug!(path = %shx_path.display(), "missing .shx index, it will be rebuilt on save");
        }

        debug!(
            path = %shp_path.display(),
            fields = table.fields.len(),
            records = table.rows.len(),
            "opened dataset"
        );

        Ok(Dataset {
            shp_path,
            shx_path,
            dbf_path,
            table,
            shapes,
        })
    }

    /// The attribute schema.
    pub fn fields(&self) -> &[Field] {
        &self.table.fields
    }

    /// Number of live (not tombstoned) records.
    pub fn record_count(&self) -> usize {
        self.table.rows.iter().filter(|r| !r.deleted).count()
    }

    /// Position of a field by name. Field names compare
    /// case-insensitively, matching how desktop GIS treats DBF schemas.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.table
            .fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Delete the named fields from the schema and from every row. Names
    /// not present are ignored. Refuses to delete the entire schema.
    pub fn delete_fields(&mut self, names: &[String]) -> Result<usize> {
        let keep: Vec<bool> = self
            .table
            .fields
            .iter()
            .map(|f| !names.iter().any(|n| n.eq_ignore_ascii_case(&f.name)))
            .collect();

        let doomed = keep.iter().filter(|k| !**k).count();
        if doomed == 0 {
            return Ok(0);
        }
        if doomed == self.table.fields.len() {
            return Err(SchemaError::EmptySchema { count: doomed }.into());
        }

        let mut index = 0;
        self.table.fields.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
        for row in &mut self.table.rows {
            let mut index = 0;
            row.cells.retain(|_| {
                let kept = keep[index];
                index += 1;
                kept
            });
        }

        debug!(deleted = doomed, remaining = self.table.fields.len(), "fields deleted");
        Ok(doomed)
    }

    /// Open an update cursor bound to the named field, optionally filtered
    /// by a predicate.
    pub fn update_cursor(
        &mut self,
        field_name: &str,
        clause: Option<WhereClause>,
    ) -> Result<UpdateCursor<'_>> {
        UpdateCursor::new(self, field_name, clause)
    }

    /// Rewrite the .dbf, .shp, and .shx files. Tombstoned rows and their
    /// geometry are dropped, surviving records renumbered from 1, file
    /// sizes and index offsets recomputed, and the header extent refreshed
    /// from the surviving geometry.
    pub fn save(&mut self) -> Result<()> {
        self.compact();

        fs::write(&self.dbf_path, self.table.encode())?;
        fs::write(&self.shp_path, self.shapes.encode())?;
        fs::write(&self.shx_path, self.shapes.encode_index())?;

        info!(
            path = %self.shp_path.display(),
            records = self.table.rows.len(),
            "saved dataset"
        );
        Ok(())
    }

    fn compact(&mut self) {
        let keep: Vec<bool> = self.table.rows.iter().map(|r| !r.deleted).collect();
        if keep.iter().any(|k| !*k) {
            let mut index = 0;
            self.table.rows.retain(|_| {
                let kept = keep[index];
                index += 1;
                kept
            });
            let mut index = 0;
            self.shapes.records.retain(|_| {
                let kept = keep[index];
                index += 1;
                kept
            });
        }

        for (i, record) in self.shapes.records.iter_mut().enumerate() {
            record.number = i as i32 + 1;
        }
        self.shapes.refresh_bounds();
    }

    /// Decode one cell of a live or tombstoned row to trimmed text.
    pub(crate) fn cell_text(&self, row: usize, field: usize) -> String {
        self.table.cell_text(row, field)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::Dataset(DatasetError::FileNotFound {
                path: path.display().to_string(),
            })
        } else {
            Error::Io(e)
        }
    })
}
