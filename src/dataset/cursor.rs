//! Mutation-capable row cursor.

use tracing::trace;

use super::Dataset;
use crate::error::{CursorError, Result};
use crate::query::WhereClause;

/// A sequential cursor over the live rows of a dataset, bound to one
/// attribute field and optionally filtered by a predicate. `next()`
/// returns the bound field's value for each matching row in file order;
/// `delete_row()` tombstones the row the cursor is on. Deleted rows are
/// compacted out of all three files when the dataset is saved.
#[derive(Debug)]
pub struct UpdateCursor<'d> {
    dataset: &'d mut Dataset,
    field: usize,
    clause: Option<WhereClause>,
    pos: Option<usize>,
    next_pos: usize,
}

impl<'d> UpdateCursor<'d> {
    pub(super) fn new(
        dataset: &'d mut Dataset,
        field_name: &str,
        clause: Option<WhereClause>,
    ) -> Result<Self> {
        let field = dataset
            .field_index(field_name)
            .ok_or_else(|| CursorError::UnknownField {
                name: field_name.to_string(),
            })?;

        if let Some(clause) = &clause {
            for name in clause.fields() {
                if dataset.field_index(name).is_none() {
                    return Err(CursorError::UnknownField {
                        name: name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(UpdateCursor {
            dataset,
            field,
            clause,
            pos: None,
            next_pos: 0,
        })
    }

    /// Advance to the next live row matching the predicate and return the
    /// bound field's decoded value, or None when the scan is done.
    pub fn next(&mut self) -> Result<Option<String>> {
        while self.next_pos < self.dataset.table.rows.len() {
            let row = self.next_pos;
            self.next_pos += 1;

            if self.dataset.table.rows[row].deleted {
                continue;
            }

            if let Some(clause) = &self.clause {
                let dataset: &Dataset = self.dataset;
                let lookup = |name: &str| {
                    dataset
                        .field_index(name)
                        .map(|field| dataset.cell_text(row, field))
                };
                if !clause.matches(&lookup) {
                    continue;
                }
            }

            self.pos = Some(row);
            return Ok(Some(self.dataset.cell_text(row, self.field)));
        }

        self.pos = None;
        Ok(None)
    }

    /// Tombstone the row the cursor is positioned on.
    pub fn delete_row(&mut self) -> Result<()> {
        let row = self.pos.ok_or(CursorError::NotOnRow)?;
        self.dataset.table.rows[row].deleted = true;
        trace!(record = row + 1, "row tombstoned");
        Ok(())
    }

    /// 1-based record number of the current row.
    pub fn record_number(&self) -> Option<usize> {
        self.pos.map(|row| row + 1)
    }
}
