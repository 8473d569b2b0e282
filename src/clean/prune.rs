//! Phase 1: prune attribute fields down to the allow-list.

use serde::Serialize;
use tracing::{debug, info};

use super::{open_dataset, CleanConfig};
use crate::error::Result;

/// Outcome of the pruning phase.
#[derive(Debug, Clone, Serialize)]
pub struct PruneReport {
    pub fields_before: Vec<String>,
    pub fields_after: Vec<String>,
    /// Deleted field names, in schema order
    pub removed: Vec<String>,
}

/// Delete every field not on the allow-list. Running against an already
/// pruned dataset finds an empty complement and writes nothing.
pub fn prune_fields(config: &CleanConfig) -> Result<PruneReport> {
    let mut dataset = open_dataset(config)?;

    let fields_before: Vec<String> = dataset.fields().iter().map(|f| f.name.clone()).collect();
    debug!(fields = ?fields_before, "fields before pruning");

    let removed = complement(&fields_before, &config.keep_fields);
    if removed.is_empty() {
        debug!("no fields to prune");
    } else {
        dataset.delete_fields(&removed)?;
        info!(removed = ?removed, "pruned fields");
        if !config.dry_run {
            dataset.save()?;
        }
    }

    let fields_after: Vec<String> = dataset.fields().iter().map(|f| f.name.clone()).collect();
    debug!(fields = ?fields_after, "fields after pruning");

    Ok(PruneReport {
        fields_before,
        fields_after,
        removed,
    })
}

/// Field names not covered by the allow-list, preserving schema order.
/// Names compare case-insensitively, as DBF field names do.
fn complement(fields: &[String], keep: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !keep.iter().any(|k| k.eq_ignore_ascii_case(f)))
        .cloned()
        .collect()
}
