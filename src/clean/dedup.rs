//! Phase 3: delete records whose owner name was already seen.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{open_dataset, CleanConfig, DeleteReport};
use crate::error::Result;

/// Full scan in file order; the first record carrying each owner-name
/// value survives, every later one is deleted.
pub fn delete_duplicates(config: &CleanConfig) -> Result<DeleteReport> {
    let mut dataset = open_dataset(config)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut scanned = 0u64;
    let mut deleted = 0u64;
    {
        let mut cursor = dataset.update_cursor(&config.owner_field, None)?;
        while let Some(owner) = cursor.next()? {
            scanned += 1;
            if seen.insert(owner.clone()) {
                continue;
            }
            let record = cursor.record_number().unwrap_or_default();
            cursor.delete_row()?;
            deleted += 1;
            debug!(record, owner = %owner, "deleted duplicate record");
        }
    }

    if deleted > 0 && !config.dry_run {
        dataset.save()?;
    }
    info!(scanned, deleted, "duplicate records removed");

    Ok(DeleteReport { scanned, deleted })
}
