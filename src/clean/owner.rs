//! Phase 2: delete city-owned records.

use tracing::{debug, info};

use super::{open_dataset, CleanConfig, DeleteReport};
use crate::error::Result;
use crate::query::WhereClause;

/// Records whose owner starts with this are city-owned.
pub const CITY_OWNED_PATTERN: &str = "CITY OF BOULDER%";

/// City-owned records ending with this are exempt from deletion.
pub const HOUSING_AUTHORITY_PATTERN: &str = "%HOUSING AUTHORITY";

/// Delete every record whose owner name matches the city-owned pattern,
/// except housing-authority records.
pub fn delete_city_owned(config: &CleanConfig) -> Result<DeleteReport> {
    let mut dataset = open_dataset(config)?;

    let clause = WhereClause::like(config.owner_field.clone(), CITY_OWNED_PATTERN).and(
        WhereClause::not_like(config.owner_field.clone(), HOUSING_AUTHORITY_PATTERN),
    );
    debug!(%clause, "owner filter");

    let mut deleted = 0u64;
    {
        let mut cursor = dataset.update_cursor(&config.owner_field, Some(clause))?;
        while let Some(owner) = cursor.next()? {
            let record = cursor.record_number().unwrap_or_default();
            cursor.delete_row()?;
            deleted += 1;
            debug!(record, owner = %owner, "deleted city-owned record");
        }
    }

    if deleted > 0 && !config.dry_run {
        dataset.save()?;
    }
    info!(deleted, "city-owned records removed");

    Ok(DeleteReport {
        scanned: deleted,
        deleted,
    })
}
