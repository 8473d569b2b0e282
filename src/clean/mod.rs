//! The cleanup pipeline: three sequential phases over one dataset.
//!
//! Each phase opens the dataset, mutates it, and saves it within its own
//! scope, so a failed phase never leaves a half-written file behind it.
//! Failure policy is explicit: by default the pipeline halts at the first
//! failed phase; with `keep_going` the remaining phases still run and every
//! error ends up in the report.

mod dedup;
mod owner;
mod prune;

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info};

pub use dedup::delete_duplicates;
pub use owner::{delete_city_owned, CITY_OWNED_PATTERN, HOUSING_AUTHORITY_PATTERN};
pub use prune::{prune_fields, PruneReport};

use crate::error::Result;

/// Field names that survive pruning. `Shape`, `FID`, and `OID` are
/// pseudo-fields (geometry and record ids) rather than DBF columns; they
/// are listed for completeness and never produce deletions.
pub const APPROVED_FIELDS: [&str; 10] = [
    "OWNER_NAME",
    "OWNER_ICO",
    "OWNER_ADDR",
    "OWNER_CITY",
    "OWNER_STA",
    "OWNER_ZIP",
    "OWNER_ZIP2",
    "Shape",
    "FID",
    "OID",
];

/// Default owner-name field.
pub const OWNER_FIELD: &str = "OWNER_NAME";

/// Phase names as they appear in reports.
pub const PHASE_PRUNE: &str = "prune-fields";
pub const PHASE_CITY_OWNED: &str = "delete-city-owned";
pub const PHASE_DUPLICATES: &str = "delete-duplicates";

/// Configuration for one cleanup run. The workspace directory is an
/// explicit value used to resolve a relative dataset path; there is no
/// process-global state.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Base directory for resolving a relative dataset path
    pub workspace: PathBuf,

    /// The .shp path, absolute or relative to the workspace
    pub dataset: PathBuf,

    /// Field used for owner filtering and duplicate detection
    pub owner_field: String,

    /// Fields that survive pruning
    pub keep_fields: Vec<String>,

    /// Run every phase without writing any file
    pub dry_run: bool,

    /// Run remaining phases after a phase fails
    pub keep_going: bool,
}

impl CleanConfig {
    /// Configuration with the default allow-list and owner field.
    pub fn new(dataset: PathBuf) -> Self {
        CleanConfig {
            workspace: PathBuf::from("."),
            dataset,
            owner_field: OWNER_FIELD.to_string(),
            keep_fields: APPROVED_FIELDS.iter().map(|s| s.to_string()).collect(),
            dry_run: false,
            keep_going: false,
        }
    }

    /// The dataset path with the workspace applied.
    pub fn dataset_path(&self) -> PathBuf {
        if self.dataset.is_absolute() {
            self.dataset.clone()
        } else {
            self.workspace.join(&self.dataset)
        }
    }
}

/// Rows deleted by a cursor-based phase.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeleteReport {
    /// Rows the cursor visited
    pub scanned: u64,
    /// Rows deleted
    pub deleted: u64,
}

/// How a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Completed,
    Failed,
    Skipped,
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhaseStatus::Completed => "completed",
            PhaseStatus::Failed => "failed",
            PhaseStatus::Skipped => "skipped",
        };
        write!(f, "{s}")
    }
}

/// One phase's outcome in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome {
    pub phase: &'static str,
    pub status: PhaseStatus,
    /// Fields or rows removed by the phase
    pub removed: u64,
    pub detail: String,
}

impl PhaseOutcome {
    fn completed(phase: &'static str, removed: u64, detail: String) -> Self {
        PhaseOutcome {
            phase,
            status: PhaseStatus::Completed,
            removed,
            detail,
        }
    }

    fn failed(phase: &'static str, err: &crate::Error) -> Self {
        PhaseOutcome {
            phase,
            status: PhaseStatus::Failed,
            removed: 0,
            detail: err.to_string(),
        }
    }

    fn skipped(phase: &'static str) -> Self {
        PhaseOutcome {
            phase,
            status: PhaseStatus::Skipped,
            removed: 0,
            detail: "skipped after earlier failure".to_string(),
        }
    }
}

/// Report for a whole cleanup run.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub phases: Vec<PhaseOutcome>,
}

impl CleanReport {
    /// True if any phase failed.
    pub fn has_failures(&self) -> bool {
        self.phases.iter().any(|p| p.status == PhaseStatus::Failed)
    }
}

/// Run the three cleanup phases in order.
pub fn run(config: &CleanConfig) -> CleanReport {
    info!(
        dataset = %config.dataset_path().display(),
        dry_run = config.dry_run,
        "starting cleanup"
    );

    let mut phases = Vec::with_capacity(3);
    let mut failed = false;

    match prune_fields(config) {
        Ok(report) => {
            let detail = if report.removed.is_empty() {
                "no fields removed".to_string()
            } else {
                format!("removed {}", report.removed.join(", "))
            };
            phases.push(PhaseOutcome::completed(
                PHASE_PRUNE,
                report.removed.len() as u64,
                detail,
            ));
        }
        Err(err) => {
            error!(phase = PHASE_PRUNE, %err, "phase failed");
            failed = true;
            phases.push(PhaseOutcome::failed(PHASE_PRUNE, &err));
        }
    }

    if failed && !config.keep_going {
        phases.push(PhaseOutcome::skipped(PHASE_CITY_OWNED));
    } else {
        match delete_city_owned(config) {
            Ok(report) => phases.push(PhaseOutcome::completed(
                PHASE_CITY_OWNED,
                report.deleted,
                format!("deleted {} city-owned records", report.deleted),
            )),
            Err(err) => {
                error!(phase = PHASE_CITY_OWNED, %err, "phase failed");
                failed = true;
                phases.push(PhaseOutcome::failed(PHASE_CITY_OWNED, &err));
            }
        }
    }

    if failed && !config.keep_going {
        phases.push(PhaseOutcome::skipped(PHASE_DUPLICATES));
    } else {
        match delete_duplicates(config) {
            Ok(report) => phases.push(PhaseOutcome::completed(
                PHASE_DUPLICATES,
                report.deleted,
                format!(
                    "deleted {} duplicates out of {} records",
                    report.deleted, report.scanned
                ),
            )),
            Err(err) => {
                error!(phase = PHASE_DUPLICATES, %err, "phase failed");
                phases.push(PhaseOutcome::failed(PHASE_DUPLICATES, &err));
            }
        }
    }

    CleanReport { phases }
}

pub(crate) fn open_dataset(config: &CleanConfig) -> Result<crate::dataset::Dataset> {
    crate::dataset::Dataset::open(config.dataset_path())
}
