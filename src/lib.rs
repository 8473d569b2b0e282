//! shpclean - clean shapefile attribute data in place.
//!
//! This library opens a shapefile triple (.shp/.shx/.dbf), prunes the
//! attribute schema down to an allow-list, deletes city-owned records
//! (housing-authority records exempt), and deletes records whose owner
//! name duplicates an earlier one.
//!
//! # Example
//!
//! ```no_run
//! use shpclean::clean::{self, CleanConfig};
//!
//! let config = CleanConfig::new("Test_Parcel13.shp".into());
//! let report = clean::run(&config);
//! for phase in &report.phases {
//!     println!("{}: {}", phase.phase, phase.detail);
//! }
//! ```

pub mod clean;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod query;

pub use error::{Error, Result};
