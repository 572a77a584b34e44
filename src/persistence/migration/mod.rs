//! Versioned map migration
//!
//! Batches of steps keyed by the format version they were written for. The
//! version gate decides which batches run; steps inside a batch run in a fixed
//! order against the same map and never abort the chain.

pub mod engine;
pub mod report;
pub mod steps;
pub mod version;

pub use engine::{MapMigrator, MigrationBatch};
pub use report::{BatchReport, MigrationReport, StepOutcome, StepRecord};
pub use steps::{MigrationStep, PromoteSpec, ReclassifySpec, ensure_registry, promote, reclassify};
pub use version::{FormatVersion, VersionError, should_migrate};
