//! What a migration run did, step by step

use std::fmt;

use crate::map::ObjectKind;

use super::version::FormatVersion;

/// Result of applying one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Registry was absent and has been created empty
    RegistryCreated(ObjectKind),
    /// Registry already existed
    RegistryPresent(ObjectKind),
    /// Legacy tiles reconciled with a registry
    Promoted {
        kind: ObjectKind,
        /// New objects appended
        created: usize,
        /// Tiles that matched an existing object
        matched: usize,
        /// Matched objects whose state was corrected
        refreshed: usize,
    },
    /// Tiles moved between layers
    Reclassified { source: u32, dest: u32, moved: usize },
    /// Nothing to do
    Skipped { reason: String },
}

impl StepOutcome {
    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Whether the step mutated the map
    pub fn changed(&self) -> bool {
        match self {
            StepOutcome::RegistryCreated(_) => true,
            StepOutcome::Promoted {
                created, refreshed, ..
            } => created + refreshed > 0,
            StepOutcome::Reclassified { moved, .. } => *moved > 0,
            StepOutcome::RegistryPresent(_) | StepOutcome::Skipped { .. } => false,
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::RegistryCreated(kind) => write!(f, "created empty {} registry", kind),
            StepOutcome::RegistryPresent(kind) => write!(f, "{} registry already present", kind),
            StepOutcome::Promoted {
                kind,
                created,
                matched,
                refreshed,
            } => write!(
                f,
                "{}: {} created, {} already migrated ({} refreshed)",
                kind, created, matched, refreshed
            ),
            StepOutcome::Reclassified {
                source,
                dest,
                moved,
            } => write!(f, "moved {} tiles from layer {} to layer {}", moved, source, dest),
            StepOutcome::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}

/// One applied step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: String,
    pub outcome: StepOutcome,
}

/// One batch: whether the gate let it through, and its steps if so
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub target: FormatVersion,
    pub applied: bool,
    pub steps: Vec<StepRecord>,
}

/// Everything a [`MapMigrator`](super::MapMigrator) run did to one map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub batches: Vec<BatchReport>,
}

impl MigrationReport {
    fn outcomes(&self) -> impl Iterator<Item = &StepOutcome> {
        self.batches
            .iter()
            .flat_map(|b| b.steps.iter().map(|s| &s.outcome))
    }

    /// Whether any step mutated the map
    pub fn changed(&self) -> bool {
        self.outcomes().any(StepOutcome::changed)
    }

    /// Whether any batch passed the version gate
    pub fn any_applied(&self) -> bool {
        self.batches.iter().any(|b| b.applied)
    }

    pub fn objects_created(&self) -> usize {
        self.outcomes()
            .map(|o| match o {
                StepOutcome::Promoted { created, .. } => *created,
                _ => 0,
            })
            .sum()
    }

    pub fn objects_refreshed(&self) -> usize {
        self.outcomes()
            .map(|o| match o {
                StepOutcome::Promoted { refreshed, .. } => *refreshed,
                _ => 0,
            })
            .sum()
    }

    pub fn tiles_moved(&self) -> usize {
        self.outcomes()
            .map(|o| match o {
                StepOutcome::Reclassified { moved, .. } => *moved,
                _ => 0,
            })
            .sum()
    }

    pub fn registries_created(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, StepOutcome::RegistryCreated(_)))
            .count()
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.batches.is_empty() {
            return writeln!(f, "no migration batches registered");
        }
        for batch in &self.batches {
            if !batch.applied {
                writeln!(f, "{}: not applied", batch.target)?;
                continue;
            }
            writeln!(f, "{}:", batch.target)?;
            for record in &batch.steps {
                writeln!(f, "  {}: {}", record.step, record.outcome)?;
            }
        }
        Ok(())
    }
}
