use std::path::{Path, PathBuf};

use crate::roster::reconcile::backup::backup_path_for;
use crate::roster::reconcile::report::DEFAULT_SAMPLE_SIZE;

/// File name of the reference table in the conventional layout.
pub const REFERENCE_FILE: &str = "HC Report.xlsx";
/// File name of the target table in the conventional layout.
pub const TARGET_FILE: &str = "Laptop Hostname.xlsx";

/// Locations and knobs for a single reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Workbook supplying the trusted values.
    pub reference: PathBuf,
    /// Workbook updated in place.
    pub target: PathBuf,
    /// Where the one-time snapshot of the target is kept.
    pub backup: PathBuf,
    /// Number of updated records echoed in the report.
    pub sample_size: usize,
}

impl ReconcileConfig {
    /// Uses the given files, deriving the backup path from the target.
    pub fn new(reference: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        let target = target.into();
        Self {
            reference: reference.into(),
            backup: backup_path_for(&target),
            target,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    /// The conventional file names inside `dir`.
    pub fn in_directory(dir: &Path) -> Self {
        Self::new(dir.join(REFERENCE_FILE), dir.join(TARGET_FILE))
    }

    pub fn with_backup(mut self, backup: impl Into<PathBuf>) -> Self {
        self.backup = backup.into();
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }
}
