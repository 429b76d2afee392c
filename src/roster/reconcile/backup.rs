use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::roster::reconcile::error::Result;
use crate::roster::reconcile::io::excel_write;
use crate::roster::reconcile::model::Table;

/// What [`ensure_backup`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    /// No backup existed; one was written.
    Created,
    /// A backup was already on disk and was left untouched.
    AlreadyPresent,
}

/// Writes `source` to `location` unless a file already exists there.
///
/// The first backup ever taken is never overwritten. The existence check and
/// the write are not atomic.
#[instrument(level = "info", skip_all, fields(location = %location.display()))]
pub fn ensure_backup(source: &Table, location: &Path) -> Result<BackupOutcome> {
    if location.try_exists()? {
        info!("backup already exists");
        return Ok(BackupOutcome::AlreadyPresent);
    }

    excel_write::write_table(location, source)?;
    info!(rows = source.len(), "backup created");
    Ok(BackupOutcome::Created)
}

/// Default backup location: the target's file stem with a `_backup` suffix,
/// same directory and extension.
pub fn backup_path_for(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match target.extension() {
        Some(extension) => format!("{stem}_backup.{}", extension.to_string_lossy()),
        None => format!("{stem}_backup"),
    };
    target.with_file_name(file_name)
}
