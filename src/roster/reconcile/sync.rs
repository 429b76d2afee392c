use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::roster::reconcile::backup::{BackupOutcome, ensure_backup};
use crate::roster::reconcile::columns::{self, DEFAULT_VALUE_COLUMN, KEY_ALIASES, VALUE_ALIASES};
use crate::roster::reconcile::config::ReconcileConfig;
use crate::roster::reconcile::error::{MissingColumn, ReconcileError, Result, TableRole};
use crate::roster::reconcile::io::{excel_read, excel_write};
use crate::roster::reconcile::merge::{JoinColumns, reconcile};
use crate::roster::reconcile::model::Table;
use crate::roster::reconcile::normalize::{ColumnKind, normalize_column};
use crate::roster::reconcile::report::Report;

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub report: Report,
    pub backup: BackupOutcome,
}

/// What the caller gets back from [`run`]: never an error, always a flag and
/// a message fit for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub report: Option<Report>,
    pub backup: Option<BackupOutcome>,
}

impl Outcome {
    fn completed(config: &ReconcileConfig, completed: Completed) -> Self {
        let backup_line = match completed.backup {
            BackupOutcome::Created => format!("Backup created: {}", config.backup.display()),
            BackupOutcome::AlreadyPresent => {
                format!("Backup file already exists: {}", config.backup.display())
            }
        };
        Self {
            success: true,
            message: format!(
                "{backup_line}\nUpdated file saved: {}",
                config.target.display()
            ),
            report: Some(completed.report),
            backup: Some(completed.backup),
        }
    }

    fn failed(error: &ReconcileError) -> Self {
        let message = match error.hint() {
            Some(hint) => format!("{error}\nTip: {hint}"),
            None => error.to_string(),
        };
        Self {
            success: false,
            message,
            report: None,
            backup: None,
        }
    }
}

/// Runs a reconciliation and folds every failure, panics included, into the
/// returned [`Outcome`].
#[instrument(
    level = "info",
    skip_all,
    fields(reference = %config.reference.display(), target = %config.target.display())
)]
pub fn run(config: &ReconcileConfig) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| reconcile_files(config))) {
        Ok(Ok(completed)) => Outcome::completed(config, completed),
        Ok(Err(error)) => {
            warn!(%error, "reconciliation failed");
            Outcome::failed(&error)
        }
        Err(payload) => {
            let error = ReconcileError::Unexpected(panic_message(payload.as_ref()));
            warn!(%error, "reconciliation aborted");
            Outcome::failed(&error)
        }
    }
}

/// Loads both workbooks, propagates reference values into the target,
/// backs up the original target once and overwrites it with the result.
///
/// Nothing is written until the merge has succeeded in memory.
pub fn reconcile_files(config: &ReconcileConfig) -> Result<Completed> {
    require_file(&config.reference)?;
    require_file(&config.target)?;

    let reference = excel_read::read_table(&config.reference)?;
    let original = excel_read::read_table(&config.target)?;
    info!(
        reference_rows = reference.len(),
        target_rows = original.len(),
        "tables loaded"
    );

    let columns = resolve_columns(&reference, &original)?;
    debug!(?columns, "columns resolved");

    let mut reference_work = reference.clone();
    let mut target_work = original.clone();
    target_work.ensure_column(&columns.target_value);
    normalize_column(&mut reference_work, &columns.reference_key, ColumnKind::Key);
    normalize_column(&mut reference_work, &columns.reference_value, ColumnKind::Value);
    normalize_column(&mut target_work, &columns.target_key, ColumnKind::Key);

    let (merged, stats) = reconcile(&target_work, &reference_work, &columns)?;
    info!(
        records_with_key = stats.records_with_key,
        updated = stats.updated,
        no_match = stats.no_match,
        "reconciled"
    );

    let backup = ensure_backup(&original, &config.backup)?;
    excel_write::write_table(&config.target, &merged.table)?;
    info!(path = %config.target.display(), "target overwritten");

    let report = Report::new(
        reference.len(),
        original.len(),
        stats,
        &merged,
        &columns.target_key,
        &columns.target_value,
        config.sample_size,
    );
    Ok(Completed { report, backup })
}

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ReconcileError::InputFileNotFound(path.to_path_buf()))
    }
}

fn resolve_columns(reference: &Table, target: &Table) -> Result<JoinColumns> {
    let reference_key = columns::resolve(reference, KEY_ALIASES);
    let reference_value = columns::resolve(reference, VALUE_ALIASES);
    let target_key = columns::resolve(target, KEY_ALIASES);

    let mut missing = Vec::new();
    if reference_key.is_none() {
        missing.push(MissingColumn::new(TableRole::Reference, KEY_ALIASES[0]));
    }
    if reference_value.is_none() {
        missing.push(MissingColumn::new(TableRole::Reference, VALUE_ALIASES[0]));
    }
    if target_key.is_none() {
        missing.push(MissingColumn::new(TableRole::Target, KEY_ALIASES[0]));
    }

    match (reference_key, reference_value, target_key) {
        (Some(reference_key), Some(reference_value), Some(target_key)) => Ok(JoinColumns {
            target_value: columns::resolve(target, VALUE_ALIASES)
                .unwrap_or_else(|| DEFAULT_VALUE_COLUMN.to_string()),
            target_key,
            reference_key,
            reference_value,
        }),
        _ => Err(ReconcileError::MissingRequiredColumn(missing)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "reconciliation panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_missing_column_is_reported() {
        let reference = Table::from_text_rows("HC", &["Department"], &[]);
        let target = Table::from_text_rows("Hosts", &["Hostname"], &[]);

        let error = resolve_columns(&reference, &target).expect_err("columns missing");

        match error {
            ReconcileError::MissingRequiredColumn(missing) => assert_eq!(
                missing,
                vec![
                    MissingColumn::new(TableRole::Reference, "Login ID"),
                    MissingColumn::new(TableRole::Reference, "User Name"),
                    MissingColumn::new(TableRole::Target, "Login ID"),
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn target_value_defaults_to_user_name() {
        let reference = Table::from_text_rows("HC", &["User ID", "Display Name"], &[]);
        let target = Table::from_text_rows("Hosts", &["LoginID", "Hostname"], &[]);

        let columns = resolve_columns(&reference, &target).expect("resolved");

        assert_eq!(
            columns,
            JoinColumns {
                target_key: "LoginID".into(),
                target_value: "User Name".into(),
                reference_key: "User ID".into(),
                reference_value: "Display Name".into(),
            }
        );
    }

    #[test]
    fn failures_carry_a_hint() {
        let outcome = Outcome::failed(&ReconcileError::InputFileNotFound("missing.xlsx".into()));

        assert!(!outcome.success);
        assert!(outcome.message.starts_with("input file not found: missing.xlsx"));
        assert!(outcome.message.contains("Tip:"));
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }
}
