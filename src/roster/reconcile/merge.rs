//! Left join of the target table against the reference table.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::roster::reconcile::error::{ReconcileError, Result, TableRole};
use crate::roster::reconcile::model::{Cell, Row, Table};
use crate::roster::reconcile::normalize::{ColumnKind, normalize_value};

/// Actual column names taking part in the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumns {
    pub target_key: String,
    pub target_value: String,
    pub reference_key: String,
    pub reference_value: String,
}

/// Match counts of a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Target rows carrying a non-empty key.
    pub records_with_key: usize,
    /// Target rows whose value was taken from the reference table.
    pub updated: usize,
    /// Keyed target rows without a usable reference row.
    pub no_match: usize,
}

/// The updated target table together with per-row provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub table: Table,
    /// `matched[i]` is `true` when row `i` received a reference value.
    pub matched: Vec<bool>,
}

impl MergedTable {
    /// Rows that received a reference value, in table order.
    pub fn updated_rows(&self) -> impl Iterator<Item = &Row> {
        self.table
            .rows
            .iter()
            .zip(&self.matched)
            .filter_map(|(row, matched)| matched.then_some(row))
    }
}

/// Propagates reference values into a copy of `target`.
///
/// Reference rows with an empty key or value are ignored and only the first
/// row per key is used. Every target row is kept: a matched row takes the
/// reference value, any other row keeps its existing value untouched. The
/// target value column is appended empty when missing.
pub fn reconcile(
    target: &Table,
    reference: &Table,
    columns: &JoinColumns,
) -> Result<(MergedTable, MergeStats)> {
    require_column(target, TableRole::Target, &columns.target_key)?;
    require_column(reference, TableRole::Reference, &columns.reference_key)?;
    require_column(reference, TableRole::Reference, &columns.reference_value)?;

    let lookup = build_lookup(reference, columns);
    debug!(
        reference_rows = reference.len(),
        distinct_keys = lookup.len(),
        "reference lookup built"
    );

    let mut table = target.clone();
    table.ensure_column(&columns.target_value);

    let mut stats = MergeStats::default();
    let mut matched = Vec::with_capacity(table.len());

    for row in &mut table.rows {
        let key = normalize_value(&row.text(&columns.target_key), ColumnKind::Key);
        if key.is_empty() {
            matched.push(false);
            continue;
        }
        stats.records_with_key += 1;

        match lookup.get(key.as_str()) {
            Some(value) => {
                row.set(columns.target_value.clone(), Cell::Text(value.to_string()));
                stats.updated += 1;
                matched.push(true);
            }
            None => matched.push(false),
        }
    }

    stats.no_match = stats.records_with_key - stats.updated;
    Ok((MergedTable { table, matched }, stats))
}

fn require_column(table: &Table, role: TableRole, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(ReconcileError::MissingColumn {
            table: role,
            column: column.to_string(),
        })
    }
}

fn build_lookup(reference: &Table, columns: &JoinColumns) -> HashMap<String, String> {
    let mut lookup = HashMap::new();
    for row in &reference.rows {
        let key = normalize_value(&row.text(&columns.reference_key), ColumnKind::Key);
        let value = normalize_value(&row.text(&columns.reference_value), ColumnKind::Value);
        if key.is_empty() || value.is_empty() {
            continue;
        }
        lookup.entry(key).or_insert(value);
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> JoinColumns {
        JoinColumns {
            target_key: "Login ID".into(),
            target_value: "User Name".into(),
            reference_key: "LoginID".into(),
            reference_value: "Full Name".into(),
        }
    }

    fn reference(rows: &[&[&str]]) -> Table {
        Table::from_text_rows("HC", &["LoginID", "Full Name"], rows)
    }

    fn target(rows: &[&[&str]]) -> Table {
        Table::from_text_rows("Hosts", &["Hostname", "Login ID", "User Name"], rows)
    }

    #[test]
    fn matched_rows_take_reference_value_and_others_keep_theirs() {
        let target = target(&[
            &["LT-001", "jdoe", "Old Name"],
            &["LT-002", "nomatch", "Keep Me"],
        ]);
        let reference = reference(&[&["jdoe", "New Name"]]);

        let (merged, stats) = reconcile(&target, &reference, &columns()).expect("reconciled");

        assert_eq!(merged.table.rows[0].text("User Name"), "New Name");
        assert_eq!(merged.table.rows[1].text("User Name"), "Keep Me");
        assert_eq!(merged.matched, vec![true, false]);
        assert_eq!(
            stats,
            MergeStats {
                records_with_key: 2,
                updated: 1,
                no_match: 1
            }
        );
    }

    #[test]
    fn first_reference_row_wins_for_duplicate_keys() {
        let target = target(&[&["LT-001", "jdoe", ""]]);
        let reference = reference(&[&["jdoe", "Alice"], &[" JDOE ", "Bob"]]);

        let (merged, _) = reconcile(&target, &reference, &columns()).expect("reconciled");

        assert_eq!(merged.table.rows[0].text("User Name"), "Alice");
    }

    #[test]
    fn empty_reference_value_is_not_a_match() {
        let target = target(&[&["LT-001", "jdoe", "Existing"]]);
        let reference = reference(&[&["jdoe", "   "]]);

        let (merged, stats) = reconcile(&target, &reference, &columns()).expect("reconciled");

        assert_eq!(merged.table.rows[0].text("User Name"), "Existing");
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.no_match, 1);
    }

    #[test]
    fn row_count_is_preserved_with_duplicate_reference_keys() {
        let target = target(&[
            &["LT-001", "jdoe", ""],
            &["LT-002", "", ""],
            &["LT-003", "jdoe", ""],
            &["LT-004", "asmith", ""],
        ]);
        let reference = reference(&[
            &["jdoe", "Jane Doe"],
            &["jdoe", "J. Doe"],
            &["asmith", "Alex Smith"],
            &["asmith", "A. Smith"],
        ]);

        let (merged, stats) = reconcile(&target, &reference, &columns()).expect("reconciled");

        assert_eq!(merged.table.len(), target.len());
        assert_eq!(stats.records_with_key, 3);
        assert_eq!(stats.updated, 3);
        assert_eq!(merged.updated_rows().count(), 3);
    }

    #[test]
    fn empty_reference_passes_target_through() {
        let target = target(&[&["LT-001", "jdoe", "Keep"]]);
        let reference = reference(&[]);

        let (merged, stats) = reconcile(&target, &reference, &columns()).expect("reconciled");

        assert_eq!(merged.table, target);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.records_with_key, 1);
    }

    #[test]
    fn empty_target_gives_zero_stats() {
        let target = target(&[]);
        let reference = reference(&[&["jdoe", "Jane Doe"]]);

        let (merged, stats) = reconcile(&target, &reference, &columns()).expect("reconciled");

        assert!(merged.table.is_empty());
        assert_eq!(stats, MergeStats::default());
    }

    #[test]
    fn missing_value_column_is_created() {
        let target = Table::from_text_rows("Hosts", &["Login ID"], &[&["jdoe"], &["other"]]);
        let reference = reference(&[&["jdoe", "Jane Doe"]]);

        let (merged, _) = reconcile(&target, &reference, &columns()).expect("reconciled");

        assert_eq!(merged.table.columns, vec!["Login ID", "User Name"]);
        assert_eq!(merged.table.rows[0].text("User Name"), "Jane Doe");
        assert_eq!(merged.table.rows[1].get("User Name"), Some(&Cell::Empty));
    }

    #[test]
    fn missing_join_column_is_rejected() {
        let target = Table::from_text_rows("Hosts", &["Hostname"], &[&["LT-001"]]);
        let reference = reference(&[]);

        let error = reconcile(&target, &reference, &columns()).expect_err("missing key");

        assert!(matches!(
            error,
            ReconcileError::MissingColumn {
                table: TableRole::Target,
                ..
            }
        ));
    }
}
