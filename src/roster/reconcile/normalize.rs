use crate::roster::reconcile::model::{Cell, Table};

/// How a column is canonicalised before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Join keys are trimmed and lower-cased.
    Key,
    /// Propagated values are only trimmed.
    Value,
}

/// Rewrites every cell of `column` as trimmed text, lower-casing keys.
/// Absent and empty cells become empty text. Applying it twice is the same
/// as applying it once.
pub fn normalize_column(table: &mut Table, column: &str, kind: ColumnKind) {
    for row in &mut table.rows {
        let normalized = normalize_value(&row.text(column), kind);
        row.set(column, Cell::Text(normalized));
    }
}

/// Canonical form of a single raw value.
pub fn normalize_value(raw: &str, kind: ColumnKind) -> String {
    let trimmed = raw.trim();
    match kind {
        ColumnKind::Key => trimmed.to_lowercase(),
        ColumnKind::Value => trimmed.to_string(),
    }
}
