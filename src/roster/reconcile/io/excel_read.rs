use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, instrument};

use crate::roster::reconcile::error::{ReconcileError, Result};
use crate::roster::reconcile::model::{Cell, Row, Table, unique_headers};

/// Reads the first worksheet of an Excel workbook into a [`Table`].
///
/// The first row of the used range is the header. Blank rows between data
/// rows are kept; a trailing run of blank rows is dropped.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|source| load_failure(path, source))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReconcileError::EmptyWorkbook(path.to_path_buf()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReconcileError::EmptyWorkbook(path.to_path_buf()))?
        .map_err(|source| load_failure(path, source))?;

    let table = range_to_table(sheet_name, &range);
    debug!(
        sheet = %table.sheet_name,
        columns = table.columns.len(),
        rows = table.len(),
        "worksheet loaded"
    );
    Ok(table)
}

fn load_failure(path: &Path, source: calamine::XlsxError) -> ReconcileError {
    ReconcileError::LoadFailure {
        path: path.to_path_buf(),
        source,
    }
}

fn range_to_table(sheet_name: String, range: &Range<DataType>) -> Table {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| to_cell(cell).to_text())
            .collect(),
        None => Vec::new(),
    };
    let columns = unique_headers(headers);
    let mut table = Table::new(sheet_name, columns);

    for raw in rows {
        let row: Row = table
            .columns
            .iter()
            .enumerate()
            .map(|(col_idx, column)| {
                let cell = raw.get(col_idx).map(to_cell).unwrap_or_default();
                (column.clone(), cell)
            })
            .collect();
        table.rows.push(row);
    }

    while table.rows.last().is_some_and(is_blank_row) {
        table.rows.pop();
    }

    table
}

fn is_blank_row(row: &Row) -> bool {
    row.cells().all(|cell| matches!(cell, Cell::Empty))
}

fn to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::String(value) if value.is_empty() => Cell::Empty,
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(serial) => Cell::DateTime(*serial),
        other => Cell::Text(other.to_string()),
    }
}
