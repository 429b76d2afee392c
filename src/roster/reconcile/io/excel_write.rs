use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::{debug, instrument};

use crate::roster::reconcile::error::{ReconcileError, Result};
use crate::roster::reconcile::model::{Cell, Table};

/// Number format for date cells without a time part.
const DATE_FORMAT: &str = "yyyy-mm-dd";
/// Number format for date cells carrying a time of day.
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes the table as the only worksheet of a new workbook at `path`,
/// replacing any file already there.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), rows = table.len()))]
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = build_workbook(table).map_err(|source| persist_failure(path, source))?;
    workbook
        .save(path)
        .map_err(|source| persist_failure(path, source))?;
    debug!("workbook saved");
    Ok(())
}

fn persist_failure(path: &Path, source: XlsxError) -> ReconcileError {
    ReconcileError::PersistFailure {
        path: path.to_path_buf(),
        source,
    }
}

fn build_workbook(table: &Table) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    let worksheet = workbook.add_worksheet();
    if !table.sheet_name.is_empty() {
        worksheet.set_name(&table.sheet_name)?;
    }

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, column) in table.columns.iter().enumerate() {
            let excel_col = col_idx as u16;
            match row.get(column) {
                Some(Cell::Text(value)) if !value.is_empty() => {
                    worksheet.write_string(excel_row, excel_col, value)?;
                }
                Some(Cell::Number(value)) => {
                    worksheet.write_number(excel_row, excel_col, *value)?;
                }
                Some(Cell::Bool(value)) => {
                    worksheet.write_boolean(excel_row, excel_col, *value)?;
                }
                Some(Cell::DateTime(serial)) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_number_with_format(excel_row, excel_col, *serial, format)?;
                }
                Some(Cell::Text(_)) | Some(Cell::Empty) | None => {}
            }
        }
    }

    Ok(workbook)
}
