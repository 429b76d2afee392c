use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Identifies which of the two input tables an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// The authoritative table supplying values.
    Reference,
    /// The table that is updated in place.
    Target,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Reference => write!(f, "Reference"),
            TableRole::Target => write!(f, "Target"),
        }
    }
}

/// A required column that could not be resolved on one of the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub table: TableRole,
    pub column: String,
}

impl MissingColumn {
    pub fn new(table: TableRole, column: impl Into<String>) -> Self {
        Self {
            table,
            column: column.into(),
        }
    }
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}'", self.table, self.column)
    }
}

/// Error type covering the different failure cases of a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Raised when one of the input files does not exist.
    #[error("input file not found: {}", .0.display())]
    InputFileNotFound(PathBuf),

    /// Raised when required columns cannot be resolved by alias. Every
    /// missing column across both tables is listed.
    #[error("required column(s) not found -> {}", join_missing(.0))]
    MissingRequiredColumn(Vec<MissingColumn>),

    /// Raised when the reconciler is handed a column name its table lacks.
    #[error("column '{column}' is not present in the {table} table")]
    MissingColumn { table: TableRole, column: String },

    /// Errors bubbled up from the Excel reader implementation.
    #[error("failed to load {}: {source}", .path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// Raised when a workbook has no worksheet to read from.
    #[error("workbook {} contains no worksheets", .0.display())]
    EmptyWorkbook(PathBuf),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("failed to write {}: {source}", .path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Wrapper for IO failures such as probing for an existing backup.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the report cannot be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for faults outside the categories above.
    #[error("unexpected failure: {0}")]
    Unexpected(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ReconcileError {
    /// Operator-facing advice printed next to the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ReconcileError::InputFileNotFound(_) => {
                Some("Check the file location or pass --reference/--target explicitly.")
            }
            ReconcileError::MissingRequiredColumn(_) => {
                Some("Check for exact column headers or trailing spaces in Excel.")
            }
            ReconcileError::LoadFailure { .. } | ReconcileError::PersistFailure { .. } => {
                Some("Make sure the file is a valid .xlsx workbook and is not open in Excel.")
            }
            _ => None,
        }
    }
}

fn join_missing(missing: &[MissingColumn]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
