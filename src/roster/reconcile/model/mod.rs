use std::collections::BTreeMap;

/// A single spreadsheet cell as seen by the reconciler.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    /// Column present in the row but holding nothing.
    #[default]
    Empty,
    /// Plain string value.
    Text(String),
    /// Numeric value. Excel stores integers as floats.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Date or time as an Excel serial day number, written back with a date
    /// format.
    DateTime(f64),
}

impl Cell {
    /// Renders the cell as a string. Integral numbers drop the fractional
    /// part so that `1042.0` becomes `"1042"`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.clone(),
            Cell::Number(value) | Cell::DateTime(value) => value.to_string(),
            Cell::Bool(value) => value.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// One record of a table, keyed by column name.
///
/// A column missing from the mapping is absent from this row, which is
/// distinct from a column that is present and mapped to [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<String, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell for `column`, or `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.values.get(column)
    }

    /// Returns the cell's text, treating absent and empty alike.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(Cell::to_text).unwrap_or_default()
    }

    /// Cells of the columns present in this row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.values.values()
    }

    /// Inserts or replaces the value of `column`.
    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        self.values.insert(column.into(), cell);
    }
}

impl<K: Into<String>> FromIterator<(K, Cell)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Cell)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(column, cell)| (column.into(), cell))
                .collect(),
        }
    }
}

/// An ordered set of rows sharing a header, read from a single worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Name of the worksheet the table was read from or will be written to.
    pub sheet_name: String,
    /// Column names in display order. Unique after trimming.
    pub columns: Vec<String>,
    /// Records in their original order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new(sheet_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from positional string rows. Blank strings become
    /// [`Cell::Empty`]. Mostly useful for fixtures.
    pub fn from_text_rows(
        sheet_name: impl Into<String>,
        columns: &[&str],
        rows: &[&[&str]],
    ) -> Self {
        let mut table = Self::new(
            sheet_name,
            columns.iter().map(|column| column.to_string()).collect(),
        );
        for values in rows {
            let row = table
                .columns
                .iter()
                .zip(values.iter())
                .map(|(column, value)| {
                    let cell = if value.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::from(*value)
                    };
                    (column.clone(), cell)
                })
                .collect();
            table.rows.push(row);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|existing| existing == column)
    }

    /// Appends `column` to the header if missing, filling every row with an
    /// empty cell. Returns `true` when the column was created.
    pub fn ensure_column(&mut self, column: &str) -> bool {
        if self.has_column(column) {
            return false;
        }
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.set(column, Cell::Empty);
        }
        true
    }
}

/// Makes raw header cells usable as column names: trims them, names blank
/// headers `Column N` and suffixes repeats with `.1`, `.2`, ...
pub fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());

    for (index, header) in raw.into_iter().enumerate() {
        let trimmed = header.trim();
        let base = if trimmed.is_empty() {
            format!("Column {}", index + 1)
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while headers.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        headers.push(candidate);
    }

    headers
}
