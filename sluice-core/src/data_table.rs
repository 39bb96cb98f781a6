use crate::{ColumnInfo, QueryError, Result, Value};

/// Fully buffered result set.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Target object for stored procedures and direct table reads, empty otherwise.
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Box<[Value]>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, its width must match the columns.
    pub fn push(&mut self, row: Box<[Value]>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(QueryError::validation(format!(
                "Row has {} values but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Value at `row` in the column named `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|v| v.get(index))
    }
}
