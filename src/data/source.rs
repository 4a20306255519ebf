use std::collections::HashMap;

use crate::data::numeric::{FieldType, Numeric};
use crate::error::{NnError, Result};

/// A row-oriented store of named scalar fields.
///
/// A cursor selects the current row; field lookups read from that row.
pub trait RecordSource {
    fn num_entries(&self) -> usize;

    /// Moves the cursor to `index`.
    fn select_row(&mut self, index: usize) -> Result<()>;

    /// Value of `name` in the current row.
    fn field(&self, name: &str) -> Result<Numeric>;

    /// Storage type of `name`, or `None` if the source has no such field.
    fn field_type(&self, name: &str) -> Option<FieldType>;

    fn field_as_double(&self, name: &str) -> Result<f64> {
        Ok(self.field(name)?.as_double())
    }

    fn field_as_int(&self, name: &str) -> Result<i32> {
        Ok(self.field(name)?.as_int())
    }
}

#[derive(Debug, Clone)]
enum Column {
    Double(Vec<f64>),
    Float(Vec<f32>),
    Int(Vec<i32>),
}

impl Column {
    fn len(&self) -> usize {
        match self {
            Column::Double(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
        }
    }

    fn get(&self, row: usize) -> Option<Numeric> {
        match self {
            Column::Double(v) => v.get(row).copied().map(Numeric::Double),
            Column::Float(v) => v.get(row).copied().map(Numeric::Float),
            Column::Int(v) => v.get(row).copied().map(Numeric::Int),
        }
    }

    fn field_type(&self) -> FieldType {
        match self {
            Column::Double(_) => FieldType::Double,
            Column::Float(_) => FieldType::Float,
            Column::Int(_) => FieldType::Int,
        }
    }
}

/// In-memory columnar `RecordSource`. Every column must have the same length.
#[derive(Debug, Clone, Default)]
pub struct TableSource {
    columns: HashMap<String, Column>,
    rows: Option<usize>,
    cursor: usize,
}

impl TableSource {
    pub fn new() -> TableSource {
        TableSource::default()
    }

    pub fn with_doubles(self, name: &str, values: Vec<f64>) -> Result<TableSource> {
        self.with_column(name, Column::Double(values))
    }

    pub fn with_floats(self, name: &str, values: Vec<f32>) -> Result<TableSource> {
        self.with_column(name, Column::Float(values))
    }

    pub fn with_ints(self, name: &str, values: Vec<i32>) -> Result<TableSource> {
        self.with_column(name, Column::Int(values))
    }

    fn with_column(mut self, name: &str, column: Column) -> Result<TableSource> {
        if self.columns.contains_key(name) {
            return Err(NnError::DuplicateField(name.to_string()));
        }
        if let Some(rows) = self.rows {
            if rows != column.len() {
                return Err(NnError::LengthMismatch {
                    context: "table columns",
                    left: rows,
                    right: column.len(),
                });
            }
        }
        self.rows = Some(column.len());
        self.columns.insert(name.to_string(), column);
        Ok(self)
    }

    pub fn current_row(&self) -> usize {
        self.cursor
    }
}

impl RecordSource for TableSource {
    fn num_entries(&self) -> usize {
        self.rows.unwrap_or(0)
    }

    fn select_row(&mut self, index: usize) -> Result<()> {
        let rows = self.num_entries();
        if index >= rows {
            return Err(NnError::RowOutOfRange { index, rows });
        }
        self.cursor = index;
        Ok(())
    }

    fn field(&self, name: &str) -> Result<Numeric> {
        let column = self.columns.get(name)
            .ok_or_else(|| NnError::UnknownField(name.to_string()))?;
        column.get(self.cursor).ok_or(NnError::RowOutOfRange {
            index: self.cursor,
            rows: column.len(),
        })
    }

    fn field_type(&self, name: &str) -> Option<FieldType> {
        self.columns.get(name).map(Column::field_type)
    }
}
