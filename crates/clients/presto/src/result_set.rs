//! Normalized query results.

use serde::ser::{SerializeMap as _, SerializeSeq as _};

/// Rows returned by a query, with every row holding exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

impl ResultSet {
    /// Builds a result set, rejecting rows whose arity differs from the column count.
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
    ) -> Result<Self, ArityError> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(ArityError {
                row,
                expected: columns.len(),
                actual: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<serde_json::Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Serializes as a JSON array of row objects (column name → value).
impl serde::Serialize for ResultSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        struct Row<'a> {
            columns: &'a [String],
            values: &'a [serde_json::Value],
        }

        impl serde::Serialize for Row<'_> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let mut map = serializer.serialize_map(Some(self.columns.len()))?;
                for (column, value) in self.columns.iter().zip(self.values) {
                    map.serialize_entry(column, value)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for values in &self.rows {
            seq.serialize_element(&Row {
                columns: &self.columns,
                values,
            })?;
        }
        seq.end()
    }
}

/// A row does not have one value per column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row} has {actual} values, expected {expected}")]
pub struct ArityError {
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}
