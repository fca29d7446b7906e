use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
    #[error("row has {actual} values but the table has {expected} columns")]
    RowLength { expected: usize, actual: usize },
    #[error("cannot concatenate tables with different columns ({left:?} vs {right:?})")]
    SchemaMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
}

/// Row-oriented table with named, ordered columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Arc<str>>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let columns: Vec<Arc<str>> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.clone()) {
                return Err(TableError::DuplicateColumn(name.to_string()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowLength {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Arc<str>] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.as_ref())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.as_ref() == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row)?.get(col)
    }

    /// Look up a cell by column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.get(row, col)
    }

    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(col))
    }

    /// Project onto the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let indices = names
            .iter()
            .map(|name| self.require_column(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.project(&indices)
    }

    /// Project onto the leading columns `[0, end)` followed by the named `extra` columns.
    ///
    /// `end` is clamped to the column count. Extras already inside the leading range are not
    /// repeated.
    pub fn select_range<S: AsRef<str>>(&self, end: usize, extra: &[S]) -> Result<Table, TableError> {
        let end = end.min(self.columns.len());
        let mut indices: Vec<usize> = (0..end).collect();
        for name in extra {
            let idx = self.require_column(name.as_ref())?;
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
        self.project(&indices)
    }

    fn project(&self, indices: &[usize]) -> Result<Table, TableError> {
        let columns: Vec<Arc<str>> = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table::from_rows(columns, rows)
    }

    pub fn rename(&self, from: &str, to: impl Into<Arc<str>>) -> Result<Table, TableError> {
        let idx = self.require_column(from)?;
        let to = to.into();
        if self.columns.iter().enumerate().any(|(i, c)| i != idx && *c == to) {
            return Err(TableError::DuplicateColumn(to.to_string()));
        }
        let mut out = self.clone();
        out.columns[idx] = to;
        Ok(out)
    }

    /// Reshape from wide to long.
    ///
    /// For every input row and every column in `value_columns`, emits one output row
    /// `(id, column name, cell)`. Output is row-major: all columns of row 0, then row 1, etc.
    pub fn melt<S: AsRef<str>>(
        &self,
        id_column: &str,
        value_columns: &[S],
        key_name: &str,
        value_name: &str,
    ) -> Result<Table, TableError> {
        let id_idx = self.require_column(id_column)?;
        let value_idx = value_columns
            .iter()
            .map(|name| self.require_column(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Table::new([id_column, key_name, value_name])?;
        out.rows.reserve(self.rows.len() * value_idx.len());
        for row in &self.rows {
            for &col in &value_idx {
                out.rows.push(vec![
                    row[id_idx].clone(),
                    Value::String(self.columns[col].clone()),
                    row[col].clone(),
                ]);
            }
        }
        Ok(out)
    }

    /// Append the rows of `other`. Both tables must have identical column lists.
    pub fn concat(&self, other: &Table) -> Result<Table, TableError> {
        if self.columns != other.columns {
            return Err(TableError::SchemaMismatch {
                left: self.column_names().map(str::to_owned).collect(),
                right: other.column_names().map(str::to_owned).collect(),
            });
        }
        let mut out = self.clone();
        out.rows.extend(other.rows.iter().cloned());
        Ok(out)
    }

    /// Group rows by `key_column` and take the maximum of `value_column` per group.
    ///
    /// Returns a two-column table `(key_column, output_name)` with groups in first-seen order.
    /// `Null`, `NaN` and non-numeric values do not participate; a group with no defined value
    /// aggregates to `Null`.
    pub fn group_max(
        &self,
        key_column: &str,
        value_column: &str,
        output_name: &str,
    ) -> Result<Table, TableError> {
        let key_idx = self.require_column(key_column)?;
        let value_idx = self.require_column(value_column)?;

        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<(Value, Option<f64>)> = Vec::new();
        for row in &self.rows {
            let key = &row[key_idx];
            let slot = *index.entry(GroupKey::from(key)).or_insert_with(|| {
                groups.push((key.clone(), None));
                groups.len() - 1
            });
            if let Some(v) = row[value_idx].as_defined_f64() {
                let current = &mut groups[slot].1;
                *current = Some(current.map_or(v, |c| c.max(v)));
            }
        }

        let rows = groups
            .into_iter()
            .map(|(key, max)| vec![key, max.map(Value::Number).unwrap_or(Value::Null)])
            .collect();
        Table::from_rows([key_column, output_name], rows)
    }

    /// Stable ascending sort on a numeric column. `Null`, `NaN` and non-numeric cells sort last.
    pub fn order_by_number(&self, column: &str) -> Result<Table, TableError> {
        let idx = self.require_column(column)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            match (a[idx].as_defined_f64(), b[idx].as_defined_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }
}

/// Hashable projection of a [`Value`] used for grouping.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Null,
    Number(u64),
    String(Arc<str>),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl From<&Value> for GroupKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => GroupKey::Null,
            // Fold -0.0 into 0.0 so they land in the same group.
            Value::Number(n) if *n == 0.0 => GroupKey::Number(0f64.to_bits()),
            Value::Number(n) => GroupKey::Number(n.to_bits()),
            Value::String(s) => GroupKey::String(s.clone()),
            Value::Boolean(b) => GroupKey::Boolean(*b),
            Value::DateTime(dt) => GroupKey::DateTime(*dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_duplicate_columns() {
        assert_eq!(
            Table::new(["a", "b", "a"]).unwrap_err(),
            TableError::DuplicateColumn("a".to_string())
        );
    }

    #[test]
    fn push_row_checks_length() {
        let mut table = Table::new(["a", "b"]).unwrap();
        let err = table.push_row(vec![Value::Null]).unwrap_err();
        assert_eq!(
            err,
            TableError::RowLength {
                expected: 2,
                actual: 1
            }
        );
        assert!(table.is_empty());
    }

    #[test]
    fn select_range_does_not_repeat_extras() {
        let table = Table::from_rows(
            ["a", "b", "c"],
            vec![vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]],
        )
        .unwrap();
        let out = table.select_range(2, &["a", "c"]).unwrap();
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn rename_rejects_collisions() {
        let table = Table::new(["a", "b"]).unwrap();
        assert!(table.rename("a", "b").is_err());
        let renamed = table.rename("a", "z").unwrap();
        assert_eq!(renamed.column_names().collect::<Vec<_>>(), vec!["z", "b"]);
    }

    #[test]
    fn negative_zero_groups_with_zero() {
        let table = Table::from_rows(
            ["k", "v"],
            vec![
                vec![Value::Number(0.0), Value::Number(1.0)],
                vec![Value::Number(-0.0), Value::Number(5.0)],
            ],
        )
        .unwrap();
        let out = table.group_max("k", "v", "max").unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.get(0, 1), Some(&Value::Number(5.0)));
    }
}
