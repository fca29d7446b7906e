use std::sync::Arc;

use log::{debug, trace};
use swimmer_table::{Table, Value};

use crate::dates::{day_offset, parse_instant, DateParseOptions};
use crate::error::{Error, Result};
use crate::schema::{WideSchema, ROW_NUMBER_COLUMN};

/// A wide table whose temporal cells are offsets from each row's own reference instant.
///
/// Every `___start` / `___end` / `___event` cell holds a `Value::Number` (possibly `NaN`),
/// metadata columns are untouched, and a 1-based [`ROW_NUMBER_COLUMN`] identifies each row in
/// original order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWide {
    table: Table,
    schema: WideSchema,
    reference_key: String,
    reference_column: String,
}

impl NormalizedWide {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn schema(&self) -> &WideSchema {
        &self.schema
    }

    pub fn reference_key(&self) -> &str {
        &self.reference_key
    }

    pub fn reference_column(&self) -> &str {
        &self.reference_column
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }
}

/// Resolve each row's reference instant and rewrite every temporal cell as a day offset from
/// it, scaled by `divisor` (days per axis unit).
///
/// Unparseable cells (on either side) become `NaN` rather than failing the run. An existing
/// [`ROW_NUMBER_COLUMN`] is overwritten in place.
pub fn normalize(
    data: &Table,
    reference_key: &str,
    divisor: f64,
    options: &DateParseOptions,
) -> Result<NormalizedWide> {
    if !divisor.is_finite() || divisor <= 0.0 {
        return Err(Error::InvalidStepDivisor { value: divisor });
    }

    let mut schema = WideSchema::classify(data.column_names());
    let reference_column = schema.reference_column(reference_key)?.to_string();
    let ref_idx = data
        .column_index(&reference_column)
        .ok_or_else(|| Error::MissingReferenceColumn {
            key: reference_key.to_string(),
        })?;

    let mut columns: Vec<Arc<str>> = data.columns().to_vec();
    let row_number_idx = match data.column_index(ROW_NUMBER_COLUMN) {
        Some(idx) => idx,
        None => {
            columns.push(Arc::from(ROW_NUMBER_COLUMN));
            schema = WideSchema::classify(columns.iter().map(|c| c.as_ref()));
            columns.len() - 1
        }
    };
    let temporal: Vec<usize> = (0..data.column_count())
        .filter(|&idx| schema.role(idx).is_some_and(|role| role.is_temporal()))
        .collect();

    let mut unparseable = 0usize;
    let mut missing_reference = 0usize;
    let mut rows = Vec::with_capacity(data.row_count());
    for (row_idx, raw) in data.rows().enumerate() {
        let reference = parse_instant(&raw[ref_idx], options);
        if reference.is_none() {
            missing_reference += 1;
            trace!(
                "row {}: reference cell {:?} in `{reference_column}` is not a date",
                row_idx + 1,
                raw[ref_idx]
            );
        }

        let mut row = raw.to_vec();
        for &col in &temporal {
            let cell = parse_instant(&raw[col], options);
            if cell.is_none() && !raw[col].is_blank() {
                unparseable += 1;
                trace!(
                    "row {}: cell {:?} in `{}` is not a date",
                    row_idx + 1,
                    raw[col],
                    columns[col]
                );
            }
            row[col] = Value::Number(day_offset(cell, reference, divisor));
        }

        let row_number = Value::Number((row_idx + 1) as f64);
        if row_number_idx < row.len() {
            row[row_number_idx] = row_number;
        } else {
            row.push(row_number);
        }
        rows.push(row);
    }

    debug!(
        "normalized {} rows against `{reference_column}` ({} temporal columns, {divisor} days per unit)",
        rows.len(),
        temporal.len()
    );
    if unparseable > 0 || missing_reference > 0 {
        debug!(
            "{unparseable} temporal cells and {missing_reference} reference cells could not be parsed; their offsets are NaN"
        );
    }

    Ok(NormalizedWide {
        table: Table::from_rows(columns, rows)?,
        schema,
        reference_key: reference_key.to_string(),
        reference_column,
    })
}
