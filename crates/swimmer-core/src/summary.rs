use std::sync::Arc;

use log::debug;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use swimmer_table::{Table, Value};

use crate::error::Result;
use crate::normalize::NormalizedWide;
use crate::schema::ROW_NUMBER_COLUMN;
use crate::wide_long::row_number_of;

/// Per-row identifying columns shown next to the plot.
///
/// Holds every column declared before the reference figure's first column, plus
/// [`ROW_NUMBER_COLUMN`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    table: Table,
}

/// One row of a [`SummaryTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRecord<'a> {
    fields: &'a [Arc<str>],
    values: &'a [Value],
}

impl SummaryTable {
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.table.column_names()
    }

    pub fn len(&self) -> usize {
        self.table.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<SummaryRecord<'_>> {
        Some(SummaryRecord {
            fields: self.table.columns(),
            values: self.table.row(index)?,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = SummaryRecord<'_>> + '_ {
        let fields = self.table.columns();
        self.table
            .rows()
            .map(move |values| SummaryRecord { fields, values })
    }
}

impl<'a> SummaryRecord<'a> {
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        let idx = self.fields.iter().position(|f| f.as_ref() == field)?;
        self.values.get(idx)
    }

    pub fn row_number(&self) -> Option<u32> {
        self.get(ROW_NUMBER_COLUMN).map(row_number_of)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.fields
            .iter()
            .map(|f| f.as_ref())
            .zip(self.values.iter())
    }
}

impl Serialize for SummaryRecord<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            if field == ROW_NUMBER_COLUMN {
                // Same integer type as the `_rowNumber` of intervals and events.
                map.serialize_entry(field, &row_number_of(value))?;
            } else {
                map.serialize_entry(field, value)?;
            }
        }
        map.end()
    }
}

struct Records<'a>(&'a SummaryTable);

impl Serialize for Records<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.records())
    }
}

impl Serialize for SummaryTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields: Vec<&str> = self.fields().collect();
        let mut state = serializer.serialize_struct("SummaryTable", 2)?;
        state.serialize_field("fields", &fields)?;
        state.serialize_field("records", &Records(self))?;
        state.end()
    }
}

/// Slice off the metadata columns that precede the reference figure.
pub fn extract_summary(normalized: &NormalizedWide) -> Result<SummaryTable> {
    let boundary = normalized
        .schema()
        .summary_boundary(normalized.reference_key())?;
    let table = normalized
        .table()
        .select_range(boundary, &[ROW_NUMBER_COLUMN])?;
    debug!(
        "summary table has {} fields for {} rows",
        table.column_count(),
        table.row_count()
    );
    Ok(SummaryTable { table })
}
