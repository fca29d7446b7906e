use std::collections::HashMap;

use log::debug;
use serde::Serialize;
use swimmer_table::{Table, Value};

use crate::error::Result;
use crate::normalize::NormalizedWide;
use crate::schema::{END_SUFFIX, EVENT_SUFFIX, ROW_NUMBER_COLUMN, START_SUFFIX};

/// A `<key>___start` / `<key>___end` pair of one row, drawn as a bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub name_of_figure: String,
    pub start: f64,
    pub end: f64,
    #[serde(rename = "_rowNumber")]
    pub row_number: u32,
}

/// A `<key>___event` cell of one row, drawn as a marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name_of_figure: String,
    pub event: f64,
    #[serde(rename = "_rowNumber")]
    pub row_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LongData {
    pub intervals: Vec<Interval>,
    pub events: Vec<Event>,
}

pub(crate) fn row_number_of(value: &Value) -> u32 {
    value
        .as_defined_f64()
        .filter(|n| *n >= 0.0)
        .map(|n| n as u32)
        .unwrap_or_default()
}

fn offset_of(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn key_of<'a>(value: &'a Value, suffix: &str) -> &'a str {
    let name = value.as_str().unwrap_or_default();
    name.strip_suffix(suffix).unwrap_or(name)
}

/// Melt `___start` and `___end` columns and join them on `(figure key, row)`.
///
/// Keys that only have one side never produce an interval.
pub fn extract_intervals(normalized: &NormalizedWide) -> Result<Vec<Interval>> {
    let table = normalized.table();
    let schema = normalized.schema();
    let starts = table.melt(
        ROW_NUMBER_COLUMN,
        &schema.start_columns(),
        "start_key",
        "start",
    )?;
    let ends = table.melt(ROW_NUMBER_COLUMN, &schema.end_columns(), "end_key", "end")?;

    let mut end_by_key: HashMap<(u32, &str), f64> = HashMap::with_capacity(ends.row_count());
    for row in ends.rows() {
        end_by_key.insert(
            (row_number_of(&row[0]), key_of(&row[1], END_SUFFIX)),
            offset_of(&row[2]),
        );
    }

    let intervals = starts
        .rows()
        .filter_map(|row| {
            let row_number = row_number_of(&row[0]);
            let key = key_of(&row[1], START_SUFFIX);
            let end = *end_by_key.get(&(row_number, key))?;
            Some(Interval {
                name_of_figure: key.to_string(),
                start: offset_of(&row[2]),
                end,
                row_number,
            })
        })
        .collect();
    Ok(intervals)
}

/// Melt `___event` columns: one event per cell, `NaN` offsets included.
pub fn extract_events(normalized: &NormalizedWide) -> Result<Vec<Event>> {
    let table = normalized.table();
    let long = table.melt(
        ROW_NUMBER_COLUMN,
        &normalized.schema().event_columns(),
        "event_key",
        "event",
    )?;
    Ok(long
        .rows()
        .map(|row| Event {
            name_of_figure: key_of(&row[1], EVENT_SUFFIX).to_string(),
            event: offset_of(&row[2]),
            row_number: row_number_of(&row[0]),
        })
        .collect())
}

pub fn wide_to_long(normalized: &NormalizedWide) -> Result<LongData> {
    let intervals = extract_intervals(normalized)?;
    let events = extract_events(normalized)?;
    debug!(
        "melted {} rows into {} intervals and {} events",
        normalized.row_count(),
        intervals.len(),
        events.len()
    );
    Ok(LongData { intervals, events })
}

impl LongData {
    /// Intervals as a `(nameOfFigure, start, end, _rowNumber)` table.
    pub fn intervals_table(&self) -> Result<Table> {
        intervals_table(&self.intervals)
    }

    /// Events as a `(nameOfFigure, event, _rowNumber)` table.
    pub fn events_table(&self) -> Result<Table> {
        events_table(&self.events)
    }
}

pub(crate) fn intervals_table(intervals: &[Interval]) -> Result<Table> {
    let rows = intervals
        .iter()
        .map(|i| {
            vec![
                Value::from(i.name_of_figure.as_str()),
                Value::Number(i.start),
                Value::Number(i.end),
                Value::from(i.row_number),
            ]
        })
        .collect();
    Ok(Table::from_rows(
        ["nameOfFigure", "start", "end", ROW_NUMBER_COLUMN],
        rows,
    )?)
}

pub(crate) fn events_table(events: &[Event]) -> Result<Table> {
    let rows = events
        .iter()
        .map(|e| {
            vec![
                Value::from(e.name_of_figure.as_str()),
                Value::Number(e.event),
                Value::from(e.row_number),
            ]
        })
        .collect();
    Ok(Table::from_rows(
        ["nameOfFigure", "event", ROW_NUMBER_COLUMN],
        rows,
    )?)
}
