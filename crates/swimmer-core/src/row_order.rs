use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::schema::ROW_NUMBER_COLUMN;
use crate::wide_long::{events_table, intervals_table, row_number_of, Event, Interval};

/// Latest observed offset of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowOrderKey {
    #[serde(rename = "_rowNumber")]
    pub row_number: u32,
    /// `None` when every interval end and event of the row is `NaN`.
    pub max_end: Option<f64>,
}

/// Order rows ascending by their latest interval end or event.
///
/// Only rows that own at least one interval or event appear. Ties keep first-seen order
/// (intervals before events); rows without a defined maximum sort last.
pub fn resolve_row_order(intervals: &[Interval], events: &[Event]) -> Result<Vec<RowOrderKey>> {
    let ends = intervals_table(intervals)?.select(&[ROW_NUMBER_COLUMN, "end"])?;
    let events = events_table(events)?
        .select(&[ROW_NUMBER_COLUMN, "event"])?
        .rename("event", "end")?;

    let ordered = ends
        .concat(&events)?
        .group_max(ROW_NUMBER_COLUMN, "end", "max_end")?
        .order_by_number("max_end")?;

    let keys: Vec<RowOrderKey> = ordered
        .rows()
        .map(|row| RowOrderKey {
            row_number: row_number_of(&row[0]),
            max_end: row[1].as_defined_f64(),
        })
        .collect();
    debug!("resolved display order for {} rows", keys.len());
    Ok(keys)
}

/// The `_rowNumber` sequence in display order.
pub fn ordered_row_numbers(keys: &[RowOrderKey]) -> Vec<u32> {
    keys.iter().map(|k| k.row_number).collect()
}
