//! Swimmer plot data preparation.
//!
//! Turns a human-authored wide table (one row per subject, `<key>___start` / `<key>___end` /
//! `<key>___event` column groups) into per-row-relative, unit-scaled intervals and events, plus
//! the row ordering and summary side table a renderer needs.
//!
//! The stages can be run individually ([`normalize`], [`wide_to_long`], [`resolve_row_order`],
//! [`extract_summary`]) or end to end via [`prepare_chart`].

#![forbid(unsafe_code)]

mod chart;
mod coerce;
pub mod dates;
mod error;
mod extent;
mod normalize;
mod row_order;
mod schema;
mod settings;
mod step;
mod styles;
mod summary;
mod wide_long;

pub use chart::{prepare_chart, PreparedChart, SourceTables};
pub use dates::{parse_instant, serial_to_datetime, DateParseOptions, DateSystem};
pub use error::{Error, Result};
pub use extent::time_extent;
pub use normalize::{normalize, NormalizedWide};
pub use row_order::{ordered_row_numbers, resolve_row_order, RowOrderKey};
pub use schema::{
    ColumnRole, WideSchema, END_SUFFIX, EVENT_SUFFIX, ROW_NUMBER_COLUMN, START_SUFFIX,
};
pub use settings::ChartSettings;
pub use step::{convert_step, DAYS_PER_MONTH, DAYS_PER_WEEK, DAYS_PER_YEAR};
pub use styles::{FigureStyle, FigureStyles};
pub use summary::{extract_summary, SummaryRecord, SummaryTable};
pub use wide_long::{extract_events, extract_intervals, wide_to_long, Event, Interval, LongData};

pub use swimmer_table::{Table, TableError, Value};
