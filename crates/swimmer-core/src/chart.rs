use log::{debug, info};
use serde::Serialize;
use swimmer_table::Table;

use crate::dates::DateParseOptions;
use crate::error::Result;
use crate::extent::time_extent;
use crate::normalize::normalize;
use crate::row_order::{ordered_row_numbers, resolve_row_order, RowOrderKey};
use crate::settings::ChartSettings;
use crate::styles::FigureStyles;
use crate::summary::{extract_summary, SummaryTable};
use crate::wide_long::{wide_to_long, Event, Interval};

/// The three named tables of a swimmer-plot source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTables {
    pub styles: Table,
    pub settings: Table,
    pub data: Table,
}

/// Everything a renderer needs, derived from one [`SourceTables`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedChart {
    pub settings: ChartSettings,
    pub styles: FigureStyles,
    pub reference_key: String,
    pub intervals: Vec<Interval>,
    pub events: Vec<Event>,
    pub row_order: Vec<RowOrderKey>,
    pub row_numbers: Vec<u32>,
    pub summary: SummaryTable,
    /// `(min, max)` of the non-negative offsets, if any.
    pub time_extent: Option<(f64, f64)>,
}

/// Run the whole pipeline: settings and styles, normalization, melting, row order and summary.
///
/// Stops at the first fatal error; no partial chart is produced.
pub fn prepare_chart(sources: &SourceTables, options: &DateParseOptions) -> Result<PreparedChart> {
    let settings = ChartSettings::from_table(&sources.settings)?;
    let styles = FigureStyles::from_table(&sources.styles)?;
    let reference_key = styles.reference_key()?.to_string();
    debug!(
        "reference figure `{reference_key}`, {} days per unit",
        settings.ox_dimension
    );

    let normalized = normalize(&sources.data, &reference_key, settings.ox_dimension, options)?;
    let long = wide_to_long(&normalized)?;
    let row_order = resolve_row_order(&long.intervals, &long.events)?;
    let summary = extract_summary(&normalized)?;
    let extent = time_extent(&long.intervals, &long.events);

    info!(
        "prepared chart: {} rows, {} intervals, {} events",
        normalized.row_count(),
        long.intervals.len(),
        long.events.len()
    );

    Ok(PreparedChart {
        settings,
        styles,
        reference_key,
        row_numbers: ordered_row_numbers(&row_order),
        intervals: long.intervals,
        events: long.events,
        row_order,
        summary,
        time_extent: extent,
    })
}
