use log::debug;
use serde::Serialize;
use swimmer_table::{Table, Value};

use crate::coerce::{is_falsy, to_number, to_text};
use crate::error::{Error, Result};
use crate::step::convert_step;

pub const DEFAULT_WIDTH: f64 = 1600.0;
pub const DEFAULT_HEIGHT: f64 = 900.0;
pub const DEFAULT_TICK_STEP: f64 = 5.0;

const MEASURE_COLUMN: &str = "measure";
const VALUE_COLUMN: &str = "value";

/// Chart-level settings read from the `settings` table's `(measure, value)` rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSettings {
    /// Plot width in pixels.
    pub width: f64,
    /// Plot height in pixels.
    pub height: f64,
    /// Time axis caption.
    pub label: String,
    /// Tick interval, in axis units.
    pub step: f64,
    /// Days per axis unit (the `oxDimension` setting after unit conversion).
    pub ox_dimension: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            label: String::new(),
            step: DEFAULT_TICK_STEP,
            ox_dimension: 1.0,
        }
    }
}

fn number_or(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(v) if !is_falsy(v) => {
            let n = to_number(v);
            if n == 0.0 || n.is_nan() {
                default
            } else {
                n
            }
        }
        _ => default,
    }
}

impl ChartSettings {
    /// Parse the `settings` table. Falsy values (blank, `0`, `NaN`) keep the defaults; a later
    /// row for the same measure wins.
    pub fn from_table(settings: &Table) -> Result<Self> {
        if settings.column_count() == 0 {
            return Ok(Self::default());
        }
        let measure_idx =
            settings
                .column_index(MEASURE_COLUMN)
                .ok_or_else(|| Error::MissingColumn {
                    table: "settings",
                    column: MEASURE_COLUMN.to_string(),
                })?;
        let value_idx = settings
            .column_index(VALUE_COLUMN)
            .ok_or_else(|| Error::MissingColumn {
                table: "settings",
                column: VALUE_COLUMN.to_string(),
            })?;

        let mut width = None;
        let mut height = None;
        let mut label = None;
        let mut step = None;
        let mut ox_dimension = None;
        for row in settings.rows() {
            let value = &row[value_idx];
            match to_text(&row[measure_idx]).trim() {
                "width" => width = Some(value),
                "height" => height = Some(value),
                "label" => label = Some(value),
                "step" => step = Some(value),
                "oxDimension" => ox_dimension = Some(value),
                "" => {}
                other => debug!("ignoring unknown setting `{other}`"),
            }
        }

        let label = match label {
            Some(v) if !is_falsy(v) => to_text(v),
            _ => String::new(),
        };
        Ok(Self {
            width: number_or(width, DEFAULT_WIDTH),
            height: number_or(height, DEFAULT_HEIGHT),
            label,
            step: number_or(step, DEFAULT_TICK_STEP),
            ox_dimension: convert_step(ox_dimension.unwrap_or(&Value::Null))?,
        })
    }
}
