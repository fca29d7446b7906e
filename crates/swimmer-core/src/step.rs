use log::debug;
use swimmer_table::Value;

use crate::error::{Error, Result};

pub const DAYS_PER_MONTH: f64 = 30.4375;
pub const DAYS_PER_YEAR: f64 = 365.25;
pub const DAYS_PER_WEEK: f64 = 7.0;
const DAYS_PER_DAY: f64 = 1.0;

/// Map an axis-unit setting to the number of days in one axis unit.
///
/// Numbers (and numeric text) are already a day count and pass through. Text is matched by
/// substring, case-insensitively: `month`, `year`, `week`, then `day`. A missing or blank
/// setting means days.
pub fn convert_step(unit: &Value) -> Result<f64> {
    let divisor = match unit {
        Value::Null => DAYS_PER_DAY,
        Value::Number(n) => *n,
        Value::String(s) => {
            let normalized = s.trim().to_lowercase();
            if normalized.is_empty() {
                DAYS_PER_DAY
            } else if let Ok(n) = normalized.parse::<f64>() {
                n
            } else if normalized.contains("month") {
                DAYS_PER_MONTH
            } else if normalized.contains("year") {
                DAYS_PER_YEAR
            } else if normalized.contains("week") {
                DAYS_PER_WEEK
            } else if normalized.contains("day") {
                DAYS_PER_DAY
            } else {
                return Err(Error::UnrecognizedStepUnit {
                    unit: s.to_string(),
                });
            }
        }
        Value::Boolean(_) | Value::DateTime(_) => {
            return Err(Error::UnrecognizedStepUnit {
                unit: unit.to_string(),
            })
        }
    };

    if !divisor.is_finite() || divisor <= 0.0 {
        return Err(Error::InvalidStepDivisor { value: divisor });
    }
    debug!("axis unit {unit:?} -> {divisor} days");
    Ok(divisor)
}
