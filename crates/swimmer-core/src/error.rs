use swimmer_table::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("reference column not found: expected `{key}___event` or `{key}___start` in the data table")]
    MissingReferenceColumn { key: String },
    #[error("styles table has no rows; its first row names the reference figure")]
    MissingReferenceKey,
    #[error("unrecognized axis unit `{unit}` (expected a number of days, or text containing day, week, month or year)")]
    UnrecognizedStepUnit { unit: String },
    #[error("step divisor must be a finite number greater than zero, got {value}")]
    InvalidStepDivisor { value: f64 },
    #[error("`{table}` table is missing required column `{column}`")]
    MissingColumn { table: &'static str, column: String },
    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
