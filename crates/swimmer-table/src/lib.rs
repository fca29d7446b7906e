//! In-memory tables for the swimmer plot pipeline.
//!
//! This crate provides the small set of relational operations the pipeline needs:
//! - Projection (`select`, `select_range`) and column renaming (`rename`).
//! - Wide-to-long reshaping (`melt`).
//! - Row concatenation, grouped `max` aggregation and stable numeric ordering.
//!
//! Tables are immutable values: every operation returns a new [`Table`].

#![forbid(unsafe_code)]

mod table;
mod value;

pub use crate::table::{Table, TableError};
pub use crate::value::Value;
