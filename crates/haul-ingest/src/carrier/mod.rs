//! Carrier records: raw CSV shape, typed shape, and the conversions between them
//!
//! A row flows through three stages:
//!
//! 1. [`parser::RowParser`] turns CSV cells into [`RawCarrier`]s, repairing rows
//!    that glue two records together
//! 2. [`coerce`] types the raw strings into a [`Carrier`]
//! 3. the reconciler writes the [`Carrier`] to the store

pub mod cargo;
pub mod coerce;
pub mod model;
pub mod parser;

pub use model::{Carrier, PowerUnits, RawCarrier, CARGO_FIELD_INDEX, CSV_FIELDS, FIELD_COUNT};
pub use parser::{FileRows, ParsedRow, RowParser};
