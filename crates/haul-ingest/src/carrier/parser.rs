//! CSV row parser
//!
//! Turns intake CSV rows into [`RawCarrier`]s. Some extracts glue the head of
//! the next record onto the `cargo_carried` cell of the previous one:
//!
//! ```text
//! 111,A Co,,1 Rd,555,10,3,a@x,unassigned,"['X','Y']222",B Co,,2 Rd,556,20,4,b@x,
//! ```
//!
//! Such a row is split at the first `]` of the cargo cell into two records.
//! Rows that cannot be repaired are reported and dropped; they never abort the
//! file.

use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use super::model::{Carrier, RawCarrier, CARGO_FIELD_INDEX, FIELD_COUNT};
use crate::error::{Result, RowError};

/// What one CSV row yielded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    /// Every cell blank
    Empty,
    /// Leading key at or below the watermark
    AlreadyProcessed { mc_number: i64 },
    Single(RawCarrier),
    /// Two records recovered from one glued row
    Split(RawCarrier, RawCarrier),
}

/// Records read from one intake file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRows {
    /// Candidate records in file order
    pub records: Vec<RawCarrier>,
    /// Rows dropped as unrepairable
    pub malformed: usize,
    /// Rows skipped by the watermark filter
    pub already_processed: usize,
}

/// Row parser with an optional resume watermark
#[derive(Debug, Clone, Copy, Default)]
pub struct RowParser {
    watermark: Option<i64>,
}

impl RowParser {
    /// Create a parser; rows keyed at or below `watermark` are skipped
    pub fn new(watermark: Option<i64>) -> Self {
        Self { watermark }
    }

    pub fn watermark(&self) -> Option<i64> {
        self.watermark
    }

    /// Parse a single row of cells
    pub fn parse_row<S: AsRef<str>>(&self, cells: &[S]) -> std::result::Result<ParsedRow, RowError> {
        if cells.iter().all(|cell| cell.as_ref().is_empty()) {
            return Ok(ParsedRow::Empty);
        }

        if let (Some(watermark), Some(first)) = (self.watermark, cells.first()) {
            if let Ok(mc_number) = first.as_ref().trim().parse::<i64>() {
                if mc_number <= watermark {
                    return Ok(ParsedRow::AlreadyProcessed { mc_number });
                }
            }
        }

        if cells.len() == FIELD_COUNT {
            return RawCarrier::from_cells(cells).map(ParsedRow::Single);
        }

        let (first, second) = split_glued_row(cells)?;
        Ok(ParsedRow::Split(first, second))
    }

    /// Parse an intake CSV stream; the first line is a header and is skipped
    ///
    /// Only reader failures (I/O, invalid UTF-8) are errors. Malformed rows
    /// are logged with their raw cells and counted.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<FileRows> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut rows = FileRows::default();
        for record in csv_reader.records() {
            let record = record?;
            let cells: Vec<&str> = record.iter().collect();
            let line = record.position().map(|p| p.line());

            match self.parse_row(&cells) {
                Ok(ParsedRow::Empty) => {},
                Ok(ParsedRow::AlreadyProcessed { mc_number }) => {
                    debug!(mc_number, "Skipping already processed row");
                    rows.already_processed += 1;
                },
                Ok(ParsedRow::Single(carrier)) => rows.records.push(carrier),
                Ok(ParsedRow::Split(first, second)) => {
                    debug!(line = ?line, "Recovered two records from glued row");
                    rows.records.push(first);
                    rows.records.push(second);
                },
                Err(error) => {
                    warn!(line = ?line, row = ?cells, error = %error, "Could not parse row");
                    rows.malformed += 1;
                },
            }
        }

        Ok(rows)
    }

    /// Parse an intake CSV file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<FileRows> {
        let file = std::fs::File::open(path.as_ref())?;
        self.parse_reader(file)
    }
}

/// Split a row whose cargo cell also carries the next record's key
///
/// Both halves must have the full arity and must coerce; otherwise the whole
/// row is rejected.
fn split_glued_row<S: AsRef<str>>(cells: &[S]) -> std::result::Result<(RawCarrier, RawCarrier), RowError> {
    let arity_error = || RowError::FieldCount {
        expected: FIELD_COUNT,
        found: cells.len(),
    };

    let cargo_cell = cells.get(CARGO_FIELD_INDEX).ok_or_else(arity_error)?.as_ref();
    let boundary = cargo_cell.find(']').ok_or_else(|| RowError::NoSplitBoundary {
        cell: cargo_cell.to_string(),
    })?;
    let (cargo_tail, next_key) = cargo_cell.split_at(boundary + 1);

    let head: Vec<&str> = cells[..CARGO_FIELD_INDEX]
        .iter()
        .map(AsRef::as_ref)
        .chain(std::iter::once(cargo_tail))
        .collect();
    let tail: Vec<&str> = std::iter::once(next_key)
        .chain(cells[CARGO_FIELD_INDEX + 1..].iter().map(AsRef::as_ref))
        .collect();

    let first = RawCarrier::from_cells(&head)?;
    let second = RawCarrier::from_cells(&tail)?;

    Carrier::try_from(&first)?;
    Carrier::try_from(&second)?;

    Ok((first, second))
}
