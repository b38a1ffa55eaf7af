//! Run statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reconcile::Outcome;

/// Counters collected over an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IngestStats {
    /// Intake files fully processed and moved
    pub files_processed: usize,
    /// Candidate records produced by the row parser
    pub records_parsed: usize,
    /// Rows dropped as unrepairable
    pub rows_malformed: usize,
    /// Rows skipped by the resume watermark
    pub rows_already_processed: usize,
    /// Carriers inserted
    pub created: usize,
    /// Carriers partially refreshed
    pub updated: usize,
    /// Carriers left alone because another workflow owns them
    pub skipped: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl IngestStats {
    pub fn started() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Total carriers that reached the store
    pub fn reconciled(&self) -> usize {
        self.created + self.updated + self.skipped
    }

    /// Fold another set of counters into this one, keeping the earliest start
    pub fn merge(&mut self, other: &IngestStats) {
        self.files_processed += other.files_processed;
        self.records_parsed += other.records_parsed;
        self.rows_malformed += other.rows_malformed;
        self.rows_already_processed += other.rows_already_processed;
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.started_at = match (self.started_at, other.started_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn duration_secs(&self) -> Option<f64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}
