//! Reconciliation engine
//!
//! Each incoming [`Carrier`] is compared with what the store already holds:
//!
//! 1. Not stored: insert the whole record ([`Outcome::Created`])
//! 2. Stored with a refreshable `c_status`: overwrite the updatable fields
//!    only ([`Outcome::Updated`])
//! 3. Stored with any other status: another workflow owns the carrier, leave
//!    it alone ([`Outcome::Skipped`])
//!
//! After every record the watermark moves to that record's `mc_number`.
//! The status check and the write are not atomic; a concurrent status change
//! by another process is picked up on a later run.

use std::fmt;

use serde_json::Value;
use tracing::{info, warn};

use crate::carrier::model::UPDATABLE_FIELDS;
use crate::carrier::Carrier;
use crate::error::Result;
use crate::stats::IngestStats;
use crate::store::{CarrierStore, Document, LOOKUP_EXCLUDED_FIELDS};
use crate::watermark::WatermarkStore;

/// What happened to one carrier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    /// Stored carrier has a status this pipeline must not touch
    Skipped { status: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => write!(f, "created"),
            Outcome::Updated => write!(f, "updated"),
            Outcome::Skipped { .. } => write!(f, "skipped"),
        }
    }
}

/// Applies the create / refresh / skip policy against a store
pub struct Reconciler<S, W> {
    store: S,
    watermark: W,
    refreshable_statuses: Vec<String>,
}

impl<S: CarrierStore, W: WatermarkStore> Reconciler<S, W> {
    pub fn new(store: S, watermark: W, refreshable_statuses: Vec<String>) -> Self {
        Self {
            store,
            watermark,
            refreshable_statuses,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn watermark_mut(&mut self) -> &mut W {
        &mut self.watermark
    }

    pub fn into_parts(self) -> (S, W) {
        (self.store, self.watermark)
    }

    /// Reconcile one carrier; `index` is its position in the current batch
    pub fn reconcile(&mut self, index: usize, carrier: &Carrier) -> Result<Outcome> {
        let mc_number = carrier.mc_number;
        let existing = self.store.find_one(mc_number, &LOOKUP_EXCLUDED_FIELDS)?;

        let outcome = match existing {
            None => {
                let document = to_document(carrier)?;
                self.store.insert_one(mc_number, &document)?;
                Outcome::Created
            },
            Some(stored) => match stored_status(&stored) {
                Some(status) if self.is_refreshable(status) => {
                    let fields = updatable_fields(carrier)?;
                    if !self.store.update_one(mc_number, &fields)? {
                        warn!(index, mc_number, "Carrier disappeared before update");
                    }
                    Outcome::Updated
                },
                Some(status) => Outcome::Skipped {
                    status: status.to_string(),
                },
                None => {
                    warn!(index, mc_number, "Stored carrier has no c_status");
                    Outcome::Skipped {
                        status: String::new(),
                    }
                },
            },
        };

        match &outcome {
            Outcome::Skipped { status } => {
                info!(index, mc_number, outcome = %outcome, status = %status, "Skipping carrier")
            },
            _ => info!(index, mc_number, outcome = %outcome, "Carrier reconciled"),
        }

        self.watermark.save(mc_number)?;
        Ok(outcome)
    }

    /// Reconcile carriers in order, stopping at the first store failure
    pub fn reconcile_all(&mut self, carriers: &[Carrier]) -> Result<IngestStats> {
        let mut stats = IngestStats::default();
        for (index, carrier) in carriers.iter().enumerate() {
            let outcome = self.reconcile(index, carrier)?;
            stats.record(&outcome);
        }
        Ok(stats)
    }

    fn is_refreshable(&self, status: &str) -> bool {
        self.refreshable_statuses.iter().any(|s| s == status)
    }
}

/// Stored `c_status`; a missing or non-string status is never refreshable
fn stored_status(document: &Document) -> Option<&str> {
    document.get("c_status").and_then(Value::as_str)
}

fn to_document(carrier: &Carrier) -> Result<Document> {
    Ok(serde_json::from_value(serde_json::to_value(carrier)?)?)
}

fn updatable_fields(carrier: &Carrier) -> Result<Document> {
    let mut document = to_document(carrier)?;
    document.retain(|field, _| UPDATABLE_FIELDS.contains(&field.as_str()));
    Ok(document)
}
