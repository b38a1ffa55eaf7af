//! Carrier document store
//!
//! The reconciler only needs four operations against a collection keyed by
//! `mc_number`: point lookup with a field-exclusion projection, full insert,
//! partial update, and delete. [`CarrierStore`] is that seam.
//!
//! - [`SqliteStore`]: JSON documents in a SQLite table, used by the binary
//! - [`MemoryStore`]: ordered map, for tests and dry runs

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;

/// A stored carrier document: field name to JSON value
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Sub-documents never needed for reconciliation and left out of lookups
pub const LOOKUP_EXCLUDED_FIELDS: [&str; 1] = ["appointment"];

/// Document collection keyed by `mc_number`
pub trait CarrierStore {
    /// Fetch the document for `mc_number` without the `exclude`d top-level fields
    fn find_one(&self, mc_number: i64, exclude: &[&str]) -> Result<Option<Document>>;

    /// Insert a new document; fails if `mc_number` is already stored
    fn insert_one(&mut self, mc_number: i64, document: &Document) -> Result<()>;

    /// Overwrite only the given top-level fields; returns whether a document matched
    fn update_one(&mut self, mc_number: i64, fields: &Document) -> Result<bool>;

    /// Remove the document; returns whether one existed
    fn delete_one(&mut self, mc_number: i64) -> Result<bool>;
}

fn project(mut document: Document, exclude: &[&str]) -> Document {
    for field in exclude {
        document.remove(*field);
    }
    document
}
