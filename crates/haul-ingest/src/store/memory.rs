use std::collections::BTreeMap;

use super::{project, CarrierStore, Document};
use crate::error::{IngestError, Result};

/// In-memory carrier collection
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<i64, Document>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full stored document, including fields lookups exclude
    pub fn get(&self, mc_number: i64) -> Option<&Document> {
        self.documents.get(&mc_number)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of inserts, updates and deletes applied
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CarrierStore for MemoryStore {
    fn find_one(&self, mc_number: i64, exclude: &[&str]) -> Result<Option<Document>> {
        Ok(self
            .documents
            .get(&mc_number)
            .map(|doc| project(doc.clone(), exclude)))
    }

    fn insert_one(&mut self, mc_number: i64, document: &Document) -> Result<()> {
        if self.documents.contains_key(&mc_number) {
            return Err(IngestError::DuplicateKey(mc_number));
        }
        self.documents.insert(mc_number, document.clone());
        self.writes += 1;
        Ok(())
    }

    fn update_one(&mut self, mc_number: i64, fields: &Document) -> Result<bool> {
        let Some(document) = self.documents.get_mut(&mc_number) else {
            return Ok(false);
        };
        for (field, value) in fields {
            document.insert(field.clone(), value.clone());
        }
        self.writes += 1;
        Ok(true)
    }

    fn delete_one(&mut self, mc_number: i64) -> Result<bool> {
        let removed = self.documents.remove(&mc_number).is_some();
        if removed {
            self.writes += 1;
        }
        Ok(removed)
    }
}
