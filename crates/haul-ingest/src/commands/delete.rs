//! `haul-ingest delete` command implementation
//!
//! Corrective removal of a single carrier; not part of the intake flow.

use colored::Colorize;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::store::{CarrierStore, SqliteStore};

/// Delete the carrier keyed by `mc_number`; returns whether one was stored
pub fn run(config: &StoreConfig, mc_number: i64) -> Result<bool> {
    let mut store = SqliteStore::open(config)?;
    let removed = delete(&mut store, mc_number)?;

    if removed {
        println!("{} carrier {}", "Deleted".green(), mc_number);
    } else {
        println!("{} carrier {} not found", "Nothing to delete:".yellow(), mc_number);
    }
    Ok(removed)
}

/// Store-agnostic delete with an audit log line
pub fn delete<S: CarrierStore>(store: &mut S, mc_number: i64) -> Result<bool> {
    let removed = store.delete_one(mc_number)?;
    info!(mc_number, removed, "Delete carrier");
    Ok(removed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_delete_from_memory_store() {
        let mut store = MemoryStore::new();
        let document = json!({"mc_number": 50, "c_status": "booked"})
            .as_object()
            .cloned()
            .unwrap();
        store.insert_one(50, &document).unwrap();

        assert!(delete(&mut store, 50).unwrap());
        assert!(!delete(&mut store, 50).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_run_against_sqlite_file() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            db_uri: dir.path().join("carriers.db").display().to_string(),
            db_name: "fmcsa".to_string(),
            collection_name: "carriers".to_string(),
            refreshable_statuses: vec!["unassigned".to_string()],
        };

        {
            let mut store = SqliteStore::open(&config).unwrap();
            let document = json!({"mc_number": 7}).as_object().cloned().unwrap();
            store.insert_one(7, &document).unwrap();
        }

        assert!(run(&config, 7).unwrap());
        assert!(!run(&config, 7).unwrap());
    }
}
