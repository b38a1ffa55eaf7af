use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::debug;

use super::{project, CarrierStore, Document};
use crate::config::StoreConfig;
use crate::error::{IngestError, Result};

/// Carrier collection stored as JSON documents in SQLite
///
/// The database file is attached under `db_name`; the collection is the table
/// `db_name.collection_name` with one row per `mc_number`. Partial updates go
/// through `json_patch` so fields this pipeline does not own are left as the
/// other writers set them.
pub struct SqliteStore {
    conn: Connection,
    table: String,
}

impl SqliteStore {
    /// Open (creating if needed) the collection described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let path = config.database_path();
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_in_memory()?;
        conn.execute(
            &format!("ATTACH DATABASE ?1 AS \"{}\"", config.db_name),
            params![path],
        )?;

        let table = format!("\"{}\".\"{}\"", config.db_name, config.collection_name);
        conn.execute(
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    mc_number INTEGER PRIMARY KEY,
                    document TEXT NOT NULL
                )
                "#,
                table
            ),
            [],
        )?;

        debug!(path, table = %table, "Opened carrier store");
        Ok(Self { conn, table })
    }
}

impl CarrierStore for SqliteStore {
    fn find_one(&self, mc_number: i64, exclude: &[&str]) -> Result<Option<Document>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT document FROM {} WHERE mc_number = ?1", self.table),
                params![mc_number],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(project(serde_json::from_str(&json)?, exclude))),
            None => Ok(None),
        }
    }

    fn insert_one(&mut self, mc_number: i64, document: &Document) -> Result<()> {
        let json = serde_json::to_string(document)?;
        self.conn
            .execute(
                &format!("INSERT INTO {} (mc_number, document) VALUES (?1, ?2)", self.table),
                params![mc_number, json],
            )
            .map_err(|e| match e.sqlite_error_code() {
                Some(ErrorCode::ConstraintViolation) => IngestError::DuplicateKey(mc_number),
                _ => IngestError::Store(e),
            })?;
        Ok(())
    }

    fn update_one(&mut self, mc_number: i64, fields: &Document) -> Result<bool> {
        let patch = serde_json::to_string(fields)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET document = json_patch(document, ?1) WHERE mc_number = ?2",
                self.table
            ),
            params![patch, mc_number],
        )?;
        Ok(changed > 0)
    }

    fn delete_one(&mut self, mc_number: i64) -> Result<bool> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE mc_number = ?1", self.table),
            params![mc_number],
        )?;
        Ok(changed > 0)
    }
}
