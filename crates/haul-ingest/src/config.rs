//! Run configuration
//!
//! Store settings come from a YAML file (`config.yaml` by default):
//!
//! ```yaml
//! db_uri: sqlite://./data/carriers.db
//! db_name: fmcsa
//! collection_name: carriers
//! # optional, defaults to the statuses below
//! refreshable_statuses: [unassigned, deactivated, didnotpick]
//! ```
//!
//! Directory and watermark locations are supplied by the CLI and bundled with
//! the store settings into a [`RunContext`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

// ============================================================================
// Defaults
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Directory new extracts are dropped into
pub const DEFAULT_INTAKE_DIR: &str = "files";

/// Directory processed extracts are moved to
pub const DEFAULT_PROCESSED_DIR: &str = "parsed";

/// Resume watermark file
pub const DEFAULT_WATERMARK_FILE: &str = "last_mc.txt";

/// Stored statuses that let the pipeline refresh a carrier
pub const DEFAULT_REFRESHABLE_STATUSES: [&str; 3] = ["unassigned", "deactivated", "didnotpick"];

/// Backing store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database location: a file path, `sqlite://<path>`, or `:memory:`
    pub db_uri: String,

    /// Database (schema) name the collection lives in
    pub db_name: String,

    /// Collection (table) holding carrier documents
    pub collection_name: String,

    /// Stored `c_status` values eligible for a partial refresh
    #[serde(default = "default_refreshable_statuses")]
    pub refreshable_statuses: Vec<String>,
}

fn default_refreshable_statuses() -> Vec<String> {
    DEFAULT_REFRESHABLE_STATUSES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl StoreConfig {
    /// Read and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IngestError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.display(),
            db_name = %config.db_name,
            collection = %config.collection_name,
            "Loaded store configuration"
        );
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: StoreConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required values are present and names are usable identifiers
    pub fn validate(&self) -> Result<()> {
        if self.db_uri.trim().is_empty() {
            return Err(IngestError::config("db_uri cannot be empty"));
        }
        validate_identifier("db_name", &self.db_name)?;
        if ["main", "temp"].contains(&self.db_name.to_ascii_lowercase().as_str()) {
            return Err(IngestError::config(format!(
                "db_name '{}' is reserved by SQLite",
                self.db_name
            )));
        }
        validate_identifier("collection_name", &self.collection_name)?;
        if self.refreshable_statuses.is_empty() {
            return Err(IngestError::config(
                "refreshable_statuses cannot be empty; omit it to use the defaults",
            ));
        }
        Ok(())
    }

    /// Database file path with any `sqlite://` scheme removed
    pub fn database_path(&self) -> &str {
        let uri = self.db_uri.trim();
        uri.strip_prefix("sqlite://").unwrap_or(uri)
    }
}

/// Names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is allowed
fn validate_identifier(key: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(IngestError::config(format!(
            "{} must be a letter or underscore followed by letters, digits or underscores, got '{}'",
            key, value
        )))
    }
}

/// Filesystem locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePaths {
    pub intake_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub watermark_file: PathBuf,
}

impl Default for IntakePaths {
    fn default() -> Self {
        Self {
            intake_dir: PathBuf::from(DEFAULT_INTAKE_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            watermark_file: PathBuf::from(DEFAULT_WATERMARK_FILE),
        }
    }
}

/// Everything a run needs, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub store: StoreConfig,
    pub paths: IntakePaths,
}

impl RunContext {
    pub fn new(store: StoreConfig, paths: IntakePaths) -> Self {
        Self { store, paths }
    }
}
