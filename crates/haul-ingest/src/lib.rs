//! Haul Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Carrier CSV ingestion and reconciliation.
//!
//! # Overview
//!
//! Carrier extracts arrive as numbered CSV files (`1.csv`, `2.csv`, ...) in an
//! intake directory. Each run:
//!
//! - **Parses** rows into [`RawCarrier`]s, repairing rows that glue two
//!   records together and dropping rows that cannot be repaired
//! - **Coerces** them into typed [`Carrier`]s
//! - **Reconciles** each carrier with the store: insert new carriers, refresh
//!   carriers nobody has claimed yet, leave claimed carriers alone
//! - **Resumes** from a watermark (the last reconciled `mc_number`) after an
//!   interruption
//! - **Moves** each finished file to the processed directory
//!
//! # Example
//!
//! ```no_run
//! use haul_ingest::config::{IntakePaths, StoreConfig};
//! use haul_ingest::intake;
//! use haul_ingest::reconcile::Reconciler;
//! use haul_ingest::store::SqliteStore;
//! use haul_ingest::watermark::FileWatermark;
//!
//! # fn main() -> haul_ingest::Result<()> {
//! let config = StoreConfig::load("config.yaml")?;
//! let paths = IntakePaths::default();
//! let mut engine = Reconciler::new(
//!     SqliteStore::open(&config)?,
//!     FileWatermark::new(&paths.watermark_file),
//!     config.refreshable_statuses.clone(),
//! );
//! let stats = intake::run(&paths, &mut engine)?;
//! println!("{} created", stats.created);
//! # Ok(())
//! # }
//! ```

pub mod carrier;
pub mod commands;
pub mod config;
pub mod error;
pub mod intake;
pub mod progress;
pub mod reconcile;
pub mod stats;
pub mod store;
pub mod watermark;

// Re-export commonly used types
pub use carrier::{Carrier, PowerUnits, RawCarrier, RowParser};
pub use config::{IntakePaths, RunContext, StoreConfig};
pub use error::{CoercionError, IngestError, Result, RowError};
pub use reconcile::{Outcome, Reconciler};
pub use stats::IngestStats;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// haul-ingest - carrier CSV ingestion and reconciliation
#[derive(Parser, Debug)]
#[command(name = "haul-ingest")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Exit immediately on failure instead of waiting for Enter
    #[arg(long, global = true)]
    pub no_pause: bool,

    /// Store configuration file
    #[arg(
        short,
        long,
        env = "HAUL_CONFIG",
        default_value = config::DEFAULT_CONFIG_FILE,
        global = true
    )]
    pub config: PathBuf,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest every pending intake file
    Run {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Show the watermark and pending intake files
    Status {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Remove one carrier from the store
    Delete {
        /// MC number of the carrier to remove
        mc_number: i64,
    },
}

/// Intake, processed and watermark locations
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Directory holding `<n>.csv` extracts
    #[arg(long, default_value = config::DEFAULT_INTAKE_DIR)]
    pub intake_dir: PathBuf,

    /// Directory finished extracts are moved to
    #[arg(long, default_value = config::DEFAULT_PROCESSED_DIR)]
    pub processed_dir: PathBuf,

    /// File holding the resume watermark
    #[arg(long, default_value = config::DEFAULT_WATERMARK_FILE)]
    pub watermark_file: PathBuf,
}

impl From<PathArgs> for IntakePaths {
    fn from(args: PathArgs) -> Self {
        IntakePaths {
            intake_dir: args.intake_dir,
            processed_dir: args.processed_dir,
            watermark_file: args.watermark_file,
        }
    }
}
