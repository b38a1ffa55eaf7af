//! `haul-ingest run` command implementation
//!
//! Ingests every pending intake file into the configured store.

use colored::Colorize;

use crate::config::RunContext;
use crate::error::Result;
use crate::intake;
use crate::reconcile::Reconciler;
use crate::stats::IngestStats;
use crate::store::SqliteStore;
use crate::watermark::FileWatermark;

/// Run the intake pipeline against the SQLite store
pub fn run(ctx: &RunContext) -> Result<IngestStats> {
    let store = SqliteStore::open(&ctx.store)?;
    let watermark = FileWatermark::new(&ctx.paths.watermark_file);
    let mut engine = Reconciler::new(store, watermark, ctx.store.refreshable_statuses.clone());

    let stats = intake::run(&ctx.paths, &mut engine)?;
    print_summary(&stats);
    Ok(stats)
}

fn print_summary(stats: &IngestStats) {
    if stats.files_processed == 0 {
        println!("No intake files found.");
        return;
    }

    println!("{}", "Ingestion Summary:".cyan().bold());
    println!("  Files:             {}", stats.files_processed);
    println!("  Created:           {}", stats.created.to_string().green());
    println!("  Updated:           {}", stats.updated.to_string().green());
    println!("  Skipped:           {}", stats.skipped);
    println!("  Already processed: {}", stats.rows_already_processed);
    if stats.rows_malformed > 0 {
        println!("  Malformed rows:    {}", stats.rows_malformed.to_string().yellow());
    }
    if let Some(secs) = stats.duration_secs() {
        println!("  Duration:          {:.1}s", secs);
    }
}
