//! `haul-ingest status` command implementation
//!
//! Shows the resume watermark and the files a `run` would process.

use colored::Colorize;

use crate::config::IntakePaths;
use crate::error::Result;
use crate::intake::list_intake_files;
use crate::watermark::FileWatermark;

/// Show the watermark and pending intake files; touches nothing on disk
pub fn run(paths: &IntakePaths) -> Result<()> {
    let watermark = FileWatermark::new(&paths.watermark_file).peek()?;
    let pending = list_intake_files(&paths.intake_dir)?;

    println!("{}", "Watermark:".cyan().bold());
    match watermark {
        Some(mc_number) => println!("  Last MC number: {}", mc_number.to_string().green()),
        None => println!("  None (next run starts from the beginning)"),
    }
    println!();

    if pending.is_empty() {
        println!("No pending intake files in {}.", paths.intake_dir.display());
        return Ok(());
    }

    println!("{}", "Pending files:".cyan().bold());
    for file in &pending {
        println!("  {}", file.display());
    }
    println!();
    println!("  Total: {}", pending.len());

    Ok(())
}
