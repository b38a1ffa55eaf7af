//! File intake driver
//!
//! Walks the intake directory in ascending numeric order of the file stem
//! (`2.csv` before `10.csv`). For each file:
//!
//! 1. parse rows, dropping malformed ones and those at or below the watermark
//! 2. coerce every record; one bad required field aborts the run
//! 3. reconcile records in order, advancing the watermark after each
//! 4. move the file to the processed directory
//!
//! A file is only moved once all its records were reconciled, so an aborted
//! file is picked up again on the next run and resumes from the watermark.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::carrier::{Carrier, RawCarrier, RowParser};
use crate::config::IntakePaths;
use crate::error::{IngestError, Result};
use crate::progress::create_progress_bar;
use crate::reconcile::Reconciler;
use crate::stats::IngestStats;
use crate::store::CarrierStore;
use crate::watermark::WatermarkStore;

/// Intake files (`<digits>.csv`) in processing order
///
/// A missing directory yields no files.
pub fn list_intake_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "Intake directory does not exist");
            return Ok(Vec::new());
        },
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        match intake_sequence(&path) {
            Some(sequence) if path.is_file() => files.push((sequence, path)),
            _ => debug!(path = %path.display(), "Ignoring non-intake entry"),
        }
    }

    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Numeric stem of `<digits>.csv`
fn intake_sequence(path: &Path) -> Option<u64> {
    if path.extension()? != "csv" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Coerce every raw record of `file`, failing on the first invalid one
pub fn coerce_records(records: &[RawCarrier], file: &Path) -> Result<Vec<Carrier>> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pb = create_progress_bar(records.len() as u64, &format!("Coercing {}", name));

    let mut carriers = Vec::with_capacity(records.len());
    for raw in records {
        match Carrier::try_from(raw) {
            Ok(carrier) => carriers.push(carrier),
            Err(source) => {
                pb.abandon();
                return Err(IngestError::coercion(file, source));
            },
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(carriers)
}

/// Move `file` into `processed_dir`, creating it if needed
///
/// Falls back to copy and remove when a rename is not possible, e.g. across
/// file systems.
pub fn move_to_processed(file: &Path, processed_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(processed_dir)?;
    let name = file.file_name().ok_or_else(|| {
        IngestError::config(format!("Not a file path: {}", file.display()))
    })?;
    let destination = processed_dir.join(name);

    if let Err(e) = fs::rename(file, &destination) {
        debug!(error = %e, "Rename failed, copying instead");
        fs::copy(file, &destination)?;
        fs::remove_file(file)?;
    }

    Ok(destination)
}

/// Process one intake file end to end
pub fn process_file<S, W>(
    file: &Path,
    parser: &RowParser,
    engine: &mut Reconciler<S, W>,
    processed_dir: &Path,
) -> Result<IngestStats>
where
    S: CarrierStore,
    W: WatermarkStore,
{
    info!(file = %file.display(), "Processing intake file");

    let rows = parser.parse_file(file)?;
    let carriers = coerce_records(&rows.records, file)?;

    let mut stats = engine.reconcile_all(&carriers)?;
    stats.records_parsed = rows.records.len();
    stats.rows_malformed = rows.malformed;
    stats.rows_already_processed = rows.already_processed;

    let destination = move_to_processed(file, processed_dir)?;
    stats.files_processed = 1;

    info!(
        file = %file.display(),
        moved_to = %destination.display(),
        records = stats.records_parsed,
        malformed = stats.rows_malformed,
        already_processed = stats.rows_already_processed,
        "Finished intake file"
    );
    Ok(stats)
}

/// Process every pending intake file
///
/// The watermark is read once here; every file of the run is filtered against
/// that value.
pub fn run<S, W>(paths: &IntakePaths, engine: &mut Reconciler<S, W>) -> Result<IngestStats>
where
    S: CarrierStore,
    W: WatermarkStore,
{
    let mut stats = IngestStats::started();

    let watermark = engine.watermark_mut().load()?;
    if let Some(mc_number) = watermark {
        info!(mc_number, "Continuing where you left off");
    }
    let parser = RowParser::new(watermark);

    let files = list_intake_files(&paths.intake_dir)?;
    if files.is_empty() {
        info!(dir = %paths.intake_dir.display(), "No intake files to process");
    }

    for file in &files {
        let file_stats = process_file(file, &parser, engine, &paths.processed_dir)?;
        stats.merge(&file_stats);
    }

    stats.finish();
    info!(
        files = stats.files_processed,
        created = stats.created,
        updated = stats.updated,
        skipped = stats.skipped,
        malformed = stats.rows_malformed,
        already_processed = stats.rows_already_processed,
        duration_secs = stats.duration_secs().unwrap_or_default(),
        "Ingestion complete"
    );
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::carrier::PowerUnits;
    use crate::config::DEFAULT_REFRESHABLE_STATUSES;
    use crate::error::CoercionError;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;
    use crate::watermark::FileWatermark;
    use tempfile::TempDir;

    const HEADER: &str = "mc_number,company_name,dba_name,address,phone_number,usdot_number,power_units,email,c_status,cargo_carried\n";

    fn row(mc_number: i64) -> String {
        format!(
            "{mc},Co {mc},,{mc} Main St,555-{mc},{dot},\"1,234\",c{mc}@haul.test,unassigned,\"['Dry Van', 'Reefer']\"\n",
            mc = mc_number,
            dot = mc_number + 9000
        )
    }

    struct Fixture {
        _dir: TempDir,
        paths: IntakePaths,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let paths = IntakePaths {
                intake_dir: dir.path().join("files"),
                processed_dir: dir.path().join("parsed"),
                watermark_file: dir.path().join("last_mc.txt"),
            };
            fs::create_dir_all(&paths.intake_dir).unwrap();
            Self { _dir: dir, paths }
        }

        fn write(&self, name: &str, rows: &[String]) {
            let content = format!("{}{}", HEADER, rows.concat());
            fs::write(self.paths.intake_dir.join(name), content).unwrap();
        }

        fn engine(&self) -> Reconciler<MemoryStore, FileWatermark> {
            Reconciler::new(
                MemoryStore::new(),
                FileWatermark::new(&self.paths.watermark_file),
                DEFAULT_REFRESHABLE_STATUSES.iter().map(|s| s.to_string()).collect(),
            )
        }
    }

    #[test]
    fn test_intake_files_sorted_numerically() {
        let fixture = Fixture::new();
        for name in ["10.csv", "2.csv", "1.csv", "notes.txt", "3a.csv", "4.CSV.bak"] {
            fs::write(fixture.paths.intake_dir.join(name), "").unwrap();
        }
        fs::create_dir(fixture.paths.intake_dir.join("5.csv")).unwrap();

        let names: Vec<String> = list_intake_files(&fixture.paths.intake_dir)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["1.csv", "2.csv", "10.csv"]);
    }

    #[test]
    fn test_missing_intake_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_intake_files(dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_run_processes_and_moves_files() {
        let fixture = Fixture::new();
        fixture.write("2.csv", &[row(20), row(21)]);
        fixture.write("1.csv", &[row(10), ",,,,,,,,,\n".to_string(), "bad,row\n".to_string()]);

        let mut engine = fixture.engine();
        let stats = run(&fixture.paths, &mut engine).unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.created, 3);
        assert_eq!(stats.rows_malformed, 1);
        assert!(stats.completed_at.is_some());

        let store = engine.store();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(10).unwrap()["power_units"], 1234);
        let carrier: Carrier =
            serde_json::from_value(serde_json::Value::Object(store.get(21).unwrap().clone())).unwrap();
        assert_eq!(carrier.power_units, PowerUnits::Count(1234));
        assert_eq!(carrier.cargo_carried, ["Dry Van", "Reefer"]);

        assert!(list_intake_files(&fixture.paths.intake_dir).unwrap().is_empty());
        assert!(fixture.paths.processed_dir.join("1.csv").exists());
        assert!(fixture.paths.processed_dir.join("2.csv").exists());
        assert_eq!(fs::read_to_string(&fixture.paths.watermark_file).unwrap(), "21");
    }

    #[test]
    fn test_run_resumes_after_watermark() {
        let fixture = Fixture::new();
        fs::write(&fixture.paths.watermark_file, "11").unwrap();
        fixture.write("1.csv", &[row(10), row(11), row(12)]);

        let mut engine = fixture.engine();
        let stats = run(&fixture.paths, &mut engine).unwrap();

        assert_eq!(stats.rows_already_processed, 2);
        assert_eq!(stats.created, 1);
        assert!(engine.store().get(12).is_some());
        assert!(engine.store().get(10).is_none());
    }

    #[test]
    fn test_coercion_failure_aborts_and_keeps_file() {
        let fixture = Fixture::new();
        fixture.write("1.csv", &[row(10)]);
        fixture.write(
            "2.csv",
            &[row(20), "30,Bad Co,,1 Rd,555,not-a-number,1,b@x,unassigned,[]\n".to_string()],
        );

        let mut engine = fixture.engine();
        let err = run(&fixture.paths, &mut engine).unwrap_err();

        match err {
            IngestError::Coercion { file, source } => {
                assert!(file.ends_with("2.csv"));
                assert!(matches!(
                    source,
                    CoercionError::InvalidInteger {
                        field: "usdot_number",
                        ..
                    }
                ));
            },
            other => panic!("unexpected error: {other}"),
        }

        // Nothing from the failed file reached the store.
        assert!(engine.store().get(20).is_none());
        assert!(fixture.paths.processed_dir.join("1.csv").exists());
        assert!(fixture.paths.intake_dir.join("2.csv").exists());
        assert_eq!(fs::read_to_string(&fixture.paths.watermark_file).unwrap(), "10");
    }

    #[test]
    fn test_store_failure_aborts_and_keeps_file() {
        let fixture = Fixture::new();
        fs::write(&fixture.paths.watermark_file, "5").unwrap();
        fixture.write("1.csv", &[row(10), row(11)]);

        let mut engine = Reconciler::new(
            FailingStore::default(),
            FileWatermark::new(&fixture.paths.watermark_file),
            DEFAULT_REFRESHABLE_STATUSES.iter().map(|s| s.to_string()).collect(),
        );
        assert!(run(&fixture.paths, &mut engine).is_err());

        assert!(fixture.paths.intake_dir.join("1.csv").exists());
        assert!(!fixture.paths.processed_dir.join("1.csv").exists());
        assert_eq!(fs::read_to_string(&fixture.paths.watermark_file).unwrap(), "5");
    }

    #[test]
    fn test_move_creates_processed_dir() {
        let fixture = Fixture::new();
        let file = fixture.paths.intake_dir.join("7.csv");
        fs::write(&file, HEADER).unwrap();

        let nested = fixture.paths.processed_dir.join("2024");
        let destination = move_to_processed(&file, &nested).unwrap();

        assert_eq!(destination, nested.join("7.csv"));
        assert!(destination.exists());
        assert!(!file.exists());
    }
}
