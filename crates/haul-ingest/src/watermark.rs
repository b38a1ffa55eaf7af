//! Resume watermark
//!
//! The watermark is the `mc_number` of the last reconciled carrier. It is
//! written after every record so an interrupted run resumes right after the
//! last record it finished.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Persistence for the single resume key
pub trait WatermarkStore {
    /// Last saved key, or `None` when nothing was saved yet
    fn load(&mut self) -> Result<Option<i64>>;

    /// Overwrite the saved key
    fn save(&mut self, mc_number: i64) -> Result<()>;
}

/// Watermark kept as a decimal string in a small text file
///
/// A missing file is created empty on [`load`](WatermarkStore::load).
#[derive(Debug, Clone)]
pub struct FileWatermark {
    path: PathBuf,
}

impl FileWatermark {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create_empty(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(&self.path)?;
        Ok(())
    }
}

impl WatermarkStore for FileWatermark {
    fn load(&mut self) -> Result<Option<i64>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No watermark file, starting fresh");
            self.create_empty()
                .map_err(|e| IngestError::watermark(&self.path, e))?;
            return Ok(None);
        }
        self.peek()
    }

    fn save(&mut self, mc_number: i64) -> Result<()> {
        let staging = self.path.with_extension("tmp");
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&staging)?;
            file.write_all(mc_number.to_string().as_bytes())?;
            file.sync_all()?;
            fs::rename(&staging, &self.path)
        };
        write().map_err(|e| IngestError::watermark(&self.path, e))
    }
}

impl FileWatermark {
    /// Read the saved key without creating a missing file
    pub fn peek(&self) -> Result<Option<i64>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IngestError::watermark(&self.path, e)),
        };

        let first_line = content.lines().next().unwrap_or("").trim();
        if first_line.is_empty() {
            return Ok(None);
        }

        if !first_line.bytes().all(|b| b.is_ascii_digit()) {
            warn!(
                path = %self.path.display(),
                content = first_line,
                "Ignoring watermark that is not a number"
            );
            return Ok(None);
        }

        match first_line.parse() {
            Ok(mc_number) => Ok(Some(mc_number)),
            Err(_) => {
                warn!(path = %self.path.display(), content = first_line, "Watermark out of range");
                Ok(None)
            },
        }
    }
}

/// In-process watermark, remembering every save
#[derive(Debug, Clone, Default)]
pub struct MemoryWatermark {
    current: Option<i64>,
    saves: Vec<i64>,
}

impl MemoryWatermark {
    pub fn new(initial: Option<i64>) -> Self {
        Self {
            current: initial,
            saves: Vec::new(),
        }
    }

    /// Keys in the order they were saved
    pub fn saves(&self) -> &[i64] {
        &self.saves
    }
}

impl WatermarkStore for MemoryWatermark {
    fn load(&mut self) -> Result<Option<i64>> {
        Ok(self.current)
    }

    fn save(&mut self, mc_number: i64) -> Result<()> {
        self.current = Some(mc_number);
        self.saves.push(mc_number);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("last_mc.txt");
        let mut watermark = FileWatermark::new(&path);

        assert_eq!(watermark.peek().unwrap(), None);
        assert!(!path.exists());

        assert_eq!(watermark.load().unwrap(), None);
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(watermark.load().unwrap(), None);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_mc.txt");
        let mut watermark = FileWatermark::new(&path);

        watermark.save(1200).unwrap();
        watermark.save(980).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "980");
        assert_eq!(FileWatermark::new(&path).load().unwrap(), Some(980));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_garbage_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_mc.txt");

        fs::write(&path, "-5\n").unwrap();
        assert_eq!(FileWatermark::new(&path).load().unwrap(), None);

        fs::write(&path, "abc").unwrap();
        assert_eq!(FileWatermark::new(&path).load().unwrap(), None);

        fs::write(&path, "  77  \nextra").unwrap();
        assert_eq!(FileWatermark::new(&path).load().unwrap(), Some(77));
    }

    #[test]
    fn test_memory_watermark_records_saves() {
        let mut watermark = MemoryWatermark::new(Some(3));
        assert_eq!(watermark.load().unwrap(), Some(3));
        watermark.save(10).unwrap();
        watermark.save(8).unwrap();
        assert_eq!(watermark.load().unwrap(), Some(8));
        assert_eq!(watermark.saves(), &[10, 8]);
    }
}
