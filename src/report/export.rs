//! CSV export of the titled report

use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::TitledEntry;

/// UTF-8 byte order mark, so spreadsheet tools detect the encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers, in export order
pub const CSV_HEADERS: [&str; 3] = ["title", "count", "key"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("I/O error writing report: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes reports as timestamped CSV files
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    file_prefix: String,
    write_bom: bool,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
            write_bom: true,
        }
    }

    pub fn with_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }

    /// Path the report for `timestamp` is written to
    pub fn report_path(&self, timestamp: &DateTime<Local>) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.csv",
            self.file_prefix,
            timestamp.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Write `entries` to a new file stamped with `timestamp`, creating the
    /// output directory if needed. Returns the written path.
    pub fn export(
        &self,
        entries: &[TitledEntry],
        timestamp: &DateTime<Local>,
    ) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.report_path(timestamp);
        let file = std::fs::File::create(&path)?;
        self.write_to(file, entries)?;
        Ok(path)
    }

    /// Write the CSV (optional BOM, header row, one row per entry) to `writer`
    pub fn write_to<W: Write>(&self, mut writer: W, entries: &[TitledEntry]) -> Result<(), ExportError> {
        if self.write_bom {
            writer.write_all(UTF8_BOM)?;
        }

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_HEADERS)?;
        for entry in entries {
            csv_writer.write_record([
                entry.title.as_str(),
                entry.count.to_string().as_str(),
                entry.key.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
