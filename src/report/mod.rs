//! Report assembly and export

pub mod builder;
pub mod export;

pub use builder::{Report, ReportBuilder};
pub use export::{CsvExporter, ExportError, CSV_HEADERS};
