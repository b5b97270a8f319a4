use std::path::{Path, PathBuf};

use sfcat_core::Cell;

use crate::{ExportError, TabularSink};

/// Comma-separated text with a header line. Numbers are written in their
/// shortest textual form and empty cells as empty fields.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TabularSink for CsvSink {
    fn path(&self) -> &Path {
        &self.path
    }

    fn write_rows(&self, columns: &[&str], rows: &[Vec<Cell>]) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(columns)?;
        for row in rows {
            writer.write_record(row.iter().map(Cell::as_text))?;
        }
        writer.flush().map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}
