//! Spreadsheet export of collected variant records.
//!
//! Records are written once, at the end of a run, to a single file whose
//! extension picks the format.

mod csv_sink;
mod xlsx;

use std::path::{Path, PathBuf};

use sfcat_core::{Cell, VariantRecord, COLUMNS};
use thiserror::Error;

pub use csv_sink::CsvSink;
pub use xlsx::XlsxSink;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("unsupported output format for {0}; expected .xlsx or .csv")]
    UnsupportedFormat(PathBuf),

    #[error("sheet limit exceeded: {0}")]
    SheetLimit(String),
}

/// A destination for rows over a fixed column set.
pub trait TabularSink {
    fn path(&self) -> &Path;

    /// Writes `columns` as the header followed by `rows`, replacing any
    /// existing file. Every row has one cell per column.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the file cannot be written.
    fn write_rows(&self, columns: &[&str], rows: &[Vec<Cell>]) -> Result<(), ExportError>;
}

/// Picks the sink for `path` from its extension (case-insensitive).
///
/// # Errors
///
/// [`ExportError::UnsupportedFormat`] for anything other than `.xlsx` or
/// `.csv`.
pub fn sink_for_path(path: &Path) -> Result<Box<dyn TabularSink>, ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("xlsx") => Ok(Box::new(XlsxSink::new(path))),
        Some("csv") => Ok(Box::new(CsvSink::new(path))),
        _ => Err(ExportError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), ExportError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Writes `records` under the full output header, creating parent
/// directories as needed. Returns the number of rows written.
///
/// # Errors
///
/// Returns an [`ExportError`] if the directory or file cannot be written.
pub fn export_records(
    sink: &dyn TabularSink,
    records: &[VariantRecord],
) -> Result<usize, ExportError> {
    ensure_parent_dir(sink.path())?;
    let rows: Vec<Vec<Cell>> = records.iter().map(VariantRecord::cells).collect();
    sink.write_rows(COLUMNS, &rows)?;
    tracing::info!(
        path = %sink.path().display(),
        rows = rows.len(),
        "exported records"
    );
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfcat_core::SpecTable;

    fn make_record(handle: &str, position: Option<usize>) -> VariantRecord {
        let mut spec = SpecTable::new();
        spec.insert("Weight", "38 lbs");
        spec.insert("Application", "Floor | Wall");
        VariantRecord {
            handle: handle.to_owned(),
            title: "Onyx Blue 12x24".to_owned(),
            variation: "Black".to_owned(),
            body_html: "<table><tr><th>Weight:</th></tr></table>".to_owned(),
            option1_value: "Black".to_owned(),
            option2_value: "12x24".to_owned(),
            price: "43.99".to_owned(),
            weight: "38 lbs".to_owned(),
            image_position: position,
            spec,
            ..VariantRecord::default()
        }
    }

    fn column(name: &str) -> usize {
        COLUMNS.iter().position(|c| *c == name).unwrap()
    }

    #[test]
    fn sink_chosen_by_extension() {
        assert!(sink_for_path(Path::new("out/data.xlsx")).is_ok());
        assert!(sink_for_path(Path::new("out/data.CSV")).is_ok());
        assert!(matches!(
            sink_for_path(Path::new("out/data.json")),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            sink_for_path(Path::new("out/data")),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn csv_export_creates_parent_dirs_and_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output/nested/scraped_data.csv");
        let sink = sink_for_path(&path).unwrap();

        let written = export_records(
            sink.as_ref(),
            &[make_record("onyx-blue", Some(1)), make_record("onyx-blue", None)],
        )
        .unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(header, COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][column("Handle")], "onyx-blue");
        assert_eq!(&rows[0][column("Variant Price")], "43.99");
        assert_eq!(&rows[0][column("Image Position")], "1");
        assert_eq!(&rows[1][column("Image Position")], "");
        assert_eq!(&rows[0][column("Variant Inventory Policy")], "deny");
        assert_eq!(&rows[0][column("Application")], "Floor | Wall");
        assert_eq!(&rows[0][column("Color Shade")], "");
    }

    #[test]
    fn empty_export_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let sink = CsvSink::new(&path);

        assert_eq!(export_records(&sink, &[]).unwrap(), 0);
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), COLUMNS.len());
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn xlsx_export_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("output/one.xlsx");
        let large = dir.path().join("output/many.xlsx");

        let one = export_records(
            sink_for_path(&small).unwrap().as_ref(),
            &[make_record("onyx-blue", Some(2))],
        )
        .unwrap();
        let records: Vec<VariantRecord> = (0..200)
            .map(|i| make_record(&format!("tile-{i}"), Some(i + 1)))
            .collect();
        let many = export_records(sink_for_path(&large).unwrap().as_ref(), &records).unwrap();
        assert_eq!((one, many), (1, 200));

        let small_bytes = std::fs::read(&small).unwrap();
        let large_bytes = std::fs::read(&large).unwrap();
        // xlsx files are zip archives
        assert!(small_bytes.starts_with(b"PK"));
        assert!(large_bytes.starts_with(b"PK"));
        assert!(large_bytes.len() > small_bytes.len());
    }

    #[test]
    fn oversized_cell_does_not_lose_the_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraped_data.xlsx");
        let mut huge = make_record("statuario", Some(1));
        huge.body_html = "<tr>".repeat(10_000);

        let written = export_records(
            sink_for_path(&path).unwrap().as_ref(),
            &[make_record("onyx-blue", Some(1)), huge],
        )
        .unwrap();

        assert_eq!(written, 2);
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
    }
}
