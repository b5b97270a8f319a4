use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use sfcat_core::Cell;

use crate::{ExportError, TabularSink};

/// Longest string Excel stores in one cell, in characters.
pub(crate) const MAX_CELL_CHARS: usize = 32_767;

/// Single-sheet Excel workbook with a bold header row.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TabularSink for XlsxSink {
    fn path(&self) -> &Path {
        &self.path
    }

    fn write_rows(&self, columns: &[&str], rows: &[Vec<Cell>]) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let header = Format::new().set_bold();

        for (col, name) in columns.iter().enumerate() {
            sheet.write_string_with_format(0, col_num(col)?, *name, &header)?;
        }

        for (idx, row) in rows.iter().enumerate() {
            let row_num = u32::try_from(idx + 1)
                .map_err(|_| ExportError::SheetLimit(format!("{} rows", rows.len())))?;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(s) => {
                        let text = fit_cell(s);
                        if text.len() < s.len() {
                            tracing::warn!(
                                row = row_num,
                                column = columns.get(col).copied().unwrap_or_default(),
                                chars = s.chars().count(),
                                "cell exceeds Excel limit; truncated"
                            );
                        }
                        sheet.write_string(row_num, col_num(col)?, text)?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number(row_num, col_num(col)?, *n)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        workbook.save(&self.path)?;
        Ok(())
    }
}

/// `s` cut to at most [`MAX_CELL_CHARS`] characters, on a char boundary.
fn fit_cell(s: &str) -> &str {
    match s.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn col_num(col: usize) -> Result<u16, ExportError> {
    u16::try_from(col).map_err(|_| ExportError::SheetLimit(format!("column {col}")))
}
