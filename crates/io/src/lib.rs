// Manifest loading (Excel, CSV, TSV) and report export

pub mod csv;
pub mod json;
pub mod tables;
pub mod xlsx;

use std::path::Path;

use bagscan_audit::{AuditError, CellValue, RawTable};

/// Input formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Excel,
    Csv,
    Tsv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Excel),
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Sheet to read from a workbook; the first sheet when `None`. Ignored for CSV.
    pub sheet: Option<String>,
    /// 0-based row holding the column headers.
    pub header_row: usize,
}

/// Load a manifest into a [`RawTable`], dispatching on file extension.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<RawTable, AuditError> {
    let format = SourceFormat::from_path(path).ok_or_else(|| AuditError::SheetRead {
        path: path.display().to_string(),
        message: "unsupported file type (expected xlsx, xls, xlsb, ods, csv or tsv)".into(),
    })?;

    let grid = match format {
        SourceFormat::Excel => xlsx::import_grid(path, options.sheet.as_deref())?,
        SourceFormat::Csv => csv::import_grid(path, None, options.header_row)?,
        SourceFormat::Tsv => csv::import_grid(path, Some(b'\t'), options.header_row)?,
    };

    let table = table_from_grid(grid, options.header_row)?;
    log::info!(
        "loaded {} data row(s), {} column(s) from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Split a cell grid at the header offset: rows above are skipped, the header
/// row names the columns, every row below is data.
pub fn table_from_grid(mut grid: Vec<Vec<CellValue>>, header_row: usize) -> Result<RawTable, AuditError> {
    if header_row >= grid.len() {
        return Err(AuditError::HeaderRowOutOfRange {
            header_row,
            rows: grid.len(),
        });
    }

    let rows = grid.split_off(header_row + 1);
    let header_cells = grid.pop().unwrap_or_default();

    let headers = header_cells
        .iter()
        .enumerate()
        .map(|(col, cell)| match cell.display() {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("Unnamed: {col}"),
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}
