// Excel workbook import (xlsx, xlsm, xls, xlsb, ods) and report export (xlsx only)

use std::path::Path;

use bagscan_audit::normalize::parse_timestamp_str;
use bagscan_audit::{AuditError, AuditReport, CellValue};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::tables::{report_tables, Field, ReportTable};

/// Read one sheet of a workbook into a cell grid.
///
/// `sheet` selects by name; the first sheet is used when `None`. The grid is
/// anchored at A1 even when the sheet's used range starts further in, so row
/// positions match what the user sees in Excel.
pub fn import_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>, AuditError> {
    let read_err = |message: String| AuditError::SheetRead {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| read_err(e.to_string()))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted || n.trim() == wanted.trim())
            .cloned()
            .ok_or_else(|| AuditError::UnknownSheet {
                name: wanted.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| read_err("workbook contains no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| read_err(format!("sheet '{name}': {e}")))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(cell_value));
        grid.push(cells);
    }

    log::debug!("read sheet '{}' from {}: {} row(s)", name, path.display(), grid.len());
    Ok(grid)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Assumes the 1900 date system; calamine does not expose the 1904 flag here.
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(at) => CellValue::DateTime(at),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_timestamp_str(s) {
            Some(at) => CellValue::DateTime(at),
            None => CellValue::text(s.as_str()),
        },
        Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(_) => CellValue::text("#ERR"),
    }
}

/// Convert an Excel serial date (1900 system) to a datetime, rounded to the second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write all report tables into one workbook, one sheet per table.
pub fn export_workbook(report: &AuditReport, path: &Path) -> Result<(), AuditError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in report_tables(report) {
        let worksheet = workbook
            .add_worksheet()
            .set_name(table.sheet_name)
            .map_err(|e| export_err(table.sheet_name, e))?;
        write_sheet(worksheet, &table, &header_format).map_err(|e| export_err(table.sheet_name, e))?;
    }

    workbook
        .save(path)
        .map_err(|e| AuditError::Export(format!("cannot save {}: {e}", path.display())))?;
    log::debug!("wrote workbook {}", path.display());
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, table: &ReportTable, header_format: &Format) -> Result<(), XlsxError> {
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, header_format)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, field) in row.iter().enumerate() {
            let c = col as u16;
            match field {
                Field::Empty => {}
                Field::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Field::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Field::Count(n) => {
                    worksheet.write_number(r, c, *n as f64)?;
                }
            }
        }
    }
    Ok(())
}

fn export_err(sheet: &str, e: XlsxError) -> AuditError {
    AuditError::Export(format!("sheet '{sheet}': {e}"))
}
