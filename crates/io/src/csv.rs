// CSV/TSV import and report export

use std::io::Read;
use std::path::{Path, PathBuf};

use bagscan_audit::{AuditError, AuditReport, CellValue};

use crate::tables::{report_tables, Field, ReportTable};

/// Read a delimited file into a cell grid. `delimiter` is sniffed when `None`,
/// from the lines at and after `header_row` so a title line above the headers
/// does not decide it.
pub fn import_grid(
    path: &Path,
    delimiter: Option<u8>,
    header_row: usize,
) -> Result<Vec<Vec<CellValue>>, AuditError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content, header_row));
    grid_from_str(&content, delimiter).map_err(|message| AuditError::SheetRead {
        path: path.display().to_string(),
        message,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// Each candidate (comma, semicolon, tab, pipe) is scored by how many sample
/// lines share the first sampled line's field count, weighted by that count.
/// Sampling starts `skip` lines in; a file shorter than that is sampled whole.
fn sniff_delimiter(content: &str, skip: usize) -> u8 {
    let candidates: &[u8] = &[b',', b';', b'\t', b'|'];
    let non_blank = |l: &&str| !l.trim().is_empty();
    let mut sample: Vec<&str> = content.lines().skip(skip).filter(non_blank).take(10).collect();
    if sample.is_empty() {
        sample = content.lines().filter(non_blank).take(10).collect();
    }

    let mut best = b',';
    let mut best_score = 0usize;

    for &delim in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&target) = counts.first() else { continue };
        if target <= 1 {
            continue;
        }

        let score = counts.iter().filter(|&&c| c == target).count() * target;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel often saves CSV as Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, AuditError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| AuditError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Parse delimited text into rows. Blank lines between records come back as
/// empty rows so row indexes line up with the file's lines; blank lines after
/// the last record are dropped.
fn grid_from_str(content: &str, delimiter: u8) -> Result<Vec<Vec<CellValue>>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        let from = reader.position().byte() as usize;
        let more = reader
            .read_record(&mut record)
            .map_err(|e| format!("record {}: {e}", grid.len() + 1))?;
        if !more {
            break;
        }
        let blanks = blank_lines_at(content.as_bytes(), from);
        grid.extend(std::iter::repeat_with(Vec::new).take(blanks));
        grid.push(record.iter().map(CellValue::text).collect());
    }
    Ok(grid)
}

/// Count the empty lines starting at byte `from`, the point where the previous
/// record ended. CRLF, LF and lone CR each end one line.
fn blank_lines_at(content: &[u8], mut from: usize) -> usize {
    // The LF of a CRLF terminator is left unread by the previous record.
    if from > 0 && content.get(from - 1) == Some(&b'\r') && content.get(from) == Some(&b'\n') {
        from += 1;
    }

    let mut blanks = 0;
    while let Some(&byte) = content.get(from) {
        match byte {
            b'\n' => from += 1,
            b'\r' if content.get(from + 1) == Some(&b'\n') => from += 2,
            b'\r' => from += 1,
            _ => break,
        }
        blanks += 1;
    }
    blanks
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Booleans are written as `True`/`False`, nulls as empty fields.
fn render(field: &Field) -> String {
    match field {
        Field::Empty => String::new(),
        Field::Text(s) => s.clone(),
        Field::Bool(true) => "True".to_string(),
        Field::Bool(false) => "False".to_string(),
        Field::Count(n) => n.to_string(),
    }
}

/// Write one report table as CSV with a header row and no index column.
pub fn write_table<W: std::io::Write>(table: &ReportTable, out: W) -> Result<(), AuditError> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);

    writer
        .write_record(&table.headers)
        .map_err(|e| AuditError::Export(e.to_string()))?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(render).collect();
        writer
            .write_record(&record)
            .map_err(|e| AuditError::Export(e.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write every report table into `dir` (created if missing). Returns the written paths.
pub fn export_reports(report: &AuditReport, dir: &Path) -> Result<Vec<PathBuf>, AuditError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AuditError::Io(format!("cannot create {}: {e}", dir.display())))?;

    let mut written = Vec::new();
    for table in report_tables(report) {
        let path = dir.join(table.file_name);
        let file = std::fs::File::create(&path)
            .map_err(|e| AuditError::Io(format!("cannot create {}: {e}", path.display())))?;
        write_table(&table, std::io::BufWriter::new(file))?;
        log::debug!("wrote {} row(s) to {}", table.rows.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
