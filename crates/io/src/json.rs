// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bagscan_audit::{AuditError, AuditReport};

/// Write the full audit report as pretty-printed JSON.
pub fn write_report(report: &AuditReport, path: &Path) -> Result<(), AuditError> {
    let file = File::create(path)
        .map_err(|e| AuditError::Io(format!("cannot create {}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    write_report_to(report, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_report_to<W: Write>(report: &AuditReport, writer: W) -> Result<(), AuditError> {
    serde_json::to_writer_pretty(writer, report).map_err(|e| AuditError::Export(e.to_string()))
}
