use std::fmt;

#[derive(Debug)]
pub enum AuditError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty candidate list, zero threshold, etc.).
    ConfigValidation(String),
    /// IO error (file read, directory create, etc.).
    Io(String),
    /// Spreadsheet or CSV could not be decoded.
    SheetRead { path: String, message: String },
    /// Requested sheet does not exist in the workbook.
    UnknownSheet { name: String, available: Vec<String> },
    /// Header offset points past the end of the sheet.
    HeaderRowOutOfRange { header_row: usize, rows: usize },
    /// Report could not be written.
    Export(String),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::SheetRead { path, message } => write!(f, "cannot read '{path}': {message}"),
            Self::UnknownSheet { name, available } => {
                write!(f, "sheet '{name}' not found (available: {})", available.join(", "))
            }
            Self::HeaderRowOutOfRange { header_row, rows } => {
                write!(f, "header row {header_row} is out of range (sheet has {rows} row(s))")
            }
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for AuditError {}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sheet_lists_available() {
        let err = AuditError::UnknownSheet {
            name: "Dispatch".into(),
            available: vec!["Sheet1".into(), "Receiving".into()],
        };
        assert_eq!(err.to_string(), "sheet 'Dispatch' not found (available: Sheet1, Receiving)");
    }

    #[test]
    fn header_row_message() {
        let err = AuditError::HeaderRowOutOfRange { header_row: 1, rows: 1 };
        assert!(err.to_string().contains("header row 1"));
    }
}
