//! Manifest and config loading shared by `run` and `columns`.

use std::path::{Path, PathBuf};

use bagscan_audit::{AuditConfig, RawTable};
use bagscan_io::{load_table, LoadOptions, SourceFormat};
use clap::Args;

use crate::exit_codes::EXIT_READ_ERROR;
use crate::CliError;

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Manifest to audit (.xlsx, .xls, .xlsb, .ods, .csv, .tsv)
    pub file: PathBuf,

    /// Audit config file (TOML); built-in defaults when omitted
    #[arg(long, env = "BAGSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sheet to read (default: first sheet). Ignored for CSV/TSV.
    #[arg(long)]
    pub sheet: Option<String>,

    /// 0-based row holding the column headers (overrides the config)
    #[arg(long)]
    pub header_row: Option<usize>,
}

impl SourceArgs {
    /// Resolve the effective config: file (or defaults), then CLI overrides.
    pub fn config(&self) -> Result<AuditConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => AuditConfig::default(),
        };
        if let Some(row) = self.header_row {
            config.header_row = row;
        }
        Ok(config)
    }

    pub fn load(&self, config: &AuditConfig) -> Result<RawTable, CliError> {
        if !self.file.exists() {
            return Err(CliError::usage(format!("file not found: {}", self.file.display())));
        }
        if SourceFormat::from_path(&self.file).is_none() {
            return Err(CliError::usage(format!("unsupported file type: {}", self.file.display()))
                .with_hint("expected .xlsx, .xlsm, .xls, .xlsb, .ods, .csv, .txt or .tsv"));
        }

        let options = LoadOptions {
            sheet: self.sheet.clone(),
            header_row: config.header_row,
        };
        Ok(load_table(&self.file, &options)?)
    }

    /// File name used as the report's `source`.
    pub fn source_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

/// Read a config file. Parsing also validates it.
pub fn read_config(path: &Path) -> Result<AuditConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_READ_ERROR,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    let config = AuditConfig::from_toml(&text)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
