//! `bagscan columns` - show what the audit would read from a manifest.

use std::io::{self, Write};

use bagscan_audit::columns::diagnose;
use bagscan_audit::model::SchemaDiagnostics;

use crate::exit_codes::EXIT_SCHEMA_ERROR;
use crate::source::SourceArgs;
use crate::CliError;

pub fn cmd_columns(source: SourceArgs, json: bool) -> Result<(), CliError> {
    let config = source.config()?;
    let table = source.load(&config)?;
    let schema = diagnose(&table.headers, &config.columns);

    if json {
        let value = serde_json::json!({
            "source": source.source_name(),
            "header_row": config.header_row,
            "rows": table.len(),
            "headers": &table.headers,
            "schema": &schema,
        });
        let json_str = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        print_listing(&table.headers, config.header_row, &schema)
            .map_err(|e| CliError::general(e.to_string()))?;
    }

    for warning in &schema.warnings {
        eprintln!("warning: {warning}");
    }
    match schema.errors.first() {
        Some(first) => Err(CliError {
            code: EXIT_SCHEMA_ERROR,
            message: first.clone(),
            hint: None,
        }),
        None => Ok(()),
    }
}

fn print_listing(headers: &[String], header_row: usize, schema: &SchemaDiagnostics) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "headers (row {header_row}):")?;
    for (i, name) in headers.iter().enumerate() {
        writeln!(out, "  {i:>3}  {name}")?;
    }

    let c = &schema.columns;
    writeln!(out, "resolved:")?;
    for (role, column) in [
        ("identifier", &c.identifier),
        ("warehouse", &c.warehouse),
        ("added_time", &c.added_time),
        ("seal", &c.seal),
    ] {
        writeln!(out, "  {role:<11} {}", column.as_deref().unwrap_or("(none)"))?;
    }
    Ok(())
}
