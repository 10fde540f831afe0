//! `bagscan run` - load a manifest, audit it, write the reports.

use std::path::PathBuf;

use bagscan_audit::AuditReport;
use clap::Args;

use crate::exit_codes::{EXIT_FINDINGS, EXIT_SCHEMA_ERROR};
use crate::source::SourceArgs;
use crate::CliError;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the four report CSVs into this directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Write all reports into one workbook
    #[arg(long)]
    pub xlsx: Option<PathBuf>,

    /// Output the full report as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Write the JSON report to a file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit with code 6 when any duplicate or anomaly is found
    #[arg(long)]
    pub fail_on_findings: bool,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = args.source.config()?;
    let table = args.source.load(&config)?;
    let source_name = args.source.source_name();

    let report = bagscan_audit::run(&table, &config, Some(&source_name));

    for warning in &report.schema.warnings {
        eprintln!("warning: {warning}");
    }

    // Reports are written even on schema errors so the (empty) outputs exist
    if let Some(ref dir) = args.out_dir {
        let written = bagscan_io::csv::export_reports(&report, dir)?;
        eprintln!("wrote {} report(s) to {}", written.len(), dir.display());
    }
    if let Some(ref path) = args.xlsx {
        bagscan_io::xlsx::export_workbook(&report, path)?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(ref path) = args.output {
        bagscan_io::json::write_report(&report, path)?;
        eprintln!("wrote {}", path.display());
    }
    if args.json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    print_summary(&report);

    if let Some(first) = report.schema.errors.first() {
        let headers = table.headers.join(", ");
        return Err(CliError {
            code: EXIT_SCHEMA_ERROR,
            message: first.clone(),
            hint: Some(format!(
                "sheet headers are: {headers}; set [columns] identifier in a --config file or adjust --header-row"
            )),
        });
    }

    if args.fail_on_findings && report.summary.has_findings() {
        return Err(CliError {
            code: EXIT_FINDINGS,
            message: String::new(),
            hint: None,
        });
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(report: &AuditReport) {
    let s = &report.summary;
    eprintln!(
        "{}: {} row(s) audited",
        report.meta.source.as_deref().unwrap_or("manifest"),
        report.meta.rows
    );
    eprintln!(
        "Total Count of Duplicates: {} ({} row(s))",
        s.duplicate_count, s.duplicate_rows
    );
    eprintln!(
        "Total Count of Bag IDs Longer than {} Characters: {} ({} distinct id(s))",
        report.meta.max_bag_id_len, s.over_length_count, s.over_length_ids
    );
    eprintln!("Total Count of Missing Lot IDs: {}", s.missing_lot_count);
    eprintln!("Weeks with Duplicates: {}", s.trend_weeks);
}
