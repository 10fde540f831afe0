// bagscan - warehouse manifest audits from the command line

mod columns;
mod config;
mod exit_codes;
mod run;
mod source;

use std::process::ExitCode;

use bagscan_audit::AuditError;
use clap::{Parser, Subcommand};

use crate::config::ConfigCommands;
use crate::exit_codes::*;
use crate::run::RunArgs;
use crate::source::SourceArgs;

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  bagscan-audit ", env!("CARGO_PKG_VERSION"),
    )
}

#[derive(Parser)]
#[command(name = "bagscan")]
#[command(about = "Audit bag/lot manifests for duplicate bags, malformed ids and missing lots")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full audit on a manifest and write the reports
    #[command(after_help = "\
Examples:
  bagscan run dispatch.xlsx --out-dir reports/
  bagscan run dispatch.xlsx --sheet Dispatch --xlsx audit.xlsx
  bagscan run receiving.csv --header-row 0 --json
  bagscan run dispatch.xlsx --config audit.toml --fail-on-findings")]
    Run(RunArgs),

    /// Show the headers and the columns the audit would use, without running it
    #[command(after_help = "\
Examples:
  bagscan columns dispatch.xlsx
  bagscan columns receiving.csv --header-row 0 --json")]
    Columns {
        #[command(flatten)]
        source: SourceArgs,

        /// Output JSON to stdout instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Inspect or validate audit configuration files
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Failure outside the read/config/schema classes (exit 1).
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<AuditError> for CliError {
    fn from(err: AuditError) -> Self {
        let (code, hint) = match &err {
            AuditError::ConfigParse(_) | AuditError::ConfigValidation(_) => {
                (EXIT_INVALID_CONFIG, Some("run `bagscan config default` for a valid starting point".to_string()))
            }
            AuditError::UnknownSheet { .. } => (EXIT_READ_ERROR, Some("pick a sheet with --sheet".to_string())),
            AuditError::HeaderRowOutOfRange { .. } => {
                (EXIT_READ_ERROR, Some("--header-row is 0-based; use 0 when the header is the first row".to_string()))
            }
            AuditError::SheetRead { .. } | AuditError::Io(_) => (EXIT_READ_ERROR, None),
            AuditError::Export(_) => (EXIT_ERROR, None),
        };
        Self { code, message: err.to_string(), hint }
    }
}

/// Route `log`/`tracing` output to stderr. `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Run(args) => run::cmd_run(args),
        Commands::Columns { source, json } => columns::cmd_columns(source, json),
        Commands::Config(cmd) => config::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
