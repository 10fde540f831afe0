//! `bagscan config` - default config and validation.

use std::path::PathBuf;

use bagscan_audit::AuditConfig;
use clap::Subcommand;

use crate::source::read_config;
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate an audit config file without running
    #[command(after_help = "\
Examples:
  bagscan config validate audit.toml")]
    Validate {
        /// Path to the audit config (TOML)
        config: PathBuf,
    },

    /// Print the built-in default config as TOML
    #[command(after_help = "\
Examples:
  bagscan config default > audit.toml")]
    Default,
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { config } => {
            let parsed = read_config(&config)?;
            eprintln!(
                "valid: header row {}, max bag id length {}, null bag ids {}, {} identifier column candidate(s)",
                parsed.header_row,
                parsed.max_bag_id_len,
                parsed.null_bag_ids,
                parsed.columns.identifier.len(),
            );
            Ok(())
        }
        ConfigCommands::Default => {
            let text = AuditConfig::default()
                .to_toml()
                .map_err(|e| CliError::config(e.to_string()))?;
            print!("{text}");
            Ok(())
        }
    }
}
