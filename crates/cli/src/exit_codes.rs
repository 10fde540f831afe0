//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `bagscan` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | Success                                                     |
//! | 1    | General error (unspecified, report export failures)         |
//! | 2    | Usage error (bad args, missing input file)                  |
//! | 3    | Read error (file cannot be opened or parsed)                |
//! | 4    | Invalid config (TOML parse or validation failure)           |
//! | 5    | Schema error (no identifier column); reports still written  |
//! | 6    | Findings present (only with `--fail-on-findings`)           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, input file missing.
pub const EXIT_USAGE: u8 = 2;

/// Manifest could not be read: unreadable file, unknown sheet, header row past the end.
pub const EXIT_READ_ERROR: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// No identifier column was found. Detection ran with null identifiers and
/// every requested report was still written.
pub const EXIT_SCHEMA_ERROR: u8 = 5;

/// Duplicates or anomalies were found and `--fail-on-findings` was given.
pub const EXIT_FINDINGS: u8 = 6;
