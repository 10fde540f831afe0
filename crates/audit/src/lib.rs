//! `bagscan-audit`: warehouse manifest audit engine.
//!
//! Pure engine crate: receives a loaded sheet, returns the audit report
//! (duplicate bags, over-length ids, missing lots, weekly duplicate trend).
//! No CLI or file IO.

pub mod anomalies;
pub mod columns;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod trend;

pub use config::{AuditConfig, ColumnCandidates, NullBagPolicy};
pub use engine::run;
pub use error::AuditError;
pub use model::{AuditReport, CanonicalRecord, CellValue, DuplicateGroup, RawTable};
