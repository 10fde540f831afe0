use serde::{Deserialize, Serialize};

use crate::error::AuditError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Audit settings. Every field has a default, so an empty TOML file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// 0-based row holding the column headers. Rows above it are skipped.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    /// Bag ids longer than this many characters are flagged.
    #[serde(default = "default_max_bag_id_len")]
    pub max_bag_id_len: usize,
    #[serde(default)]
    pub null_bag_ids: NullBagPolicy,
    #[serde(default)]
    pub columns: ColumnCandidates,
}

fn default_header_row() -> usize {
    1
}

fn default_max_bag_id_len() -> usize {
    15
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            header_row: default_header_row(),
            max_bag_id_len: default_max_bag_id_len(),
            null_bag_ids: NullBagPolicy::default(),
            columns: ColumnCandidates::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Null bag ids
// ---------------------------------------------------------------------------

/// Whether rows with no parseable bag id are grouped together as duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullBagPolicy {
    /// Null bag ids never form a duplicate group.
    #[default]
    Ignore,
    /// All null-bag-id rows form one group keyed by null.
    Group,
}

impl std::fmt::Display for NullBagPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Group => write!(f, "group"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column candidates
// ---------------------------------------------------------------------------

/// Accepted header names per logical field, highest priority first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnCandidates {
    #[serde(default = "default_identifier")]
    pub identifier: Vec<String>,
    #[serde(default = "default_warehouse")]
    pub warehouse: Vec<String>,
    #[serde(default = "default_added_time")]
    pub added_time: Vec<String>,
    #[serde(default = "default_seal")]
    pub seal: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_identifier() -> Vec<String> {
    names(&["BAG ID.", "Bag Information", "BAG QR CODE"])
}

fn default_warehouse() -> Vec<String> {
    names(&["DISPATCH WAREHOUSE", "RECEIVING WAREHOUSE"])
}

fn default_added_time() -> Vec<String> {
    names(&["ADDED TIME", "Added Time", "ADDED ON", "DATE ADDED"])
}

fn default_seal() -> Vec<String> {
    names(&["SEAL", "SEAL NO.", "Seal Number"])
}

impl Default for ColumnCandidates {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            warehouse: default_warehouse(),
            added_time: default_added_time(),
            seal: default_seal(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AuditConfig {
    pub fn from_toml(input: &str) -> Result<Self, AuditError> {
        let config: AuditConfig =
            toml::from_str(input).map_err(|e| AuditError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, AuditError> {
        toml::to_string_pretty(self).map_err(|e| AuditError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        if self.max_bag_id_len == 0 {
            return Err(AuditError::ConfigValidation(
                "max_bag_id_len must be greater than 0".into(),
            ));
        }

        // Without identifier candidates nothing can ever be parsed
        if self.columns.identifier.is_empty() {
            return Err(AuditError::ConfigValidation(
                "columns.identifier must list at least one column name".into(),
            ));
        }

        let fields = [
            ("identifier", &self.columns.identifier),
            ("warehouse", &self.columns.warehouse),
            ("added_time", &self.columns.added_time),
            ("seal", &self.columns.seal),
        ];
        for (field, candidates) in fields {
            if candidates.iter().any(|c| c.trim().is_empty()) {
                return Err(AuditError::ConfigValidation(format!(
                    "columns.{field} contains a blank column name"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
