use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::NullBagPolicy;

/// Timestamp layout used wherever an added time is rendered as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single typed cell as read from the source sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    /// The string payload, only for text cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell the way a spreadsheet displays it. `None` for blanks.
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => {
                // Integers without decimals
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            Self::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Self::DateTime(dt) => Some(dt.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

/// The uploaded sheet: header names plus data rows, in sheet order.
///
/// Rows may be shorter than the header (trailing blanks are not stored);
/// missing cells read as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header equal to `name` (surrounding whitespace ignored).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        self.rows.iter().map(|cells| RawRecord { cells })
    }
}

/// One data row; reads past its stored cells yield [`CellValue::Empty`].
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    cells: &'a [CellValue],
}

impl<'a> RawRecord<'a> {
    pub fn get(&self, col: usize) -> &'a CellValue {
        self.cells.get(col).unwrap_or(&EMPTY_CELL)
    }
}

// ---------------------------------------------------------------------------
// Canonical rows
// ---------------------------------------------------------------------------

/// One normalized row. `row_index` is the 0-based position of the data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub row_index: usize,
    pub bag_id: Option<String>,
    pub lot_id: Option<String>,
    pub warehouse: Option<String>,
    pub added_time: Option<NaiveDateTime>,
    pub seal: Option<String>,
}

// ---------------------------------------------------------------------------
// Schema resolution
// ---------------------------------------------------------------------------

/// Source column chosen for each logical field (absent when no candidate matched).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedColumns {
    pub identifier: Option<String>,
    pub warehouse: Option<String>,
    pub added_time: Option<String>,
    pub seal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiagnostics {
    pub columns: ResolvedColumns,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SchemaDiagnostics {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

/// All rows sharing one bag id. Scalar fields come from the first member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub bag_id: Option<String>,
    pub lot_id: Option<String>,
    pub warehouse: Option<String>,
    pub added_time: Option<NaiveDateTime>,
    pub seals: Vec<String>,
    pub row_indexes: Vec<usize>,
}

impl DuplicateGroup {
    pub fn member_count(&self) -> usize {
        self.row_indexes.len()
    }

    /// Row indexes joined with commas, e.g. `"0,1"`.
    pub fn duplicate_rows(&self) -> String {
        join_rows(&self.row_indexes)
    }

    pub fn seals_joined(&self) -> String {
        self.seals.join(",")
    }
}

pub(crate) fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Anomalies
// ---------------------------------------------------------------------------

/// Independent detection flags; a record may carry both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyFlags {
    pub over_length: bool,
    pub missing_lot: bool,
}

impl AnomalyFlags {
    pub fn any(&self) -> bool {
        self.over_length || self.missing_lot
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyRecord {
    pub record: CanonicalRecord,
    pub flags: AnomalyFlags,
}

/// Over-length bag id, merged across the rows that carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverLengthEntry {
    pub bag_id: String,
    pub length: usize,
    pub lot_id: Option<String>,
    pub warehouse: Option<String>,
    pub added_time: Option<NaiveDateTime>,
    pub seals: Vec<String>,
    pub row_indexes: Vec<usize>,
}

impl OverLengthEntry {
    pub fn rows(&self) -> String {
        join_rows(&self.row_indexes)
    }

    pub fn seals_joined(&self) -> String {
        self.seals.join(",")
    }
}

// ---------------------------------------------------------------------------
// Weekly trend
// ---------------------------------------------------------------------------

/// Distinct duplicated bag ids seen in one (week, warehouse) window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    pub week_start: NaiveDate,
    pub warehouse: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyTrend {
    /// Sorted by week start, then warehouse (unknown warehouse last).
    pub buckets: Vec<WeekBucket>,
}

/// Trend pivoted for a stacked bar chart: one row per week, one column per warehouse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StackedTable {
    pub warehouses: Vec<String>,
    pub rows: Vec<StackedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackedRow {
    pub week: String,
    pub counts: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditMeta {
    pub engine_version: String,
    pub source: Option<String>,
    pub rows: usize,
    pub header_row: usize,
    pub max_bag_id_len: usize,
    pub null_bag_ids: NullBagPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    /// Distinct duplicated bag ids (one per group).
    pub duplicate_count: usize,
    /// Rows belonging to any duplicate group.
    pub duplicate_rows: usize,
    /// Rows whose bag id exceeds the length threshold.
    pub over_length_count: usize,
    /// Distinct over-length bag ids.
    pub over_length_ids: usize,
    pub missing_lot_count: usize,
    pub trend_weeks: usize,
}

impl AuditSummary {
    pub fn has_findings(&self) -> bool {
        self.duplicate_count > 0 || self.over_length_count > 0 || self.missing_lot_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub meta: AuditMeta,
    pub schema: SchemaDiagnostics,
    pub summary: AuditSummary,
    pub duplicates: Vec<DuplicateGroup>,
    pub over_length: Vec<OverLengthEntry>,
    pub missing_lot: Vec<CanonicalRecord>,
    pub trend: WeeklyTrend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_display_drops_integer_decimals() {
        assert_eq!(CellValue::Number(42.0).display().as_deref(), Some("42"));
        assert_eq!(CellValue::Number(4.5).display().as_deref(), Some("4.5"));
    }

    #[test]
    fn blank_cells_display_as_none() {
        assert_eq!(CellValue::Empty.display(), None);
        assert_eq!(CellValue::Text(String::new()).display(), None);
        assert!(CellValue::text("").is_empty());
    }

    #[test]
    fn short_rows_read_as_empty() {
        let table = RawTable::new(
            vec!["BAG ID.".into(), " DISPATCH WAREHOUSE ".into()],
            vec![vec![CellValue::text("Bag=1")]],
        );
        let rec = table.records().next().unwrap();
        assert_eq!(rec.get(0), &CellValue::text("Bag=1"));
        assert_eq!(rec.get(1), &CellValue::Empty);
        assert_eq!(table.column_index("DISPATCH WAREHOUSE"), Some(1));
    }

    #[test]
    fn flags_any() {
        assert!(AnomalyFlags { over_length: false, missing_lot: true }.any());
        assert!(!AnomalyFlags::default().any());
    }
}
