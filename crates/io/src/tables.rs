//! Report tables shared by the CSV and XLSX writers.

use bagscan_audit::model::TIMESTAMP_FORMAT;
use bagscan_audit::AuditReport;
use chrono::NaiveDateTime;

pub const DUPLICATES_FILE: &str = "duplicate_bag_lot_ids_with_rows.csv";
pub const OVER_LENGTH_FILE: &str = "flagged_bag_ids.csv";
pub const MISSING_LOT_FILE: &str = "missing_lot_ids.csv";
pub const TREND_FILE: &str = "weekly_duplicate_trend.csv";

/// A single output cell. Writers decide how each variant is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Empty,
    Text(String),
    Bool(bool),
    Count(usize),
}

impl Field {
    fn opt(value: &Option<String>) -> Self {
        match value {
            Some(s) => Self::Text(s.clone()),
            None => Self::Empty,
        }
    }

    fn time(value: Option<NaiveDateTime>) -> Self {
        match value {
            Some(dt) => Self::Text(dt.format(TIMESTAMP_FORMAT).to_string()),
            None => Self::Empty,
        }
    }

    fn text(s: String) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct ReportTable {
    pub sheet_name: &'static str,
    pub file_name: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Field>>,
}

pub fn duplicates_table(report: &AuditReport) -> ReportTable {
    ReportTable {
        sheet_name: "Duplicates",
        file_name: DUPLICATES_FILE,
        headers: headers(&[
            "Lot ID",
            "Bag ID",
            "Warehouse",
            "Duplicate Flag",
            "Duplicate Rows",
            "Added Time",
            "Seals",
        ]),
        rows: report
            .duplicates
            .iter()
            .map(|g| {
                vec![
                    Field::opt(&g.lot_id),
                    Field::opt(&g.bag_id),
                    Field::opt(&g.warehouse),
                    Field::Bool(true),
                    Field::Text(g.duplicate_rows()),
                    Field::time(g.added_time),
                    Field::text(g.seals_joined()),
                ]
            })
            .collect(),
    }
}

pub fn over_length_table(report: &AuditReport) -> ReportTable {
    ReportTable {
        sheet_name: "Over-length IDs",
        file_name: OVER_LENGTH_FILE,
        headers: headers(&[
            "Lot ID",
            "Bag ID",
            "Warehouse",
            "Bag ID Length Flag",
            "Bag ID Length",
            "Rows",
            "Added Time",
            "Seals",
        ]),
        rows: report
            .over_length
            .iter()
            .map(|e| {
                vec![
                    Field::opt(&e.lot_id),
                    Field::Text(e.bag_id.clone()),
                    Field::opt(&e.warehouse),
                    Field::Bool(true),
                    Field::Count(e.length),
                    Field::Text(e.rows()),
                    Field::time(e.added_time),
                    Field::text(e.seals_joined()),
                ]
            })
            .collect(),
    }
}

pub fn missing_lot_table(report: &AuditReport) -> ReportTable {
    ReportTable {
        sheet_name: "Missing Lot",
        file_name: MISSING_LOT_FILE,
        headers: headers(&[
            "Lot ID",
            "Bag ID",
            "Warehouse",
            "Missing Lot Flag",
            "Row",
            "Added Time",
            "Seal",
        ]),
        rows: report
            .missing_lot
            .iter()
            .map(|r| {
                vec![
                    Field::opt(&r.lot_id),
                    Field::opt(&r.bag_id),
                    Field::opt(&r.warehouse),
                    Field::Bool(true),
                    Field::Count(r.row_index),
                    Field::time(r.added_time),
                    Field::opt(&r.seal),
                ]
            })
            .collect(),
    }
}

/// Stacked-count table: `Week` then one column per warehouse.
pub fn trend_table(report: &AuditReport) -> ReportTable {
    let stacked = report.trend.stacked_table();

    let mut headers = vec!["Week".to_string()];
    headers.extend(stacked.warehouses.iter().cloned());

    ReportTable {
        sheet_name: "Weekly Trend",
        file_name: TREND_FILE,
        headers,
        rows: stacked
            .rows
            .iter()
            .map(|row| {
                let mut fields = vec![Field::Text(row.week.clone())];
                fields.extend(row.counts.iter().map(|&c| Field::Count(c)));
                fields
            })
            .collect(),
    }
}

pub fn report_tables(report: &AuditReport) -> Vec<ReportTable> {
    vec![
        duplicates_table(report),
        over_length_table(report),
        missing_lot_table(report),
        trend_table(report),
    ]
}
