use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::model::{CanonicalRecord, CellValue, RawTable, ResolvedColumns};
use crate::parser::parse_cell;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Build one canonical record per data row, preserving order.
///
/// Never drops rows: a row with nothing usable still yields a record with
/// every field `None`, so `row_index` always matches the sheet position.
pub fn normalize(table: &RawTable, columns: &ResolvedColumns) -> Vec<CanonicalRecord> {
    let idx = |name: &Option<String>| name.as_deref().and_then(|n| table.column_index(n));

    let identifier_idx = idx(&columns.identifier);
    let warehouse_idx = idx(&columns.warehouse);
    let added_time_idx = idx(&columns.added_time);
    let seal_idx = idx(&columns.seal);

    let mut unparsed_times = 0usize;

    let records: Vec<CanonicalRecord> = table
        .records()
        .enumerate()
        .map(|(row_index, rec)| {
            let (lot_id, bag_id) = match identifier_idx {
                Some(i) => parse_cell(rec.get(i)),
                None => (None, None),
            };

            let added_time = added_time_idx.and_then(|i| {
                let cell = rec.get(i);
                let parsed = parse_timestamp(cell);
                if parsed.is_none() && !cell.is_empty() {
                    unparsed_times += 1;
                    log::debug!("row {row_index}: unparseable added time {cell:?}");
                }
                parsed
            });

            CanonicalRecord {
                row_index,
                bag_id,
                lot_id,
                warehouse: warehouse_idx.and_then(|i| rec.get(i).display()),
                added_time,
                seal: seal_idx.and_then(|i| rec.get(i).display()),
            }
        })
        .collect();

    if unparsed_times > 0 {
        log::warn!("{unparsed_times} added time value(s) could not be parsed and were left empty");
    }

    records
}

/// Read a timestamp from a cell. Unrecognized values yield `None`.
pub fn parse_timestamp(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(s) => parse_timestamp_str(s),
        _ => None,
    }
}

pub fn parse_timestamp_str(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::resolve_columns;
    use crate::config::ColumnCandidates;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn table(headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    fn run(table: &RawTable) -> Vec<CanonicalRecord> {
        let columns = resolve_columns(&table.headers, &ColumnCandidates::default());
        normalize(table, &columns)
    }

    #[test]
    fn one_record_per_row_in_order() {
        let t = table(
            &["BAG ID.", "DISPATCH WAREHOUSE"],
            vec![
                vec![CellValue::text("Bag=A1,Lot=L1"), CellValue::text("North")],
                vec![],
                vec![CellValue::Number(77.0), CellValue::Number(3.0)],
            ],
        );
        let records = run(&t);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().map(|r| r.row_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        assert_eq!(records[0].bag_id.as_deref(), Some("A1"));
        assert_eq!(records[0].lot_id.as_deref(), Some("L1"));
        assert_eq!(records[0].warehouse.as_deref(), Some("North"));

        // Blank row still produces a record
        assert_eq!(records[1].bag_id, None);
        assert_eq!(records[1].warehouse, None);

        // Numeric identifier is not text; numeric warehouse is displayed
        assert_eq!(records[2].bag_id, None);
        assert_eq!(records[2].warehouse.as_deref(), Some("3"));
    }

    #[test]
    fn missing_identifier_column_nulls_ids() {
        let t = table(
            &["Something", "RECEIVING WAREHOUSE"],
            vec![vec![CellValue::text("Bag=A1"), CellValue::text("South")]],
        );
        let records = run(&t);
        assert_eq!(records[0].bag_id, None);
        assert_eq!(records[0].lot_id, None);
        assert_eq!(records[0].warehouse.as_deref(), Some("South"));
    }

    #[test]
    fn added_time_and_seal() {
        let t = table(
            &["Bag Information", "ADDED TIME", "SEAL"],
            vec![
                vec![
                    CellValue::text("Bag=A1"),
                    CellValue::DateTime(dt("2024-03-06 09:15:00")),
                    CellValue::text("S-1"),
                ],
                vec![
                    CellValue::text("Bag=A2"),
                    CellValue::text("2024-03-07 10:00:00"),
                    CellValue::Empty,
                ],
                vec![
                    CellValue::text("Bag=A3"),
                    CellValue::text("not a date"),
                    CellValue::text("S-3"),
                ],
            ],
        );
        let records = run(&t);
        assert_eq!(records[0].added_time, Some(dt("2024-03-06 09:15:00")));
        assert_eq!(records[0].seal.as_deref(), Some("S-1"));
        assert_eq!(records[1].added_time, Some(dt("2024-03-07 10:00:00")));
        assert_eq!(records[1].seal, None);
        assert_eq!(records[2].added_time, None);
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(parse_timestamp_str("2024-03-06"), Some(dt("2024-03-06 00:00:00")));
        assert_eq!(parse_timestamp_str("06/03/2024 14:30"), Some(dt("2024-03-06 14:30:00")));
        assert_eq!(parse_timestamp_str("2024-03-06T14:30:00"), Some(dt("2024-03-06 14:30:00")));
        assert_eq!(
            parse_timestamp_str("2024-03-06T14:30:00+05:30"),
            Some(dt("2024-03-06 14:30:00"))
        );
        assert_eq!(parse_timestamp_str("  "), None);
        assert_eq!(parse_timestamp_str("yesterday"), None);
        assert_eq!(parse_timestamp(&CellValue::Number(45000.0)), None);
    }
}
