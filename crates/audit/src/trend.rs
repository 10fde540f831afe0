use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

use crate::model::{CanonicalRecord, StackedRow, StackedTable, WeekBucket, WeeklyTrend};

/// Stack label for rows with no warehouse.
pub const UNKNOWN_WAREHOUSE: &str = "Unknown";

/// Column label for the no-warehouse stack, parenthesized until it no longer
/// collides with a real warehouse name.
fn unknown_label(named: &BTreeSet<&str>) -> String {
    let mut label = UNKNOWN_WAREHOUSE.to_string();
    while named.contains(label.as_str()) {
        label = format!("({label})");
    }
    label
}

/// Monday of the week containing `at`.
pub fn week_start(at: NaiveDateTime) -> NaiveDate {
    let date = at.date();
    let back = u64::from(date.weekday().num_days_from_monday());
    date - Days::new(back)
}

/// `"YYYY-MM-DD - YYYY-MM-DD"`, Monday through Sunday.
pub fn week_label(start: NaiveDate) -> String {
    let end = start + Days::new(6);
    format!("{} - {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

fn cmp_warehouse(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Count distinct duplicated bag ids per (week, warehouse).
///
/// A bag id counts once per window no matter how many of its rows land there.
/// Rows without an added time cannot be bucketed and are skipped.
pub fn weekly_trend<'a, I>(duplicate_records: I) -> WeeklyTrend
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut seen: HashSet<(Option<&'a str>, NaiveDate, Option<&'a str>)> = HashSet::new();
    let mut counts: HashMap<(NaiveDate, Option<String>), usize> = HashMap::new();
    let mut undated = 0usize;

    for record in duplicate_records {
        let Some(at) = record.added_time else {
            undated += 1;
            continue;
        };
        let start = week_start(at);
        let triple = (record.bag_id.as_deref(), start, record.warehouse.as_deref());
        if seen.insert(triple) {
            *counts.entry((start, record.warehouse.clone())).or_insert(0) += 1;
        }
    }

    if undated > 0 {
        log::debug!("trend: skipped {undated} duplicate row(s) without an added time");
    }

    let mut buckets: Vec<WeekBucket> = counts
        .into_iter()
        .map(|((week_start, warehouse), count)| WeekBucket {
            week_start,
            warehouse,
            count,
        })
        .collect();
    buckets.sort_by(|a, b| {
        a.week_start
            .cmp(&b.week_start)
            .then_with(|| cmp_warehouse(&a.warehouse, &b.warehouse))
    });

    WeeklyTrend { buckets }
}

impl WeeklyTrend {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Distinct weeks, chronological.
    pub fn weeks(&self) -> Vec<NaiveDate> {
        let weeks: BTreeSet<NaiveDate> = self.buckets.iter().map(|b| b.week_start).collect();
        weeks.into_iter().collect()
    }

    pub fn count(&self, week_start: NaiveDate, warehouse: Option<&str>) -> usize {
        self.buckets
            .iter()
            .find(|b| b.week_start == week_start && b.warehouse.as_deref() == warehouse)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    /// Pivot into week rows × warehouse columns; absent cells are zero.
    pub fn stacked_table(&self) -> StackedTable {
        let named: BTreeSet<&str> = self
            .buckets
            .iter()
            .filter_map(|b| b.warehouse.as_deref())
            .collect();
        let has_unknown = self.buckets.iter().any(|b| b.warehouse.is_none());
        let unknown = unknown_label(&named);

        let mut columns: Vec<Option<&str>> = named.into_iter().map(Some).collect();
        if has_unknown {
            columns.push(None);
        }

        let rows = self
            .weeks()
            .into_iter()
            .map(|week| StackedRow {
                week: week_label(week),
                counts: columns.iter().map(|wh| self.count(week, *wh)).collect(),
            })
            .collect();

        StackedTable {
            warehouses: columns
                .iter()
                .map(|wh| wh.map_or_else(|| unknown.clone(), str::to_string))
                .collect(),
            rows,
        }
    }
}
