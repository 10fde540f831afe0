// Property-based tests for the audit pipeline invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{HashMap, HashSet};

use bagscan_audit::anomalies::flag_anomalies;
use bagscan_audit::columns::resolve_columns;
use bagscan_audit::config::{AuditConfig, ColumnCandidates, NullBagPolicy};
use bagscan_audit::duplicates::{duplicate_members, find_duplicates};
use bagscan_audit::model::{CanonicalRecord, CellValue, RawTable};
use bagscan_audit::normalize::normalize;
use bagscan_audit::trend::{week_start, weekly_trend};
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Identifier cell: mostly composite codes over a tiny alphabet so bag ids collide.
fn arb_identifier() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        4 => "Bag=[A-D]{1,2},Lot=[0-9]".prop_map(CellValue::Text),
        3 => "Bag=[A-D]{1,2}".prop_map(CellValue::Text),
        1 => "Lot=[0-9],Bag=[A-D]{1,2}".prop_map(CellValue::Text),
        1 => "[A-D]{14,18}".prop_map(CellValue::Text),
        1 => Just(CellValue::Empty),
        1 => (0.0..1000.0f64).prop_map(CellValue::Number),
    ]
}

fn arb_warehouse() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        3 => "(North|South|East)".prop_map(CellValue::Text),
        1 => Just(CellValue::Empty),
    ]
}

/// Timestamps spread over a few weeks in early 2024, sometimes blank.
fn arb_added_time() -> impl Strategy<Value = CellValue> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid base date");
    prop_oneof![
        4 => (0i64..(21 * 24)).prop_map(move |h| CellValue::DateTime(base + chrono::Duration::hours(h))),
        1 => Just(CellValue::Empty),
        1 => Just(CellValue::text("garbage")),
    ]
}

fn arb_table(max_rows: usize) -> impl Strategy<Value = RawTable> {
    prop::collection::vec(
        (arb_identifier(), arb_warehouse(), arb_added_time()),
        0..max_rows,
    )
    .prop_map(|rows| {
        RawTable::new(
            vec![
                "BAG ID.".to_string(),
                "DISPATCH WAREHOUSE".to_string(),
                "ADDED TIME".to_string(),
            ],
            rows.into_iter().map(|(a, b, c)| vec![a, b, c]).collect(),
        )
    })
}

fn records_of(table: &RawTable) -> Vec<CanonicalRecord> {
    let columns = resolve_columns(&table.headers, &ColumnCandidates::default());
    normalize(table, &columns)
}

fn arb_policy() -> impl Strategy<Value = NullBagPolicy> {
    prop_oneof![Just(NullBagPolicy::Ignore), Just(NullBagPolicy::Group)]
}

// ===========================================================================
// Normalizer
// ===========================================================================

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn normalizer_keeps_every_row(table in arb_table(40)) {
        let records = records_of(&table);
        prop_assert_eq!(records.len(), table.len());
        for (i, r) in records.iter().enumerate() {
            prop_assert_eq!(r.row_index, i);
        }
    }
}

// ===========================================================================
// Duplicate groups
// ===========================================================================

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn groups_are_exhaustive_and_disjoint(table in arb_table(40), policy in arb_policy()) {
        let records = records_of(&table);
        let groups = find_duplicates(&records, policy);

        let mut occurrences: HashMap<Option<String>, usize> = HashMap::new();
        for r in &records {
            if r.bag_id.is_some() || policy == NullBagPolicy::Group {
                *occurrences.entry(r.bag_id.clone()).or_insert(0) += 1;
            }
        }

        // One group per key occurring at least twice, and no others
        let keys: Vec<_> = groups.iter().map(|g| g.bag_id.clone()).collect();
        let unique: HashSet<_> = keys.iter().cloned().collect();
        prop_assert_eq!(keys.len(), unique.len(), "bag id appears in two groups");
        for (key, count) in &occurrences {
            prop_assert_eq!(unique.contains(key), *count >= 2, "key {:?} x{}", key, count);
        }

        // Member totals match duplicate row count
        let expected_rows: usize = occurrences.values().filter(|&&c| c >= 2).sum();
        let member_rows: usize = groups.iter().map(|g| g.member_count()).sum();
        prop_assert_eq!(member_rows, expected_rows);

        // Every row index belongs to at most one group, and the bag ids agree
        let mut seen = HashSet::new();
        for g in &groups {
            for &row in &g.row_indexes {
                prop_assert!(seen.insert(row), "row {} in two groups", row);
                prop_assert_eq!(&records[row].bag_id, &g.bag_id);
            }
            // Rows listed in sheet order
            prop_assert!(g.row_indexes.windows(2).all(|w| w[0] < w[1]));
        }

        prop_assert_eq!(duplicate_members(&records, &groups).len(), expected_rows);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn groups_sorted_newest_first(table in arb_table(40)) {
        let records = records_of(&table);
        let groups = find_duplicates(&records, NullBagPolicy::Ignore);
        for w in groups.windows(2) {
            match (w[0].added_time, w[1].added_time) {
                (Some(a), Some(b)) => prop_assert!(a >= b),
                (None, Some(_)) => prop_assert!(false, "blank time sorted before a dated group"),
                (None, None) => prop_assert!(w[0].row_indexes[0] < w[1].row_indexes[0]),
                (Some(_), None) => {}
            }
        }
    }
}

// ===========================================================================
// Anomalies
// ===========================================================================

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn over_length_flags_are_sound(table in arb_table(40), max_len in 1usize..20) {
        let records = records_of(&table);
        let anomalies = flag_anomalies(&records, max_len);
        for a in &anomalies {
            prop_assert!(a.flags.over_length || a.flags.missing_lot);
            prop_assert_eq!(a.flags.missing_lot, a.record.lot_id.is_none());
            if a.flags.over_length {
                let bag = a.record.bag_id.as_deref();
                prop_assert!(bag.is_some(), "null bag id flagged as over-length");
                prop_assert!(bag.map(|b| b.chars().count()).unwrap_or(0) > max_len);
            }
        }
        // Nothing missed
        let flagged: HashSet<usize> = anomalies.iter().filter(|a| a.flags.over_length).map(|a| a.record.row_index).collect();
        for r in &records {
            let long = r.bag_id.as_ref().map(|b| b.chars().count() > max_len).unwrap_or(false);
            prop_assert_eq!(flagged.contains(&r.row_index), long);
        }
    }
}

// ===========================================================================
// Weekly trend
// ===========================================================================

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn trend_counts_distinct_bags_per_window(table in arb_table(60)) {
        let records = records_of(&table);
        let groups = find_duplicates(&records, NullBagPolicy::Ignore);
        let members = duplicate_members(&records, &groups);
        let trend = weekly_trend(members.iter().copied());

        let mut expected: HashMap<(NaiveDate, Option<String>), HashSet<Option<String>>> = HashMap::new();
        for r in &members {
            if let Some(at) = r.added_time {
                expected
                    .entry((week_start(at), r.warehouse.clone()))
                    .or_default()
                    .insert(r.bag_id.clone());
            }
        }

        prop_assert_eq!(trend.buckets.len(), expected.len());
        for b in &trend.buckets {
            let bags = expected.get(&(b.week_start, b.warehouse.clone()));
            prop_assert_eq!(Some(b.count), bags.map(|s| s.len()));
        }
    }
}

// ===========================================================================
// Pipeline
// ===========================================================================

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn pipeline_is_idempotent(table in arb_table(40), policy in arb_policy()) {
        let config = AuditConfig { null_bag_ids: policy, ..AuditConfig::default() };
        let first = bagscan_audit::run(&table, &config, Some("sheet"));
        let second = bagscan_audit::run(&table, &config, Some("sheet"));
        prop_assert_eq!(first, second);
    }
}

#[test]
fn five_rows_in_one_window_count_once() {
    let at = NaiveDateTime::parse_from_str("2024-01-03 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let rows = (0..5)
        .map(|_| {
            vec![
                CellValue::text("Bag=SAME,Lot=1"),
                CellValue::text("North"),
                CellValue::DateTime(at),
            ]
        })
        .collect();
    let table = RawTable::new(
        vec!["BAG ID.".into(), "DISPATCH WAREHOUSE".into(), "ADDED TIME".into()],
        rows,
    );
    let report = bagscan_audit::run(&table, &AuditConfig::default(), None);
    assert_eq!(report.summary.duplicate_rows, 5);
    assert_eq!(report.trend.buckets.len(), 1);
    assert_eq!(report.trend.buckets[0].count, 1);
}
