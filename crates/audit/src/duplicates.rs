use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::config::NullBagPolicy;
use crate::model::{CanonicalRecord, DuplicateGroup};

/// Newest first, blanks last. Equal keys compare equal so a stable sort keeps row order.
pub fn cmp_added_time_desc(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group records sharing a bag id that occurs at least twice.
///
/// Scalar fields come from the first member in row order; seals and row
/// indexes are collected from every member in row order. Groups are sorted by
/// added time, newest first, ties kept in first-seen order.
pub fn find_duplicates(records: &[CanonicalRecord], policy: NullBagPolicy) -> Vec<DuplicateGroup> {
    let key_of = |r: &'_ CanonicalRecord| -> Option<Option<String>> {
        match (&r.bag_id, policy) {
            (Some(id), _) => Some(Some(id.clone())),
            (None, NullBagPolicy::Group) => Some(None),
            (None, NullBagPolicy::Ignore) => None,
        }
    };

    let mut counts: HashMap<Option<String>, usize> = HashMap::new();
    for key in records.iter().filter_map(key_of) {
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut slot: HashMap<Option<String>, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for record in records {
        let Some(key) = key_of(record) else { continue };
        if counts.get(&key).copied().unwrap_or(0) < 2 {
            continue;
        }

        let idx = *slot.entry(key.clone()).or_insert_with(|| {
            groups.push(DuplicateGroup {
                bag_id: key,
                lot_id: record.lot_id.clone(),
                warehouse: record.warehouse.clone(),
                added_time: record.added_time,
                seals: Vec::new(),
                row_indexes: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[idx];
        group.row_indexes.push(record.row_index);
        if let Some(ref seal) = record.seal {
            group.seals.push(seal.clone());
        }
    }

    groups.sort_by(|a, b| cmp_added_time_desc(a.added_time, b.added_time));

    log::debug!(
        "duplicates: {} group(s) covering {} row(s)",
        groups.len(),
        groups.iter().map(|g| g.member_count()).sum::<usize>()
    );

    groups
}

/// Records that belong to any of `groups`, in row order.
pub fn duplicate_members<'a>(
    records: &'a [CanonicalRecord],
    groups: &[DuplicateGroup],
) -> Vec<&'a CanonicalRecord> {
    let rows: HashSet<usize> = groups
        .iter()
        .flat_map(|g| g.row_indexes.iter().copied())
        .collect();
    records.iter().filter(|r| rows.contains(&r.row_index)).collect()
}
