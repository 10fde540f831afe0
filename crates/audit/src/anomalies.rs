use std::collections::HashMap;

use crate::duplicates::cmp_added_time_desc;
use crate::model::{AnomalyFlags, AnomalyRecord, CanonicalRecord, OverLengthEntry};

/// Length in characters (not bytes) when it exceeds `max_len`.
pub fn over_length(bag_id: Option<&str>, max_len: usize) -> Option<usize> {
    let len = bag_id?.chars().count();
    (len > max_len).then_some(len)
}

pub fn flags_for(record: &CanonicalRecord, max_len: usize) -> AnomalyFlags {
    AnomalyFlags {
        over_length: over_length(record.bag_id.as_deref(), max_len).is_some(),
        missing_lot: record.lot_id.is_none(),
    }
}

/// Every record carrying at least one flag, in row order.
pub fn flag_anomalies(records: &[CanonicalRecord], max_len: usize) -> Vec<AnomalyRecord> {
    records
        .iter()
        .filter_map(|record| {
            let flags = flags_for(record, max_len);
            flags.any().then(|| AnomalyRecord {
                record: record.clone(),
                flags,
            })
        })
        .collect()
}

/// Over-length bag ids, merged per bag id like duplicate groups.
pub fn over_length_report(anomalies: &[AnomalyRecord]) -> Vec<OverLengthEntry> {
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<OverLengthEntry> = Vec::new();

    for anomaly in anomalies.iter().filter(|a| a.flags.over_length) {
        let record = &anomaly.record;
        let Some(bag_id) = record.bag_id.as_deref() else { continue };

        let idx = *slot.entry(bag_id).or_insert_with(|| {
            entries.push(OverLengthEntry {
                bag_id: bag_id.to_string(),
                length: bag_id.chars().count(),
                lot_id: record.lot_id.clone(),
                warehouse: record.warehouse.clone(),
                added_time: record.added_time,
                seals: Vec::new(),
                row_indexes: Vec::new(),
            });
            entries.len() - 1
        });

        let entry = &mut entries[idx];
        entry.row_indexes.push(record.row_index);
        if let Some(ref seal) = record.seal {
            entry.seals.push(seal.clone());
        }
    }

    entries.sort_by(|a, b| cmp_added_time_desc(a.added_time, b.added_time));
    entries
}

/// Records without a lot id, newest first.
pub fn missing_lot_report(anomalies: &[AnomalyRecord]) -> Vec<CanonicalRecord> {
    let mut rows: Vec<CanonicalRecord> = anomalies
        .iter()
        .filter(|a| a.flags.missing_lot)
        .map(|a| a.record.clone())
        .collect();
    rows.sort_by(|a, b| cmp_added_time_desc(a.added_time, b.added_time));
    rows
}
