use crate::anomalies::{flag_anomalies, missing_lot_report, over_length_report};
use crate::columns::diagnose;
use crate::config::AuditConfig;
use crate::duplicates::{duplicate_members, find_duplicates};
use crate::model::{AuditMeta, AuditReport, AuditSummary, RawTable};
use crate::normalize::normalize;
use crate::trend::weekly_trend;

/// Run the full audit over one loaded sheet.
///
/// Pure: the same table and config always produce an equal report. Schema
/// problems are reported in `report.schema`, never returned as errors; callers
/// decide how to surface them.
pub fn run(table: &RawTable, config: &AuditConfig, source: Option<&str>) -> AuditReport {
    let schema = diagnose(&table.headers, &config.columns);
    for message in schema.errors.iter().chain(&schema.warnings) {
        log::debug!("schema: {message}");
    }

    let records = normalize(table, &schema.columns);

    let duplicates = find_duplicates(&records, config.null_bag_ids);
    let members = duplicate_members(&records, &duplicates);

    let anomalies = flag_anomalies(&records, config.max_bag_id_len);
    let over_length = over_length_report(&anomalies);
    let missing_lot = missing_lot_report(&anomalies);

    let trend = weekly_trend(members.iter().copied());

    let summary = AuditSummary {
        duplicate_count: duplicates.len(),
        duplicate_rows: members.len(),
        over_length_count: anomalies.iter().filter(|a| a.flags.over_length).count(),
        over_length_ids: over_length.len(),
        missing_lot_count: missing_lot.len(),
        trend_weeks: trend.weeks().len(),
    };

    log::info!(
        "audited {} row(s): {} duplicate bag id(s), {} over-length row(s), {} missing lot id(s)",
        records.len(),
        summary.duplicate_count,
        summary.over_length_count,
        summary.missing_lot_count,
    );

    AuditReport {
        meta: AuditMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            source: source.map(str::to_string),
            rows: records.len(),
            header_row: config.header_row,
            max_bag_id_len: config.max_bag_id_len,
            null_bag_ids: config.null_bag_ids,
        },
        schema,
        summary,
        duplicates,
        over_length,
        missing_lot,
        trend,
    }
}
