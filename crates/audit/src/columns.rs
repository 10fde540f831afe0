use crate::config::ColumnCandidates;
use crate::model::{ResolvedColumns, SchemaDiagnostics};

/// First candidate present in `available`, returned with the sheet's own spelling.
pub fn first_present<S: AsRef<str>>(available: &[S], candidates: &[String]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        let candidate = candidate.trim();
        available
            .iter()
            .map(|h| h.as_ref())
            .find(|h| h.trim() == candidate)
            .map(str::to_string)
    })
}

/// Pick a source column for every logical field.
pub fn resolve_columns<S: AsRef<str>>(
    available: &[S],
    candidates: &ColumnCandidates,
) -> ResolvedColumns {
    ResolvedColumns {
        identifier: first_present(available, &candidates.identifier),
        warehouse: first_present(available, &candidates.warehouse),
        added_time: first_present(available, &candidates.added_time),
        seal: first_present(available, &candidates.seal),
    }
}

/// Resolve columns and describe what is missing.
///
/// A missing identifier column is an error (every bag/lot id becomes null);
/// a missing warehouse column is only a warning. Optional columns are silent.
pub fn diagnose<S: AsRef<str>>(available: &[S], candidates: &ColumnCandidates) -> SchemaDiagnostics {
    let columns = resolve_columns(available, candidates);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if columns.identifier.is_none() {
        errors.push(format!(
            "no identifier column found (expected one of: {})",
            quoted(&candidates.identifier)
        ));
    }

    if columns.warehouse.is_none() {
        warnings.push(format!(
            "no warehouse column found (expected one of: {})",
            quoted(&candidates.warehouse)
        ));
    }

    SchemaDiagnostics {
        columns,
        errors,
        warnings,
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
