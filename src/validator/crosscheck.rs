//! Cross-reference integrity checks over a parsed file.
//!
//! Runs once after the line stream when no fatal condition occurred.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::columns::stable::{RELIABILITY, SME_ID_REFS, SMF_ID_REFS};
use crate::error::{catalog, Diagnostic, DiagnosticCollection, DiagnosticOverflow};
use crate::model::{MzTab, Parameter, Table, TableKind};

/// Reliability scale used when no override is declared.
pub const DEFAULT_RELIABILITY_PATTERN: &str = "^[1-4]$";
/// Metabolomics Standards Initiative identification levels.
pub const MSI_RELIABILITY_ACCESSION: &str = "MS:1002896";
/// Schymanski et al. confidence levels.
pub const SCHYMANSKI_RELIABILITY_ACCESSION: &str = "MS:1002955";
const SCHYMANSKI_RELIABILITY_PATTERN: &str = "^(1|2a|2b|3|4|5)$";

static DEFAULT_RELIABILITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_RELIABILITY_PATTERN).expect("Invalid reliability regex"));
static SCHYMANSKI_RELIABILITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SCHYMANSKI_RELIABILITY_PATTERN).expect("Invalid reliability regex")
});

/// Run every integrity check and record the findings.
pub fn check(mztab: &MzTab, diagnostics: &mut DiagnosticCollection) -> Result<(), DiagnosticOverflow> {
    for table in mztab.tables() {
        check_duplicate_ids(table, diagnostics)?;
    }

    check_row_references(
        mztab.small_molecule_summary.as_ref(),
        mztab.small_molecule_feature.as_ref(),
        SMF_ID_REFS,
        diagnostics,
    )?;
    check_row_references(
        mztab.small_molecule_feature.as_ref(),
        mztab.small_molecule_evidence.as_ref(),
        SME_ID_REFS,
        diagnostics,
    )?;

    check_sections(mztab, diagnostics)?;
    check_column_units(mztab, diagnostics)?;
    check_reliability(mztab, diagnostics)?;
    Ok(())
}

fn check_duplicate_ids(table: &Table, diagnostics: &mut DiagnosticCollection) -> Result<(), DiagnosticOverflow> {
    let id_column = table.kind.id_column();
    let mut first_seen: BTreeMap<i64, usize> = BTreeMap::new();
    for row in &table.rows {
        let Some(id) = row.integer(id_column) else {
            continue;
        };
        if let Some(first) = first_seen.get(&id) {
            diagnostics.add(Diagnostic::new(
                &catalog::DUPLICATE_ROW_ID,
                Some(row.line_number),
                &[&id_column, &id, first],
            ))?;
        } else {
            first_seen.insert(id, row.line_number);
        }
    }
    Ok(())
}

/// Every id listed in `column` of a `from` row must be the id of a `to` row.
/// A missing `to` table means no id resolves.
fn check_row_references(
    from: Option<&Table>,
    to: Option<&Table>,
    column: &str,
    diagnostics: &mut DiagnosticCollection,
) -> Result<(), DiagnosticOverflow> {
    let Some(from) = from else {
        return Ok(());
    };
    let known: BTreeSet<i64> = to.map(|t| t.row_ids().into_iter().collect()).unwrap_or_default();
    let id_column = from.kind.id_column();
    let prefix = from.kind.data_prefix();

    for row in &from.rows {
        let referenced: BTreeSet<i64> = row.integer_list(column).into_iter().collect();
        let row_id = row
            .integer(id_column)
            .map(|id| id.to_string())
            .unwrap_or_else(|| "null".to_string());
        for missing in referenced.difference(&known) {
            diagnostics.add(Diagnostic::new(
                &catalog::UNKNOWN_REF_ID,
                Some(row.line_number),
                &[&prefix, &row_id, &column, missing],
            ))?;
        }
    }
    Ok(())
}

fn check_sections(mztab: &MzTab, diagnostics: &mut DiagnosticCollection) -> Result<(), DiagnosticOverflow> {
    let expected = [
        (TableKind::SmallMolecule, &catalog::NO_SMALL_MOLECULE_SECTION),
        (TableKind::SmallMoleculeFeature, &catalog::NO_SMALL_MOLECULE_FEATURE_SECTION),
        (TableKind::SmallMoleculeEvidence, &catalog::NO_SMALL_MOLECULE_EVIDENCE_SECTION),
    ];
    for (kind, diagnostic) in expected {
        // a header without rows counts as missing
        if mztab.table(kind).map_or(true, |table| table.rows.is_empty()) {
            diagnostics.add(Diagnostic::new(diagnostic, None, &[]))?;
        }
    }
    Ok(())
}

/// Units may only be declared for columns of a table that is present.
fn check_column_units(mztab: &MzTab, diagnostics: &mut DiagnosticCollection) -> Result<(), DiagnosticOverflow> {
    for unit in &mztab.metadata.column_units {
        let Some(table) = mztab.table(unit.table) else {
            debug!("colunit-{} not checked, table absent", unit.table);
            continue;
        };
        if !table.columns.contains(&unit.column) {
            diagnostics.add(Diagnostic::new(
                &catalog::COL_UNIT,
                unit.line_number,
                &[&unit.table, &unit.column],
            ))?;
        }
    }
    Ok(())
}

/// Pattern the `reliability` column must match, `None` when the declared
/// scale is not one the checker knows.
pub fn reliability_pattern(declared: Option<&Parameter>) -> Option<&'static Regex> {
    match declared.and_then(|p| p.accession.as_deref()) {
        None | Some(MSI_RELIABILITY_ACCESSION) => Some(&*DEFAULT_RELIABILITY),
        Some(SCHYMANSKI_RELIABILITY_ACCESSION) => Some(&*SCHYMANSKI_RELIABILITY),
        Some(_) => None,
    }
}

fn check_reliability(mztab: &MzTab, diagnostics: &mut DiagnosticCollection) -> Result<(), DiagnosticOverflow> {
    let Some(summary) = &mztab.small_molecule_summary else {
        return Ok(());
    };
    let declared = mztab.metadata.small_molecule_identification_reliability.as_ref();
    let Some(pattern) = reliability_pattern(declared) else {
        debug!("reliability scale {:?} has no known pattern", declared);
        return Ok(());
    };

    for row in &summary.rows {
        let Some(value) = row.get(RELIABILITY).and_then(|v| v.as_text()) else {
            continue;
        };
        if !pattern.is_match(value) {
            diagnostics.add(Diagnostic::new(
                &catalog::REGEX_MISMATCH,
                Some(row.line_number),
                &[&RELIABILITY, &value, &pattern.as_str()],
            ))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnFactory;
    use crate::model::{ColumnUnit, Row, Value};

    fn row(line: usize, cells: &[(&str, Value)]) -> Row {
        let mut row = Row::new(line);
        for (column, value) in cells {
            row.set(*column, Some(value.clone()));
        }
        row
    }

    fn ids(values: &[i64]) -> Value {
        Value::List(values.iter().map(|&v| Some(Value::Integer(v))).collect())
    }

    fn table(kind: TableKind, rows: Vec<Row>) -> Table {
        let mut table = Table::new(kind, ColumnFactory::with_stable_columns(kind));
        table.rows = rows;
        table
    }

    fn consistent() -> MzTab {
        MzTab {
            small_molecule_summary: Some(table(
                TableKind::SmallMolecule,
                vec![row(10, &[("SML_ID", Value::Integer(1)), (SMF_ID_REFS, ids(&[1, 2]))])],
            )),
            small_molecule_feature: Some(table(
                TableKind::SmallMoleculeFeature,
                vec![
                    row(20, &[("SMF_ID", Value::Integer(1)), (SME_ID_REFS, ids(&[1]))]),
                    row(21, &[("SMF_ID", Value::Integer(2)), (SME_ID_REFS, ids(&[1]))]),
                ],
            )),
            small_molecule_evidence: Some(table(
                TableKind::SmallMoleculeEvidence,
                vec![row(30, &[("SME_ID", Value::Integer(1))])],
            )),
            ..Default::default()
        }
    }

    fn run(mztab: &MzTab) -> DiagnosticCollection {
        let mut diagnostics = DiagnosticCollection::default();
        check(mztab, &mut diagnostics).unwrap();
        diagnostics
    }

    #[test]
    fn test_consistent_references() {
        assert!(run(&consistent()).is_empty());
    }

    #[test]
    fn test_one_diagnostic_per_dangling_id() {
        let mut mztab = consistent();
        let summary = mztab.small_molecule_summary.as_mut().unwrap();
        summary.rows[0].set(SMF_ID_REFS, Some(ids(&[1, 7, 8, 8])));
        let diagnostics = run(&mztab);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code() == catalog::UNKNOWN_REF_ID.code));
        assert!(diagnostics.iter().all(|d| d.line_number() == Some(10)));
    }

    #[test]
    fn test_missing_target_table() {
        let mut mztab = consistent();
        mztab.small_molecule_evidence = None;
        let codes: Vec<u32> = run(&mztab).iter().map(|d| d.code()).collect();
        assert_eq!(
            codes,
            vec![
                catalog::UNKNOWN_REF_ID.code,
                catalog::UNKNOWN_REF_ID.code,
                catalog::NO_SMALL_MOLECULE_EVIDENCE_SECTION.code
            ]
        );
    }

    #[test]
    fn test_header_without_rows_is_missing_section() {
        let mut mztab = consistent();
        mztab.small_molecule_summary.as_mut().unwrap().rows[0].set(SMF_ID_REFS, None);
        mztab.small_molecule_feature.as_mut().unwrap().rows.clear();
        let codes: Vec<u32> = run(&mztab).iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec![catalog::NO_SMALL_MOLECULE_FEATURE_SECTION.code]);

        mztab.small_molecule_summary.as_mut().unwrap().rows.clear();
        let codes: Vec<u32> = run(&mztab).iter().map(|d| d.code()).collect();
        assert_eq!(
            codes,
            vec![
                catalog::NO_SMALL_MOLECULE_SECTION.code,
                catalog::NO_SMALL_MOLECULE_FEATURE_SECTION.code
            ]
        );
    }

    #[test]
    fn test_duplicate_row_ids() {
        let mut mztab = consistent();
        let evidence = mztab.small_molecule_evidence.as_mut().unwrap();
        evidence.rows.push(row(31, &[("SME_ID", Value::Integer(1))]));
        let diagnostics = run(&mztab);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.code(), catalog::DUPLICATE_ROW_ID.code);
        assert_eq!(diagnostic.line_number(), Some(31));
    }

    #[test]
    fn test_column_unit_must_name_a_column() {
        let mut mztab = consistent();
        mztab.metadata.column_units.push(ColumnUnit {
            table: TableKind::SmallMoleculeFeature,
            column: "retention_time_in_seconds".to_string(),
            unit: Parameter::cv("UO", "UO:0000010", "second"),
            line_number: Some(4),
        });
        mztab.metadata.column_units.push(ColumnUnit {
            table: TableKind::SmallMoleculeFeature,
            column: "opt_global_missing".to_string(),
            unit: Parameter::cv("UO", "UO:0000010", "second"),
            line_number: Some(5),
        });
        let diagnostics = run(&mztab);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().line_number(), Some(5));
    }

    #[test]
    fn test_reliability_scales() {
        let mut mztab = consistent();
        let summary = mztab.small_molecule_summary.as_mut().unwrap();
        summary.rows[0].set(RELIABILITY, Some(Value::Text("2a".to_string())));
        assert_eq!(run(&mztab).len(), 1);

        mztab.metadata.small_molecule_identification_reliability =
            Some(Parameter::cv("MS", SCHYMANSKI_RELIABILITY_ACCESSION, "Schymanski"));
        assert!(run(&mztab).is_empty());

        mztab.metadata.small_molecule_identification_reliability =
            Some(Parameter::cv("MS", "MS:9999999", "in-house scale"));
        assert!(reliability_pattern(mztab.metadata.small_molecule_identification_reliability.as_ref()).is_none());
        assert!(run(&mztab).is_empty());
    }
}
