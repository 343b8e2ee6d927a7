use super::*;
use crate::model::{ColumnType, ElementRef, ElementType, Value};

const MINIMAL: &str = include_str!("../../tests/data/minimal.mztab");

fn without(pattern: &str) -> String {
    MINIMAL
        .lines()
        .filter(|l| !l.contains(pattern))
        .collect::<Vec<_>>()
        .join("\n")
}

fn codes(outcome: &ParseOutcome) -> Vec<u32> {
    outcome.diagnostics.iter().map(|d| d.code()).collect()
}

// ==================== Accepted Files ====================

#[test]
fn test_minimal_file_parses_clean() {
    let outcome = parse_str(MINIMAL, &ParseOptions::default());
    assert!(outcome.diagnostics.is_empty(), "{}", outcome.diagnostics);
    assert!(!outcome.is_aborted());

    let file = outcome.file.unwrap();
    assert_eq!(file.metadata.mztab_id.as_deref(), Some("MTBLS263"));
    assert_eq!(file.metadata.assay.len(), 2);
    assert_eq!(file.metadata.study_variable[&1].assay_refs, vec![1, 2]);
    assert_eq!(file.comments.len(), 1);

    let summary = file.small_molecule_summary.as_ref().unwrap();
    assert_eq!(summary.rows.len(), 2);
    assert_eq!(summary.rows[0].line_number, 61);
    assert_eq!(summary.rows[0].integer_list("SMF_ID_REFS"), vec![1, 2]);

    let feature = file.small_molecule_feature.as_ref().unwrap();
    assert_eq!(feature.row_ids(), vec![1, 2, 3]);
    assert!(feature.rows[2]
        .get("abundance_assay[2]")
        .and_then(Value::as_double)
        .unwrap()
        .is_nan());

    let evidence = file.small_molecule_evidence.as_ref().unwrap();
    assert_eq!(evidence.rows.len(), 3);
}

#[test]
fn test_cv_optional_column_value() {
    let file = parse_str(MINIMAL, &ParseOptions::default()).file.unwrap();
    let summary = file.small_molecule_summary.unwrap();
    let column = summary.columns.get("opt_global_cv_MS:1000073_ESI").unwrap();
    assert_eq!(column.data_type, ColumnType::Text);
    assert_eq!(
        summary.rows[0].get("opt_global_cv_MS:1000073_ESI"),
        Some(&Value::Text("positive".to_string()))
    );
}

#[test]
fn test_reader_and_str_agree() {
    let from_reader = parse(MINIMAL.as_bytes(), &ParseOptions::default()).unwrap();
    let from_str = parse_str(MINIMAL, &ParseOptions::default());
    assert_eq!(from_reader.file, from_str.file);
}

#[test]
fn test_crlf_line_endings() {
    let text = MINIMAL.replace('\n', "\r\n");
    let outcome = parse_str(&text, &ParseOptions::default());
    assert!(outcome.diagnostics.is_empty(), "{}", outcome.diagnostics);
    assert!(outcome.file.is_some());
}

#[test]
fn test_hash_comments_are_kept() {
    let text = format!("# exported by a test\n{}", MINIMAL);
    let file = parse_str(&text, &ParseOptions::default()).file.unwrap();
    assert_eq!(file.comments[0].text, "# exported by a test");
    assert_eq!(file.comments[1].text, "Minimal mzTab-M example used by the test suite");
}

// ==================== Fatal Conditions ====================

#[test]
fn test_metadata_after_table_is_line_order() {
    let text = format!("{}\nMTD\ttitle\tlate title", MINIMAL.trim_end());
    let outcome = parse_str(&text, &ParseOptions::default());
    assert!(outcome.file.is_none());
    let fatal = outcome.fatal.unwrap();
    assert_eq!(fatal.code(), catalog::LINE_ORDER.code);
    assert_eq!(fatal.line_number(), Some(73));
}

#[test]
fn test_unknown_prefix_is_fatal() {
    let text = MINIMAL.replacen("MTD\ttitle", "PRT\ttitle", 1);
    let outcome = parse_str(&text, &ParseOptions::default());
    assert_eq!(outcome.fatal.map(|d| d.code()), Some(catalog::LINE_PREFIX.code));
    assert!(outcome.file.is_none());
}

#[test]
fn test_second_header_is_fatal() {
    let header = MINIMAL.lines().find(|l| l.starts_with("SFH")).unwrap();
    let text = format!("{}\n{}", MINIMAL.trim_end(), header);
    let outcome = parse_str(&text, &ParseOptions::default());
    let fatal = outcome.fatal.unwrap();
    assert_eq!(fatal.code(), catalog::HEADER_LINE.code);
    assert!(fatal.message().contains("64"));
}

#[test]
fn test_data_without_header_is_fatal() {
    let text = without("SFH\t");
    let outcome = parse_str(&text, &ParseOptions::default());
    assert_eq!(outcome.fatal.map(|d| d.code()), Some(catalog::NO_HEADER_LINE.code));
}

#[test]
fn test_hash_without_method_is_fatal() {
    let text = without("hash_method");
    let outcome = parse_str(&text, &ParseOptions::default());
    assert!(outcome.file.is_none());
    let fatal = outcome.fatal.unwrap();
    assert_eq!(fatal.code(), catalog::HASH_METHOD_NOT_DEFINED.code);
    assert_eq!(fatal.line_number(), Some(30));
}

#[test]
fn test_overflow_aborts_run() {
    let text = format!(
        "{}\nSME\t1\nSME\t2\nSME\t3",
        MINIMAL.trim_end()
    );
    let outcome = parse_str(&text, &ParseOptions::new(Level::Info, 2));
    assert_eq!(outcome.overflow, Some(DiagnosticOverflow { max_count: 2 }));
    assert_eq!(outcome.diagnostics.len(), 2);
    assert!(outcome.file.is_none());
}

// ==================== Recoverable Diagnostics ====================

#[test]
fn test_count_mismatch_continues() {
    let text = format!("{}\nSME\t9\tinput_9", MINIMAL.trim_end());
    let outcome = parse_str(&text, &ParseOptions::default());
    assert!(outcome.fatal.is_none());
    assert_eq!(codes(&outcome), vec![catalog::COUNT_MATCH.code]);
    assert!(outcome.file.is_none());
}

#[test]
fn test_bad_cell_is_reported_and_row_kept() {
    let text = MINIMAL.replacen("195.0877\t1\t301.2", "abc\t1\t301.2", 1);
    let outcome = parse_str(&text, &ParseOptions::default());
    assert_eq!(codes(&outcome), vec![catalog::DOUBLE.code]);
    assert_eq!(outcome.diagnostics.iter().next().unwrap().line_number(), Some(65));
}

#[test]
fn test_duplicate_metadata_keeps_first() {
    let text = MINIMAL.replacen(
        "MTD\tmzTab-ID\tMTBLS263",
        "MTD\tmzTab-ID\tMTBLS263\nMTD\tmzTab-ID\tOTHER",
        1,
    );
    let outcome = parse_str(&text, &ParseOptions::default());
    assert_eq!(codes(&outcome), vec![catalog::DUPLICATION_DEFINE.code]);
    assert!(outcome.file.is_none());
}

#[test]
fn test_undefined_assay_in_header() {
    let text = MINIMAL
        .replacen("abundance_assay[2]\tabundance_study", "abundance_assay[3]\tabundance_study", 1);
    let outcome = parse_str(&text, &ParseOptions::default());
    assert_eq!(codes(&outcome), vec![catalog::NOT_DEFINE_IN_METADATA.code]);
    let diagnostic = outcome.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.line_number(), Some(60));
    assert!(diagnostic.message().contains(&ElementRef::new(ElementType::Assay, 3).to_string()));
}

#[test]
fn test_missing_optional_sections_are_info() {
    let text: String = MINIMAL
        .lines()
        .take_while(|l| !l.starts_with("SFH"))
        .collect::<Vec<_>>()
        .join("\n");
    // summary rows no longer point at features
    let text = text
        .replace("\t1|2\t", "\tnull\t")
        .replace("\t3\tHMDB", "\tnull\tHMDB");

    let outcome = parse_str(&text, &ParseOptions::default());
    assert_eq!(
        codes(&outcome),
        vec![
            catalog::NO_SMALL_MOLECULE_FEATURE_SECTION.code,
            catalog::NO_SMALL_MOLECULE_EVIDENCE_SECTION.code
        ]
    );
    assert!(outcome.file.is_some());

    let outcome = parse_str(&text, &ParseOptions::new(Level::Warn, 10));
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_panicking_line_is_recorded_as_null() {
    let failing = MINIMAL.lines().position(|l| l.starts_with("SML\t1\t")).unwrap() + 1;
    let mut dispatcher = LineDispatcher::new(&ParseOptions::default());
    dispatcher.fail_on_line = Some(failing);
    for (index, line) in MINIMAL.lines().enumerate() {
        assert!(dispatcher.feed(index + 1, line).is_continue());
    }

    let nulls: Vec<_> = dispatcher
        .diagnostics
        .iter()
        .filter(|d| d.code() == catalog::NULL.code)
        .collect();
    assert_eq!(nulls.len(), 1);
    assert_eq!(nulls[0].line_number(), Some(failing));
    assert!(dispatcher.fatal.is_none());

    // the failing row is dropped, every later line is still handled
    let rows = |kind: TableKind| dispatcher.tables.get(&kind).map(|t| t.table.rows.len());
    assert_eq!(rows(TableKind::SmallMolecule), Some(1));
    assert_eq!(rows(TableKind::SmallMoleculeFeature), Some(3));
    assert_eq!(rows(TableKind::SmallMoleculeEvidence), Some(3));
}

#[test]
fn test_header_without_rows_is_missing_section() {
    let text: String = without("SMF\t")
        .replace("\t1|2\t", "\tnull\t")
        .replace("\t3\tHMDB", "\tnull\tHMDB");
    let outcome = parse_str(&text, &ParseOptions::default());
    assert_eq!(codes(&outcome), vec![catalog::NO_SMALL_MOLECULE_FEATURE_SECTION.code]);
    let mztab = outcome.file.unwrap();
    assert!(mztab.small_molecule_feature.unwrap().rows.is_empty());
}
