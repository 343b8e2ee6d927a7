//! Write-back stability: `parse(write(parse(f))) == parse(f)`.

use mztab::model::{MzTab, Value};
use mztab::parser::{parse_str, ParseOptions};
use mztab::writer::{to_string, WriterConfig};
use proptest::prelude::*;

const MINIMAL: &str = include_str!("data/minimal.mztab");

fn fixture() -> MzTab {
    parse_str(MINIMAL, &ParseOptions::default()).file.unwrap()
}

fn round_trip(mztab: &MzTab) -> MzTab {
    let text = to_string(mztab, &WriterConfig::default()).unwrap();
    let outcome = parse_str(&text, &ParseOptions::default());
    assert!(outcome.diagnostics.is_empty(), "{}\n{}", outcome.diagnostics, text);
    outcome.file.unwrap()
}

#[test]
fn test_optional_cv_column_survives() {
    let reparsed = round_trip(&fixture());
    let summary = reparsed.small_molecule_summary.unwrap();
    let value = summary.rows[0].get("opt_global_cv_MS:1000073_ESI").unwrap();
    assert_eq!(value.to_string(), "positive");
}

#[test]
fn test_nan_abundance_survives() {
    let reparsed = round_trip(&fixture());
    let summary = reparsed.small_molecule_summary.unwrap();
    let value = summary.rows[1].get("abundance_assay[2]").unwrap();
    assert!(value.as_double().unwrap().is_nan());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_title_round_trips(title in "[A-Za-z0-9][A-Za-z0-9 ,.;:()/-]{0,40}[A-Za-z0-9]") {
        let mut mztab = fixture();
        mztab.metadata.title = Some(format!("T{}", title));
        prop_assert_eq!(round_trip(&mztab), mztab);
    }

    #[test]
    fn prop_abundance_round_trips(values in prop::collection::vec(-1.0e12f64..1.0e12, 2)) {
        let mut mztab = fixture();
        let summary = mztab.small_molecule_summary.as_mut().unwrap();
        for (row, value) in summary.rows.iter_mut().zip(&values) {
            row.set("abundance_assay[1]", Some(Value::Double(*value)));
        }
        prop_assert_eq!(round_trip(&mztab), mztab);
    }
}
