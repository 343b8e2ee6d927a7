//! Turning a classified rule into diagnostics.

use serde::{Deserialize, Serialize};

use super::evaluate::RuleMatch;
use super::lookup::TermRelation;
use super::rule::{CombinationLogic, CvTermRef};
use crate::error::{catalog, Diagnostic};

/// How parameters outside a rule's terms are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermStrictness {
    /// Warning
    #[default]
    Lenient,
    /// Error
    Strict,
}

/// Diagnostics for one evaluated rule: combination logic first, then
/// parameters no term accepts, then field mismatches of accepted ones,
/// then non-repeatable terms accepted more than once in one element.
pub fn diagnose(result: &RuleMatch<'_>, strictness: TermStrictness) -> Vec<Diagnostic> {
    let mut diagnostics = match result.rule.combination_logic {
        CombinationLogic::And => and(result),
        CombinationLogic::Or => or(result),
        CombinationLogic::Xor => xor(result),
    };
    diagnostics.extend(not_allowed(result, strictness));
    diagnostics.extend(malformed(result));
    diagnostics.extend(repeated(result));
    diagnostics
}

fn and(result: &RuleMatch<'_>) -> Vec<Diagnostic> {
    let level = result.rule.requirement_level.level();
    result
        .missing_terms()
        .into_iter()
        .map(|term| {
            Diagnostic::new(
                &catalog::CV_TERM_REQUIRED,
                None,
                &[&result.rule.id, term, &result.path],
            )
            .with_level(level)
        })
        .collect()
}

fn missing_every_term(result: &RuleMatch<'_>) -> Vec<Diagnostic> {
    let level = result.rule.requirement_level.level();
    result
        .rule
        .terms
        .iter()
        .map(|term| {
            Diagnostic::new(
                &catalog::CV_TERM_MISSING,
                None,
                &[&result.rule.id, &result.path, term],
            )
            .with_level(level)
        })
        .collect()
}

fn or(result: &RuleMatch<'_>) -> Vec<Diagnostic> {
    if result.matched_terms().is_empty() {
        missing_every_term(result)
    } else {
        Vec::new()
    }
}

fn xor(result: &RuleMatch<'_>) -> Vec<Diagnostic> {
    let matched = result.matched_terms();
    match matched.len() {
        0 => missing_every_term(result),
        1 => Vec::new(),
        _ => {
            let names = matched
                .iter()
                .map(|term| term.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            vec![Diagnostic::new(
                &catalog::CV_TERM_XOR,
                None,
                &[&result.rule.id, &result.path, &names],
            )
            .with_level(result.rule.requirement_level.level())]
        }
    }
}

fn not_allowed(result: &RuleMatch<'_>, strictness: TermStrictness) -> Vec<Diagnostic> {
    let kind = match strictness {
        TermStrictness::Lenient => &catalog::CV_TERM_NOT_ALLOWED,
        TermStrictness::Strict => &catalog::CV_TERM_NOT_ALLOWED_STRICT,
    };
    result
        .extra()
        .into_iter()
        .map(|found| {
            Diagnostic::new(
                kind,
                None,
                &[&found.parameter, &found.location, &result.rule.id],
            )
        })
        .collect()
}

fn mismatch(found: &str, expected: &str) -> bool {
    !expected.is_empty() && !found.eq_ignore_ascii_case(expected)
}

/// Accepted parameters identical to their rule term must carry the term's
/// CV label and name. Children have names of their own.
fn malformed(result: &RuleMatch<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (found, allowance) in result.allowed() {
        if allowance.relation != TermRelation::Identical {
            continue;
        }
        let term: &CvTermRef = allowance.term;
        let parameter = &found.parameter;
        let accession = parameter.accession.as_deref().unwrap_or_default();
        let label = parameter.cv_label.as_deref().unwrap_or_default();

        let fields = [
            ("cv label", label, term.cv_label.as_str()),
            ("name", parameter.name.as_str(), term.name.as_str()),
        ];
        for (field, actual, expected) in fields {
            if mismatch(actual, expected) {
                diagnostics.push(Diagnostic::new(
                    &catalog::CV_TERM_MALFORMED,
                    None,
                    &[&accession, &found.location, &field, &actual, &expected],
                ));
            }
        }
    }
    diagnostics
}

/// Element instance a location belongs to: `ms_run[1]-scan_polarity[2]`
/// belongs to `ms_run[1]`. Scalar keys are their own element.
fn element_of(location: &str) -> &str {
    match location.find(']') {
        Some(end) => &location[..=end],
        None => location,
    }
}

fn repeated(result: &RuleMatch<'_>) -> Vec<Diagnostic> {
    let mut counts: Vec<(&CvTermRef, &str, usize)> = Vec::new();
    for (found, allowance) in result.allowed() {
        if allowance.term.repeatable {
            continue;
        }
        let element = element_of(&found.location);
        match counts
            .iter_mut()
            .find(|(term, seen, _)| std::ptr::eq(*term, allowance.term) && *seen == element)
        {
            Some(entry) => entry.2 += 1,
            None => counts.push((allowance.term, element, 1)),
        }
    }

    let level = result.rule.requirement_level.level();
    counts
        .into_iter()
        .filter(|(_, _, count)| *count > 1)
        .map(|(term, element, count)| {
            Diagnostic::new(
                &catalog::CV_TERM_REPEATED,
                None,
                &[&result.rule.id, term, &element, &count],
            )
            .with_level(level)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cvmapping::evaluate::evaluate;
    use crate::cvmapping::rule::{CvMappingRule, RequirementLevel};
    use crate::cvmapping::Ontology;
    use crate::error::Level;
    use crate::model::{Metadata, MsRun, Parameter};

    const MZML: &str = "MS:1000584";
    const RAW: &str = "MS:1000563";

    fn rule(logic: CombinationLogic, level: RequirementLevel) -> CvMappingRule {
        CvMappingRule {
            id: "ms_run_format".to_string(),
            cv_element_path: "/mzTab/metadata/ms_run/format".to_string(),
            requirement_level: level,
            combination_logic: logic,
            terms: vec![
                CvTermRef::new("MS", MZML, "mzML format"),
                CvTermRef::new("MS", RAW, "Thermo RAW format"),
            ],
        }
    }

    fn runs(formats: &[Parameter]) -> Metadata {
        let mut metadata = Metadata::new();
        for (i, format) in formats.iter().enumerate() {
            let id = i as u32 + 1;
            let mut run = MsRun::new(id);
            run.format = Some(format.clone());
            metadata.ms_run.insert(id, run);
        }
        metadata
    }

    fn run_rule(rule: &CvMappingRule, metadata: &Metadata, strictness: TermStrictness) -> Vec<Diagnostic> {
        let result = evaluate(rule, metadata, &Ontology::new()).unwrap();
        diagnose(&result, strictness)
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
        diagnostics.iter().map(|d| d.code()).collect()
    }

    #[test]
    fn test_or_with_one_term_present() {
        let metadata = runs(&[Parameter::cv("MS", RAW, "Thermo RAW format")]);
        let rule = rule(CombinationLogic::Or, RequirementLevel::Must);
        assert!(run_rule(&rule, &metadata, TermStrictness::Lenient).is_empty());
    }

    #[test]
    fn test_or_with_no_term_present_uses_rule_level() {
        let metadata = Metadata::new();
        for (level, expected) in [
            (RequirementLevel::May, Level::Info),
            (RequirementLevel::Should, Level::Warn),
            (RequirementLevel::Must, Level::Error),
        ] {
            let diagnostics = run_rule(&rule(CombinationLogic::Or, level), &metadata, TermStrictness::Lenient);
            assert_eq!(diagnostics.len(), 2);
            assert!(diagnostics.iter().all(|d| d.level() == expected));
            assert!(diagnostics.iter().all(|d| d.code() == catalog::CV_TERM_MISSING.code));
        }
    }

    #[test]
    fn test_and_reports_each_missing_term() {
        let metadata = runs(&[Parameter::cv("MS", MZML, "mzML format")]);
        let diagnostics = run_rule(
            &rule(CombinationLogic::And, RequirementLevel::Should),
            &metadata,
            TermStrictness::Lenient,
        );
        assert_eq!(codes(&diagnostics), vec![catalog::CV_TERM_REQUIRED.code]);
        assert!(diagnostics[0].message().contains(RAW));
        assert_eq!(diagnostics[0].level(), Level::Warn);
    }

    #[test]
    fn test_xor_conflict() {
        let metadata = runs(&[
            Parameter::cv("MS", MZML, "mzML format"),
            Parameter::cv("MS", RAW, "Thermo RAW format"),
        ]);
        let rule = rule(CombinationLogic::Xor, RequirementLevel::Must);
        let diagnostics = run_rule(&rule, &metadata, TermStrictness::Lenient);
        assert_eq!(codes(&diagnostics), vec![catalog::CV_TERM_XOR.code]);

        let single = runs(&[Parameter::cv("MS", MZML, "mzML format")]);
        assert!(run_rule(&rule, &single, TermStrictness::Lenient).is_empty());
    }

    #[test]
    fn test_extra_parameter_strictness() {
        let metadata = runs(&[
            Parameter::cv("MS", MZML, "mzML format"),
            Parameter::cv("MS", "MS:1000526", "Waters raw format"),
        ]);
        let rule = rule(CombinationLogic::Or, RequirementLevel::Must);

        let lenient = run_rule(&rule, &metadata, TermStrictness::Lenient);
        assert_eq!(codes(&lenient), vec![catalog::CV_TERM_NOT_ALLOWED.code]);
        assert_eq!(lenient[0].level(), Level::Warn);
        assert!(lenient[0].message().contains("ms_run[2]-format"));

        let strict = run_rule(&rule, &metadata, TermStrictness::Strict);
        assert_eq!(codes(&strict), vec![catalog::CV_TERM_NOT_ALLOWED_STRICT.code]);
        assert_eq!(strict[0].level(), Level::Error);
    }

    #[test]
    fn test_malformed_fields() {
        let metadata = runs(&[Parameter::cv("PSI-MS", MZML, "mzML file")]);
        let rule = rule(CombinationLogic::Or, RequirementLevel::Must);
        let diagnostics = run_rule(&rule, &metadata, TermStrictness::Lenient);
        assert_eq!(
            codes(&diagnostics),
            vec![catalog::CV_TERM_MALFORMED.code, catalog::CV_TERM_MALFORMED.code]
        );
        assert!(diagnostics[0].message().contains("cv label"));
        assert!(diagnostics[1].message().contains("mzML file"));
    }

    fn polarity_rule(repeatable: bool) -> CvMappingRule {
        let mut positive = CvTermRef::new("MS", "MS:1000130", "positive scan");
        positive.repeatable = repeatable;
        CvMappingRule {
            id: "ms_run_scan_polarity".to_string(),
            cv_element_path: "/mzTab/metadata/ms_run/scan_polarity".to_string(),
            requirement_level: RequirementLevel::Should,
            combination_logic: CombinationLogic::Or,
            terms: vec![positive],
        }
    }

    fn polarities(per_run: &[usize]) -> Metadata {
        let mut metadata = Metadata::new();
        for (i, count) in per_run.iter().enumerate() {
            let id = i as u32 + 1;
            let mut run = MsRun::new(id);
            for m in 1..=*count as u32 {
                run.scan_polarity
                    .insert(m, Parameter::cv("MS", "MS:1000130", "positive scan"));
            }
            metadata.ms_run.insert(id, run);
        }
        metadata
    }

    #[test]
    fn test_non_repeatable_term_counted_per_element() {
        // once in each of two runs is fine
        let metadata = polarities(&[1, 1]);
        assert!(run_rule(&polarity_rule(false), &metadata, TermStrictness::Lenient).is_empty());

        let metadata = polarities(&[1, 3]);
        let diagnostics = run_rule(&polarity_rule(false), &metadata, TermStrictness::Lenient);
        assert_eq!(codes(&diagnostics), vec![catalog::CV_TERM_REPEATED.code]);
        assert_eq!(diagnostics[0].level(), Level::Warn);
        assert!(diagnostics[0].message().contains("ms_run[2] has it 3 times"));

        assert!(run_rule(&polarity_rule(true), &metadata, TermStrictness::Lenient).is_empty());
    }

    #[test]
    fn test_element_of_location() {
        assert_eq!(element_of("ms_run[1]-scan_polarity[2]"), "ms_run[1]");
        assert_eq!(element_of("custom[3]"), "custom[3]");
        assert_eq!(element_of("quantification_method"), "quantification_method");
    }
}
