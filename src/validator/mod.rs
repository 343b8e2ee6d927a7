//! # Semantic validation
//!
//! Two layers run over a parsed [`MzTab`]:
//!
//! 1. [`crosscheck`]: referential integrity between tables and metadata.
//!    The parser runs it automatically after the last line.
//! 2. [`validate`]: CV mapping rules, independent of parsing. Each rule is
//!    evaluated on its own; a rule whose term lookup fails is listed as
//!    unchecked rather than reported as a missing term.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mztab::cvmapping::{load_file, Ontology};
//! use mztab::parser::{parse_file, ParseOptions};
//! use mztab::validator::{validate, ValidationOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let outcome = parse_file("study.mztab", &ParseOptions::default())?;
//! let rules = load_file("mzTab-M-mapping.xml")?;
//! let ontology = Ontology::from_obo_file("psi-ms.obo")?;
//! if let Some(file) = &outcome.file {
//!     let result = validate(file, &rules, &ontology, &ValidationOptions::default())?;
//!     for diagnostic in &result.diagnostics {
//!         println!("{}", diagnostic);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod crosscheck;

use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use crate::cvmapping::TermStrictness;
use crate::cvmapping::{diagnose, evaluate, CvMappingRule, EvaluationError, RuleSet, TermLookup};
use crate::error::{
    Diagnostic, DiagnosticCollection, DiagnosticOverflow, Level, UncheckedRule,
    DEFAULT_MAX_DIAGNOSTICS,
};
use crate::model::MzTab;

/// Settings for a CV rule run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Severity for parameters no rule term accepts
    pub strictness: TermStrictness,
    /// Diagnostics below this level are dropped
    pub minimum_level: Level,
    /// Capacity of the diagnostic collection
    pub max_diagnostics: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strictness: TermStrictness::Lenient,
            minimum_level: Level::Info,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }
}

/// Result of a CV rule run.
#[derive(Debug)]
pub struct CvValidation {
    /// Rule diagnostics, in rule order
    pub diagnostics: DiagnosticCollection,
    /// Rules abandoned because a term lookup failed
    pub unchecked: Vec<UncheckedRule>,
}

impl CvValidation {
    /// True when every rule was evaluated and none raised an error.
    pub fn is_valid(&self) -> bool {
        self.unchecked.is_empty() && !self.diagnostics.has_errors()
    }
}

fn run_rule<L>(
    rule: &CvMappingRule,
    mztab: &MzTab,
    lookup: &L,
    strictness: TermStrictness,
) -> Result<Vec<Diagnostic>, EvaluationError>
where
    L: TermLookup + ?Sized,
{
    let result = evaluate(rule, &mztab.metadata, lookup)?;
    Ok(diagnose(&result, strictness))
}

/// Evaluate every rule of `rules` against `mztab`.
///
/// With the `parallel` feature rules are evaluated concurrently; results
/// are merged in rule order either way.
pub fn validate<L>(
    mztab: &MzTab,
    rules: &RuleSet,
    lookup: &L,
    options: &ValidationOptions,
) -> Result<CvValidation, DiagnosticOverflow>
where
    L: TermLookup + ?Sized,
{
    #[cfg(feature = "parallel")]
    let outcomes: Vec<_> = rules
        .rules()
        .par_iter()
        .map(|rule| run_rule(rule, mztab, lookup, options.strictness))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<_> = rules
        .rules()
        .iter()
        .map(|rule| run_rule(rule, mztab, lookup, options.strictness))
        .collect();

    let mut diagnostics = DiagnosticCollection::new(options.minimum_level, options.max_diagnostics);
    let mut unchecked = Vec::new();
    for (rule, outcome) in rules.rules().iter().zip(outcomes) {
        match outcome {
            Ok(found) => {
                diagnostics.add_all(found)?;
            }
            Err(error) => {
                warn!("rule {} not checked: {}", rule.id, error);
                unchecked.push(UncheckedRule {
                    rule_id: rule.id.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    info!(
        "CV validation: {} rules, {} diagnostics, {} unchecked",
        rules.len(),
        diagnostics.len(),
        unchecked.len()
    );
    Ok(CvValidation {
        diagnostics,
        unchecked,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cvmapping::{
        CombinationLogic, CvTermRef, LookupError, Ontology, RequirementLevel, TermRelation,
        TimedLookup,
    };
    use crate::error::catalog;
    use crate::model::{Instrument, Parameter};

    struct Stalled;

    impl TermLookup for Stalled {
        fn relation(&self, _: &str, _: &str) -> Result<TermRelation, LookupError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(TermRelation::Unrelated)
        }
    }

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            CvMappingRule {
                id: "instrument_name".to_string(),
                cv_element_path: "/mzTab/metadata/instrument/name".to_string(),
                requirement_level: RequirementLevel::Must,
                combination_logic: CombinationLogic::Or,
                terms: vec![CvTermRef::new("MS", "MS:1000031", "instrument model").with_children(false)],
            },
            CvMappingRule {
                id: "quantification_method".to_string(),
                cv_element_path: "/mzTab/metadata/quantification_method".to_string(),
                requirement_level: RequirementLevel::Should,
                combination_logic: CombinationLogic::Or,
                terms: vec![CvTermRef::new("MS", "MS:1001834", "LC-MS label-free quantitation analysis")],
            },
        ])
        .unwrap()
    }

    fn mztab() -> MzTab {
        let mut mztab = MzTab::default();
        let mut instrument = Instrument::new(1);
        instrument.name = Some(Parameter::cv("MS", "MS:1001911", "Q Exactive"));
        mztab.metadata.instrument.insert(1, instrument);
        mztab
    }

    fn ontology() -> Ontology {
        let obo = "[Term]\nid: MS:1000031\nname: instrument model\n\n\
                   [Term]\nid: MS:1001911\nname: Q Exactive\nis_a: MS:1000031\n";
        Ontology::from_obo(obo.as_bytes()).unwrap()
    }

    #[test]
    fn test_rules_in_order() {
        let result = validate(&mztab(), &rules(), &ontology(), &ValidationOptions::default()).unwrap();
        assert!(result.unchecked.is_empty());
        let codes: Vec<u32> = result.diagnostics.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec![catalog::CV_TERM_MISSING.code]);
        assert_eq!(result.diagnostics.iter().next().unwrap().level(), Level::Warn);
        assert!(result.is_valid());
    }

    #[test]
    fn test_timeout_marks_rule_unchecked() {
        let lookup = TimedLookup::new(Stalled, Duration::from_millis(10));
        let result = validate(&mztab(), &rules(), &lookup, &ValidationOptions::default()).unwrap();
        assert_eq!(result.unchecked.len(), 1);
        assert_eq!(result.unchecked[0].rule_id, "instrument_name");
        assert!(result.unchecked[0].reason.contains("timed out"));
        assert!(!result.is_valid());
    }

    #[test]
    fn test_minimum_level_filters_rule_diagnostics() {
        let options = ValidationOptions {
            minimum_level: Level::Error,
            ..Default::default()
        };
        let result = validate(&mztab(), &rules(), &ontology(), &options).unwrap();
        assert!(result.diagnostics.is_empty());
    }
}
