//! # CV mapping rules
//!
//! A mapping rule names an element path of the metadata and the
//! controlled-vocabulary terms allowed there, combined with AND, OR or XOR
//! logic at a MUST, SHOULD or MAY requirement level.
//!
//! - [`RuleSet`]: validated rules, loaded with [`load_file`] from PSI
//!   CvMapping XML or JSON
//! - [`TermLookup`]: the term hierarchy, e.g. an [`Ontology`] read from OBO,
//!   optionally bounded by [`TimedLookup`]
//! - [`evaluate`] classifies found parameters, [`diagnose`] turns the
//!   classification into diagnostics
//!
//! The entry point that runs a whole rule set over a file is
//! [`crate::validator::validate`].

mod evaluate;
mod loader;
mod logic;
mod lookup;
mod ontology;
mod rule;
mod selector;

pub use evaluate::{evaluate, Allowance, Classified, EvaluationError, RuleMatch};
pub use loader::{load_file, load_json, load_xml, MappingError};
pub use logic::{diagnose, TermStrictness};
pub use lookup::{LookupError, TermLookup, TermRelation, TimedLookup};
pub use ontology::{Ontology, OntologyError, Term};
pub use rule::{CombinationLogic, CvMappingRule, CvTermRef, RequirementLevel, RuleConfigError, RuleSet};
pub use selector::{ElementPath, FoundParameter, Scalar};
