//! Classifying the parameters found at a rule's path against its terms.

use super::lookup::{LookupError, TermLookup, TermRelation};
use super::rule::{CvMappingRule, CvTermRef};
use super::selector::{ElementPath, FoundParameter};
use crate::model::Metadata;

/// Why a rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// The rule addresses a path no metadata parameter lives at.
    /// Rules inside a [`super::RuleSet`] never raise this.
    #[error("unsupported element path {0}")]
    UnsupportedPath(String),

    /// A term lookup failed
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// The rule term that accepted a found parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowance<'r> {
    /// Accepting term
    pub term: &'r CvTermRef,
    /// How the parameter relates to that term
    pub relation: TermRelation,
}

/// A found parameter and the term accepting it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<'r> {
    /// Parameter as found in the metadata
    pub found: FoundParameter,
    /// `None` when no rule term accepts it
    pub allowed_by: Option<Allowance<'r>>,
}

/// Outcome of classifying one rule against a file.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<'r> {
    /// The evaluated rule
    pub rule: &'r CvMappingRule,
    /// Normalised element path
    pub path: ElementPath,
    /// CV parameters found at the path, in metadata key order
    pub found: Vec<Classified<'r>>,
}

impl<'r> RuleMatch<'r> {
    /// Found parameters accepted by some term.
    pub fn allowed(&self) -> impl Iterator<Item = (&FoundParameter, Allowance<'r>)> {
        self.found
            .iter()
            .filter_map(|c| c.allowed_by.map(|a| (&c.found, a)))
    }

    /// Found parameters no term accepts.
    pub fn extra(&self) -> Vec<&FoundParameter> {
        self.found
            .iter()
            .filter(|c| c.allowed_by.is_none())
            .map(|c| &c.found)
            .collect()
    }

    /// Rule terms that accepted at least one parameter, in rule order.
    pub fn matched_terms(&self) -> Vec<&'r CvTermRef> {
        self.rule
            .terms
            .iter()
            .filter(|term| self.allowed().any(|(_, a)| std::ptr::eq(a.term, *term)))
            .collect()
    }

    /// Rule terms that accepted nothing, in rule order.
    pub fn missing_terms(&self) -> Vec<&'r CvTermRef> {
        let matched = self.matched_terms();
        self.rule
            .terms
            .iter()
            .filter(|term| !matched.iter().any(|m| std::ptr::eq(*m, *term)))
            .collect()
    }
}

fn classify<'r, L>(
    terms: &'r [CvTermRef],
    accession: &str,
    lookup: &L,
) -> Result<Option<Allowance<'r>>, LookupError>
where
    L: TermLookup + ?Sized,
{
    for term in terms {
        let identical = term.accession.eq_ignore_ascii_case(accession);
        if !term.allow_children {
            if identical {
                return Ok(Some(Allowance {
                    term,
                    relation: TermRelation::Identical,
                }));
            }
            continue;
        }

        let relation = if identical {
            TermRelation::Identical
        } else {
            lookup.relation(&term.accession, accession)?
        };
        let accepted = match relation {
            TermRelation::Child => true,
            TermRelation::Identical => term.use_term,
            TermRelation::Unrelated => false,
        };
        if accepted {
            return Ok(Some(Allowance { term, relation }));
        }
    }
    Ok(None)
}

/// Classify every CV parameter at the rule's path. User parameters carry
/// no accession and are not considered. A lookup failure abandons the rule.
pub fn evaluate<'r, L>(
    rule: &'r CvMappingRule,
    metadata: &Metadata,
    lookup: &L,
) -> Result<RuleMatch<'r>, EvaluationError>
where
    L: TermLookup + ?Sized,
{
    let path = ElementPath::parse(&rule.cv_element_path)
        .ok_or_else(|| EvaluationError::UnsupportedPath(rule.cv_element_path.clone()))?;

    let mut found = Vec::new();
    for parameter in path.select(metadata) {
        let Some(accession) = parameter.parameter.accession.as_deref() else {
            continue;
        };
        let allowed_by = classify(&rule.terms, accession, lookup)?;
        found.push(Classified {
            found: parameter,
            allowed_by,
        });
    }

    Ok(RuleMatch { rule, path, found })
}
