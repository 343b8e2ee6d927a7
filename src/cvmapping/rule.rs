use std::fmt;

use serde::{Deserialize, Serialize};

use super::selector::ElementPath;
use crate::error::Level;

/// Requirement level of a mapping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequirementLevel {
    /// Optional
    May,
    /// Recommended
    Should,
    /// Required
    Must,
}

impl RequirementLevel {
    /// Severity of diagnostics raised by rules of this level.
    pub fn level(&self) -> Level {
        match self {
            Self::May => Level::Info,
            Self::Should => Level::Warn,
            Self::Must => Level::Error,
        }
    }

    /// Parse `MAY`, `SHOULD` or `MUST` (case insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MAY" => Some(Self::May),
            "SHOULD" => Some(Self::Should),
            "MUST" => Some(Self::Must),
            _ => None,
        }
    }
}

/// How the terms of a rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombinationLogic {
    /// Every term must be present
    And,
    /// At least one term must be present
    Or,
    /// Exactly one term family must be present
    Xor,
}

impl CombinationLogic {
    /// Parse `AND`, `OR` or `XOR` (case insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "XOR" => Some(Self::Xor),
            _ => None,
        }
    }
}

impl fmt::Display for CombinationLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        };
        f.write_str(name)
    }
}

/// A term a rule refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvTermRef {
    /// Accession, e.g. `MS:1000031`
    pub accession: String,
    /// Term name
    pub name: String,
    /// CV label, e.g. `MS`
    #[serde(default)]
    pub cv_label: String,
    /// Children of the term satisfy the rule
    #[serde(default)]
    pub allow_children: bool,
    /// The term itself satisfies the rule
    #[serde(default = "default_true")]
    pub use_term: bool,
    /// The term may appear several times
    #[serde(default = "default_true")]
    pub repeatable: bool,
}

fn default_true() -> bool {
    true
}

impl CvTermRef {
    /// Term that only matches itself.
    pub fn new(cv_label: &str, accession: &str, name: &str) -> Self {
        Self {
            accession: accession.to_string(),
            name: name.to_string(),
            cv_label: cv_label.to_string(),
            allow_children: false,
            use_term: true,
            repeatable: true,
        }
    }

    /// Let children of the term satisfy the rule.
    pub fn with_children(mut self, use_term: bool) -> Self {
        self.allow_children = true;
        self.use_term = use_term;
        self
    }
}

impl fmt::Display for CvTermRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.accession, self.name)
    }
}

/// A CV mapping rule: which terms may or must annotate an element path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvMappingRule {
    /// Rule id
    pub id: String,
    /// Element the rule applies to, e.g. `/metadata/instrument/name`
    pub cv_element_path: String,
    /// Requirement level
    pub requirement_level: RequirementLevel,
    /// Combination logic
    pub combination_logic: CombinationLogic,
    /// Terms of the rule
    pub terms: Vec<CvTermRef>,
}

/// A rule that cannot be evaluated as written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleConfigError {
    /// AND logic cannot be combined with child-allowing terms
    #[error("rule {rule}: AND logic cannot be combined with allowChildren on term {term}")]
    AndWithChildren {
        /// Rule id
        rule: String,
        /// Offending term accession
        term: String,
    },

    /// A rule without terms
    #[error("rule {0} declares no terms")]
    NoTerms(String),

    /// The element path does not address any parameter
    #[error("rule {rule}: unsupported element path {path}")]
    UnknownPath {
        /// Rule id
        rule: String,
        /// Declared path
        path: String,
    },
}

impl CvMappingRule {
    /// Check that the rule can be evaluated.
    pub fn validate(&self) -> Result<(), RuleConfigError> {
        if self.terms.is_empty() {
            return Err(RuleConfigError::NoTerms(self.id.clone()));
        }
        if self.combination_logic == CombinationLogic::And {
            if let Some(term) = self.terms.iter().find(|t| t.allow_children) {
                return Err(RuleConfigError::AndWithChildren {
                    rule: self.id.clone(),
                    term: term.accession.clone(),
                });
            }
        }
        if ElementPath::parse(&self.cv_element_path).is_none() {
            return Err(RuleConfigError::UnknownPath {
                rule: self.id.clone(),
                path: self.cv_element_path.clone(),
            });
        }
        Ok(())
    }
}

/// A validated, read-only collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<CvMappingRule>,
}

impl RuleSet {
    /// Validate every rule and build the set. The first rule that fails
    /// validation rejects the whole set.
    pub fn new(rules: Vec<CvMappingRule>) -> Result<Self, RuleConfigError> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[CvMappingRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True for an empty set.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
