use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type tag of an indexed metadata element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    /// `assay[n]`
    Assay,
    /// `ms_run[n]`
    MsRun,
    /// `sample[n]`
    Sample,
    /// `study_variable[n]`
    StudyVariable,
    /// `cv[n]`
    Cv,
    /// `database[n]`
    Database,
    /// `software[n]`
    Software,
    /// `instrument[n]`
    Instrument,
    /// `contact[n]`
    Contact,
    /// `publication[n]`
    Publication,
    /// `sample_processing[n]`
    SampleProcessing,
    /// `uri[n]`
    Uri,
    /// `external_study_uri[n]`
    ExternalStudyUri,
    /// `custom[n]`
    Custom,
    /// `derivatization_agent[n]`
    DerivatizationAgent,
    /// `id_confidence_measure[n]`
    IdConfidenceMeasure,
}

impl ElementType {
    /// Every element type, in metadata write order.
    pub const ALL: [ElementType; 16] = [
        Self::SampleProcessing,
        Self::Instrument,
        Self::Software,
        Self::Publication,
        Self::Contact,
        Self::Uri,
        Self::ExternalStudyUri,
        Self::StudyVariable,
        Self::MsRun,
        Self::Sample,
        Self::Assay,
        Self::Custom,
        Self::Cv,
        Self::Database,
        Self::DerivatizationAgent,
        Self::IdConfidenceMeasure,
    ];

    /// Metadata key of the element, e.g. `ms_run`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Assay => "assay",
            Self::MsRun => "ms_run",
            Self::Sample => "sample",
            Self::StudyVariable => "study_variable",
            Self::Cv => "cv",
            Self::Database => "database",
            Self::Software => "software",
            Self::Instrument => "instrument",
            Self::Contact => "contact",
            Self::Publication => "publication",
            Self::SampleProcessing => "sample_processing",
            Self::Uri => "uri",
            Self::ExternalStudyUri => "external_study_uri",
            Self::Custom => "custom",
            Self::DerivatizationAgent => "derivatization_agent",
            Self::IdConfidenceMeasure => "id_confidence_measure",
        }
    }

    /// Resolve a metadata key into an element type.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Identity of an indexed element: `(element_type, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef {
    /// Element type
    pub element_type: ElementType,
    /// Positive id
    pub id: u32,
}

impl ElementRef {
    /// Create a reference.
    pub fn new(element_type: ElementType, id: u32) -> Self {
        Self { element_type, id }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.element_type, self.id)
    }
}

/// Error for tokens that are not `element[id]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid element reference: {0}")]
pub struct ElementRefParseError(pub String);

/// Split `name[id]` into its name and a positive id.
pub fn split_indexed(token: &str) -> Option<(&str, u32)> {
    let token = token.trim();
    let open = token.find('[')?;
    let inner = token[open + 1..].strip_suffix(']')?;
    let id: u32 = inner.parse().ok()?;
    if id == 0 {
        return None;
    }
    Some((&token[..open], id))
}

impl FromStr for ElementRef {
    type Err = ElementRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, id) = split_indexed(s).ok_or_else(|| ElementRefParseError(s.to_string()))?;
        let element_type =
            ElementType::from_key(name).ok_or_else(|| ElementRefParseError(s.to_string()))?;
        Ok(Self::new(element_type, id))
    }
}
