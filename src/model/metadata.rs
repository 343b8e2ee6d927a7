//! Plain data holders for the metadata section.
//!
//! Every indexed element owns its `id`; references between elements are
//! stored as ids (or [`ElementRef`]s), never as copies of the referenced
//! element.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::element::{ElementRef, ElementType};
use super::param::Parameter;
use super::table::TableKind;

/// `sample_processing[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleProcessing {
    /// Element id
    pub id: u32,
    /// Processing steps, `|` separated on the wire
    pub parameters: Vec<Parameter>,
}

/// `instrument[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Element id
    pub id: u32,
    /// `instrument[n]-name`
    pub name: Option<Parameter>,
    /// `instrument[n]-source`
    pub source: Option<Parameter>,
    /// `instrument[n]-analyzer[m]`
    pub analyzer: BTreeMap<u32, Parameter>,
    /// `instrument[n]-detector`
    pub detector: Option<Parameter>,
}

/// `software[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Software {
    /// Element id
    pub id: u32,
    /// Software name and version
    pub parameter: Option<Parameter>,
    /// `software[n]-setting[m]`
    pub setting: BTreeMap<u32, String>,
}

/// `publication[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Element id
    pub id: u32,
    /// Items such as `pubmed:21063943` or `doi:10.1000/xyz`
    pub items: Vec<String>,
}

/// `contact[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Element id
    pub id: u32,
    /// `contact[n]-name`
    pub name: Option<String>,
    /// `contact[n]-affiliation`
    pub affiliation: Option<String>,
    /// `contact[n]-email`
    pub email: Option<String>,
    /// `contact[n]-orcid`
    pub orcid: Option<String>,
}

/// `uri[n]` and `external_study_uri[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Uri {
    /// Element id
    pub id: u32,
    /// The URI
    pub value: Option<String>,
}

/// `study_variable[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyVariable {
    /// Element id
    pub id: u32,
    /// `study_variable[n]`
    pub name: Option<String>,
    /// `study_variable[n]-assay_refs`, assay ids
    pub assay_refs: Vec<u32>,
    /// `study_variable[n]-average_function`
    pub average_function: Option<Parameter>,
    /// `study_variable[n]-variation_function`
    pub variation_function: Option<Parameter>,
    /// `study_variable[n]-description`
    pub description: Option<String>,
    /// `study_variable[n]-factors`
    pub factors: Vec<Parameter>,
}

/// `ms_run[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsRun {
    /// Element id
    pub id: u32,
    /// `ms_run[n]-location`
    pub location: Option<String>,
    /// `ms_run[n]-instrument_ref`, instrument id
    pub instrument_ref: Option<u32>,
    /// `ms_run[n]-format`
    pub format: Option<Parameter>,
    /// `ms_run[n]-id_format`
    pub id_format: Option<Parameter>,
    /// `ms_run[n]-fragmentation_method[m]`
    pub fragmentation_method: BTreeMap<u32, Parameter>,
    /// `ms_run[n]-scan_polarity[m]`
    pub scan_polarity: BTreeMap<u32, Parameter>,
    /// `ms_run[n]-hash`
    pub hash: Option<String>,
    /// `ms_run[n]-hash_method`
    pub hash_method: Option<Parameter>,
}

/// `sample[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Element id
    pub id: u32,
    /// `sample[n]`
    pub name: Option<String>,
    /// `sample[n]-species[m]`
    pub species: BTreeMap<u32, Parameter>,
    /// `sample[n]-tissue[m]`
    pub tissue: BTreeMap<u32, Parameter>,
    /// `sample[n]-cell_type[m]`
    pub cell_type: BTreeMap<u32, Parameter>,
    /// `sample[n]-disease[m]`
    pub disease: BTreeMap<u32, Parameter>,
    /// `sample[n]-description`
    pub description: Option<String>,
    /// `sample[n]-custom[m]`
    pub custom: BTreeMap<u32, Parameter>,
}

/// `assay[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assay {
    /// Element id
    pub id: u32,
    /// `assay[n]`
    pub name: Option<String>,
    /// `assay[n]-custom[m]`
    pub custom: BTreeMap<u32, Parameter>,
    /// `assay[n]-external_uri`
    pub external_uri: Option<String>,
    /// `assay[n]-sample_ref`, sample id
    pub sample_ref: Option<u32>,
    /// `assay[n]-ms_run_ref`, ms_run ids
    pub ms_run_ref: Vec<u32>,
}

/// `cv[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cv {
    /// Element id
    pub id: u32,
    /// `cv[n]-label`
    pub label: Option<String>,
    /// `cv[n]-full_name`
    pub full_name: Option<String>,
    /// `cv[n]-version`
    pub version: Option<String>,
    /// `cv[n]-uri`
    pub uri: Option<String>,
}

/// `database[n]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Element id
    pub id: u32,
    /// Database name parameter
    pub parameter: Option<Parameter>,
    /// `database[n]-prefix`
    pub prefix: Option<String>,
    /// `database[n]-version`
    pub version: Option<String>,
    /// `database[n]-uri`
    pub uri: Option<String>,
}

/// Indexed element that is a single parameter: `custom[n]`,
/// `derivatization_agent[n]`, `id_confidence_measure[n]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedParameter {
    /// Element id
    pub id: u32,
    /// The parameter
    pub parameter: Option<Parameter>,
}

/// `colunit-<table>	<column>=<parameter>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnUnit {
    /// Table the column belongs to
    pub table: TableKind,
    /// Column name
    pub column: String,
    /// Unit parameter
    pub unit: Parameter,
    /// Metadata line that declared the unit
    #[serde(skip)]
    pub line_number: Option<usize>,
}

impl PartialEq for ColumnUnit {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.column == other.column && self.unit == other.unit
    }
}

/// Complete metadata section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// `mzTab-version`
    pub mztab_version: Option<String>,
    /// `mzTab-ID`
    pub mztab_id: Option<String>,
    /// `title`
    pub title: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `sample_processing[n]`
    pub sample_processing: BTreeMap<u32, SampleProcessing>,
    /// `instrument[n]`
    pub instrument: BTreeMap<u32, Instrument>,
    /// `software[n]`
    pub software: BTreeMap<u32, Software>,
    /// `publication[n]`
    pub publication: BTreeMap<u32, Publication>,
    /// `contact[n]`
    pub contact: BTreeMap<u32, Contact>,
    /// `uri[n]`
    pub uri: BTreeMap<u32, Uri>,
    /// `external_study_uri[n]`
    pub external_study_uri: BTreeMap<u32, Uri>,
    /// `quantification_method`
    pub quantification_method: Option<Parameter>,
    /// `study_variable[n]`
    pub study_variable: BTreeMap<u32, StudyVariable>,
    /// `ms_run[n]`
    pub ms_run: BTreeMap<u32, MsRun>,
    /// `sample[n]`
    pub sample: BTreeMap<u32, Sample>,
    /// `assay[n]`
    pub assay: BTreeMap<u32, Assay>,
    /// `custom[n]`
    pub custom: BTreeMap<u32, IndexedParameter>,
    /// `cv[n]`
    pub cv: BTreeMap<u32, Cv>,
    /// `database[n]`
    pub database: BTreeMap<u32, Database>,
    /// `derivatization_agent[n]`
    pub derivatization_agent: BTreeMap<u32, IndexedParameter>,
    /// `small_molecule-quantification_unit`
    pub small_molecule_quantification_unit: Option<Parameter>,
    /// `small_molecule_feature-quantification_unit`
    pub small_molecule_feature_quantification_unit: Option<Parameter>,
    /// `small_molecule-identification_reliability`
    pub small_molecule_identification_reliability: Option<Parameter>,
    /// `id_confidence_measure[n]`
    pub id_confidence_measure: BTreeMap<u32, IndexedParameter>,
    /// `colunit-small_molecule`, `colunit-small_molecule_feature`,
    /// `colunit-small_molecule_evidence`
    pub column_units: Vec<ColumnUnit>,
}

macro_rules! with_id {
    ($ty:ident) => {
        impl $ty {
            /// Empty element with the given id.
            pub fn new(id: u32) -> Self {
                Self {
                    id,
                    ..Default::default()
                }
            }
        }
    };
}

with_id!(SampleProcessing);
with_id!(Instrument);
with_id!(Software);
with_id!(Publication);
with_id!(Contact);
with_id!(Uri);
with_id!(StudyVariable);
with_id!(MsRun);
with_id!(Sample);
with_id!(Assay);
with_id!(Cv);
with_id!(Database);
with_id!(IndexedParameter);

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when an element with this identity exists, placeholder or not.
    pub fn contains(&self, element: ElementRef) -> bool {
        let id = element.id;
        match element.element_type {
            ElementType::Assay => self.assay.contains_key(&id),
            ElementType::MsRun => self.ms_run.contains_key(&id),
            ElementType::Sample => self.sample.contains_key(&id),
            ElementType::StudyVariable => self.study_variable.contains_key(&id),
            ElementType::Cv => self.cv.contains_key(&id),
            ElementType::Database => self.database.contains_key(&id),
            ElementType::Software => self.software.contains_key(&id),
            ElementType::Instrument => self.instrument.contains_key(&id),
            ElementType::Contact => self.contact.contains_key(&id),
            ElementType::Publication => self.publication.contains_key(&id),
            ElementType::SampleProcessing => self.sample_processing.contains_key(&id),
            ElementType::Uri => self.uri.contains_key(&id),
            ElementType::ExternalStudyUri => self.external_study_uri.contains_key(&id),
            ElementType::Custom => self.custom.contains_key(&id),
            ElementType::DerivatizationAgent => self.derivatization_agent.contains_key(&id),
            ElementType::IdConfidenceMeasure => self.id_confidence_measure.contains_key(&id),
        }
    }

    /// Insert an empty element unless one with the same identity exists.
    ///
    /// Returns `true` when a placeholder was created.
    pub(crate) fn insert_placeholder(&mut self, element: ElementRef) -> bool {
        let id = element.id;
        let created = match element.element_type {
            ElementType::Assay => self.assay.insert_if_absent(id, Assay::new),
            ElementType::MsRun => self.ms_run.insert_if_absent(id, MsRun::new),
            ElementType::Sample => self.sample.insert_if_absent(id, Sample::new),
            ElementType::StudyVariable => self.study_variable.insert_if_absent(id, StudyVariable::new),
            ElementType::Cv => self.cv.insert_if_absent(id, Cv::new),
            ElementType::Database => self.database.insert_if_absent(id, Database::new),
            ElementType::Software => self.software.insert_if_absent(id, Software::new),
            ElementType::Instrument => self.instrument.insert_if_absent(id, Instrument::new),
            ElementType::Contact => self.contact.insert_if_absent(id, Contact::new),
            ElementType::Publication => self.publication.insert_if_absent(id, Publication::new),
            ElementType::SampleProcessing => {
                self.sample_processing.insert_if_absent(id, SampleProcessing::new)
            }
            ElementType::Uri => self.uri.insert_if_absent(id, Uri::new),
            ElementType::ExternalStudyUri => self.external_study_uri.insert_if_absent(id, Uri::new),
            ElementType::Custom => self.custom.insert_if_absent(id, IndexedParameter::new),
            ElementType::DerivatizationAgent => {
                self.derivatization_agent.insert_if_absent(id, IndexedParameter::new)
            }
            ElementType::IdConfidenceMeasure => {
                self.id_confidence_measure.insert_if_absent(id, IndexedParameter::new)
            }
        };
        created
    }

    /// Ids of every registered element of one type, ascending.
    pub fn ids(&self, element_type: ElementType) -> Vec<u32> {
        match element_type {
            ElementType::Assay => self.assay.keys().copied().collect(),
            ElementType::MsRun => self.ms_run.keys().copied().collect(),
            ElementType::Sample => self.sample.keys().copied().collect(),
            ElementType::StudyVariable => self.study_variable.keys().copied().collect(),
            ElementType::Cv => self.cv.keys().copied().collect(),
            ElementType::Database => self.database.keys().copied().collect(),
            ElementType::Software => self.software.keys().copied().collect(),
            ElementType::Instrument => self.instrument.keys().copied().collect(),
            ElementType::Contact => self.contact.keys().copied().collect(),
            ElementType::Publication => self.publication.keys().copied().collect(),
            ElementType::SampleProcessing => self.sample_processing.keys().copied().collect(),
            ElementType::Uri => self.uri.keys().copied().collect(),
            ElementType::ExternalStudyUri => self.external_study_uri.keys().copied().collect(),
            ElementType::Custom => self.custom.keys().copied().collect(),
            ElementType::DerivatizationAgent => self.derivatization_agent.keys().copied().collect(),
            ElementType::IdConfidenceMeasure => self.id_confidence_measure.keys().copied().collect(),
        }
    }

    /// Every registered element identity, grouped by type.
    pub fn element_refs(&self) -> Vec<ElementRef> {
        ElementType::ALL
            .iter()
            .flat_map(|&t| self.ids(t).into_iter().map(move |id| ElementRef::new(t, id)))
            .collect()
    }

    /// Units declared for one table.
    pub fn column_units_for(&self, table: TableKind) -> impl Iterator<Item = &ColumnUnit> {
        self.column_units.iter().filter(move |u| u.table == table)
    }
}

trait InsertIfAbsent<V> {
    fn insert_if_absent(&mut self, id: u32, make: fn(u32) -> V) -> bool;
}

impl<V> InsertIfAbsent<V> for BTreeMap<u32, V> {
    fn insert_if_absent(&mut self, id: u32, make: fn(u32) -> V) -> bool {
        if self.contains_key(&id) {
            return false;
        }
        self.insert(id, make(id));
        true
    }
}
