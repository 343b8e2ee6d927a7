//! Element paths of mapping rules and the parameters they select.

use std::fmt;

use crate::model::{ElementType, Metadata, Parameter, TableKind};

/// A parameter found at a rule's element path.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundParameter {
    /// Where the parameter was found, as a metadata key (`instrument[1]-name`)
    pub location: String,
    /// The parameter itself
    pub parameter: Parameter,
}

/// Metadata items that hold a single parameter and no index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// `quantification_method`
    QuantificationMethod,
    /// `small_molecule-quantification_unit` / `small_molecule_feature-quantification_unit`
    QuantificationUnit(TableKind),
    /// `small_molecule-identification_reliability`
    IdentificationReliability,
    /// `colunit-<table>`
    ColumnUnit(TableKind),
}

/// Normalised form of a rule's `cvElementPath`.
///
/// Paths are matched case-insensitively, with or without the leading
/// `/mzTab`, with camelCase or snake_case segments, and with bracketed
/// index selectors dropped: `/mzTab/metadata/msRun[1]/format` and
/// `/metadata/ms_run/format` select the same parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementPath {
    /// A non-indexed metadata item
    Scalar(Scalar),
    /// A parameter property of an indexed element; `""` for the element's own value
    Property(ElementType, &'static str),
}

/// Parameter-valued properties of indexed elements.
const PROPERTIES: &[(ElementType, &str)] = &[
    (ElementType::SampleProcessing, ""),
    (ElementType::Instrument, "name"),
    (ElementType::Instrument, "source"),
    (ElementType::Instrument, "analyzer"),
    (ElementType::Instrument, "detector"),
    (ElementType::Software, ""),
    (ElementType::StudyVariable, "average_function"),
    (ElementType::StudyVariable, "variation_function"),
    (ElementType::StudyVariable, "factors"),
    (ElementType::MsRun, "format"),
    (ElementType::MsRun, "id_format"),
    (ElementType::MsRun, "fragmentation_method"),
    (ElementType::MsRun, "scan_polarity"),
    (ElementType::MsRun, "hash_method"),
    (ElementType::Sample, "species"),
    (ElementType::Sample, "tissue"),
    (ElementType::Sample, "cell_type"),
    (ElementType::Sample, "disease"),
    (ElementType::Sample, "custom"),
    (ElementType::Assay, "custom"),
    (ElementType::Custom, ""),
    (ElementType::Database, ""),
    (ElementType::DerivatizationAgent, ""),
    (ElementType::IdConfidenceMeasure, ""),
];

fn snake_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    for (i, c) in segment.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn normalise(path: &str) -> Vec<String> {
    path.trim()
        .split('/')
        .map(|segment| segment.split('[').next().unwrap_or_default())
        .filter(|segment| !segment.is_empty())
        .map(snake_case)
        .collect()
}

impl ElementPath {
    /// Parse a rule path; `None` when it addresses nothing this crate models.
    pub fn parse(path: &str) -> Option<Self> {
        let segments = normalise(path);
        let mut rest = segments.as_slice();
        if rest.first().is_some_and(|s| s == "mz_tab" || s == "mztab") {
            rest = &rest[1..];
        }
        match rest.first() {
            Some(s) if s == "metadata" => rest = &rest[1..],
            _ => return None,
        }

        match rest {
            [item] => Self::scalar(item).or_else(|| Self::property(item, "")),
            [element, property] => Self::property(element, property),
            _ => None,
        }
    }

    fn scalar(item: &str) -> Option<Self> {
        let scalar = match item {
            "quantification_method" => Scalar::QuantificationMethod,
            "small_molecule-quantification_unit" => {
                Scalar::QuantificationUnit(TableKind::SmallMolecule)
            }
            "small_molecule_feature-quantification_unit" => {
                Scalar::QuantificationUnit(TableKind::SmallMoleculeFeature)
            }
            "small_molecule-identification_reliability" => Scalar::IdentificationReliability,
            _ => {
                let table = item.strip_prefix("colunit-")?;
                Scalar::ColumnUnit(TableKind::from_name(table)?)
            }
        };
        Some(Self::Scalar(scalar))
    }

    fn property(element: &str, property: &str) -> Option<Self> {
        let element_type = ElementType::from_key(element)?;
        let property = match property {
            "param" | "parameter" | "parameters" => "",
            other => other,
        };
        PROPERTIES
            .iter()
            .find(|(t, p)| *t == element_type && *p == property)
            .map(|(t, p)| Self::Property(*t, *p))
    }

    /// Every parameter of `metadata` this path addresses, in key order.
    pub fn select(&self, metadata: &Metadata) -> Vec<FoundParameter> {
        let mut found = Vec::new();
        let mut push = |location: String, parameter: &Parameter| {
            found.push(FoundParameter {
                location,
                parameter: parameter.clone(),
            });
        };

        match *self {
            Self::Scalar(scalar) => match scalar {
                Scalar::QuantificationMethod => {
                    if let Some(p) = &metadata.quantification_method {
                        push("quantification_method".to_string(), p);
                    }
                }
                Scalar::QuantificationUnit(table) => {
                    let unit = match table {
                        TableKind::SmallMolecule => &metadata.small_molecule_quantification_unit,
                        _ => &metadata.small_molecule_feature_quantification_unit,
                    };
                    if let Some(p) = unit {
                        push(format!("{}-quantification_unit", table), p);
                    }
                }
                Scalar::IdentificationReliability => {
                    if let Some(p) = &metadata.small_molecule_identification_reliability {
                        push("small_molecule-identification_reliability".to_string(), p);
                    }
                }
                Scalar::ColumnUnit(table) => {
                    for unit in metadata.column_units_for(table) {
                        push(format!("colunit-{}:{}", table, unit.column), &unit.unit);
                    }
                }
            },
            Self::Property(element_type, property) => {
                select_property(metadata, element_type, property, &mut push)
            }
        }
        found
    }
}

fn select_property(
    metadata: &Metadata,
    element_type: ElementType,
    property: &str,
    push: &mut impl FnMut(String, &Parameter),
) {
    let key = element_type.key();
    let at = |id: &u32| {
        if property.is_empty() {
            format!("{}[{}]", key, id)
        } else {
            format!("{}[{}]-{}", key, id, property)
        }
    };
    let sub = |id: &u32, m: &u32| format!("{}[{}]-{}[{}]", key, id, property, m);

    match (element_type, property) {
        (ElementType::SampleProcessing, _) => {
            for (id, e) in &metadata.sample_processing {
                e.parameters.iter().for_each(|p| push(at(id), p));
            }
        }
        (ElementType::Instrument, "analyzer") => {
            for (id, e) in &metadata.instrument {
                e.analyzer.iter().for_each(|(m, p)| push(sub(id, m), p));
            }
        }
        (ElementType::Instrument, _) => {
            for (id, e) in &metadata.instrument {
                let value = match property {
                    "name" => &e.name,
                    "source" => &e.source,
                    _ => &e.detector,
                };
                if let Some(p) = value {
                    push(at(id), p);
                }
            }
        }
        (ElementType::Software, _) => {
            for (id, e) in &metadata.software {
                if let Some(p) = &e.parameter {
                    push(at(id), p);
                }
            }
        }
        (ElementType::StudyVariable, "factors") => {
            for (id, e) in &metadata.study_variable {
                e.factors.iter().for_each(|p| push(at(id), p));
            }
        }
        (ElementType::StudyVariable, _) => {
            for (id, e) in &metadata.study_variable {
                let value = if property == "average_function" {
                    &e.average_function
                } else {
                    &e.variation_function
                };
                if let Some(p) = value {
                    push(at(id), p);
                }
            }
        }
        (ElementType::MsRun, "fragmentation_method" | "scan_polarity") => {
            for (id, e) in &metadata.ms_run {
                let values = if property == "scan_polarity" {
                    &e.scan_polarity
                } else {
                    &e.fragmentation_method
                };
                values.iter().for_each(|(m, p)| push(sub(id, m), p));
            }
        }
        (ElementType::MsRun, _) => {
            for (id, e) in &metadata.ms_run {
                let value = match property {
                    "format" => &e.format,
                    "id_format" => &e.id_format,
                    _ => &e.hash_method,
                };
                if let Some(p) = value {
                    push(at(id), p);
                }
            }
        }
        (ElementType::Sample, _) => {
            for (id, e) in &metadata.sample {
                let values = match property {
                    "species" => &e.species,
                    "tissue" => &e.tissue,
                    "cell_type" => &e.cell_type,
                    "disease" => &e.disease,
                    _ => &e.custom,
                };
                values.iter().for_each(|(m, p)| push(sub(id, m), p));
            }
        }
        (ElementType::Assay, _) => {
            for (id, e) in &metadata.assay {
                e.custom.iter().for_each(|(m, p)| push(sub(id, m), p));
            }
        }
        (ElementType::Database, _) => {
            for (id, e) in &metadata.database {
                if let Some(p) = &e.parameter {
                    push(at(id), p);
                }
            }
        }
        (ElementType::Custom | ElementType::DerivatizationAgent | ElementType::IdConfidenceMeasure, _) => {
            let elements = match element_type {
                ElementType::Custom => &metadata.custom,
                ElementType::DerivatizationAgent => &metadata.derivatization_agent,
                _ => &metadata.id_confidence_measure,
            };
            for (id, e) in elements {
                if let Some(p) = &e.parameter {
                    push(at(id), p);
                }
            }
        }
        _ => {}
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(Scalar::QuantificationMethod) => f.write_str("/mzTab/metadata/quantification_method"),
            Self::Scalar(Scalar::QuantificationUnit(t)) => {
                write!(f, "/mzTab/metadata/{}-quantification_unit", t)
            }
            Self::Scalar(Scalar::IdentificationReliability) => {
                f.write_str("/mzTab/metadata/small_molecule-identification_reliability")
            }
            Self::Scalar(Scalar::ColumnUnit(t)) => write!(f, "/mzTab/metadata/colunit-{}", t),
            Self::Property(t, "") => write!(f, "/mzTab/metadata/{}", t.key()),
            Self::Property(t, p) => write!(f, "/mzTab/metadata/{}/{}", t.key(), p),
        }
    }
}
