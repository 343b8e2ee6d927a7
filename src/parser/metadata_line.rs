//! `MTD` line handling: key resolution and element field assignment.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::LineFault;
use crate::context::ParserContext;
use crate::error::catalog;
use crate::model::value::{is_null, split_outside_brackets, BAR};
use crate::model::{ColumnUnit, ElementRef, ElementType, Parameter, TableKind};

static ELEMENT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z_]+)(?:\[(\d+)\])?(?:-([a-zA-Z_]+)(?:\[(\d+)\])?)?$")
        .expect("Invalid metadata key regex")
});

/// What a metadata key addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Version,
    Id,
    Title,
    Description,
    QuantificationMethod,
    QuantificationUnit(TableKind),
    IdentificationReliability,
    ColumnUnit(TableKind),
    Element {
        element: ElementRef,
        property: Option<String>,
        sub_id: Option<u32>,
    },
}

/// Whether an element property takes a `[m]` index; `None` for unknown
/// properties.
fn property_shape(element_type: ElementType, property: Option<&str>) -> Option<bool> {
    use ElementType as T;
    let indexed = match (element_type, property) {
        (T::SampleProcessing | T::Software | T::Publication | T::Uri | T::ExternalStudyUri, None) => false,
        (T::Custom | T::DerivatizationAgent | T::IdConfidenceMeasure, None) => false,
        (T::StudyVariable | T::Sample | T::Assay | T::Database, None) => false,
        (T::Instrument, Some("name" | "source" | "detector")) => false,
        (T::Instrument, Some("analyzer")) => true,
        (T::Software, Some("setting")) => true,
        (T::Contact, Some("name" | "affiliation" | "email" | "orcid")) => false,
        (
            T::StudyVariable,
            Some("assay_refs" | "average_function" | "variation_function" | "description" | "factors"),
        ) => false,
        (
            T::MsRun,
            Some("location" | "instrument_ref" | "format" | "id_format" | "hash" | "hash_method"),
        ) => false,
        (T::MsRun, Some("fragmentation_method" | "scan_polarity")) => true,
        (T::Sample, Some("description")) => false,
        (T::Sample, Some("species" | "tissue" | "cell_type" | "disease" | "custom")) => true,
        (T::Assay, Some("external_uri" | "sample_ref" | "ms_run_ref")) => false,
        (T::Assay, Some("custom")) => true,
        (T::Cv, Some("label" | "full_name" | "version" | "uri")) => false,
        (T::Database, Some("prefix" | "version" | "uri")) => false,
        _ => return None,
    };
    Some(indexed)
}

fn resolve_key(key: &str) -> Option<Target> {
    match key {
        "mzTab-version" => return Some(Target::Version),
        "mzTab-ID" => return Some(Target::Id),
        "title" => return Some(Target::Title),
        "description" => return Some(Target::Description),
        "quantification_method" => return Some(Target::QuantificationMethod),
        "small_molecule-identification_reliability" => {
            return Some(Target::IdentificationReliability)
        }
        _ => {}
    }
    if let Some(table) = key.strip_prefix("colunit-") {
        return TableKind::from_name(table).map(Target::ColumnUnit);
    }
    if let Some(table) = key.strip_suffix("-quantification_unit") {
        return match TableKind::from_name(table) {
            Some(t @ (TableKind::SmallMolecule | TableKind::SmallMoleculeFeature)) => {
                Some(Target::QuantificationUnit(t))
            }
            _ => None,
        };
    }

    let caps = ELEMENT_KEY.captures(key)?;
    let element_type = ElementType::from_key(&caps[1])?;
    let id: u32 = caps.get(2)?.as_str().parse().ok().filter(|&id| id > 0)?;
    let property = caps.get(3).map(|m| m.as_str().to_string());
    let sub_id = match caps.get(4) {
        Some(m) => Some(m.as_str().parse::<u32>().ok().filter(|&id| id > 0)?),
        None => None,
    };
    let indexed = property_shape(element_type, property.as_deref())?;
    if indexed != sub_id.is_some() {
        return None;
    }
    Some(Target::Element {
        element: ElementRef::new(element_type, id),
        property,
        sub_id,
    })
}

/// Handle one `MTD` line.
pub(super) fn handle(
    context: &mut ParserContext,
    line: &str,
    line_number: usize,
) -> Result<(), LineFault> {
    let tokens: Vec<&str> = line.split('\t').collect();
    if tokens.len() != 3 || tokens[1].trim().is_empty() || is_null(tokens[2]) {
        return Err(LineFault::line(&catalog::MTD_LINE, line_number, &[&excerpt(line)]));
    }
    let key = tokens[1].trim();
    let value = tokens[2].trim();

    let target = resolve_key(key)
        .ok_or_else(|| LineFault::line(&catalog::MTD_DEFINE_LABEL, line_number, &[&key]))?;

    let (define_key, element) = match &target {
        Target::ColumnUnit(_) => {
            let column = value.split_once('=').map(|(c, _)| c.trim()).unwrap_or(value);
            (format!("{}:{}", key, column), None)
        }
        Target::Element { element, .. } => (key.to_string(), Some(*element)),
        _ => (key.to_string(), None),
    };
    context
        .define(&define_key, element, line_number)
        .map_err(LineFault::Line)?;
    debug!("MTD {} = {}", key, value);

    let at = Location { key, line_number };
    match target {
        Target::Version => context.metadata_mut().mztab_version = Some(value.to_string()),
        Target::Id => context.metadata_mut().mztab_id = Some(value.to_string()),
        Target::Title => context.metadata_mut().title = Some(value.to_string()),
        Target::Description => context.metadata_mut().description = Some(value.to_string()),
        Target::QuantificationMethod => {
            context.metadata_mut().quantification_method = Some(at.param(value)?)
        }
        Target::QuantificationUnit(TableKind::SmallMoleculeFeature) => {
            context.metadata_mut().small_molecule_feature_quantification_unit = Some(at.param(value)?)
        }
        Target::QuantificationUnit(_) => {
            context.metadata_mut().small_molecule_quantification_unit = Some(at.param(value)?)
        }
        Target::IdentificationReliability => {
            context.metadata_mut().small_molecule_identification_reliability = Some(at.param(value)?)
        }
        Target::ColumnUnit(table) => {
            let unit = column_unit(table, value, line_number)?;
            context.metadata_mut().column_units.push(unit);
        }
        Target::Element {
            element,
            property,
            sub_id,
        } => assign(context, &at, element, property.as_deref(), sub_id.unwrap_or(0), value)?,
    }
    Ok(())
}

struct Location<'a> {
    key: &'a str,
    line_number: usize,
}

impl Location<'_> {
    fn param(&self, value: &str) -> Result<Parameter, LineFault> {
        value
            .parse()
            .map_err(|_| LineFault::line(&catalog::PARAM, self.line_number, &[&self.key, &value]))
    }

    fn params(&self, value: &str) -> Result<Vec<Parameter>, LineFault> {
        split_outside_brackets(value, BAR)
            .into_iter()
            .map(|item| self.param(item.trim()))
            .collect()
    }

    fn reference(
        &self,
        context: &mut ParserContext,
        token: &str,
        expected: ElementType,
    ) -> Result<u32, LineFault> {
        let token = token.trim();
        match token.parse::<ElementRef>() {
            Ok(element) if element.element_type == expected => {
                Ok(context.get_or_create(element, Some(self.line_number)).id)
            }
            _ => Err(LineFault::line(
                &catalog::INDEX_REF,
                self.line_number,
                &[&self.key, &token, &expected],
            )),
        }
    }

    fn references(
        &self,
        context: &mut ParserContext,
        value: &str,
        expected: ElementType,
    ) -> Result<Vec<u32>, LineFault> {
        value
            .split(BAR)
            .map(|token| self.reference(context, token, expected))
            .collect()
    }
}

fn column_unit(table: TableKind, value: &str, line_number: usize) -> Result<ColumnUnit, LineFault> {
    let invalid = || LineFault::line(&catalog::COL_UNIT_VALUE, line_number, &[&table, &value]);
    let (column, unit) = value.split_once('=').ok_or_else(invalid)?;
    let column = column.trim();
    if column.is_empty() {
        return Err(invalid());
    }
    let unit: Parameter = unit.trim().parse().map_err(|_| invalid())?;
    Ok(ColumnUnit {
        table,
        column: column.to_string(),
        unit,
        line_number: Some(line_number),
    })
}

fn assign(
    context: &mut ParserContext,
    at: &Location<'_>,
    element: ElementRef,
    property: Option<&str>,
    sub_id: u32,
    value: &str,
) -> Result<(), LineFault> {
    let id = element.id;
    let text = || Some(value.to_string());

    match (element.element_type, property) {
        (ElementType::SampleProcessing, _) => {
            let parameters = at.params(value)?;
            if let Some(e) = context.metadata_mut().sample_processing.get_mut(&id) {
                e.parameters = parameters;
            }
        }
        (ElementType::Instrument, Some(property)) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().instrument.get_mut(&id) {
                match property {
                    "name" => e.name = Some(parameter),
                    "source" => e.source = Some(parameter),
                    "detector" => e.detector = Some(parameter),
                    _ => {
                        e.analyzer.insert(sub_id, parameter);
                    }
                }
            }
        }
        (ElementType::Software, None) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().software.get_mut(&id) {
                e.parameter = Some(parameter);
            }
        }
        (ElementType::Software, Some(_)) => {
            if let Some(e) = context.metadata_mut().software.get_mut(&id) {
                e.setting.insert(sub_id, value.to_string());
            }
        }
        (ElementType::Publication, _) => {
            let items = value.split(BAR).map(|s| s.trim().to_string()).collect();
            if let Some(e) = context.metadata_mut().publication.get_mut(&id) {
                e.items = items;
            }
        }
        (ElementType::Contact, Some(property)) => {
            if let Some(e) = context.metadata_mut().contact.get_mut(&id) {
                match property {
                    "name" => e.name = text(),
                    "affiliation" => e.affiliation = text(),
                    "email" => e.email = text(),
                    _ => e.orcid = text(),
                }
            }
        }
        (ElementType::Uri, _) => {
            if let Some(e) = context.metadata_mut().uri.get_mut(&id) {
                e.value = text();
            }
        }
        (ElementType::ExternalStudyUri, _) => {
            if let Some(e) = context.metadata_mut().external_study_uri.get_mut(&id) {
                e.value = text();
            }
        }
        (ElementType::StudyVariable, property) => assign_study_variable(context, at, id, property, value)?,
        (ElementType::MsRun, Some(property)) => assign_ms_run(context, at, id, property, sub_id, value)?,
        (ElementType::Sample, property) => {
            let parameter = match property {
                None | Some("description") => None,
                Some(_) => Some(at.param(value)?),
            };
            if let Some(e) = context.metadata_mut().sample.get_mut(&id) {
                match (property, parameter) {
                    (None, _) => e.name = text(),
                    (Some("description"), _) => e.description = text(),
                    (Some("species"), Some(p)) => {
                        e.species.insert(sub_id, p);
                    }
                    (Some("tissue"), Some(p)) => {
                        e.tissue.insert(sub_id, p);
                    }
                    (Some("cell_type"), Some(p)) => {
                        e.cell_type.insert(sub_id, p);
                    }
                    (Some("disease"), Some(p)) => {
                        e.disease.insert(sub_id, p);
                    }
                    (_, Some(p)) => {
                        e.custom.insert(sub_id, p);
                    }
                    _ => {}
                }
            }
        }
        (ElementType::Assay, property) => assign_assay(context, at, id, property, sub_id, value)?,
        (ElementType::Custom, _) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().custom.get_mut(&id) {
                e.parameter = Some(parameter);
            }
        }
        (ElementType::DerivatizationAgent, _) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().derivatization_agent.get_mut(&id) {
                e.parameter = Some(parameter);
            }
        }
        (ElementType::IdConfidenceMeasure, _) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().id_confidence_measure.get_mut(&id) {
                e.parameter = Some(parameter);
            }
        }
        (ElementType::Cv, Some(property)) => {
            if let Some(e) = context.metadata_mut().cv.get_mut(&id) {
                match property {
                    "label" => e.label = text(),
                    "full_name" => e.full_name = text(),
                    "version" => e.version = text(),
                    _ => e.uri = text(),
                }
            }
        }
        (ElementType::Database, None) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().database.get_mut(&id) {
                e.parameter = Some(parameter);
            }
        }
        (ElementType::Database, Some(property)) => {
            if let Some(e) = context.metadata_mut().database.get_mut(&id) {
                match property {
                    "prefix" => e.prefix = text(),
                    "version" => e.version = text(),
                    _ => e.uri = text(),
                }
            }
        }
        // shapes rejected by resolve_key
        (ElementType::Instrument | ElementType::Contact | ElementType::MsRun | ElementType::Cv, None) => {}
    }
    Ok(())
}

fn assign_study_variable(
    context: &mut ParserContext,
    at: &Location<'_>,
    id: u32,
    property: Option<&str>,
    value: &str,
) -> Result<(), LineFault> {
    match property {
        None | Some("description") => {
            if let Some(e) = context.metadata_mut().study_variable.get_mut(&id) {
                if property.is_none() {
                    e.name = Some(value.to_string());
                } else {
                    e.description = Some(value.to_string());
                }
            }
        }
        Some("assay_refs") => {
            let refs = at.references(context, value, ElementType::Assay)?;
            if let Some(e) = context.metadata_mut().study_variable.get_mut(&id) {
                e.assay_refs = refs;
            }
        }
        Some("factors") => {
            let factors = at.params(value)?;
            if let Some(e) = context.metadata_mut().study_variable.get_mut(&id) {
                e.factors = factors;
            }
        }
        Some(function) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().study_variable.get_mut(&id) {
                if function == "average_function" {
                    e.average_function = Some(parameter);
                } else {
                    e.variation_function = Some(parameter);
                }
            }
        }
    }
    Ok(())
}

fn assign_ms_run(
    context: &mut ParserContext,
    at: &Location<'_>,
    id: u32,
    property: &str,
    sub_id: u32,
    value: &str,
) -> Result<(), LineFault> {
    match property {
        "location" | "hash" => {
            if let Some(e) = context.metadata_mut().ms_run.get_mut(&id) {
                if property == "location" {
                    e.location = Some(value.to_string());
                } else {
                    e.hash = Some(value.to_string());
                }
            }
        }
        "instrument_ref" => {
            let instrument = at.reference(context, value, ElementType::Instrument)?;
            if let Some(e) = context.metadata_mut().ms_run.get_mut(&id) {
                e.instrument_ref = Some(instrument);
            }
        }
        _ => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().ms_run.get_mut(&id) {
                match property {
                    "format" => e.format = Some(parameter),
                    "id_format" => e.id_format = Some(parameter),
                    "hash_method" => e.hash_method = Some(parameter),
                    "fragmentation_method" => {
                        e.fragmentation_method.insert(sub_id, parameter);
                    }
                    _ => {
                        e.scan_polarity.insert(sub_id, parameter);
                    }
                }
            }
        }
    }
    Ok(())
}

fn assign_assay(
    context: &mut ParserContext,
    at: &Location<'_>,
    id: u32,
    property: Option<&str>,
    sub_id: u32,
    value: &str,
) -> Result<(), LineFault> {
    match property {
        None | Some("external_uri") => {
            if let Some(e) = context.metadata_mut().assay.get_mut(&id) {
                if property.is_none() {
                    e.name = Some(value.to_string());
                } else {
                    e.external_uri = Some(value.to_string());
                }
            }
        }
        Some("sample_ref") => {
            let sample = at.reference(context, value, ElementType::Sample)?;
            if let Some(e) = context.metadata_mut().assay.get_mut(&id) {
                e.sample_ref = Some(sample);
            }
        }
        Some("ms_run_ref") => {
            let runs = at.references(context, value, ElementType::MsRun)?;
            if let Some(e) = context.metadata_mut().assay.get_mut(&id) {
                e.ms_run_ref = runs;
            }
        }
        Some(_) => {
            let parameter = at.param(value)?;
            if let Some(e) = context.metadata_mut().assay.get_mut(&id) {
                e.custom.insert(sub_id, parameter);
            }
        }
    }
    Ok(())
}

/// First characters of a line for diagnostics.
pub(super) fn excerpt(line: &str) -> String {
    const MAX: usize = 60;
    match line.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &line[..end]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(context: &mut ParserContext, key: &str, value: &str) -> Result<(), LineFault> {
        handle(context, &format!("MTD\t{}\t{}", key, value), 1)
    }

    fn code(fault: LineFault) -> u32 {
        match fault {
            LineFault::Line(d) | LineFault::Fatal(d) => d.code(),
            LineFault::Overflow(_) => 0,
        }
    }

    #[test]
    fn test_resolve_keys() {
        assert_eq!(resolve_key("mzTab-version"), Some(Target::Version));
        assert_eq!(
            resolve_key("colunit-small_molecule_evidence"),
            Some(Target::ColumnUnit(TableKind::SmallMoleculeEvidence))
        );
        assert!(matches!(
            resolve_key("ms_run[2]-fragmentation_method[1]"),
            Some(Target::Element { sub_id: Some(1), .. })
        ));
        assert_eq!(resolve_key("ms_run[2]-fragmentation_method"), None);
        assert_eq!(resolve_key("ms_run[0]-location"), None);
        assert_eq!(resolve_key("ms_run[1]"), None);
        assert_eq!(resolve_key("assay[1]-colour"), None);
        assert_eq!(resolve_key("small_molecule_evidence-quantification_unit"), None);
    }

    #[test]
    fn test_assay_fields_and_forward_references() {
        let mut context = ParserContext::new();
        run(&mut context, "assay[1]", "first assay").unwrap();
        run(&mut context, "assay[1]-ms_run_ref", "ms_run[1]|ms_run[2]").unwrap();
        run(&mut context, "assay[1]-sample_ref", "sample[1]").unwrap();

        let assay = &context.metadata().assay[&1];
        assert_eq!(assay.name.as_deref(), Some("first assay"));
        assert_eq!(assay.ms_run_ref, vec![1, 2]);
        assert_eq!(assay.sample_ref, Some(1));
        assert_eq!(context.metadata().ms_run.len(), 2);
        assert_eq!(context.undefined_references().len(), 3);

        run(&mut context, "ms_run[1]-location", "file:///a.mzML").unwrap();
        assert_eq!(context.undefined_references().len(), 2);
    }

    #[test]
    fn test_duplicate_keeps_first_value() {
        let mut context = ParserContext::new();
        run(&mut context, "mzTab-ID", "first").unwrap();
        let fault = run(&mut context, "mzTab-ID", "second").unwrap_err();
        assert_eq!(code(fault), catalog::DUPLICATION_DEFINE.code);
        assert_eq!(context.metadata().mztab_id.as_deref(), Some("first"));
    }

    #[test]
    fn test_malformed_values() {
        let mut context = ParserContext::new();
        let fault = run(&mut context, "quantification_method", "[MS, MS:1, ]").unwrap_err();
        assert_eq!(code(fault), catalog::PARAM.code);

        let fault = run(&mut context, "assay[1]-ms_run_ref", "sample[1]").unwrap_err();
        assert_eq!(code(fault), catalog::INDEX_REF.code);

        let fault = run(&mut context, "colunit-small_molecule", "no unit here").unwrap_err();
        assert_eq!(code(fault), catalog::COL_UNIT_VALUE.code);

        let fault = handle(&mut context, "MTD\ttitle", 3).unwrap_err();
        assert_eq!(code(fault), catalog::MTD_LINE.code);

        let fault = run(&mut context, "peptide[1]", "x").unwrap_err();
        assert_eq!(code(fault), catalog::MTD_DEFINE_LABEL.code);
    }

    #[test]
    fn test_column_units_per_column() {
        let mut context = ParserContext::new();
        run(
            &mut context,
            "colunit-small_molecule",
            "retention_time=[UO, UO:0000010, second, ]",
        )
        .unwrap();
        run(
            &mut context,
            "colunit-small_molecule",
            "opt_global_mass=[UO, UO:0000221, dalton, ]",
        )
        .unwrap();
        let units = &context.metadata().column_units;
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].column, "opt_global_mass");
        assert_eq!(units[0].unit.name, "second");
    }

    #[test]
    fn test_ms_run_properties() {
        let mut context = ParserContext::new();
        run(&mut context, "ms_run[1]-hash", "de9f2c7fd25e1b3afad3e85a0bd17d9b100db4b3").unwrap();
        run(&mut context, "ms_run[1]-scan_polarity[1]", "[MS, MS:1000130, positive scan, ]").unwrap();
        run(&mut context, "ms_run[1]-instrument_ref", "instrument[1]").unwrap();
        let run_1 = &context.metadata().ms_run[&1];
        assert!(run_1.hash.is_some());
        assert_eq!(run_1.scan_polarity[&1].name, "positive scan");
        assert_eq!(run_1.instrument_ref, Some(1));
        assert!(context.metadata().instrument.contains_key(&1));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(100);
        assert_eq!(excerpt(&long).len(), 63);
        assert_eq!(excerpt("short"), "short");
    }
}
