//! Rendering the metadata section as key/value pairs.

use std::collections::BTreeMap;

use crate::model::{ElementRef, ElementType, IndexedParameter, Metadata, Parameter};

/// Key/value pairs of the metadata section, in canonical order.
pub(super) struct MetadataLines {
    lines: Vec<(String, String)>,
}

impl MetadataLines {
    fn text(&mut self, key: impl Into<String>, value: Option<&String>) {
        if let Some(value) = value {
            self.lines.push((key.into(), value.clone()));
        }
    }

    fn param(&mut self, key: impl Into<String>, value: Option<&Parameter>) {
        if let Some(value) = value {
            self.lines.push((key.into(), value.to_string()));
        }
    }

    fn params(&mut self, key: impl Into<String>, values: &[Parameter]) {
        if !values.is_empty() {
            self.lines.push((key.into(), join(values.iter())));
        }
    }

    fn indexed_params(&mut self, prefix: &str, values: &BTreeMap<u32, Parameter>) {
        for (m, value) in values {
            self.lines.push((format!("{}[{}]", prefix, m), value.to_string()));
        }
    }

    fn refs(&mut self, key: impl Into<String>, element_type: ElementType, ids: &[u32]) {
        if !ids.is_empty() {
            let refs = ids.iter().map(|&id| ElementRef::new(element_type, id));
            self.lines.push((key.into(), join(refs)));
        }
    }

    fn indexed_parameters(&mut self, key: &str, elements: &BTreeMap<u32, IndexedParameter>) {
        for (id, e) in elements {
            self.param(format!("{}[{}]", key, id), e.parameter.as_ref());
        }
    }

    pub(super) fn into_vec(self) -> Vec<(String, String)> {
        self.lines
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join("|")
}

pub(super) fn render(metadata: &Metadata) -> MetadataLines {
    let mut out = MetadataLines { lines: Vec::new() };

    out.text("mzTab-version", metadata.mztab_version.as_ref());
    out.text("mzTab-ID", metadata.mztab_id.as_ref());
    out.text("title", metadata.title.as_ref());
    out.text("description", metadata.description.as_ref());

    for (id, e) in &metadata.sample_processing {
        out.params(format!("sample_processing[{}]", id), &e.parameters);
    }
    for (id, e) in &metadata.instrument {
        let key = format!("instrument[{}]", id);
        out.param(format!("{}-name", key), e.name.as_ref());
        out.param(format!("{}-source", key), e.source.as_ref());
        out.indexed_params(&format!("{}-analyzer", key), &e.analyzer);
        out.param(format!("{}-detector", key), e.detector.as_ref());
    }
    for (id, e) in &metadata.software {
        let key = format!("software[{}]", id);
        out.param(key.clone(), e.parameter.as_ref());
        for (m, setting) in &e.setting {
            out.text(format!("{}-setting[{}]", key, m), Some(setting));
        }
    }
    for (id, e) in &metadata.publication {
        if !e.items.is_empty() {
            out.lines.push((format!("publication[{}]", id), e.items.join("|")));
        }
    }
    for (id, e) in &metadata.contact {
        let key = format!("contact[{}]", id);
        out.text(format!("{}-name", key), e.name.as_ref());
        out.text(format!("{}-affiliation", key), e.affiliation.as_ref());
        out.text(format!("{}-email", key), e.email.as_ref());
        out.text(format!("{}-orcid", key), e.orcid.as_ref());
    }
    for (id, e) in &metadata.uri {
        out.text(format!("uri[{}]", id), e.value.as_ref());
    }
    for (id, e) in &metadata.external_study_uri {
        out.text(format!("external_study_uri[{}]", id), e.value.as_ref());
    }
    out.param("quantification_method", metadata.quantification_method.as_ref());

    for (id, e) in &metadata.study_variable {
        let key = format!("study_variable[{}]", id);
        out.text(key.clone(), e.name.as_ref());
        out.refs(format!("{}-assay_refs", key), ElementType::Assay, &e.assay_refs);
        out.param(format!("{}-average_function", key), e.average_function.as_ref());
        out.param(format!("{}-variation_function", key), e.variation_function.as_ref());
        out.text(format!("{}-description", key), e.description.as_ref());
        out.params(format!("{}-factors", key), &e.factors);
    }
    for (id, e) in &metadata.ms_run {
        let key = format!("ms_run[{}]", id);
        out.text(format!("{}-location", key), e.location.as_ref());
        if let Some(instrument) = e.instrument_ref {
            out.refs(format!("{}-instrument_ref", key), ElementType::Instrument, &[instrument]);
        }
        out.param(format!("{}-format", key), e.format.as_ref());
        out.param(format!("{}-id_format", key), e.id_format.as_ref());
        out.indexed_params(&format!("{}-fragmentation_method", key), &e.fragmentation_method);
        out.indexed_params(&format!("{}-scan_polarity", key), &e.scan_polarity);
        out.text(format!("{}-hash", key), e.hash.as_ref());
        out.param(format!("{}-hash_method", key), e.hash_method.as_ref());
    }
    for (id, e) in &metadata.sample {
        let key = format!("sample[{}]", id);
        out.text(key.clone(), e.name.as_ref());
        out.indexed_params(&format!("{}-species", key), &e.species);
        out.indexed_params(&format!("{}-tissue", key), &e.tissue);
        out.indexed_params(&format!("{}-cell_type", key), &e.cell_type);
        out.indexed_params(&format!("{}-disease", key), &e.disease);
        out.text(format!("{}-description", key), e.description.as_ref());
        out.indexed_params(&format!("{}-custom", key), &e.custom);
    }
    for (id, e) in &metadata.assay {
        let key = format!("assay[{}]", id);
        out.text(key.clone(), e.name.as_ref());
        out.indexed_params(&format!("{}-custom", key), &e.custom);
        out.text(format!("{}-external_uri", key), e.external_uri.as_ref());
        if let Some(sample) = e.sample_ref {
            out.refs(format!("{}-sample_ref", key), ElementType::Sample, &[sample]);
        }
        out.refs(format!("{}-ms_run_ref", key), ElementType::MsRun, &e.ms_run_ref);
    }
    out.indexed_parameters("custom", &metadata.custom);
    for (id, e) in &metadata.cv {
        let key = format!("cv[{}]", id);
        out.text(format!("{}-label", key), e.label.as_ref());
        out.text(format!("{}-full_name", key), e.full_name.as_ref());
        out.text(format!("{}-version", key), e.version.as_ref());
        out.text(format!("{}-uri", key), e.uri.as_ref());
    }
    for (id, e) in &metadata.database {
        let key = format!("database[{}]", id);
        out.param(key.clone(), e.parameter.as_ref());
        out.text(format!("{}-prefix", key), e.prefix.as_ref());
        out.text(format!("{}-version", key), e.version.as_ref());
        out.text(format!("{}-uri", key), e.uri.as_ref());
    }
    out.indexed_parameters("derivatization_agent", &metadata.derivatization_agent);
    out.param(
        "small_molecule-quantification_unit",
        metadata.small_molecule_quantification_unit.as_ref(),
    );
    out.param(
        "small_molecule_feature-quantification_unit",
        metadata.small_molecule_feature_quantification_unit.as_ref(),
    );
    out.param(
        "small_molecule-identification_reliability",
        metadata.small_molecule_identification_reliability.as_ref(),
    );
    out.indexed_parameters("id_confidence_measure", &metadata.id_confidence_measure);

    // declaration order, which is part of file equality
    for unit in &metadata.column_units {
        out.lines.push((
            format!("colunit-{}", unit.table),
            format!("{}={}", unit.column, unit.unit),
        ));
    }
    out
}
