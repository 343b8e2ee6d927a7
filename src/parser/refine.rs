//! Metadata refinement after the last line has been read.

use std::sync::LazyLock;

use regex::Regex;

use super::LineFault;
use crate::context::ParserContext;
use crate::error::{catalog, Diagnostic, DiagnosticCollection};
use crate::model::{ElementRef, ElementType};

static MZTAB_M_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^2\.\d+\.\d+-M$").expect("Invalid mzTab version regex"));

/// Check hash methods, undefined references, mandatory items and the
/// version string. A hash without hash method is fatal.
///
/// Per-element requirements only apply to elements some metadata line
/// defined; bare placeholders are reported as undefined instead.
pub(super) fn refine(
    context: &ParserContext,
    diagnostics: &mut DiagnosticCollection,
) -> Result<(), LineFault> {
    let metadata = context.metadata();

    for (id, run) in &metadata.ms_run {
        if run.hash.is_some() && run.hash_method.is_none() {
            let line = context.key_line(&format!("ms_run[{}]-hash", id));
            return Err(LineFault::Fatal(Diagnostic::new(
                &catalog::HASH_METHOD_NOT_DEFINED,
                line,
                &[id],
            )));
        }
    }

    for (element, line) in context.undefined_references() {
        diagnostics.add(Diagnostic::new(&catalog::NOT_DEFINE_IN_METADATA, line, &[&element]))?;
    }

    let mut missing: Vec<String> = Vec::new();
    let mut require = |present: bool, item: &str| {
        if !present {
            missing.push(item.to_string());
        }
    };
    require(metadata.mztab_version.is_some(), "mzTab-version");
    require(metadata.mztab_id.is_some(), "mzTab-ID");
    require(metadata.quantification_method.is_some(), "quantification_method");
    require(
        metadata.software.values().any(|s| s.parameter.is_some()),
        "software[1]",
    );
    let defined = |element_type: ElementType, id: u32| {
        context.is_defined(ElementRef::new(element_type, id))
    };
    let runs: Vec<_> = metadata
        .ms_run
        .iter()
        .filter(|(id, _)| defined(ElementType::MsRun, **id))
        .collect();
    require(!runs.is_empty(), "ms_run[1]-location");
    for (id, run) in runs {
        require(run.location.is_some(), &format!("ms_run[{}]-location", id));
    }
    let assays: Vec<_> = metadata
        .assay
        .iter()
        .filter(|(id, _)| defined(ElementType::Assay, **id))
        .collect();
    require(!assays.is_empty(), "assay[1]-ms_run_ref");
    for (id, assay) in assays {
        require(!assay.ms_run_ref.is_empty(), &format!("assay[{}]-ms_run_ref", id));
    }
    require(!metadata.study_variable.is_empty(), "study_variable[1]");
    require(!metadata.cv.is_empty(), "cv[1]-label");
    require(!metadata.database.is_empty(), "database[1]");
    require(
        metadata.small_molecule_quantification_unit.is_some(),
        "small_molecule-quantification_unit",
    );
    require(
        metadata.small_molecule_feature_quantification_unit.is_some(),
        "small_molecule_feature-quantification_unit",
    );
    require(
        !metadata.id_confidence_measure.is_empty(),
        "id_confidence_measure[1]",
    );

    for item in &missing {
        diagnostics.add(Diagnostic::new(&catalog::MANDATORY_METADATA, None, &[item]))?;
    }

    if let Some(version) = &metadata.mztab_version {
        if !MZTAB_M_VERSION.is_match(version) {
            diagnostics.add(Diagnostic::new(
                &catalog::MZTAB_VERSION,
                context.key_line("mzTab-version"),
                &[version],
            ))?;
        }
    }

    Ok(())
}
