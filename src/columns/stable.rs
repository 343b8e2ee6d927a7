//! Stable and indexed-element column definitions per table.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnType, ElementType, TableKind};

/// A column every header of its table must declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableColumn {
    /// Header token
    pub name: &'static str,
    /// Cell type
    pub data_type: ColumnType,
}

const fn stable(name: &'static str, data_type: ColumnType) -> StableColumn {
    StableColumn { name, data_type }
}

/// `SML_ID`
pub const SML_ID: &str = "SML_ID";
/// `SMF_ID_REFS`
pub const SMF_ID_REFS: &str = "SMF_ID_REFS";
/// `SMF_ID`
pub const SMF_ID: &str = "SMF_ID";
/// `SME_ID_REFS`
pub const SME_ID_REFS: &str = "SME_ID_REFS";
/// `SME_ID`
pub const SME_ID: &str = "SME_ID";
/// `reliability`
pub const RELIABILITY: &str = "reliability";
/// `spectra_ref`
pub const SPECTRA_REF: &str = "spectra_ref";

static SMALL_MOLECULE: [StableColumn; 13] = [
    stable(SML_ID, ColumnType::Integer),
    stable(SMF_ID_REFS, ColumnType::IntegerList),
    stable("database_identifier", ColumnType::TextList),
    stable("chemical_formula", ColumnType::TextList),
    stable("smiles", ColumnType::TextList),
    stable("inchi", ColumnType::TextList),
    stable("chemical_name", ColumnType::TextList),
    stable("uri", ColumnType::TextList),
    stable("theoretical_neutral_mass", ColumnType::DoubleList),
    stable("adduct_ions", ColumnType::TextList),
    stable(RELIABILITY, ColumnType::Text),
    stable("best_id_confidence_measure", ColumnType::Parameter),
    stable("best_id_confidence_value", ColumnType::Double),
];

static SMALL_MOLECULE_FEATURE: [StableColumn; 10] = [
    stable(SMF_ID, ColumnType::Integer),
    stable(SME_ID_REFS, ColumnType::IntegerList),
    stable("SME_ID_REF_ambiguity_code", ColumnType::Integer),
    stable("adduct_ion", ColumnType::Text),
    stable("isotopomer", ColumnType::Parameter),
    stable("exp_mass_to_charge", ColumnType::Double),
    stable("charge", ColumnType::Integer),
    stable("retention_time_in_seconds", ColumnType::Double),
    stable("retention_time_in_seconds_start", ColumnType::Double),
    stable("retention_time_in_seconds_end", ColumnType::Double),
];

static SMALL_MOLECULE_EVIDENCE: [StableColumn; 17] = [
    stable(SME_ID, ColumnType::Integer),
    stable("evidence_input_id", ColumnType::Text),
    stable("database_identifier", ColumnType::Text),
    stable("chemical_formula", ColumnType::Text),
    stable("smiles", ColumnType::Text),
    stable("inchi", ColumnType::Text),
    stable("chemical_name", ColumnType::Text),
    stable("uri", ColumnType::Text),
    stable("derivatized_form", ColumnType::Parameter),
    stable("adduct_ion", ColumnType::Text),
    stable("exp_mass_to_charge", ColumnType::Double),
    stable("charge", ColumnType::Integer),
    stable("theoretical_mass_to_charge", ColumnType::Double),
    stable(SPECTRA_REF, ColumnType::SpectraRefList),
    stable("identification_method", ColumnType::Parameter),
    stable("ms_level", ColumnType::Parameter),
    stable("rank", ColumnType::Integer),
];

/// Stable columns of a table, in write order.
pub fn stable_columns(table: TableKind) -> &'static [StableColumn] {
    match table {
        TableKind::SmallMolecule => &SMALL_MOLECULE,
        TableKind::SmallMoleculeFeature => &SMALL_MOLECULE_FEATURE,
        TableKind::SmallMoleculeEvidence => &SMALL_MOLECULE_EVIDENCE,
    }
}

/// Position of a stable column in write order.
pub fn stable_order(table: TableKind, name: &str) -> Option<usize> {
    stable_columns(table).iter().position(|c| c.name == name)
}

/// Column families whose name carries an element id, e.g. `abundance_assay[3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexedFamily {
    /// `abundance_assay[n]`
    AbundanceAssay,
    /// `abundance_study_variable[n]`
    AbundanceStudyVariable,
    /// `abundance_variation_study_variable[n]`
    AbundanceVariationStudyVariable,
    /// `id_confidence_measure[n]`
    IdConfidenceMeasure,
}

impl IndexedFamily {
    /// Column name before the `[id]` suffix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::AbundanceAssay => "abundance_assay",
            Self::AbundanceStudyVariable => "abundance_study_variable",
            Self::AbundanceVariationStudyVariable => "abundance_variation_study_variable",
            Self::IdConfidenceMeasure => "id_confidence_measure",
        }
    }

    /// Element the id refers to.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::AbundanceAssay => ElementType::Assay,
            Self::AbundanceStudyVariable | Self::AbundanceVariationStudyVariable => {
                ElementType::StudyVariable
            }
            Self::IdConfidenceMeasure => ElementType::IdConfidenceMeasure,
        }
    }

    /// Families a table may carry.
    pub fn for_table(table: TableKind) -> &'static [IndexedFamily] {
        match table {
            TableKind::SmallMolecule => &[
                Self::AbundanceAssay,
                Self::AbundanceStudyVariable,
                Self::AbundanceVariationStudyVariable,
            ],
            TableKind::SmallMoleculeFeature => &[Self::AbundanceAssay],
            TableKind::SmallMoleculeEvidence => &[Self::IdConfidenceMeasure],
        }
    }

    /// Column name for an element id.
    pub fn column_name(&self, id: u32) -> String {
        format!("{}[{}]", self.prefix(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_column_is_first() {
        for table in TableKind::ALL {
            assert_eq!(stable_columns(table)[0].name, table.id_column());
            assert_eq!(stable_order(table, table.id_column()), Some(0));
        }
    }

    #[test]
    fn test_column_types() {
        assert_eq!(
            stable_columns(TableKind::SmallMoleculeEvidence)[13].data_type,
            ColumnType::SpectraRefList
        );
        assert_eq!(stable_order(TableKind::SmallMoleculeFeature, "charge"), Some(6));
        assert_eq!(stable_order(TableKind::SmallMolecule, "charge"), None);
    }

    #[test]
    fn test_indexed_family_names() {
        assert_eq!(IndexedFamily::AbundanceAssay.column_name(3), "abundance_assay[3]");
        assert_eq!(
            IndexedFamily::AbundanceVariationStudyVariable.element_type(),
            ElementType::StudyVariable
        );
        assert_eq!(
            IndexedFamily::for_table(TableKind::SmallMoleculeEvidence),
            &[IndexedFamily::IdConfidenceMeasure]
        );
    }
}
