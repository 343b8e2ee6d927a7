//! Catalog of every diagnostic type the parser and validators can emit.
//!
//! Codes are grouped by category: 1xxx format, 2xxx logical, 3xxx cross-check.
//! The catalog is immutable static data; [`by_code`] builds its lookup index
//! once on first use.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::diagnostic::{Category, DiagnosticType, Level};

const fn format(code: u32, level: Level, name: &'static str, template: &'static str) -> DiagnosticType {
    DiagnosticType {
        code,
        category: Category::Format,
        level,
        name,
        template,
        cause: None,
    }
}

const fn logical(code: u32, level: Level, name: &'static str, template: &'static str) -> DiagnosticType {
    DiagnosticType {
        code,
        category: Category::Logical,
        level,
        name,
        template,
        cause: None,
    }
}

const fn cross_check(code: u32, level: Level, name: &'static str, template: &'static str) -> DiagnosticType {
    DiagnosticType {
        code,
        category: Category::CrossCheck,
        level,
        name,
        template,
        cause: None,
    }
}

// =============================================================================
// Format
// =============================================================================

/// Line starts with an unknown section prefix (fatal)
pub static LINE_PREFIX: DiagnosticType = DiagnosticType {
    cause: Some("Every line starts with a three letter section prefix followed by a tab."),
    ..format(
        1001,
        Level::Error,
        "LinePrefix",
        "Unrecognized line prefix \"{0}\"; lines must start with MTD, SMH, SML, SFH, SMF, SEH, SME or COM.",
    )
};

/// Data line token count differs from its header
pub static COUNT_MATCH: DiagnosticType = format(
    1002,
    Level::Error,
    "CountMatch",
    "Data line has {0} fields but the {1} header declares {2}.",
);

/// Stable column missing from a header
pub static STABLE_COLUMN: DiagnosticType = format(
    1003,
    Level::Error,
    "StableColumn",
    "Header {0} is missing the stable column \"{1}\".",
);

/// Header token that is neither stable nor optional
pub static OPTIONAL_COLUMN: DiagnosticType = DiagnosticType {
    cause: Some("Columns outside the stable set must start with \"opt_\"."),
    ..format(
        1004,
        Level::Error,
        "OptionalCVParamColumn",
        "Column \"{0}\" is neither a stable {1} column nor an optional column.",
    )
};

/// Malformed indexed-element column such as `abundance_assay[x]`
pub static INDEXED_COLUMN: DiagnosticType = format(
    1005,
    Level::Error,
    "IndexedColumn",
    "Column \"{0}\" is not a valid {1} column; expected {2}[<id>].",
);

/// Column appears twice in one header
pub static DUPLICATE_COLUMN: DiagnosticType = format(
    1006,
    Level::Error,
    "DuplicateColumn",
    "Column \"{0}\" appears more than once in header {1}.",
);

/// Metadata line is not `MTD<tab>key<tab>value`
pub static MTD_LINE: DiagnosticType = format(
    1007,
    Level::Error,
    "MTDLine",
    "Metadata line must be MTD<tab>key<tab>value, found \"{0}\".",
);

/// Unknown metadata key
pub static MTD_DEFINE_LABEL: DiagnosticType = format(
    1008,
    Level::Error,
    "MTDDefineLabel",
    "Unknown metadata key \"{0}\".",
);

/// Malformed `[label, accession, name, value]` parameter
pub static PARAM: DiagnosticType = format(
    1009,
    Level::Error,
    "Param",
    "\"{1}\" in {0} is not a valid parameter; expected [cv_label, accession, name, value].",
);

/// Not an integer
pub static INTEGER: DiagnosticType = format(
    1010,
    Level::Error,
    "Integer",
    "\"{1}\" in {0} is not an integer.",
);

/// Not a floating point number
pub static DOUBLE: DiagnosticType = format(
    1011,
    Level::Error,
    "Double",
    "\"{1}\" in {0} is not a number.",
);

/// Malformed indexed reference such as `assay[x]`
pub static INDEX_REF: DiagnosticType = format(
    1012,
    Level::Error,
    "IndexedElementRef",
    "\"{1}\" in {0} is not a valid reference; expected {2}[<id>].",
);

/// Malformed spectra reference
pub static SPECTRA_REF: DiagnosticType = format(
    1013,
    Level::Error,
    "SpectraRef",
    "\"{1}\" in {0} is not a valid spectra reference; expected ms_run[<id>]:<native id>.",
);

/// colunit names a column the table does not have
pub static COL_UNIT: DiagnosticType = format(
    1014,
    Level::Error,
    "ColUnit",
    "colunit-{0} names column \"{1}\", which is not declared in the {0} header.",
);

/// colunit value is not `<column>=<parameter>`
pub static COL_UNIT_VALUE: DiagnosticType = format(
    1015,
    Level::Error,
    "ColUnitValue",
    "colunit-{0} value \"{1}\" must be <column>=<parameter>.",
);

/// mzTab-version is not an mzTab-M version
pub static MZTAB_VERSION: DiagnosticType = format(
    1016,
    Level::Error,
    "MZTabVersion",
    "mzTab-version \"{0}\" is not a valid mzTab-M version; expected 2.<minor>.<patch>-M.",
);

/// Value does not match a required pattern
pub static REGEX_MISMATCH: DiagnosticType = format(
    1017,
    Level::Error,
    "RegexMismatch",
    "Value \"{1}\" in column {0} does not match the pattern {2}.",
);

/// Value is well-formed text but not acceptable for its key
pub static INVALID_VALUE: DiagnosticType = format(
    1018,
    Level::Error,
    "InvalidValue",
    "Value \"{1}\" of {0} is invalid: {2}.",
);

// =============================================================================
// Logical
// =============================================================================

/// Sections out of order (fatal)
pub static LINE_ORDER: DiagnosticType = DiagnosticType {
    cause: Some("Sections follow the order MTD, SMH/SML, SFH/SMF, SEH/SME."),
    ..logical(
        2001,
        Level::Error,
        "LineOrder",
        "{0} line appears after a {1} line.",
    )
};

/// Header declared twice (fatal)
pub static HEADER_LINE: DiagnosticType = logical(
    2002,
    Level::Error,
    "HeaderLine",
    "Header {0} is defined more than once; the first definition is on line {1}.",
);

/// Data line without header (fatal)
pub static NO_HEADER_LINE: DiagnosticType = logical(
    2003,
    Level::Error,
    "NoHeaderLine",
    "{0} line found before its {1} header.",
);

/// Same metadata key defined twice
pub static DUPLICATION_DEFINE: DiagnosticType = logical(
    2004,
    Level::Error,
    "DuplicationDefine",
    "{0} is defined more than once; the first definition is kept.",
);

/// Unexpected fault while handling one line
pub static NULL: DiagnosticType = logical(
    2005,
    Level::Error,
    "NULL",
    "Line could not be processed: {0}",
);

/// Referenced element never defined
pub static NOT_DEFINE_IN_METADATA: DiagnosticType = logical(
    2006,
    Level::Error,
    "NotDefineInMetadata",
    "{0} is referenced but not defined in the metadata.",
);

/// Mandatory metadata missing
pub static MANDATORY_METADATA: DiagnosticType = logical(
    2007,
    Level::Error,
    "MandatoryMetadata",
    "{0} is mandatory but not defined in the metadata.",
);

/// ms_run hash without hash method (fatal)
pub static HASH_METHOD_NOT_DEFINED: DiagnosticType = logical(
    2008,
    Level::Error,
    "HashMethodNotDefined",
    "ms_run[{0}]-hash is reported but ms_run[{0}]-hash_method is not defined.",
);

/// Row references an id no row defines
pub static UNKNOWN_REF_ID: DiagnosticType = logical(
    2009,
    Level::Error,
    "UnknownRefId",
    "{0} row {1} references {2} {3}, which does not exist.",
);

/// Summary section missing
pub static NO_SMALL_MOLECULE_SECTION: DiagnosticType = logical(
    2010,
    Level::Error,
    "NoSmallMoleculeSection",
    "No small molecule summary section (SMH/SML) with rows was found.",
);

/// Feature section missing
pub static NO_SMALL_MOLECULE_FEATURE_SECTION: DiagnosticType = logical(
    2011,
    Level::Info,
    "NoSmallMoleculeFeatureSection",
    "No small molecule feature section (SFH/SMF) with rows was found.",
);

/// Evidence section missing
pub static NO_SMALL_MOLECULE_EVIDENCE_SECTION: DiagnosticType = logical(
    2012,
    Level::Info,
    "NoSmallMoleculeEvidenceSection",
    "No small molecule evidence section (SEH/SME) with rows was found.",
);

/// Row id used twice in one table
pub static DUPLICATE_ROW_ID: DiagnosticType = logical(
    2013,
    Level::Error,
    "DuplicateRowId",
    "{0} {1} is used by more than one row; first seen on line {2}.",
);

// =============================================================================
// Cross-check
// =============================================================================

/// Parameter not covered by the rule
pub static CV_TERM_NOT_ALLOWED: DiagnosticType = cross_check(
    3001,
    Level::Warn,
    "CvTermNotAllowed",
    "{0} at {1} is not allowed by rule {2}.",
);

/// Parameter not covered by the rule, strict mode
pub static CV_TERM_NOT_ALLOWED_STRICT: DiagnosticType = cross_check(
    3002,
    Level::Error,
    "CvTermNotInRule",
    "{0} at {1} is not part of rule {2}.",
);

/// AND rule term missing
pub static CV_TERM_REQUIRED: DiagnosticType = cross_check(
    3003,
    Level::Error,
    "CvTermRequired",
    "Rule {0} requires {1} at {2}, but it was not found.",
);

/// OR/XOR rule matched nothing
pub static CV_TERM_MISSING: DiagnosticType = cross_check(
    3004,
    Level::Error,
    "CvTermMissing",
    "Rule {0} expects one of its terms at {1}; {2} was not found.",
);

/// XOR rule matched several term families
pub static CV_TERM_XOR: DiagnosticType = cross_check(
    3005,
    Level::Error,
    "CvTermXor",
    "Rule {0} allows only one of its terms at {1}, but found {2}.",
);

/// Found parameter field differs from the rule term
pub static CV_TERM_MALFORMED: DiagnosticType = cross_check(
    3006,
    Level::Warn,
    "CvTermMalformed",
    "{0} at {1} has {2} \"{3}\", expected \"{4}\".",
);

/// Non-repeatable term accepted more than once within one element
pub static CV_TERM_REPEATED: DiagnosticType = cross_check(
    3007,
    Level::Warn,
    "CvTermRepeated",
    "Rule {0} allows {1} once per element, but {2} has it {3} times.",
);

static ALL: [&DiagnosticType; 38] = [
    &LINE_PREFIX,
    &COUNT_MATCH,
    &STABLE_COLUMN,
    &OPTIONAL_COLUMN,
    &INDEXED_COLUMN,
    &DUPLICATE_COLUMN,
    &MTD_LINE,
    &MTD_DEFINE_LABEL,
    &PARAM,
    &INTEGER,
    &DOUBLE,
    &INDEX_REF,
    &SPECTRA_REF,
    &COL_UNIT,
    &COL_UNIT_VALUE,
    &MZTAB_VERSION,
    &REGEX_MISMATCH,
    &INVALID_VALUE,
    &LINE_ORDER,
    &HEADER_LINE,
    &NO_HEADER_LINE,
    &DUPLICATION_DEFINE,
    &NULL,
    &NOT_DEFINE_IN_METADATA,
    &MANDATORY_METADATA,
    &HASH_METHOD_NOT_DEFINED,
    &UNKNOWN_REF_ID,
    &NO_SMALL_MOLECULE_SECTION,
    &NO_SMALL_MOLECULE_FEATURE_SECTION,
    &NO_SMALL_MOLECULE_EVIDENCE_SECTION,
    &DUPLICATE_ROW_ID,
    &CV_TERM_NOT_ALLOWED,
    &CV_TERM_NOT_ALLOWED_STRICT,
    &CV_TERM_REQUIRED,
    &CV_TERM_MISSING,
    &CV_TERM_XOR,
    &CV_TERM_MALFORMED,
    &CV_TERM_REPEATED,
];

static BY_CODE: LazyLock<HashMap<u32, &'static DiagnosticType>> =
    LazyLock::new(|| ALL.iter().map(|kind| (kind.code, *kind)).collect());

/// Every diagnostic type, in code order.
pub fn all() -> &'static [&'static DiagnosticType] {
    &ALL
}

/// Look up a diagnostic type by its numeric code.
pub fn by_code(code: u32) -> Option<&'static DiagnosticType> {
    BY_CODE.get(&code).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        assert_eq!(BY_CODE.len(), ALL.len());
    }

    #[test]
    fn test_code_ranges_match_categories() {
        for kind in all() {
            let expected = match kind.code / 1000 {
                1 => Category::Format,
                2 => Category::Logical,
                3 => Category::CrossCheck,
                other => panic!("unexpected code range {}", other),
            };
            assert_eq!(kind.category, expected, "code {}", kind.code);
        }
    }

    #[test]
    fn test_lookup_by_code() {
        assert_eq!(by_code(2008).map(|k| k.name), Some("HashMethodNotDefined"));
        assert!(by_code(9999).is_none());
    }
}
