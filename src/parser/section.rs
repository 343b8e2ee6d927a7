use std::fmt;

use crate::model::TableKind;

/// Kind of an mzTab-M line, identified by its leading token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    /// `COM` or any line starting with `#`
    Comment,
    /// `MTD`
    Metadata,
    /// `SMH`
    SmallMoleculeHeader,
    /// `SML`
    SmallMolecule,
    /// `SFH`
    SmallMoleculeFeatureHeader,
    /// `SMF`
    SmallMoleculeFeature,
    /// `SEH`
    SmallMoleculeEvidenceHeader,
    /// `SME`
    SmallMoleculeEvidence,
}

impl Section {
    /// Three letter line prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Comment => "COM",
            Self::Metadata => "MTD",
            Self::SmallMoleculeHeader => "SMH",
            Self::SmallMolecule => "SML",
            Self::SmallMoleculeFeatureHeader => "SFH",
            Self::SmallMoleculeFeature => "SMF",
            Self::SmallMoleculeEvidenceHeader => "SEH",
            Self::SmallMoleculeEvidence => "SME",
        }
    }

    /// Descriptive name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Metadata => "metadata",
            Self::SmallMoleculeHeader => "small molecule header",
            Self::SmallMolecule => "small molecule",
            Self::SmallMoleculeFeatureHeader => "small molecule feature header",
            Self::SmallMoleculeFeature => "small molecule feature",
            Self::SmallMoleculeEvidenceHeader => "small molecule evidence header",
            Self::SmallMoleculeEvidence => "small molecule evidence",
        }
    }

    /// Ordering rank; levels never decrease within a file.
    pub fn level(&self) -> u8 {
        match self {
            Self::Comment => 0,
            Self::Metadata => 1,
            Self::SmallMoleculeHeader => 2,
            Self::SmallMolecule => 3,
            Self::SmallMoleculeFeatureHeader => 4,
            Self::SmallMoleculeFeature => 5,
            Self::SmallMoleculeEvidenceHeader => 6,
            Self::SmallMoleculeEvidence => 7,
        }
    }

    /// Classify a line by its leading token.
    pub fn of_line(line: &str) -> Option<Self> {
        if line.starts_with('#') {
            return Some(Self::Comment);
        }
        let prefix = line.split('\t').next().unwrap_or_default().trim();
        match prefix {
            "COM" => Some(Self::Comment),
            "MTD" => Some(Self::Metadata),
            "SMH" => Some(Self::SmallMoleculeHeader),
            "SML" => Some(Self::SmallMolecule),
            "SFH" => Some(Self::SmallMoleculeFeatureHeader),
            "SMF" => Some(Self::SmallMoleculeFeature),
            "SEH" => Some(Self::SmallMoleculeEvidenceHeader),
            "SME" => Some(Self::SmallMoleculeEvidence),
            _ => None,
        }
    }

    /// Table of a header or data section.
    pub fn table(&self) -> Option<TableKind> {
        match self {
            Self::SmallMoleculeHeader | Self::SmallMolecule => Some(TableKind::SmallMolecule),
            Self::SmallMoleculeFeatureHeader | Self::SmallMoleculeFeature => {
                Some(TableKind::SmallMoleculeFeature)
            }
            Self::SmallMoleculeEvidenceHeader | Self::SmallMoleculeEvidence => {
                Some(TableKind::SmallMoleculeEvidence)
            }
            Self::Comment | Self::Metadata => None,
        }
    }

    /// True for `SMH`, `SFH` and `SEH`.
    pub fn is_header(&self) -> bool {
        matches!(
            self,
            Self::SmallMoleculeHeader
                | Self::SmallMoleculeFeatureHeader
                | Self::SmallMoleculeEvidenceHeader
        )
    }

    /// Header section of a table.
    pub fn header_of(table: TableKind) -> Self {
        match table {
            TableKind::SmallMolecule => Self::SmallMoleculeHeader,
            TableKind::SmallMoleculeFeature => Self::SmallMoleculeFeatureHeader,
            TableKind::SmallMoleculeEvidence => Self::SmallMoleculeEvidenceHeader,
        }
    }

    /// Data section of a table.
    pub fn data_of(table: TableKind) -> Self {
        match table {
            TableKind::SmallMolecule => Self::SmallMolecule,
            TableKind::SmallMoleculeFeature => Self::SmallMoleculeFeature,
            TableKind::SmallMoleculeEvidence => Self::SmallMoleculeEvidence,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_lines() {
        assert_eq!(Section::of_line("MTD\tmzTab-version\t2.0.0-M"), Some(Section::Metadata));
        assert_eq!(Section::of_line("# free comment"), Some(Section::Comment));
        assert_eq!(Section::of_line("COM\tnote"), Some(Section::Comment));
        assert_eq!(Section::of_line("PRH\tx"), None);
        assert_eq!(Section::of_line("MTDX\tx"), None);
    }

    #[test]
    fn test_header_precedes_data() {
        for table in TableKind::ALL {
            let header = Section::header_of(table);
            let data = Section::data_of(table);
            assert!(header.is_header() && !data.is_header());
            assert_eq!(header.level() + 1, data.level());
            assert_eq!(data.table(), Some(table));
            assert_eq!(header.prefix(), table.header_prefix());
        }
    }
}
