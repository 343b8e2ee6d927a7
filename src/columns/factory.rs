//! Header classification and the per-table column model.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::position::PositionMap;
use super::stable::{stable_columns, stable_order, IndexedFamily};
use crate::model::{split_indexed, ColumnType, ElementRef, ElementType, TableKind};

static OPTIONAL_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^opt_(global|(\w+)\[(\d+)\])_(cv_([A-Za-z]+:\d+)_(.+)|(.+))$")
        .expect("Invalid optional column regex")
});

/// Prefix shared by every optional column.
pub const OPT_PREFIX: &str = "opt_";

/// Scope an optional column applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptScope {
    /// `opt_global_...`
    Global,
    /// `opt_assay[1]_...` and friends
    Element(ElementRef),
}

impl fmt::Display for OptScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Element(element) => write!(f, "{}", element),
        }
    }
}

/// How a header token was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Member of the table's stable column set
    Stable {
        /// Write order within the stable set
        order: usize,
    },
    /// `abundance_assay[n]` and the other indexed families
    Indexed {
        /// Column family
        family: IndexedFamily,
        /// Element the column is bound to
        element: ElementRef,
    },
    /// `opt_<scope>_cv_<accession>_<name>`
    OptionalCv {
        /// Scope
        scope: OptScope,
        /// CV accession, e.g. `MS:1000073`
        accession: String,
        /// Parameter name after the accession
        cv_name: String,
    },
    /// `opt_<scope>_<name>`
    Optional {
        /// Scope
        scope: OptScope,
        /// Free-form name
        name: String,
    },
    /// Any other `opt_` token
    Generic,
    /// Token that could not be classified; its cells are skipped
    Invalid,
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Header token
    pub name: String,
    /// Cell type
    pub data_type: ColumnType,
    /// Classification
    pub kind: ColumnKind,
}

impl ColumnDescriptor {
    /// True for columns outside the stable set.
    pub fn is_optional(&self) -> bool {
        !matches!(self.kind, ColumnKind::Stable { .. })
    }

    /// Element the column name references, if any.
    pub fn element(&self) -> Option<ElementRef> {
        match &self.kind {
            ColumnKind::Indexed { element, .. } => Some(*element),
            ColumnKind::OptionalCv {
                scope: OptScope::Element(element),
                ..
            }
            | ColumnKind::Optional {
                scope: OptScope::Element(element),
                ..
            } => Some(*element),
            _ => None,
        }
    }
}

/// Problems found while classifying a header. None of them stops the
/// classification of the remaining tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderProblem {
    /// Token is not stable, not indexed and lacks the `opt_` prefix
    NotOptional {
        /// Header token
        token: String,
    },
    /// Token looks like an indexed column but its id is malformed
    BadIndexed {
        /// Header token
        token: String,
        /// Family the token resembles
        family: IndexedFamily,
    },
    /// Stable column absent from the header
    MissingStable {
        /// Column name
        column: &'static str,
    },
    /// Token appears twice
    Duplicate {
        /// Header token
        token: String,
    },
}

/// Result of classifying one header line.
#[derive(Debug, Clone)]
pub struct HeaderBinding {
    /// Column model of the table
    pub factory: ColumnFactory,
    /// Header tokens in file order
    pub positions: PositionMap,
    /// Problems to report
    pub problems: Vec<HeaderProblem>,
}

/// Column model of one table.
///
/// Columns are kept in canonical write order: stable columns by their fixed
/// order, indexed columns by family then ascending id, optional columns in
/// first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFactory {
    table: TableKind,
    stable: Vec<ColumnDescriptor>,
    indexed: BTreeMap<(IndexedFamily, u32), ColumnDescriptor>,
    optional: Vec<ColumnDescriptor>,
}

impl ColumnFactory {
    /// Empty column model.
    pub fn new(table: TableKind) -> Self {
        Self {
            table,
            stable: Vec::new(),
            indexed: BTreeMap::new(),
            optional: Vec::new(),
        }
    }

    /// Column model declaring every stable column of a table.
    pub fn with_stable_columns(table: TableKind) -> Self {
        let mut factory = Self::new(table);
        for column in stable_columns(table) {
            factory.add(classify(table, column.name));
        }
        factory
    }

    /// Table this model belongs to.
    pub fn table(&self) -> TableKind {
        self.table
    }

    /// Every column in write order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.stable
            .iter()
            .chain(self.indexed.values())
            .chain(self.optional.iter())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.stable.len() + self.indexed.len() + self.optional.len()
    }

    /// True when no column is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a column by header token.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns().find(|c| c.name == name)
    }

    /// True when the table declares the column.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Optional columns in first-seen order.
    pub fn optional_columns(&self) -> &[ColumnDescriptor] {
        &self.optional
    }

    /// Elements referenced by indexed and scoped optional column names.
    pub fn referenced_elements(&self) -> Vec<ElementRef> {
        self.columns().filter_map(ColumnDescriptor::element).collect()
    }

    /// Add a column; returns `false` when a column with that name exists.
    ///
    /// Invalid columns are never stored.
    pub fn add(&mut self, descriptor: ColumnDescriptor) -> bool {
        if self.contains(&descriptor.name) {
            return false;
        }
        match &descriptor.kind {
            ColumnKind::Stable { order } => {
                let at = self
                    .stable
                    .iter()
                    .position(|c| matches!(c.kind, ColumnKind::Stable { order: o } if o > *order))
                    .unwrap_or(self.stable.len());
                self.stable.insert(at, descriptor);
            }
            ColumnKind::Indexed { family, element } => {
                let key = (*family, element.id);
                self.indexed.insert(key, descriptor);
            }
            ColumnKind::OptionalCv { .. } | ColumnKind::Optional { .. } | ColumnKind::Generic => {
                self.optional.push(descriptor)
            }
            ColumnKind::Invalid => return false,
        }
        true
    }

    /// Classify a header line (including its `SMH`/`SFH`/`SEH` prefix).
    pub fn from_header_line(table: TableKind, line: &str) -> HeaderBinding {
        let mut factory = Self::new(table);
        let mut positions = Vec::new();
        let mut problems = Vec::new();

        for token in line.split('\t').skip(1) {
            let token = token.trim();
            let descriptor = classify(table, token);
            match &descriptor.kind {
                ColumnKind::Invalid => {
                    let problem = IndexedFamily::for_table(table)
                        .iter()
                        .find(|f| token.starts_with(&format!("{}[", f.prefix())))
                        .map(|&family| HeaderProblem::BadIndexed {
                            token: token.to_string(),
                            family,
                        })
                        .unwrap_or_else(|| HeaderProblem::NotOptional {
                            token: token.to_string(),
                        });
                    problems.push(problem);
                }
                _ => {
                    if !factory.add(descriptor.clone()) {
                        problems.push(HeaderProblem::Duplicate {
                            token: token.to_string(),
                        });
                    }
                }
            }
            positions.push(descriptor);
        }

        for column in stable_columns(table) {
            if !factory.contains(column.name) {
                problems.push(HeaderProblem::MissingStable {
                    column: column.name,
                });
            }
        }

        HeaderBinding {
            factory,
            positions: PositionMap::new(table, positions),
            problems,
        }
    }

    /// Position map of the canonical write order.
    pub fn position_map(&self) -> PositionMap {
        PositionMap::new(self.table, self.columns().cloned().collect())
    }
}

/// Classify one header token for a table.
pub fn classify(table: TableKind, token: &str) -> ColumnDescriptor {
    if let Some(order) = stable_order(table, token) {
        return ColumnDescriptor {
            name: token.to_string(),
            data_type: stable_columns(table)[order].data_type,
            kind: ColumnKind::Stable { order },
        };
    }

    if let Some((name, id)) = split_indexed(token) {
        let family = IndexedFamily::for_table(table)
            .iter()
            .find(|f| f.prefix() == name);
        if let Some(&family) = family {
            return ColumnDescriptor {
                name: token.to_string(),
                data_type: ColumnType::Double,
                kind: ColumnKind::Indexed {
                    family,
                    element: ElementRef::new(family.element_type(), id),
                },
            };
        }
    }

    if token.starts_with(OPT_PREFIX) {
        return ColumnDescriptor {
            name: token.to_string(),
            data_type: ColumnType::Text,
            kind: classify_optional(token),
        };
    }

    ColumnDescriptor {
        name: token.to_string(),
        data_type: ColumnType::Text,
        kind: ColumnKind::Invalid,
    }
}

fn classify_optional(token: &str) -> ColumnKind {
    let Some(caps) = OPTIONAL_COLUMN.captures(token) else {
        return ColumnKind::Generic;
    };

    let scope = if &caps[1] == "global" {
        OptScope::Global
    } else {
        let element_type = caps.get(2).and_then(|m| ElementType::from_key(m.as_str()));
        let id = caps
            .get(3)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|&id| id > 0);
        match (element_type, id) {
            (Some(element_type), Some(id)) => OptScope::Element(ElementRef::new(element_type, id)),
            _ => return ColumnKind::Generic,
        }
    };

    match (caps.get(5), caps.get(6), caps.get(7)) {
        (Some(accession), Some(name), _) => ColumnKind::OptionalCv {
            scope,
            accession: accession.as_str().to_string(),
            cv_name: name.as_str().to_string(),
        },
        (_, _, Some(name)) => ColumnKind::Optional {
            scope,
            name: name.as_str().to_string(),
        },
        _ => ColumnKind::Generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(table: TableKind, extra: &[&str]) -> String {
        let mut tokens = vec![table.header_prefix()];
        tokens.extend(stable_columns(table).iter().map(|c| c.name));
        tokens.extend_from_slice(extra);
        tokens.join("\t")
    }

    #[test]
    fn test_cv_optional_column() {
        let descriptor = classify(TableKind::SmallMolecule, "opt_global_cv_MS:1000073_ESI");
        assert_eq!(
            descriptor.kind,
            ColumnKind::OptionalCv {
                scope: OptScope::Global,
                accession: "MS:1000073".to_string(),
                cv_name: "ESI".to_string(),
            }
        );
    }

    #[test]
    fn test_scoped_optional_column() {
        let descriptor = classify(TableKind::SmallMoleculeFeature, "opt_assay[2]_my_value");
        assert_eq!(
            descriptor.kind,
            ColumnKind::Optional {
                scope: OptScope::Element(ElementRef::new(ElementType::Assay, 2)),
                name: "my_value".to_string(),
            }
        );
        assert_eq!(descriptor.element(), Some(ElementRef::new(ElementType::Assay, 2)));
    }

    #[test]
    fn test_generic_optional_column() {
        assert_eq!(classify(TableKind::SmallMolecule, "opt_whatever").kind, ColumnKind::Generic);
        assert_eq!(
            classify(TableKind::SmallMolecule, "opt_spectrum[1]_x").kind,
            ColumnKind::Generic
        );
    }

    #[test]
    fn test_indexed_columns_are_table_specific() {
        let descriptor = classify(TableKind::SmallMolecule, "abundance_study_variable[1]");
        assert!(matches!(
            descriptor.kind,
            ColumnKind::Indexed {
                family: IndexedFamily::AbundanceStudyVariable,
                ..
            }
        ));
        assert_eq!(
            classify(TableKind::SmallMoleculeFeature, "abundance_study_variable[1]").kind,
            ColumnKind::Invalid
        );
    }

    #[test]
    fn test_header_classification_continues_after_problems() {
        let line = header(
            TableKind::SmallMolecule,
            &["bogus", "abundance_assay[x]", "abundance_assay[2]", "abundance_assay[1]", "opt_global_a"],
        );
        let binding = ColumnFactory::from_header_line(TableKind::SmallMolecule, &line);
        assert_eq!(
            binding.problems,
            vec![
                HeaderProblem::NotOptional {
                    token: "bogus".to_string()
                },
                HeaderProblem::BadIndexed {
                    token: "abundance_assay[x]".to_string(),
                    family: IndexedFamily::AbundanceAssay
                },
            ]
        );
        assert_eq!(binding.positions.len(), 13 + 5);

        let names: Vec<&str> = binding.factory.columns().skip(13).map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["abundance_assay[1]", "abundance_assay[2]", "opt_global_a"]);
    }

    #[test]
    fn test_missing_and_duplicate_columns() {
        let line = "SMH\tSML_ID\tSML_ID\topt_global_a";
        let binding = ColumnFactory::from_header_line(TableKind::SmallMolecule, line);
        assert!(binding.problems.contains(&HeaderProblem::Duplicate {
            token: "SML_ID".to_string()
        }));
        assert!(binding.problems.contains(&HeaderProblem::MissingStable {
            column: "SMF_ID_REFS"
        }));
    }

    #[test]
    fn test_stable_columns_sorted_regardless_of_header_order() {
        let line = "SFH\tcharge\tSMF_ID";
        let binding = ColumnFactory::from_header_line(TableKind::SmallMoleculeFeature, line);
        let names: Vec<&str> = binding.factory.columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["SMF_ID", "charge"]);
    }
}
