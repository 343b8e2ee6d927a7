//! Parsed tables and the complete in-memory file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use super::value::Value;
use crate::columns::ColumnFactory;

/// The three data tables of an mzTab-M file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableKind {
    /// Small molecule summary (SMH/SML)
    SmallMolecule,
    /// Small molecule feature (SFH/SMF)
    SmallMoleculeFeature,
    /// Small molecule evidence (SEH/SME)
    SmallMoleculeEvidence,
}

impl TableKind {
    /// All tables in file order.
    pub const ALL: [TableKind; 3] = [
        Self::SmallMolecule,
        Self::SmallMoleculeFeature,
        Self::SmallMoleculeEvidence,
    ];

    /// Name used by `colunit-<name>` and `<name>-quantification_unit` keys.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SmallMolecule => "small_molecule",
            Self::SmallMoleculeFeature => "small_molecule_feature",
            Self::SmallMoleculeEvidence => "small_molecule_evidence",
        }
    }

    /// Resolve a table name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Header line prefix.
    pub fn header_prefix(&self) -> &'static str {
        match self {
            Self::SmallMolecule => "SMH",
            Self::SmallMoleculeFeature => "SFH",
            Self::SmallMoleculeEvidence => "SEH",
        }
    }

    /// Data line prefix.
    pub fn data_prefix(&self) -> &'static str {
        match self {
            Self::SmallMolecule => "SML",
            Self::SmallMoleculeFeature => "SMF",
            Self::SmallMoleculeEvidence => "SME",
        }
    }

    /// Column holding the row id.
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::SmallMolecule => "SML_ID",
            Self::SmallMoleculeFeature => "SMF_ID",
            Self::SmallMoleculeEvidence => "SME_ID",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One data row; cells are keyed by column name and absent cells are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    /// Source line, 0 for rows built in memory
    pub line_number: usize,
    /// Bound cells
    pub cells: BTreeMap<String, Value>,
}

// Line numbers move when a file is rewritten; they are not part of row identity.
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Row {
    /// Create an empty row for a source line.
    pub fn new(line_number: usize) -> Self {
        Self {
            line_number,
            cells: BTreeMap::new(),
        }
    }

    /// Cell value, `None` when absent.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Set a cell, removing it when `value` is `None`.
    pub fn set(&mut self, column: impl Into<String>, value: Option<Value>) {
        let column = column.into();
        match value {
            Some(value) => {
                self.cells.insert(column, value);
            }
            None => {
                self.cells.remove(&column);
            }
        }
    }

    /// Integer cell content.
    pub fn integer(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_integer)
    }

    /// Integer items of a list cell; null items are skipped.
    pub fn integer_list(&self, column: &str) -> Vec<i64> {
        self.get(column)
            .and_then(Value::as_list)
            .map(|items| items.iter().flatten().filter_map(Value::as_integer).collect())
            .unwrap_or_default()
    }
}

/// A comment line, kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Source line
    pub line_number: usize,
    /// Text after the `COM` prefix, or the whole `#` line
    pub text: String,
}

impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

/// A parsed table: its column model and its rows in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Which table this is
    pub kind: TableKind,
    /// Columns bound from the header
    pub columns: ColumnFactory,
    /// Data rows
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table without rows.
    pub fn new(kind: TableKind, columns: ColumnFactory) -> Self {
        Self {
            kind,
            columns,
            rows: Vec::new(),
        }
    }

    /// Ids of every row that has one.
    pub fn row_ids(&self) -> Vec<i64> {
        let id_column = self.kind.id_column();
        self.rows.iter().filter_map(|r| r.integer(id_column)).collect()
    }
}

/// A fully parsed mzTab-M file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MzTab {
    /// Metadata section
    pub metadata: Metadata,
    /// Comment lines
    pub comments: Vec<Comment>,
    /// SMH/SML
    pub small_molecule_summary: Option<Table>,
    /// SFH/SMF
    pub small_molecule_feature: Option<Table>,
    /// SEH/SME
    pub small_molecule_evidence: Option<Table>,
}

impl MzTab {
    /// Table of the given kind, if the file has it.
    pub fn table(&self, kind: TableKind) -> Option<&Table> {
        match kind {
            TableKind::SmallMolecule => self.small_molecule_summary.as_ref(),
            TableKind::SmallMoleculeFeature => self.small_molecule_feature.as_ref(),
            TableKind::SmallMoleculeEvidence => self.small_molecule_evidence.as_ref(),
        }
    }

    pub(crate) fn table_slot(&mut self, kind: TableKind) -> &mut Option<Table> {
        match kind {
            TableKind::SmallMolecule => &mut self.small_molecule_summary,
            TableKind::SmallMoleculeFeature => &mut self.small_molecule_feature,
            TableKind::SmallMoleculeEvidence => &mut self.small_molecule_evidence,
        }
    }

    /// Present tables in file order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        TableKind::ALL.into_iter().filter_map(|kind| self.table(kind))
    }
}
