//! Binding data lines to the columns of their header.

use super::factory::{ColumnDescriptor, ColumnKind};
use crate::model::{ColumnType, Row, TableKind, Value};

/// Header tokens in file order. Position 0 of a line is its prefix and is
/// not part of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMap {
    table: TableKind,
    columns: Vec<ColumnDescriptor>,
}

/// A cell whose token does not parse as its column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    /// Column name
    pub column: String,
    /// Offending token
    pub token: String,
    /// Expected type
    pub expected: ColumnType,
}

/// A data line bound to a row. Cells that failed to parse are absent from
/// the row and listed in `errors`.
#[derive(Debug, Clone)]
pub struct BoundRow {
    /// Bound row
    pub row: Row,
    /// Cells that could not be parsed
    pub errors: Vec<CellError>,
}

/// Token count of a data line differs from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMismatch {
    /// Fields on the data line, prefix included
    pub found: usize,
    /// Fields on the header line, prefix included
    pub expected: usize,
}

impl PositionMap {
    pub(crate) fn new(table: TableKind, columns: Vec<ColumnDescriptor>) -> Self {
        Self { table, columns }
    }

    /// Table the header belongs to.
    pub fn table(&self) -> TableKind {
        self.table
    }

    /// Number of columns, prefix excluded.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True for a header without columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column at a 1-based line position.
    pub fn column_at(&self, position: usize) -> Option<&ColumnDescriptor> {
        position.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Columns in header order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Split a data line (prefix included) by tab and bind each token to
    /// its column. Null tokens bind to absent cells.
    pub fn split_and_bind(&self, line: &str, line_number: usize) -> Result<BoundRow, CountMismatch> {
        let tokens: Vec<&str> = line.split('\t').collect();
        let expected = self.columns.len() + 1;
        if tokens.len() != expected {
            return Err(CountMismatch {
                found: tokens.len(),
                expected,
            });
        }

        let mut row = Row::new(line_number);
        let mut errors = Vec::new();
        for (column, token) in self.columns.iter().zip(tokens.into_iter().skip(1)) {
            if column.kind == ColumnKind::Invalid {
                continue;
            }
            match Value::parse(token, column.data_type) {
                Ok(value) => row.set(column.name.clone(), value),
                Err(e) => errors.push(CellError {
                    column: column.name.clone(),
                    token: e.token,
                    expected: e.expected,
                }),
            }
        }
        Ok(BoundRow { row, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnFactory;

    fn feature_header() -> PositionMap {
        let line = "SFH\tSMF_ID\tSME_ID_REFS\texp_mass_to_charge\tabundance_assay[1]\topt_global_note";
        ColumnFactory::from_header_line(TableKind::SmallMoleculeFeature, line).positions
    }

    #[test]
    fn test_bind_row() {
        let map = feature_header();
        let bound = map
            .split_and_bind("SMF\t1\t1|2\t180.06\tNaN\tnull", 9)
            .unwrap();
        assert!(bound.errors.is_empty());
        let row = bound.row;
        assert_eq!(row.line_number, 9);
        assert_eq!(row.integer("SMF_ID"), Some(1));
        assert_eq!(row.integer_list("SME_ID_REFS"), vec![1, 2]);
        assert!(row.get("abundance_assay[1]").unwrap().as_double().unwrap().is_nan());
        assert!(row.get("opt_global_note").is_none());
    }

    #[test]
    fn test_count_mismatch() {
        let map = feature_header();
        let err = map.split_and_bind("SMF\t1\t1", 3).unwrap_err();
        assert_eq!(err, CountMismatch { found: 3, expected: 6 });
    }

    #[test]
    fn test_bad_cells_are_collected() {
        let map = feature_header();
        let bound = map.split_and_bind("SMF\tone\t1\tx\t1.0\tok", 4).unwrap();
        let columns: Vec<&str> = bound.errors.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["SMF_ID", "exp_mass_to_charge"]);
        assert!(bound.row.get("SMF_ID").is_none());
        assert_eq!(bound.row.get("opt_global_note"), Some(&Value::Text("ok".to_string())));
    }

    #[test]
    fn test_column_positions_are_one_based() {
        let map = feature_header();
        assert!(map.column_at(0).is_none());
        assert_eq!(map.column_at(1).map(|c| c.name.as_str()), Some("SMF_ID"));
    }
}
