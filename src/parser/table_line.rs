//! Header and data line handling for the three small molecule tables.

use log::debug;

use super::LineFault;
use crate::columns::{CellError, ColumnFactory, HeaderProblem, PositionMap};
use crate::context::ParserContext;
use crate::error::{catalog, Diagnostic, DiagnosticCollection};
use crate::model::{ColumnType, Table, TableKind, Value};

/// A table whose header has been read.
#[derive(Debug)]
pub(super) struct TableState {
    pub(super) table: Table,
    pub(super) positions: PositionMap,
    pub(super) header_line: usize,
}

impl TableState {
    /// Classify a header line, report its problems and register the
    /// elements its column names reference.
    pub(super) fn from_header(
        kind: TableKind,
        line: &str,
        line_number: usize,
        context: &mut ParserContext,
        diagnostics: &mut DiagnosticCollection,
    ) -> Result<Self, LineFault> {
        let binding = ColumnFactory::from_header_line(kind, line);
        let header = kind.header_prefix();

        for problem in &binding.problems {
            let diagnostic = match problem {
                HeaderProblem::NotOptional { token } => Diagnostic::new(
                    &catalog::OPTIONAL_COLUMN,
                    Some(line_number),
                    &[token, &kind],
                ),
                HeaderProblem::BadIndexed { token, family } => Diagnostic::new(
                    &catalog::INDEXED_COLUMN,
                    Some(line_number),
                    &[token, &kind, &family.prefix()],
                ),
                HeaderProblem::MissingStable { column } => Diagnostic::new(
                    &catalog::STABLE_COLUMN,
                    Some(line_number),
                    &[&header, column],
                ),
                HeaderProblem::Duplicate { token } => Diagnostic::new(
                    &catalog::DUPLICATE_COLUMN,
                    Some(line_number),
                    &[token, &header],
                ),
            };
            diagnostics.add(diagnostic)?;
        }

        for element in binding.factory.referenced_elements() {
            context.get_or_create(element, Some(line_number));
        }

        debug!(
            "{} header on line {}: {} columns, {} optional",
            header,
            line_number,
            binding.factory.len(),
            binding.factory.optional_columns().len()
        );

        Ok(Self {
            table: Table::new(kind, binding.factory),
            positions: binding.positions,
            header_line: line_number,
        })
    }

    /// Bind a data line and append it as a row.
    pub(super) fn push_data_line(
        &mut self,
        line: &str,
        line_number: usize,
        context: &mut ParserContext,
        diagnostics: &mut DiagnosticCollection,
    ) -> Result<(), LineFault> {
        let kind = self.table.kind;
        let bound = self.positions.split_and_bind(line, line_number).map_err(|m| {
            LineFault::line(
                &catalog::COUNT_MATCH,
                line_number,
                &[&m.found, &kind.header_prefix(), &m.expected],
            )
        })?;

        for error in &bound.errors {
            diagnostics.add(cell_diagnostic(error, line_number))?;
        }

        for value in bound.row.cells.values() {
            register_spectra_refs(value, context, line_number);
        }

        self.table.rows.push(bound.row);
        Ok(())
    }
}

fn register_spectra_refs(value: &Value, context: &mut ParserContext, line_number: usize) {
    match value {
        Value::SpectraRef(r) => {
            context.get_or_create(r.ms_run_ref(), Some(line_number));
        }
        Value::List(items) => {
            for item in items.iter().flatten() {
                register_spectra_refs(item, context, line_number);
            }
        }
        _ => {}
    }
}

fn cell_diagnostic(error: &CellError, line_number: usize) -> Diagnostic {
    let kind = match error.expected {
        ColumnType::Integer | ColumnType::IntegerList => &catalog::INTEGER,
        ColumnType::Double | ColumnType::DoubleList => &catalog::DOUBLE,
        ColumnType::Parameter => &catalog::PARAM,
        ColumnType::SpectraRefList => &catalog::SPECTRA_REF,
        ColumnType::Text | ColumnType::TextList => &catalog::INVALID_VALUE,
    };
    Diagnostic::new(
        kind,
        Some(line_number),
        &[&error.column, &error.token, &"unparseable text"],
    )
}
