//! # Column model
//!
//! Stable column sets per table, header classification into stable,
//! indexed-element and optional columns, and positional binding of data
//! lines. This layer only classifies; diagnostics and registry updates are
//! the parser's job.

mod factory;
mod position;
pub mod stable;

pub use factory::{
    classify, ColumnDescriptor, ColumnFactory, ColumnKind, HeaderBinding, HeaderProblem, OptScope,
    OPT_PREFIX,
};
pub use position::{BoundRow, CellError, CountMismatch, PositionMap};
pub use stable::{stable_columns, IndexedFamily, StableColumn};
