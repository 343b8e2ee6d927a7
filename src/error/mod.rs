//! # Diagnostics
//!
//! Leveled, capacity-bounded diagnostics shared by every stage of parsing and
//! validation.
//!
//! - [`DiagnosticType`]: static catalog entry (category, default level, code, template)
//! - [`Diagnostic`]: one occurrence bound to a line and to concrete values
//! - [`DiagnosticCollection`]: bounded, level-filtered list owned by one run
//! - [`ReportEntry`] / [`ValidationReport`]: flattened output for callers
//!
//! Data problems never surface as Rust errors. The only failure a collection
//! raises is [`DiagnosticOverflow`], which aborts the run that owns it.

pub mod catalog;
mod collection;
mod diagnostic;
mod report;

pub use collection::{DiagnosticCollection, DiagnosticOverflow, DEFAULT_MAX_DIAGNOSTICS};
pub use diagnostic::{Category, Diagnostic, DiagnosticType, Level};
pub use report::{ReportCategory, ReportEntry, ReportLevel, UncheckedRule, ValidationReport};
