//! # mztab - mzTab-M Reader, Validator and Writer
//!
//! `mztab` reads the tab-delimited mzTab-M 2.0 format used to report
//! metabolomics results, checks it for format, logical and cross-reference
//! problems, evaluates controlled-vocabulary mapping rules against its
//! metadata, and writes it back in canonical layout.
//!
//! ## Key Features
//!
//! - **Leveled diagnostics**: every data problem is a [`error::Diagnostic`]
//!   with a category, a level and a line number, collected into a bounded
//!   [`error::DiagnosticCollection`]. Only structural faults abort a run.
//!
//! - **Forward references**: indexed elements such as `assay[3]` may be
//!   mentioned before they are defined; definitions and references resolve
//!   to the same registry entry.
//!
//! - **CV mapping rules**: PSI CvMapping XML or JSON rule sets with
//!   AND/OR/XOR logic, evaluated against an injectable term lookup.
//!
//! - **Round-trip writing**: `parse(write(parse(f))) == parse(f)`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mztab::parser::{parse_file, ParseOptions};
//! use mztab::writer::{to_string, WriterConfig};
//!
//! let outcome = parse_file("study.mztab", &ParseOptions::default())?;
//! for diagnostic in &outcome.diagnostics {
//!     println!("{}", diagnostic);
//! }
//!
//! if let Some(mztab) = outcome.file {
//!     println!("{} ms runs", mztab.metadata.ms_run.len());
//!     let text = to_string(&mztab, &WriterConfig::default())?;
//!     println!("{}", text);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`error`]: diagnostic catalog, bounded collection and reports
//! - [`model`]: metadata elements, parameters, typed cell values and tables
//! - [`columns`]: stable and optional column model per table
//! - [`parser`]: section state machine and line handlers
//! - [`validator`]: cross-reference integrity and CV rule validation
//! - [`cvmapping`]: rule sets, ontology lookup and combination logic
//! - [`writer`]: canonical serializer

#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod columns;
mod context;
pub mod cvmapping;
pub mod error;
pub mod model;
pub mod parser;
pub mod validator;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::cvmapping::{load_file, Ontology, RuleSet, TermLookup, TimedLookup};
    pub use crate::error::{
        Diagnostic, DiagnosticCollection, Level, ValidationReport, DEFAULT_MAX_DIAGNOSTICS,
    };
    pub use crate::model::{ElementRef, ElementType, Metadata, MzTab, Parameter, Table, TableKind};
    pub use crate::parser::{parse, parse_file, parse_str, ParseOptions, ParseOutcome};
    pub use crate::validator::{validate, TermStrictness, ValidationOptions};
    pub use crate::writer::{to_string, write_file, MzTabWriter, WriterConfig};
}
