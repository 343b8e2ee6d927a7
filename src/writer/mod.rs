//! # mzTab-M Writer Module
//!
//! Serializes an [`crate::model::MzTab`] back to tab-separated text.
//!
//! ## Design Principles
//!
//! 1. **Round-trip stable**: parsing the output of the writer yields a file
//!    equal to the one written (line numbers aside).
//!
//! 2. **Canonical order**: metadata keys follow the element order of the
//!    format; table columns are stable first, then indexed by ascending id,
//!    then optional columns in the order they were first seen.
//!
//! 3. **No quoting**: fields are written verbatim; commas inside parameter
//!    names are protected by the parameter syntax itself.

mod config;
mod error;
mod metadata;
mod stats;
mod writer_impl;


pub use config::{CompressionType, WriterConfig};
pub use error::WriterError;
pub use stats::WriterStats;
pub use writer_impl::{to_string, write_file, MzTabWriter};
