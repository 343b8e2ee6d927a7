//! # Object model
//!
//! Plain data records for a parsed mzTab-M file. Metadata elements live in
//! per-type ordered maps keyed by id; everything else refers to them by
//! [`ElementRef`].

mod element;
mod metadata;
mod param;
mod table;
pub mod value;

pub use element::{split_indexed, ElementRef, ElementRefParseError, ElementType};
pub use metadata::{
    Assay, ColumnUnit, Contact, Cv, Database, IndexedParameter, Instrument, Metadata, MsRun,
    Publication, Sample, SampleProcessing, Software, StudyVariable, Uri,
};
pub use param::{Parameter, ParameterParseError};
pub use table::{Comment, MzTab, Row, Table, TableKind};
pub use value::{ColumnType, SpectraRef, Value, ValueParseError};
