//! # mzTab-M parser
//!
//! A section-aware state machine turns the line stream into metadata,
//! comments and typed table rows:
//!
//! 1. Each non-empty line is classified by its prefix ([`Section`]).
//! 2. Section levels must never decrease; headers come before their data
//!    and appear once per table.
//! 3. Metadata lines fill the element registry, header lines build the
//!    column model, data lines are bound positionally.
//! 4. After the last line a refinement pass checks the metadata, then the
//!    cross-reference checker runs on the assembled file.
//!
//! Per-line problems are recorded as diagnostics and parsing continues.
//! Ordering violations, duplicate or missing headers, unknown prefixes and
//! diagnostic overflow abort the run.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mztab::parser::{parse_file, ParseOptions};
//!
//! let outcome = parse_file("study.mztab", &ParseOptions::default())?;
//! for diagnostic in &outcome.diagnostics {
//!     println!("{}", diagnostic);
//! }
//! if let Some(file) = outcome.file {
//!     println!("{} assays", file.metadata.assay.len());
//! }
//! # Ok::<(), mztab::parser::ParseError>(())
//! ```

mod metadata_line;
mod refine;
mod section;
mod table_line;

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::ops::ControlFlow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};

pub use section::Section;

use crate::context::ParserContext;
use crate::error::{
    catalog, Diagnostic, DiagnosticCollection, DiagnosticOverflow, DiagnosticType, Level,
    DEFAULT_MAX_DIAGNOSTICS,
};
use crate::model::{Comment, MzTab, TableKind};
use crate::validator::crosscheck;
use table_line::TableState;

/// Errors that prevent reading the input at all.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Underlying I/O failure, including invalid UTF-8
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a single line failed.
#[derive(Debug)]
pub enum LineFault {
    /// Recorded; parsing continues with the next line
    Line(Diagnostic),
    /// Recorded; the run stops
    Fatal(Diagnostic),
    /// The diagnostic collection is full; the run stops
    Overflow(DiagnosticOverflow),
}

impl LineFault {
    fn line(kind: &'static DiagnosticType, line_number: usize, values: &[&dyn fmt::Display]) -> Self {
        Self::Line(Diagnostic::new(kind, Some(line_number), values))
    }

    fn fatal(kind: &'static DiagnosticType, line_number: usize, values: &[&dyn fmt::Display]) -> Self {
        Self::Fatal(Diagnostic::new(kind, Some(line_number), values))
    }
}

impl From<DiagnosticOverflow> for LineFault {
    fn from(overflow: DiagnosticOverflow) -> Self {
        Self::Overflow(overflow)
    }
}

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Diagnostics below this level are dropped
    pub minimum_level: Level,
    /// Capacity of the diagnostic collection
    pub max_diagnostics: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            minimum_level: Level::Info,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }
}

impl ParseOptions {
    /// Options with the given level and capacity.
    pub fn new(minimum_level: Level, max_diagnostics: usize) -> Self {
        Self {
            minimum_level,
            max_diagnostics,
        }
    }
}

/// Result of one parse run.
#[derive(Debug)]
pub struct ParseOutcome {
    /// The parsed file; `None` after an Error-level diagnostic or a fatal condition
    pub file: Option<MzTab>,
    /// Diagnostics at or above the minimum level, in the order they were raised
    pub diagnostics: DiagnosticCollection,
    /// The condition that aborted the run, if any
    pub fatal: Option<Diagnostic>,
    /// Set when the run stopped because the collection was full
    pub overflow: Option<DiagnosticOverflow>,
}

impl ParseOutcome {
    /// True when the run stopped early.
    pub fn is_aborted(&self) -> bool {
        self.fatal.is_some() || self.overflow.is_some()
    }

    /// Split into the parsed file and its diagnostics.
    pub fn into_parts(self) -> (Option<MzTab>, DiagnosticCollection) {
        (self.file, self.diagnostics)
    }
}

/// Parse mzTab-M text.
pub fn parse_str(text: &str, options: &ParseOptions) -> ParseOutcome {
    let mut dispatcher = LineDispatcher::new(options);
    for (index, line) in text.lines().enumerate() {
        if dispatcher.feed(index + 1, line).is_break() {
            break;
        }
    }
    dispatcher.finish()
}

/// Parse mzTab-M from a buffered reader.
pub fn parse<R: BufRead>(reader: R, options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    let mut dispatcher = LineDispatcher::new(options);
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if dispatcher.feed(index + 1, &line).is_break() {
            break;
        }
    }
    Ok(dispatcher.finish())
}

/// Parse an mzTab-M file; gzip-compressed input is detected by its magic bytes.
pub fn parse_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    let path = path.as_ref();
    info!("Parsing {}", path.display());
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    let file = File::open(path)?;

    if read == 2 && magic == [0x1f, 0x8b] {
        debug!("{} is gzip compressed", path.display());
        parse(BufReader::new(MultiGzDecoder::new(file)), options)
    } else {
        parse(BufReader::new(file), options)
    }
}

/// Line-by-line state of one parse.
struct LineDispatcher {
    context: ParserContext,
    diagnostics: DiagnosticCollection,
    comments: Vec<Comment>,
    tables: BTreeMap<TableKind, TableState>,
    high_water_mark: u8,
    last_section: Option<Section>,
    fatal: Option<Diagnostic>,
    overflow: Option<DiagnosticOverflow>,
    #[cfg(test)]
    fail_on_line: Option<usize>,
}

impl LineDispatcher {
    fn new(options: &ParseOptions) -> Self {
        Self {
            context: ParserContext::new(),
            diagnostics: DiagnosticCollection::new(options.minimum_level, options.max_diagnostics),
            comments: Vec::new(),
            tables: BTreeMap::new(),
            high_water_mark: 0,
            last_section: None,
            fatal: None,
            overflow: None,
            #[cfg(test)]
            fail_on_line: None,
        }
    }

    /// Process one line; `Break` once the run is aborted.
    fn feed(&mut self, line_number: usize, line: &str) -> ControlFlow<()> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return ControlFlow::Continue(());
        }

        let result = catch_unwind(AssertUnwindSafe(|| self.dispatch(line_number, line)))
            .unwrap_or_else(|_| {
                warn!("unexpected fault while handling line {}", line_number);
                Err(LineFault::line(
                    &catalog::NULL,
                    line_number,
                    &[&metadata_line::excerpt(line)],
                ))
            });

        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(fault) => self.record(fault),
        }
    }

    fn record(&mut self, fault: LineFault) -> ControlFlow<()> {
        match fault {
            LineFault::Line(diagnostic) => match self.diagnostics.add(diagnostic) {
                Ok(_) => ControlFlow::Continue(()),
                Err(overflow) => {
                    self.overflow = Some(overflow);
                    ControlFlow::Break(())
                }
            },
            LineFault::Fatal(diagnostic) => {
                warn!("parse aborted: {}", diagnostic);
                if let Err(overflow) = self.diagnostics.add(diagnostic.clone()) {
                    self.overflow = Some(overflow);
                }
                self.fatal = Some(diagnostic);
                ControlFlow::Break(())
            }
            LineFault::Overflow(overflow) => {
                warn!("parse aborted: {}", overflow);
                self.overflow = Some(overflow);
                ControlFlow::Break(())
            }
        }
    }

    fn dispatch(&mut self, line_number: usize, line: &str) -> Result<(), LineFault> {
        #[cfg(test)]
        if self.fail_on_line == Some(line_number) {
            panic!("handler failure on line {}", line_number);
        }

        let Some(section) = Section::of_line(line) else {
            let prefix = line.split('\t').next().unwrap_or_default();
            return Err(LineFault::fatal(&catalog::LINE_PREFIX, line_number, &[&prefix]));
        };

        if section == Section::Comment {
            let text = line
                .strip_prefix("COM")
                .map(|rest| rest.strip_prefix('\t').unwrap_or(rest))
                .unwrap_or(line);
            self.comments.push(Comment {
                line_number,
                text: text.to_string(),
            });
            return Ok(());
        }

        if section.is_header() {
            if let Some(state) = section.table().and_then(|t| self.tables.get(&t)) {
                return Err(LineFault::fatal(
                    &catalog::HEADER_LINE,
                    line_number,
                    &[&section, &state.header_line],
                ));
            }
        }

        if section.level() < self.high_water_mark {
            let previous = self.last_section.unwrap_or(section);
            return Err(LineFault::fatal(
                &catalog::LINE_ORDER,
                line_number,
                &[&section, &previous],
            ));
        }

        if self.last_section != Some(section) {
            debug!("entering {} section on line {}", section.name(), line_number);
        }
        self.last_section = Some(section);

        match section {
            Section::Comment => Ok(()),
            Section::Metadata => {
                self.high_water_mark = section.level();
                metadata_line::handle(&mut self.context, line, line_number)
            }
            Section::SmallMoleculeHeader
            | Section::SmallMoleculeFeatureHeader
            | Section::SmallMoleculeEvidenceHeader => {
                let table = section.table().unwrap_or(TableKind::SmallMolecule);
                self.high_water_mark = Section::data_of(table).level();
                let state = TableState::from_header(
                    table,
                    line,
                    line_number,
                    &mut self.context,
                    &mut self.diagnostics,
                )?;
                self.tables.insert(table, state);
                Ok(())
            }
            Section::SmallMolecule | Section::SmallMoleculeFeature | Section::SmallMoleculeEvidence => {
                let table = section.table().unwrap_or(TableKind::SmallMolecule);
                let Some(state) = self.tables.get_mut(&table) else {
                    return Err(LineFault::fatal(
                        &catalog::NO_HEADER_LINE,
                        line_number,
                        &[&section, &Section::header_of(table)],
                    ));
                };
                self.high_water_mark = section.level();
                state.push_data_line(line, line_number, &mut self.context, &mut self.diagnostics)
            }
        }
    }

    fn finish(mut self) -> ParseOutcome {
        if self.fatal.is_none() && self.overflow.is_none() {
            if let Err(fault) = refine::refine(&self.context, &mut self.diagnostics) {
                let _ = self.record(fault);
            }
        }

        let mut file = None;
        if self.fatal.is_none() && self.overflow.is_none() {
            let mut mztab = MzTab {
                metadata: self.context.into_metadata(),
                comments: self.comments,
                ..Default::default()
            };
            for (kind, state) in self.tables {
                *mztab.table_slot(kind) = Some(state.table);
            }

            match crosscheck::check(&mztab, &mut self.diagnostics) {
                Ok(()) if !self.diagnostics.has_errors() => file = Some(mztab),
                Ok(()) => {}
                Err(overflow) => self.overflow = Some(overflow),
            }
        }

        info!(
            "Parse finished: {} diagnostics, {}",
            self.diagnostics.len(),
            if file.is_some() { "file accepted" } else { "no file produced" }
        );

        ParseOutcome {
            file,
            diagnostics: self.diagnostics,
            fatal: self.fatal,
            overflow: self.overflow,
        }
    }
}

#[cfg(test)]
mod tests;
