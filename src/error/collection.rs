use std::fmt;

use super::diagnostic::{Diagnostic, Level};
use super::report::ReportEntry;

/// Default capacity of a [`DiagnosticCollection`].
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 300;

/// Raised when a collection would grow past its capacity.
///
/// This aborts the current parse or validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("diagnostic limit of {max_count} reached; run aborted")]
pub struct DiagnosticOverflow {
    /// Capacity of the collection that overflowed
    pub max_count: usize,
}

/// Bounded, level-filtered, ordered list of diagnostics for one run.
#[derive(Debug, Clone)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
    max_count: usize,
    minimum_level: Level,
}

impl Default for DiagnosticCollection {
    fn default() -> Self {
        Self::new(Level::Info, DEFAULT_MAX_DIAGNOSTICS)
    }
}

impl DiagnosticCollection {
    /// Create an empty collection.
    pub fn new(minimum_level: Level, max_count: usize) -> Self {
        Self {
            diagnostics: Vec::new(),
            max_count,
            minimum_level,
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `Ok(false)` without touching the collection when the diagnostic
    /// is below the minimum level, `Ok(true)` when it was appended.
    pub fn add(&mut self, diagnostic: Diagnostic) -> Result<bool, DiagnosticOverflow> {
        if diagnostic.level() < self.minimum_level {
            return Ok(false);
        }
        if self.diagnostics.len() >= self.max_count {
            return Err(DiagnosticOverflow {
                max_count: self.max_count,
            });
        }
        self.diagnostics.push(diagnostic);
        Ok(true)
    }

    /// Add several diagnostics with the same per-item semantics as [`Self::add`].
    ///
    /// Returns whether at least one diagnostic was appended.
    pub fn add_all<I>(&mut self, diagnostics: I) -> Result<bool, DiagnosticOverflow>
    where
        I: IntoIterator<Item = Diagnostic>,
    {
        let mut added = false;
        for diagnostic in diagnostics {
            added |= self.add(diagnostic)?;
        }
        Ok(added)
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Capacity.
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Minimum level a diagnostic needs to be recorded.
    pub fn minimum_level(&self) -> Level {
        self.minimum_level
    }

    /// Iterate the recorded diagnostics in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of diagnostics at exactly `level`.
    pub fn count_at(&self, level: Level) -> usize {
        self.diagnostics.iter().filter(|d| d.level() == level).count()
    }

    /// True when any Error-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level() == Level::Error)
    }

    /// Convert into report entries for external consumption.
    pub fn to_report_entries(&self) -> Vec<ReportEntry> {
        self.diagnostics.iter().map(ReportEntry::from).collect()
    }

    /// Take ownership of the recorded diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl fmt::Display for DiagnosticCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, diagnostic) in self.diagnostics.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::catalog;
    use proptest::prelude::*;

    fn error() -> Diagnostic {
        Diagnostic::new(&catalog::LINE_PREFIX, Some(1), &[&"XXX"])
    }

    fn info() -> Diagnostic {
        Diagnostic::new(&catalog::NO_SMALL_MOLECULE_FEATURE_SECTION, None, &[])
    }

    #[test]
    fn test_below_minimum_is_dropped() {
        let mut collection = DiagnosticCollection::new(Level::Warn, 1);
        assert_eq!(collection.add(info()), Ok(false));
        assert!(collection.is_empty());
        assert_eq!(collection.add(error()), Ok(true));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_overflow_keeps_capacity() {
        let mut collection = DiagnosticCollection::new(Level::Info, 2);
        collection.add(error()).unwrap();
        collection.add(error()).unwrap();
        assert_eq!(collection.add(error()), Err(DiagnosticOverflow { max_count: 2 }));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_add_all_reports_if_any_added() {
        let mut collection = DiagnosticCollection::new(Level::Error, 10);
        assert_eq!(collection.add_all(vec![info(), info()]), Ok(false));
        assert_eq!(collection.add_all(vec![info(), error()]), Ok(true));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_display_joins_lines() {
        let mut collection = DiagnosticCollection::default();
        collection.add(error()).unwrap();
        collection.add(info()).unwrap();
        let rendered = collection.to_string();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.lines().nth(1).unwrap().starts_with("[Info-2011]"));
    }

    proptest! {
        #[test]
        fn prop_overflow_on_exactly_max_plus_one(max in 1usize..40, filtered in 0usize..20) {
            let mut collection = DiagnosticCollection::new(Level::Warn, max);
            for _ in 0..filtered {
                prop_assert_eq!(collection.add(info()), Ok(false));
            }
            for _ in 0..max {
                prop_assert_eq!(collection.add(error()), Ok(true));
            }
            prop_assert!(collection.add(error()).is_err());
            prop_assert_eq!(collection.len(), max);
        }
    }
}
