use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[cfg(feature = "colorized_output")]
use console::style;

use super::diagnostic::{Category, Diagnostic, Level};
use super::collection::DiagnosticCollection;

/// Category as exposed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportCategory {
    /// Grammar problem in a field or line
    Format,
    /// Relationship between values violated
    Logical,
    /// Conflict with a CV mapping rule
    CrossCheck,
}

impl From<Category> for ReportCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Format => Self::Format,
            Category::Logical => Self::Logical,
            Category::CrossCheck => Self::CrossCheck,
        }
    }
}

/// Severity as exposed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportLevel {
    /// Informational
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

impl From<Level> for ReportLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Info => Self::Info,
            Level::Warn => Self::Warn,
            Level::Error => Self::Error,
        }
    }
}

/// One diagnostic flattened for external consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Source line, -1 when unknown
    pub line_number: i64,
    /// Diagnostic category
    pub category: ReportCategory,
    /// Diagnostic severity
    pub level: ReportLevel,
    /// Rendered message
    pub message: String,
    /// Stable numeric code
    pub code: u32,
}

impl From<&Diagnostic> for ReportEntry {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            line_number: diagnostic.line_number().map(|n| n as i64).unwrap_or(-1),
            category: diagnostic.category().into(),
            level: diagnostic.level().into(),
            message: diagnostic.message().to_string(),
            code: diagnostic.code(),
        }
    }
}

/// A rule whose evaluation could not complete.
#[derive(Debug, Clone, Serialize)]
pub struct UncheckedRule {
    /// Rule id from the mapping file
    pub rule_id: String,
    /// Why the rule could not be checked
    pub reason: String,
}

/// Complete report of one parse/validation run.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Path of the validated file
    pub file_path: String,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Minimum level that was recorded
    pub minimum_level: ReportLevel,
    /// Whether an object graph was produced
    pub parsed: bool,
    /// Fatal condition that aborted the run, if any
    pub aborted: Option<String>,
    /// Recorded diagnostics
    pub entries: Vec<ReportEntry>,
    /// Rules that could not be evaluated
    pub unchecked_rules: Vec<UncheckedRule>,
}

impl ValidationReport {
    /// Create an empty report for the given file path.
    pub fn new(file_path: impl Into<String>, minimum_level: Level) -> Self {
        Self {
            file_path: file_path.into(),
            generated_at: Utc::now(),
            minimum_level: minimum_level.into(),
            parsed: false,
            aborted: None,
            entries: Vec::new(),
            unchecked_rules: Vec::new(),
        }
    }

    /// Append every diagnostic of a collection.
    pub fn extend_from(&mut self, diagnostics: &DiagnosticCollection) {
        self.entries.extend(diagnostics.to_report_entries());
    }

    /// Number of entries at the given level.
    pub fn count(&self, level: ReportLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// True when the run must be considered failed.
    pub fn has_failures(&self) -> bool {
        self.aborted.is_some()
            || !self.unchecked_rules.is_empty()
            || self.count(ReportLevel::Error) > 0
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn summary_line(&self) -> String {
        format!(
            "{} errors, {} warnings, {} info",
            self.count(ReportLevel::Error),
            self.count(ReportLevel::Warn),
            self.count(ReportLevel::Info)
        )
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();

            output.push_str(&format!("{}\n", style("mzTab Validation Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("=======================").cyan()));
            output.push_str(&format!("{}: {}\n\n", style("File").bold(), self.file_path));

            if self.entries.is_empty() {
                output.push_str(&format!(
                    "{}\n",
                    style(format!("No diagnostics at or above {:?}.", self.minimum_level)).green()
                ));
            }
            for entry in &self.entries {
                let label = format!("[{:?}-{}]", entry.level, entry.code);
                let label = match entry.level {
                    ReportLevel::Info => style(label).blue(),
                    ReportLevel::Warn => style(label).yellow(),
                    ReportLevel::Error => style(label).red(),
                };
                output.push_str(&format!(
                    "{} line {}: {}\n",
                    label, entry.line_number, entry.message
                ));
            }
            for rule in &self.unchecked_rules {
                output.push_str(&format!(
                    "{} rule {}: {}\n",
                    style("[UNCHECKED]").magenta().bold(),
                    rule.rule_id,
                    rule.reason
                ));
            }

            output.push('\n');
            output.push_str(&format!("{}: {}\n", style("Summary").bold(), self.summary_line()));
            if let Some(reason) = &self.aborted {
                output.push_str(&format!("{} {}\n", style("Aborted:").red().bold(), reason));
            }
            if self.has_failures() {
                output.push_str(&format!("{}\n", style("Validation FAILED").red().bold()));
            } else {
                output.push_str(&format!("{}\n", style("Validation PASSED").green().bold()));
            }
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mzTab Validation Report")?;
        writeln!(f, "=======================")?;
        writeln!(f, "File: {}", self.file_path)?;
        writeln!(f)?;

        if self.entries.is_empty() {
            writeln!(f, "No diagnostics at or above {:?}.", self.minimum_level)?;
        }
        for entry in &self.entries {
            writeln!(
                f,
                "[{:?}-{}] line {}: {}",
                entry.level, entry.code, entry.line_number, entry.message
            )?;
        }
        for rule in &self.unchecked_rules {
            writeln!(f, "[UNCHECKED] rule {}: {}", rule.rule_id, rule.reason)?;
        }

        writeln!(f)?;
        writeln!(f, "Summary: {}", self.summary_line())?;
        if let Some(reason) = &self.aborted {
            writeln!(f, "Aborted: {}", reason)?;
        }
        if self.has_failures() {
            writeln!(f, "Validation FAILED")?;
        } else {
            writeln!(f, "Validation PASSED")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::catalog;

    #[test]
    fn test_entries_are_lossless() {
        let mut collection = DiagnosticCollection::default();
        collection
            .add(Diagnostic::new(&catalog::COUNT_MATCH, Some(12), &[&3, &"SMH", &4]))
            .unwrap();
        collection
            .add(Diagnostic::new(&catalog::NO_SMALL_MOLECULE_EVIDENCE_SECTION, None, &[]))
            .unwrap();

        let entries = collection.to_report_entries();
        assert_eq!(entries[0].line_number, 12);
        assert_eq!(entries[0].category, ReportCategory::Format);
        assert_eq!(entries[0].level, ReportLevel::Error);
        assert_eq!(entries[0].code, 1002);
        assert_eq!(entries[1].line_number, -1);
        assert_eq!(entries[1].level, ReportLevel::Info);
    }

    #[test]
    fn test_empty_report_says_so() {
        let report = ValidationReport::new("clean.mztab", Level::Info);
        let output = report.to_string();
        assert!(output.contains("No diagnostics at or above Info."));
        assert!(output.contains("Validation PASSED"));
    }

    #[test]
    fn test_unchecked_rules_fail_the_report() {
        let mut report = ValidationReport::new("x.mztab", Level::Warn);
        report.unchecked_rules.push(UncheckedRule {
            rule_id: "ms_run_format".to_string(),
            reason: "lookup timed out".to_string(),
        });
        assert!(report.has_failures());
        assert!(report.to_string().contains("[UNCHECKED] rule ms_run_format"));
    }

    #[test]
    fn test_json_output() {
        let report = ValidationReport::new("x.mztab", Level::Info);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"file_path\": \"x.mztab\""));
    }
}
