use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic.
///
/// Ordered so that `Info < Warn < Error`, which is what the collection's
/// minimum-level filter relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// Informational, the format says MAY or RECOMMENDED
    Info,
    /// Should be fixed, the format says SHOULD
    Warn,
    /// Must be fixed, the format says MUST
    Error,
}

impl Level {
    /// Parse a level from a config or CLI string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What kind of rule a diagnostic reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// A single field or line does not follow its grammar
    Format,
    /// Well-formed values violate a relationship the format requires
    Logical,
    /// A value conflicts with an external CV mapping rule
    CrossCheck,
}

impl Category {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Format => "Format",
            Self::Logical => "Logical",
            Self::CrossCheck => "CrossCheck",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Static description of one kind of diagnostic.
///
/// Instances live in [`super::catalog`] and are never mutated.
#[derive(Debug, PartialEq, Eq)]
pub struct DiagnosticType {
    /// Stable numeric code
    pub code: u32,
    /// Category of the rule being reported
    pub category: Category,
    /// Default severity
    pub level: Level,
    /// Short identifier, e.g. `LinePrefix`
    pub name: &'static str,
    /// Message template with `{0}`, `{1}`, ... placeholders
    pub template: &'static str,
    /// Optional explanation of the cause
    pub cause: Option<&'static str>,
}

impl DiagnosticType {
    /// Number of positional values the template needs (highest placeholder + 1).
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut rest = self.template;
        while let Some(open) = rest.find('{') {
            rest = &rest[open + 1..];
            let Some(close) = rest.find('}') else {
                break;
            };
            if let Ok(index) = rest[..close].parse::<usize>() {
                count = count.max(index + 1);
            }
            rest = &rest[close + 1..];
        }
        count
    }

    fn render(&self, values: &[&dyn fmt::Display]) -> String {
        let mut message = self.template.to_string();
        for (index, value) in values.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", index), &value.to_string());
        }
        message
    }
}

/// One occurrence of a [`DiagnosticType`], bound to a line and to concrete values.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    kind: &'static DiagnosticType,
    level: Level,
    line_number: Option<usize>,
    message: String,
}

impl Diagnostic {
    /// Bind a diagnostic type to an occurrence.
    ///
    /// # Panics
    ///
    /// Panics when fewer values are supplied than the template has
    /// placeholders. That is a programming error, not a data error.
    pub fn new(
        kind: &'static DiagnosticType,
        line_number: Option<usize>,
        values: &[&dyn fmt::Display],
    ) -> Self {
        let needed = kind.placeholder_count();
        assert!(
            values.len() >= needed,
            "diagnostic {} ({}) needs {} values, got {}",
            kind.code,
            kind.name,
            needed,
            values.len()
        );
        Self {
            kind,
            level: kind.level,
            line_number,
            message: kind.render(values),
        }
    }

    /// Override the severity, used when the level comes from rule configuration.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// The diagnostic type this occurrence belongs to.
    pub fn kind(&self) -> &'static DiagnosticType {
        self.kind
    }

    /// Stable numeric code.
    pub fn code(&self) -> u32 {
        self.kind.code
    }

    /// Category of the diagnostic.
    pub fn category(&self) -> Category {
        self.kind.category
    }

    /// Effective severity.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Source line, `None` when the diagnostic is not tied to a line.
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    /// Message with all placeholders substituted.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional cause text from the catalog.
    pub fn cause(&self) -> Option<&'static str> {
        self.kind.cause
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line_number.map(|n| n as i64).unwrap_or(-1);
        write!(
            f,
            "[{}-{}] line {}: {}",
            self.level, self.kind.code, line, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::catalog;

    #[test]
    fn test_placeholder_count() {
        assert_eq!(catalog::LINE_PREFIX.placeholder_count(), 1);
        assert_eq!(catalog::COUNT_MATCH.placeholder_count(), 3);
        // repeated placeholder counts once
        assert_eq!(catalog::HASH_METHOD_NOT_DEFINED.placeholder_count(), 1);
    }

    #[test]
    fn test_render_and_display() {
        let diagnostic = Diagnostic::new(&catalog::LINE_PREFIX, Some(7), &[&"XYZ"]);
        assert_eq!(diagnostic.code(), catalog::LINE_PREFIX.code);
        assert!(diagnostic.message().contains("\"XYZ\""));
        let rendered = diagnostic.to_string();
        assert!(rendered.starts_with("[Error-1001] line 7: "));
    }

    #[test]
    fn test_unknown_line_renders_minus_one() {
        let diagnostic = Diagnostic::new(&catalog::NO_SMALL_MOLECULE_FEATURE_SECTION, None, &[]);
        assert!(diagnostic.to_string().contains("line -1:"));
    }

    #[test]
    #[should_panic(expected = "needs 3 values")]
    fn test_missing_values_is_a_programming_error() {
        let _ = Diagnostic::new(&catalog::COUNT_MATCH, Some(1), &[&1]);
    }

    #[test]
    fn test_level_override() {
        let diagnostic = Diagnostic::new(&catalog::CV_TERM_REQUIRED, None, &[&"r", &"MS:1", &"p"])
            .with_level(Level::Info);
        assert_eq!(diagnostic.level(), Level::Info);
    }

    #[test]
    fn test_level_ordering_and_parse() {
        assert!(Level::Info < Level::Warn && Level::Warn < Level::Error);
        assert_eq!(Level::parse("WARNING"), Some(Level::Warn));
        assert_eq!(Level::parse("fatal"), None);
    }
}
