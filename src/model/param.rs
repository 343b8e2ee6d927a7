//! Controlled vocabulary parameters as written in mzTab:
//! `[cv_label, accession, name, value]`.
//!
//! A parameter without label and accession is a user parameter, e.g.
//! `[, , my instrument, ]`.

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use super::value::split_outside_brackets;

/// A CV or user parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// CV label, e.g. "MS"
    pub cv_label: Option<String>,
    /// CV accession, e.g. "MS:1000073"
    pub accession: Option<String>,
    /// Human-readable name (required)
    pub name: String,
    /// Optional value
    pub value: Option<String>,
}

/// Error returned when a token is not a `[label, accession, name, value]` group.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed parameter: {0}")]
pub struct ParameterParseError(pub String);

impl Parameter {
    /// Create a CV parameter.
    pub fn cv(cv_label: &str, accession: &str, name: &str) -> Self {
        Self {
            cv_label: Some(cv_label.to_string()),
            accession: Some(accession.to_string()),
            name: name.to_string(),
            value: None,
        }
    }

    /// Create a user parameter with a value.
    pub fn user(name: &str, value: &str) -> Self {
        Self {
            cv_label: None,
            accession: None,
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Add a value to the parameter
    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// True when the parameter carries a CV accession.
    pub fn is_cv(&self) -> bool {
        self.accession.is_some()
    }
}

/// Strip one pair of surrounding quotes.
///
/// Quotes protect commas inside names and values. More than two quote
/// characters cannot be interpreted reliably; they are all removed and a
/// warning is logged.
fn unquote(field: &str) -> String {
    let quotes = field.matches('"').count();
    if quotes > 2 {
        warn!(
            "parameter field {} contains {} quote characters; removing all of them",
            field, quotes
        );
        return field.replace('"', "").trim().to_string();
    }
    if quotes == 2 && field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        return field[1..field.len() - 1].to_string();
    }
    field.to_string()
}

fn quote_if_needed(field: &str) -> String {
    if field.contains(',') {
        format!("\"{}\"", field)
    } else {
        field.to_string()
    }
}

fn non_empty(field: String) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field)
    }
}

impl FromStr for Parameter {
    type Err = ParameterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| ParameterParseError(trimmed.to_string()))?;

        let fields = split_outside_brackets(inner, ',');
        if fields.len() != 4 {
            return Err(ParameterParseError(trimmed.to_string()));
        }

        let mut fields = fields.into_iter().map(|f| unquote(f.trim()));
        let cv_label = fields.next().and_then(non_empty);
        let accession = fields.next().and_then(non_empty);
        let name = fields.next().unwrap_or_default();
        let value = fields.next().and_then(non_empty);

        if name.is_empty() {
            return Err(ParameterParseError(trimmed.to_string()));
        }

        Ok(Self {
            cv_label,
            accession,
            name,
            value,
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.cv_label.as_deref().unwrap_or(""),
            self.accession.as_deref().unwrap_or(""),
            quote_if_needed(&self.name),
            self.value.as_deref().map(quote_if_needed).unwrap_or_default()
        )
    }
}
