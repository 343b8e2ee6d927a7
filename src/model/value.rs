//! Cell values and the scalar parse rules shared by every line handler.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::element::{ElementRef, ElementType};
use super::param::Parameter;

/// Wire-format null sentinel.
pub const NULL: &str = "null";
/// Token for "calculation error".
pub const NAN: &str = "NaN";
/// Token for "ratio denominator is zero".
pub const INFINITY: &str = "INF";
/// List delimiter inside cells and metadata values.
pub const BAR: char = '|';

/// Data type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Signed integer
    Integer,
    /// Floating point, accepting `NaN` and `INF`
    Double,
    /// Free text
    Text,
    /// `[label, accession, name, value]`
    Parameter,
    /// `|`-separated integers
    IntegerList,
    /// `|`-separated doubles, items may be `null`
    DoubleList,
    /// `|`-separated text
    TextList,
    /// `|`-separated `ms_run[<id>]:<native id>` references
    SpectraRefList,
}

/// Reference from an evidence row to a spectrum in an ms_run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpectraRef {
    /// Referenced ms_run id
    pub ms_run: u32,
    /// Native spectrum identifier, e.g. `scan=42`
    pub reference: String,
}

impl SpectraRef {
    /// The ms_run this reference points at.
    pub fn ms_run_ref(&self) -> ElementRef {
        ElementRef::new(ElementType::MsRun, self.ms_run)
    }
}

impl fmt::Display for SpectraRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ms_run[{}]:{}", self.ms_run, self.reference)
    }
}

/// A bound, typed cell value. Absent cells are represented by `None` at the
/// row level, never by a variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Integer cell
    Integer(i64),
    /// Double cell
    Double(f64),
    /// Text cell
    Text(String),
    /// Parameter cell
    Parameter(Parameter),
    /// Spectra reference
    SpectraRef(SpectraRef),
    /// List cell, `None` items were `null`
    List(Vec<Option<Value>>),
}

// NaN cells compare equal so that parsed graphs can be compared after a round trip.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Parameter(a), Self::Parameter(b)) => a == b,
            (Self::SpectraRef(a), Self::SpectraRef(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Integer content, if this is an integer cell.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Double content, if this is a double cell.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Parameter content, if this is a parameter cell.
    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Self::Parameter(p) => Some(p),
            _ => None,
        }
    }

    /// List items, if this is a list cell.
    pub fn as_list(&self) -> Option<&[Option<Value>]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Parse a non-null token as the given column type.
    ///
    /// Returns `Ok(None)` for null tokens.
    pub fn parse(token: &str, data_type: ColumnType) -> Result<Option<Self>, ValueParseError> {
        if is_null(token) {
            return Ok(None);
        }
        let token = token.trim();
        let value = match data_type {
            ColumnType::Integer => Self::Integer(parse_integer(token)?),
            ColumnType::Double => Self::Double(parse_double(token)?),
            ColumnType::Text => Self::Text(token.to_string()),
            ColumnType::Parameter => Self::Parameter(
                token
                    .parse()
                    .map_err(|_| ValueParseError::new(token, ColumnType::Parameter))?,
            ),
            ColumnType::SpectraRefList | ColumnType::IntegerList | ColumnType::DoubleList | ColumnType::TextList => {
                let item_type = match data_type {
                    ColumnType::IntegerList => ColumnType::Integer,
                    ColumnType::DoubleList => ColumnType::Double,
                    ColumnType::SpectraRefList => return parse_spectra_refs(token).map(Some),
                    _ => ColumnType::Text,
                };
                let items = split_outside_brackets(token, BAR)
                    .into_iter()
                    .map(|item| Self::parse(item, item_type))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::List(items)
            }
        };
        Ok(Some(value))
    }
}

fn parse_spectra_refs(token: &str) -> Result<Value, ValueParseError> {
    let items = split_outside_brackets(token, BAR)
        .into_iter()
        .map(|item| {
            parse_spectra_ref(item.trim())
                .map(|r| Some(Value::SpectraRef(r)))
                .ok_or_else(|| ValueParseError::new(item, ColumnType::SpectraRefList))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(items))
}

/// Parse `ms_run[<id>]:<native id>`.
pub fn parse_spectra_ref(token: &str) -> Option<SpectraRef> {
    let (run, reference) = token.split_once(':')?;
    let element: ElementRef = run.trim().parse().ok()?;
    if element.element_type != ElementType::MsRun || reference.trim().is_empty() {
        return None;
    }
    Some(SpectraRef {
        ms_run: element.id,
        reference: reference.trim().to_string(),
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Double(v) => f.write_str(&format_double(*v)),
            Self::Text(v) => f.write_str(v),
            Self::Parameter(p) => write!(f, "{}", p),
            Self::SpectraRef(r) => write!(f, "{}", r),
            Self::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, "{}", BAR)?;
                    }
                    match item {
                        Some(value) => write!(f, "{}", value)?,
                        None => f.write_str(NULL)?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// A token that does not parse as its column type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{token}\" is not a valid {expected:?}")]
pub struct ValueParseError {
    /// Offending token
    pub token: String,
    /// Type the token was parsed as
    pub expected: ColumnType,
}

impl ValueParseError {
    fn new(token: &str, expected: ColumnType) -> Self {
        Self {
            token: token.to_string(),
            expected,
        }
    }
}

/// Empty, blank and `null` tokens are absent values.
pub fn is_null(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || token.eq_ignore_ascii_case(NULL)
}

/// Parse an integer token.
pub fn parse_integer(token: &str) -> Result<i64, ValueParseError> {
    token
        .trim()
        .parse()
        .map_err(|_| ValueParseError::new(token, ColumnType::Integer))
}

/// Parse a double token; `NaN` and `INF` map to their IEEE values.
pub fn parse_double(token: &str) -> Result<f64, ValueParseError> {
    let token = token.trim();
    if token.eq_ignore_ascii_case(NAN) {
        return Ok(f64::NAN);
    }
    if token.eq_ignore_ascii_case(INFINITY) {
        return Ok(f64::INFINITY);
    }
    match token.parse::<f64>() {
        // "inf"/"infinity" spellings are not part of the format
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ValueParseError::new(token, ColumnType::Double)),
    }
}

/// Render a double the way the format spells special values.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        NAN.to_string()
    } else if value == f64::INFINITY {
        INFINITY.to_string()
    } else {
        value.to_string()
    }
}

/// Split on `delimiter` only outside `[...]` groups and double quotes.
///
/// A parameter's own commas (`[MS, MS:1, name, value]`) and bars inside
/// quoted names never split the enclosing list.
pub fn split_outside_brackets(s: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (index, ch) in s.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '[' if !quoted => depth += 1,
            ']' if !quoted => depth = depth.saturating_sub(1),
            c if c == delimiter && depth == 0 && !quoted => {
                parts.push(&s[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}
