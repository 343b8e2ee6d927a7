//! Loading rule sets from PSI CvMapping XML or JSON.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::rule::{CombinationLogic, CvMappingRule, CvTermRef, RequirementLevel, RuleConfigError, RuleSet};

/// Errors raised while loading a mapping file.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Attribute value is not UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required attribute is absent
    #[error("<{element}> is missing attribute {attribute}")]
    MissingAttribute {
        /// Element name
        element: &'static str,
        /// Attribute name
        attribute: &'static str,
    },

    /// An attribute has a value outside its vocabulary
    #[error("attribute {attribute} has invalid value {value:?}")]
    InvalidAttribute {
        /// Attribute name
        attribute: &'static str,
        /// Offending value
        value: String,
    },

    /// `<CvTerm>` outside any `<CvMappingRule>`
    #[error("CvTerm outside of a CvMappingRule")]
    OrphanTerm,

    /// A rule cannot be evaluated; the whole file is rejected
    #[error("mapping rejected, no rule loaded: {0}")]
    Rule(#[from] RuleConfigError),
}

/// Load a rule set, choosing JSON for `.json` files and XML otherwise.
///
/// Loading is all-or-nothing: one rule that cannot be evaluated rejects
/// the file with [`MappingError::Rule`].
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<RuleSet, MappingError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rules = if is_json { load_json(reader)? } else { load_xml(reader)? };
    info!("Loaded {} CV mapping rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Load a JSON array of rules.
pub fn load_json<R: BufRead>(reader: R) -> Result<RuleSet, MappingError> {
    let rules: Vec<CvMappingRule> = serde_json::from_reader(reader)?;
    Ok(RuleSet::new(rules)?)
}

fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, MappingError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MappingError::Xml(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?.to_string();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn required(e: &BytesStart, element: &'static str, attribute: &'static str) -> Result<String, MappingError> {
    get_attribute(e, attribute)?.ok_or(MappingError::MissingAttribute { element, attribute })
}

fn flag(e: &BytesStart, attribute: &'static str, default: bool) -> Result<bool, MappingError> {
    match get_attribute(e, attribute)? {
        None => Ok(default),
        Some(value) => match value.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(MappingError::InvalidAttribute { attribute, value }),
        },
    }
}

fn parse_rule(e: &BytesStart) -> Result<CvMappingRule, MappingError> {
    let level = required(e, "CvMappingRule", "requirementLevel")?;
    let logic = required(e, "CvMappingRule", "cvTermsCombinationLogic")?;
    Ok(CvMappingRule {
        id: required(e, "CvMappingRule", "id")?,
        cv_element_path: required(e, "CvMappingRule", "cvElementPath")?,
        requirement_level: RequirementLevel::parse(&level).ok_or(MappingError::InvalidAttribute {
            attribute: "requirementLevel",
            value: level.clone(),
        })?,
        combination_logic: CombinationLogic::parse(&logic).ok_or(MappingError::InvalidAttribute {
            attribute: "cvTermsCombinationLogic",
            value: logic.clone(),
        })?,
        terms: Vec::new(),
    })
}

fn parse_term(e: &BytesStart) -> Result<CvTermRef, MappingError> {
    Ok(CvTermRef {
        accession: required(e, "CvTerm", "termAccession")?,
        name: get_attribute(e, "termName")?.unwrap_or_default(),
        cv_label: get_attribute(e, "cvIdentifierRef")?.unwrap_or_default(),
        allow_children: flag(e, "allowChildren", false)?,
        use_term: flag(e, "useTerm", true)?,
        repeatable: flag(e, "isRepeatable", true)?,
    })
}

/// Load a PSI CvMapping XML document.
pub fn load_xml<R: BufRead>(reader: R) -> Result<RuleSet, MappingError> {
    let mut reader = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut rules: Vec<CvMappingRule> = Vec::new();
    let mut current: Option<CvMappingRule> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.name().as_ref() == b"CvMappingRule" => {
                current = Some(parse_rule(e)?);
            }
            Event::Empty(ref e) if e.name().as_ref() == b"CvMappingRule" => {
                rules.push(parse_rule(e)?);
            }
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"CvTerm" => {
                let term = parse_term(e)?;
                current.as_mut().ok_or(MappingError::OrphanTerm)?.terms.push(term);
            }
            Event::End(ref e) if e.name().as_ref() == b"CvMappingRule" => {
                if let Some(rule) = current.take() {
                    debug!("rule {} with {} terms", rule.id, rule.terms.len());
                    rules.push(rule);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(RuleSet::new(rules)?)
}
