//! Indexed element registry shared by every line handler of one parse.
//!
//! Elements are created on first mention, whether that mention is their
//! own metadata line or a reference such as `assay[3]` in a header. The
//! placeholder and the later definition are the same `(type, id)` entry.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::error::{catalog, Diagnostic};
use crate::model::{ElementRef, Metadata};

/// Registry state for one parse run.
#[derive(Debug, Default)]
pub struct ParserContext {
    metadata: Metadata,
    defined_keys: HashMap<String, usize>,
    defined_elements: BTreeSet<ElementRef>,
    references: BTreeMap<ElementRef, Option<usize>>,
}

impl ParserContext {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata collected so far.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Mutable access for line handlers filling element fields.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Consume the registry and return its metadata.
    pub fn into_metadata(self) -> Metadata {
        self.metadata
    }

    /// Return the element, registering a placeholder on first mention.
    ///
    /// `line_number` is where the reference was seen; only the first
    /// reference line is remembered.
    pub fn get_or_create(&mut self, element: ElementRef, line_number: Option<usize>) -> ElementRef {
        if self.metadata.insert_placeholder(element) {
            debug!("registered placeholder for {}", element);
        }
        self.references.entry(element).or_insert(line_number);
        element
    }

    /// Record the definition of a metadata key.
    ///
    /// `element` is the indexed element the key belongs to, if any; it is
    /// created when absent and marked as defined. A key defined twice yields
    /// a duplication diagnostic and the caller keeps the first value.
    pub fn define(
        &mut self,
        key: &str,
        element: Option<ElementRef>,
        line_number: usize,
    ) -> Result<(), Diagnostic> {
        if let Some(first) = self.defined_keys.get(key) {
            debug!("{} already defined on line {}", key, first);
            return Err(Diagnostic::new(
                &catalog::DUPLICATION_DEFINE,
                Some(line_number),
                &[&key],
            ));
        }
        self.defined_keys.insert(key.to_string(), line_number);
        if let Some(element) = element {
            self.metadata.insert_placeholder(element);
            self.defined_elements.insert(element);
        }
        Ok(())
    }

    /// Line that defined a metadata key.
    pub fn key_line(&self, key: &str) -> Option<usize> {
        self.defined_keys.get(key).copied()
    }

    /// True when at least one metadata line defined the element.
    pub fn is_defined(&self, element: ElementRef) -> bool {
        self.defined_elements.contains(&element)
    }

    /// Elements that were referenced but never defined, with the line of
    /// their first reference.
    pub fn undefined_references(&self) -> Vec<(ElementRef, Option<usize>)> {
        self.references
            .iter()
            .filter(|(element, _)| !self.defined_elements.contains(element))
            .map(|(element, line)| (*element, *line))
            .collect()
    }
}
