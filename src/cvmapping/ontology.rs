//! In-memory ontology loaded from OBO files.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use super::lookup::{LookupError, TermLookup, TermRelation};

/// Errors raised while reading an OBO file.
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stanza that cannot be interpreted
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },
}

/// One ontology term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Term {
    /// Accession, e.g. `MS:1000031`
    pub id: String,
    /// Term name
    pub name: String,
    /// Direct `is_a` parents
    pub parents: Vec<String>,
    /// Marked obsolete
    pub obsolete: bool,
}

/// Term hierarchy keyed by accession.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    terms: HashMap<String, Term>,
}

impl Ontology {
    /// Empty ontology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an OBO file.
    pub fn from_obo_file<P: AsRef<Path>>(path: P) -> Result<Self, OntologyError> {
        let path = path.as_ref();
        let ontology = Self::from_obo(BufReader::new(File::open(path)?))?;
        info!("Loaded {} terms from {}", ontology.len(), path.display());
        Ok(ontology)
    }

    /// Read OBO text. Only `[Term]` stanzas are kept; `id`, `name`,
    /// `is_a` and `is_obsolete` are the tags that matter.
    pub fn from_obo<R: BufRead>(reader: R) -> Result<Self, OntologyError> {
        let mut ontology = Self::new();
        let mut current: Option<Term> = None;
        let mut in_term = false;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('!') {
                continue;
            }
            if line.starts_with('[') {
                if let Some(term) = current.take() {
                    ontology.insert(term);
                }
                in_term = line == "[Term]";
                continue;
            }
            if !in_term {
                continue;
            }

            let Some((tag, value)) = line.split_once(':') else {
                return Err(OntologyError::Malformed {
                    line: index + 1,
                    reason: format!("expected `tag: value`, found {:?}", line),
                });
            };
            // strip trailing `! comment`
            let value = value.split(" !").next().unwrap_or_default().trim();
            let term = current.get_or_insert_with(Term::default);
            match tag.trim() {
                "id" => term.id = value.to_string(),
                "name" => term.name = value.to_string(),
                "is_a" => term.parents.push(value.to_string()),
                "is_obsolete" => term.obsolete = value == "true",
                _ => {}
            }
        }
        if let Some(term) = current {
            ontology.insert(term);
        }
        Ok(ontology)
    }

    /// Add a term, replacing one with the same id.
    pub fn insert(&mut self, term: Term) {
        if term.id.is_empty() {
            debug!("skipping term without id: {:?}", term.name);
            return;
        }
        self.terms.insert(term.id.clone(), term);
    }

    /// Term by accession.
    pub fn get(&self, accession: &str) -> Option<&Term> {
        self.terms.get(accession)
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when no term was loaded.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when `ancestor` is reachable from `accession` over `is_a` edges.
    pub fn is_descendant(&self, accession: &str, ancestor: &str) -> bool {
        let mut queue: VecDeque<&str> = VecDeque::from([accession]);
        let mut seen: HashSet<&str> = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(term) = self.terms.get(current) else {
                continue;
            };
            for parent in &term.parents {
                if parent == ancestor {
                    return true;
                }
                queue.push_back(parent);
            }
        }
        false
    }
}

impl TermLookup for Ontology {
    fn relation(&self, parent: &str, candidate: &str) -> Result<TermRelation, LookupError> {
        for accession in [parent, candidate] {
            if !self.terms.contains_key(accession) {
                return Err(LookupError::UnknownAccession(accession.to_string()));
            }
        }
        if parent == candidate {
            Ok(TermRelation::Identical)
        } else if self.is_descendant(candidate, parent) {
            Ok(TermRelation::Child)
        } else {
            Ok(TermRelation::Unrelated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBO: &str = "format-version: 1.2\n\
        ontology: ms\n\
        \n\
        [Term]\n\
        id: MS:1000031\n\
        name: instrument model\n\
        \n\
        [Term]\n\
        id: MS:1000483\n\
        name: Thermo Fisher Scientific instrument model\n\
        is_a: MS:1000031 ! instrument model\n\
        \n\
        [Term]\n\
        id: MS:1001911\n\
        name: Q Exactive\n\
        is_a: MS:1000483 ! Thermo Fisher Scientific instrument model\n\
        \n\
        [Typedef]\n\
        id: part_of\n\
        name: part of\n\
        \n\
        [Term]\n\
        id: MS:1000073\n\
        name: electrospray ionization\n";

    fn ontology() -> Ontology {
        Ontology::from_obo(OBO.as_bytes()).unwrap()
    }

    #[test]
    fn test_terms_and_typedefs() {
        let ontology = ontology();
        assert_eq!(ontology.len(), 4);
        assert_eq!(ontology.get("MS:1001911").unwrap().parents, vec!["MS:1000483"]);
        assert!(ontology.get("part_of").is_none());
    }

    #[test]
    fn test_relations() {
        let ontology = ontology();
        assert_eq!(ontology.relation("MS:1000031", "MS:1000031"), Ok(TermRelation::Identical));
        assert_eq!(ontology.relation("MS:1000031", "MS:1001911"), Ok(TermRelation::Child));
        assert_eq!(ontology.relation("MS:1000031", "MS:1000073"), Ok(TermRelation::Unrelated));
        assert_eq!(ontology.relation("MS:1001911", "MS:1000031"), Ok(TermRelation::Unrelated));
        assert_eq!(
            ontology.relation("MS:9999999", "MS:1000031"),
            Err(LookupError::UnknownAccession("MS:9999999".to_string()))
        );
    }

    #[test]
    fn test_unknown_found_term_is_not_unrelated() {
        let ontology = ontology();
        assert_eq!(
            ontology.relation("MS:1000031", "MS:9999999"),
            Err(LookupError::UnknownAccession("MS:9999999".to_string()))
        );
    }

    #[test]
    fn test_malformed_line() {
        let text = "[Term]\nid: MS:1\nnot a tag line\n";
        assert!(matches!(
            Ontology::from_obo(text.as_bytes()),
            Err(OntologyError::Malformed { line: 3, .. })
        ));
    }
}
