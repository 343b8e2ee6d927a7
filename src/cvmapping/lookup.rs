//! Term hierarchy lookups.
//!
//! The engine only ever asks one question of an ontology: how does a found
//! term relate to a rule term. Implementations may be in-memory
//! ([`super::Ontology`]) or remote; remote ones should be wrapped in
//! [`TimedLookup`] so a slow service cannot stall validation.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use log::warn;

/// Relation of a found term to a rule term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermRelation {
    /// Same accession
    Identical,
    /// The found term descends from the rule term
    Child,
    /// Neither of the above
    Unrelated,
}

/// Why a lookup could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The ontology does not know the rule term or the found term
    #[error("unknown accession {0}")]
    UnknownAccession(String),

    /// The backing service could not be reached
    #[error("term lookup unavailable: {0}")]
    Unavailable(String),

    /// The lookup did not answer in time
    #[error("term lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Classifies found terms against rule terms.
pub trait TermLookup: Send + Sync {
    /// Relation of `candidate` to `parent`.
    fn relation(&self, parent: &str, candidate: &str) -> Result<TermRelation, LookupError>;
}

impl<L: TermLookup + ?Sized> TermLookup for Arc<L> {
    fn relation(&self, parent: &str, candidate: &str) -> Result<TermRelation, LookupError> {
        (**self).relation(parent, candidate)
    }
}

impl<L: TermLookup + ?Sized> TermLookup for &L {
    fn relation(&self, parent: &str, candidate: &str) -> Result<TermRelation, LookupError> {
        (**self).relation(parent, candidate)
    }
}

/// Bounds every lookup of the wrapped implementation by a timeout.
///
/// Each call runs on its own thread and the answer is handed back over a
/// channel. A call that misses the deadline is reported as
/// [`LookupError::Timeout`]; its thread finishes in the background.
pub struct TimedLookup<L> {
    inner: Arc<L>,
    timeout: Duration,
}

impl<L: TermLookup + 'static> TimedLookup<L> {
    /// Wrap `inner`, allowing `timeout` per lookup.
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    /// Per-lookup timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<L: TermLookup + 'static> TermLookup for TimedLookup<L> {
    fn relation(&self, parent: &str, candidate: &str) -> Result<TermRelation, LookupError> {
        let (sender, receiver) = bounded(1);
        let inner = Arc::clone(&self.inner);
        let parent = parent.to_string();
        let candidate = candidate.to_string();

        thread::Builder::new()
            .name("term-lookup".to_string())
            .spawn(move || {
                // receiver may already be gone after a timeout
                let _ = sender.send(inner.relation(&parent, &candidate));
            })
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!("term lookup exceeded {:?}", self.timeout);
                Err(LookupError::Timeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(LookupError::Unavailable("lookup worker stopped".to_string()))
            }
        }
    }
}
