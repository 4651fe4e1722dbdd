//! Immutable point-in-time views of the retained roots.

use crate::recorder::Call;
use std::ops::Deref;
use std::sync::Arc;

/// Retained roots as of one `get_logs` call
///
/// **Public** - handed to consumers
///
/// Shares structure with the store: taking a snapshot clones one `Arc`, and
/// the store copies its root list before mutating it while a snapshot is
/// alive. Later recording or clearing is never visible through a snapshot.
#[derive(Debug, Clone, Default)]
pub struct LogSnapshot {
    roots: Arc<Vec<Arc<Call>>>,
}

impl LogSnapshot {
    pub(crate) fn new(roots: Arc<Vec<Arc<Call>>>) -> Self {
        Self { roots }
    }

    /// Total stored nodes across all roots
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|root| root.node_count()).sum()
    }

    /// Owned copies of the roots, for serialization
    pub fn to_calls(&self) -> Vec<Call> {
        self.roots.iter().map(|root| Call::clone(root)).collect()
    }
}

impl Deref for LogSnapshot {
    type Target = [Arc<Call>];

    fn deref(&self) -> &Self::Target {
        &self.roots
    }
}

impl<'a> IntoIterator for &'a LogSnapshot {
    type Item = &'a Arc<Call>;
    type IntoIter = std::slice::Iter<'a, Arc<Call>>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter()
    }
}
