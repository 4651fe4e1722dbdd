//! Call tree nodes and their attribute values.

use crate::utils::config::CHILD_COUNT_ATTR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute value attached to a call
///
/// Only strings and unsigned integers are ever produced by the hooks, so the
/// variant is closed and equality is total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    U64(u64),
    Str(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::U64(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(n) => Some(*n),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U64(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::U64(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

/// Attribute map of a call
///
/// Ordered so that equality, serialization and rendering are deterministic.
pub type Attributes = BTreeMap<String, Value>;

/// Build an attribute map from key/value pairs
///
/// ```ignore
/// let attrs = attributes([("objFullName", "Actor Level.Player")]);
/// ```
pub fn attributes<K, V, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A node in a call tree
///
/// **Public** - the unit handed to consumers through snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Fully-qualified name of the intercepted callable
    pub name: String,

    /// Caller-supplied attributes plus the synthetic `childCount`
    #[serde(default)]
    pub attributes: Attributes,

    /// Nested invocations, in call order
    #[serde(default)]
    pub children: Vec<Call>,
}

impl Call {
    /// Create an open call with no children
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Number of identical adjacent repeats merged into this node
    ///
    /// Zero for a call that happened once, or for a call that was never
    /// finalized by the builder.
    pub fn child_count(&self) -> u64 {
        self.attributes
            .get(CHILD_COUNT_ATTR)
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Total number of times this call happened at its position
    pub fn call_count(&self) -> u64 {
        self.child_count() + 1
    }

    pub(crate) fn set_child_count(&mut self, count: u64) {
        self.attributes
            .insert(CHILD_COUNT_ATTR.to_string(), Value::U64(count));
    }

    /// Look up a string attribute
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Whether `other` is the same invocation for aggregation purposes
    ///
    /// Compares the name and every caller attribute key-for-key and
    /// value-for-value. `childCount` is builder state and never takes part.
    pub fn is_repeat_of(&self, other: &Call) -> bool {
        if self.name != other.name {
            return false;
        }

        let ours = self.attributes.iter().filter(|(k, _)| *k != CHILD_COUNT_ATTR);
        let theirs = other.attributes.iter().filter(|(k, _)| *k != CHILD_COUNT_ATTR);
        ours.eq(theirs)
    }

    /// Height of the subtree rooted here, counted in nodes
    ///
    /// A leaf has depth 1.
    pub fn depth(&self) -> usize {
        // Iterative: traced programs may nest deeper than our own stack.
        let mut max = 0;
        let mut pending: Vec<(&Call, usize)> = vec![(self, 1)];

        while let Some((call, level)) = pending.pop() {
            max = max.max(level);
            pending.extend(call.children.iter().map(|c| (c, level + 1)));
        }

        max
    }

    /// Number of stored nodes in the subtree, this one included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&Call> = vec![self];

        while let Some(call) = pending.pop() {
            count += 1;
            pending.extend(call.children.iter());
        }

        count
    }
}
