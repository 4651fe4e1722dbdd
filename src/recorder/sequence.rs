//! Logical sequence identity.
//!
//! Every independent chain of enter/exit events gets its own active stack.
//! By default a sequence is the calling OS thread; replays drive explicit
//! sequences taken from the recorded events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-assigned ids start high so they never collide with the small ids
/// event scripts use.
const THREAD_ID_BASE: u64 = 1 << 32;

static NEXT_THREAD_SEQUENCE: AtomicU64 = AtomicU64::new(THREAD_ID_BASE);

thread_local! {
    static THREAD_SEQUENCE: SequenceId =
        SequenceId(NEXT_THREAD_SEQUENCE.fetch_add(1, Ordering::Relaxed));
}

/// Identity of one logical call sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId(pub u64);

impl SequenceId {
    /// Sequence of the calling thread, assigned on first use
    ///
    /// `None` once the thread's locals have been torn down, e.g. when called
    /// from another thread-local's destructor.
    pub fn current() -> Option<Self> {
        THREAD_SEQUENCE.try_with(|id| *id).ok()
    }
}

impl From<u64> for SequenceId {
    fn from(id: u64) -> Self {
        SequenceId(id)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_current_is_stable_within_thread() {
        assert!(SequenceId::current().is_some());
        assert_eq!(SequenceId::current(), SequenceId::current());
    }

    #[test]
    fn test_threads_get_distinct_sequences() {
        let here = SequenceId::current().unwrap();
        let there = thread::spawn(SequenceId::current).join().unwrap().unwrap();

        assert_ne!(here, there);
        assert!(here.0 >= THREAD_ID_BASE);
        assert!(there.0 >= THREAD_ID_BASE);
    }
}
