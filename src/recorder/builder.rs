//! Build nested call trees from enter/exit events.
//!
//! Each logical sequence owns an active stack of open calls. `start` pushes,
//! `end` pops and attaches the closed call to its parent, merging it into the
//! parent's last child when both are the same invocation. A call closed on an
//! otherwise empty stack is a completed root and is returned to the caller.
//!
//! Example for three identical calls to `leaf` under `root`:
//!
//! ```text
//! start(root) start(leaf) end(leaf) start(leaf) end(leaf) start(leaf) end(leaf) end(root)
//!
//! root (childCount 0)
//! └── leaf (childCount 2)
//! ```

use super::call::{Attributes, Call};
use super::sequence::SequenceId;
use log::{debug, trace};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type ActiveStack = Arc<Mutex<Vec<Call>>>;

/// Counters for the recoverable anomalies the builder tolerates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderStats {
    /// `end` calls that found no open call
    pub unmatched_ends: u64,

    /// `end` calls whose name differed from the open call
    pub mismatched_ends: u64,

    /// Calls folded into an identical preceding sibling
    pub merged_repeats: u64,
}

/// Per-sequence call tree builder
///
/// **Public** - owned by the trace store, usable standalone
///
/// The sequence map lock is only held to find or create a stack and to drop
/// one that drained. Mutating a stack holds that stack's own lock, which is
/// uncontended because a sequence is driven by one thread at a time.
#[derive(Debug, Default)]
pub struct CallTreeBuilder {
    stacks: RwLock<HashMap<SequenceId, ActiveStack>>,
    unmatched_ends: AtomicU64,
    mismatched_ends: AtomicU64,
    merged_repeats: AtomicU64,
}

impl CallTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a call on `seq`
    ///
    /// Never fails.
    pub fn start(&self, seq: SequenceId, name: impl Into<String>, attributes: Attributes) {
        let stack = self.stack_for(seq);
        stack.lock().push(Call::new(name, attributes));
    }

    /// Close the innermost open call on `seq`
    ///
    /// # Returns
    /// The finished tree when the closed call was the outermost one on the
    /// sequence, `None` otherwise (including when nothing was open).
    pub fn end(&self, seq: SequenceId, name: &str) -> Option<Call> {
        let Some(stack) = self.existing_stack(seq) else {
            self.note_unmatched(seq, name);
            return None;
        };

        let (root, drained) = {
            let mut open = stack.lock();

            let Some(mut closed) = open.pop() else {
                drop(open);
                self.note_unmatched(seq, name);
                return None;
            };

            if closed.name != name {
                self.mismatched_ends.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "{}: end({}) closed open call {}; keeping the recorded name",
                    seq, name, closed.name
                );
            }

            match open.last_mut() {
                Some(parent) => {
                    self.attach(parent, closed);
                    (None, false)
                }
                None => {
                    closed.set_child_count(0);
                    (Some(closed), true)
                }
            }
        };

        if drained {
            self.release_if_empty(seq);
        }

        root
    }

    /// Number of sequences with at least one open call
    pub fn active_sequences(&self) -> usize {
        self.stacks
            .read()
            .values()
            .filter(|stack| !stack.lock().is_empty())
            .count()
    }

    /// Number of calls currently open on `seq`
    pub fn open_depth(&self, seq: SequenceId) -> usize {
        self.existing_stack(seq)
            .map(|stack| stack.lock().len())
            .unwrap_or(0)
    }

    /// Drop every active stack, abandoning any open calls
    pub fn reset(&self) {
        let abandoned: usize = self
            .stacks
            .write()
            .drain()
            .map(|(_, stack)| stack.lock().len())
            .sum();

        if abandoned > 0 {
            debug!("Abandoned {} open calls on reset", abandoned);
        }
    }

    pub fn stats(&self) -> BuilderStats {
        BuilderStats {
            unmatched_ends: self.unmatched_ends.load(Ordering::Relaxed),
            mismatched_ends: self.mismatched_ends.load(Ordering::Relaxed),
            merged_repeats: self.merged_repeats.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.unmatched_ends.store(0, Ordering::Relaxed);
        self.mismatched_ends.store(0, Ordering::Relaxed);
        self.merged_repeats.store(0, Ordering::Relaxed);
    }

    /// Attach a closed call to its parent
    ///
    /// Only the parent's last child is considered for merging, so `f, g, f`
    /// stays three nodes.
    fn attach(&self, parent: &mut Call, mut closed: Call) {
        if let Some(last) = parent.children.last_mut() {
            if last.is_repeat_of(&closed) {
                let repeats = last.child_count() + 1;
                last.set_child_count(repeats);
                self.merged_repeats.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        closed.set_child_count(0);
        parent.children.push(closed);
    }

    fn note_unmatched(&self, seq: SequenceId, name: &str) {
        self.unmatched_ends.fetch_add(1, Ordering::Relaxed);
        trace!("{}: end({}) with no open call, ignored", seq, name);
    }

    fn existing_stack(&self, seq: SequenceId) -> Option<ActiveStack> {
        self.stacks.read().get(&seq).cloned()
    }

    fn stack_for(&self, seq: SequenceId) -> ActiveStack {
        if let Some(stack) = self.existing_stack(seq) {
            return stack;
        }

        self.stacks
            .write()
            .entry(seq)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    fn release_if_empty(&self, seq: SequenceId) {
        let mut stacks = self.stacks.write();
        let empty = stacks
            .get(&seq)
            .map(|stack| stack.lock().is_empty())
            .unwrap_or(false);

        if empty {
            stacks.remove(&seq);
        }
    }
}
