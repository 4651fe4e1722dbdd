//! Retention and lifecycle of completed call trees.
//!
//! The store owns a `CallTreeBuilder` and routes every completed root through
//! its retention policy:
//! 1. Dropped while recording is disabled
//! 2. Discarded when shallower than `min_call_stack_size`
//! 3. Appended to the retained roots otherwise
//!
//! All shared state sits behind one coarse lock. Retained roots are kept
//! copy-on-write so snapshots never observe later changes.

use super::snapshot::LogSnapshot;
use crate::recorder::{Attributes, BuilderStats, Call, CallTreeBuilder, SequenceId};
use crate::utils::config::{RecorderConfig, DEFAULT_MIN_CALL_STACK_SIZE};
use log::{debug, info, trace};
use parking_lot::Mutex;
use std::sync::Arc;

/// Counters describing what happened to completed roots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Roots appended to the logs
    pub retained: u64,

    /// Roots shallower than the threshold
    pub discarded_shallow: u64,

    /// Roots completed while recording was disabled
    pub dropped_disabled: u64,

    /// Anomalies tolerated while building trees
    pub builder: BuilderStats,
}

#[derive(Debug)]
struct StoreState {
    enabled: bool,
    min_call_stack_size: u16,
    roots: Arc<Vec<Arc<Call>>>,
    retained: u64,
    discarded_shallow: u64,
    dropped_disabled: u64,
}

impl StoreState {
    fn new(enabled: bool, min_call_stack_size: u16) -> Self {
        Self {
            enabled,
            min_call_stack_size,
            roots: Arc::new(Vec::new()),
            retained: 0,
            discarded_shallow: 0,
            dropped_disabled: 0,
        }
    }
}

/// Process-wide recorder state with an explicit lifecycle
///
/// **Public** - shared via `Arc` between the hooks and the consumer
///
/// # Example
/// ```ignore
/// let store = TraceStore::new();
/// store.enable();
/// store.start("Game.Tick", Attributes::new());
/// store.end("Game.Tick");
/// for root in store.get_logs().iter() { /* render */ }
/// ```
#[derive(Debug)]
pub struct TraceStore {
    builder: CallTreeBuilder,
    state: Mutex<StoreState>,
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceStore {
    /// Create a disabled store with the default retention threshold
    pub fn new() -> Self {
        Self {
            builder: CallTreeBuilder::new(),
            state: Mutex::new(StoreState::new(false, DEFAULT_MIN_CALL_STACK_SIZE)),
        }
    }

    /// Create a store from loaded configuration
    pub fn with_config(config: &RecorderConfig) -> Self {
        Self {
            builder: CallTreeBuilder::new(),
            state: Mutex::new(StoreState::new(config.enabled, config.min_call_stack_size)),
        }
    }

    pub fn enable(&self) {
        self.state.lock().enabled = true;
        info!("Chain logging enabled");
    }

    pub fn disable(&self) {
        self.state.lock().enabled = false;
        info!("Chain logging disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Update the retention threshold
    ///
    /// Applies to roots completed from now on; already retained roots stay.
    pub fn set_min_call_stack_size(&self, size: u16) {
        self.state.lock().min_call_stack_size = size;
        debug!("Minimum call stack size set to {}", size);
    }

    pub fn min_call_stack_size(&self) -> u16 {
        self.state.lock().min_call_stack_size
    }

    /// Drop every retained root
    pub fn clear_logs(&self) {
        let mut state = self.state.lock();
        state.roots = Arc::new(Vec::new());
    }

    /// Snapshot of the retained roots, in completion order
    pub fn get_logs(&self) -> LogSnapshot {
        LogSnapshot::new(Arc::clone(&self.state.lock().roots))
    }

    /// Record entry into `name` on the calling thread's sequence
    ///
    /// Ignored on a thread that is tearing down its locals.
    pub fn start(&self, name: impl Into<String>, attributes: Attributes) {
        let name: String = name.into();
        match SequenceId::current() {
            Some(seq) => self.start_on(seq, name, attributes),
            None => trace!("start({}) during thread teardown, ignored", name),
        }
    }

    /// Record exit from `name` on the calling thread's sequence
    pub fn end(&self, name: &str) {
        match SequenceId::current() {
            Some(seq) => self.end_on(seq, name),
            None => trace!("end({}) during thread teardown, ignored", name),
        }
    }

    /// Record entry on an explicit sequence
    ///
    /// Runs regardless of the enabled flag so nesting stays consistent when
    /// recording is switched on mid-chain.
    pub fn start_on(&self, seq: SequenceId, name: impl Into<String>, attributes: Attributes) {
        self.builder.start(seq, name, attributes);
    }

    /// Record exit on an explicit sequence
    pub fn end_on(&self, seq: SequenceId, name: &str) {
        if let Some(root) = self.builder.end(seq, name) {
            self.complete_root(root);
        }
    }

    /// Number of sequences with open calls
    pub fn active_sequences(&self) -> usize {
        self.builder.active_sequences()
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.state.lock();
        StoreStats {
            retained: state.retained,
            discarded_shallow: state.discarded_shallow,
            dropped_disabled: state.dropped_disabled,
            builder: self.builder.stats(),
        }
    }

    /// Return to the freshly-initialised state
    ///
    /// Disables recording, clears logs and counters, and abandons every
    /// open call. Keeps the configured threshold.
    pub fn teardown(&self) {
        {
            let mut state = self.state.lock();
            let min = state.min_call_stack_size;
            *state = StoreState::new(false, min);
        }
        self.builder.reset();
        self.builder.reset_stats();
        info!("Chain logging torn down");
    }

    fn complete_root(&self, root: Call) {
        let depth = root.depth();
        let mut state = self.state.lock();

        if !state.enabled {
            state.dropped_disabled += 1;
            debug!("Dropped root {} (recording disabled)", root.name);
            return;
        }

        if depth < usize::from(state.min_call_stack_size) {
            state.discarded_shallow += 1;
            debug!(
                "Discarded root {} (depth {} < {})",
                root.name, depth, state.min_call_stack_size
            );
            return;
        }

        debug!("Retained root {} (depth {})", root.name, depth);
        Arc::make_mut(&mut state.roots).push(Arc::new(root));
        state.retained += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::thread;

    const SEQ: SequenceId = SequenceId(7);

    fn chain(store: &TraceStore, depth: usize) {
        let names: Vec<String> = (0..depth).map(|i| format!("level{}", i)).collect();
        for name in &names {
            store.start_on(SEQ, name.as_str(), Attributes::new());
        }
        for name in names.iter().rev() {
            store.end_on(SEQ, name);
        }
    }

    #[test]
    fn test_new_store_is_disabled() {
        let store = TraceStore::new();
        assert!(!store.is_enabled());
        assert_eq!(store.min_call_stack_size(), 3);

        chain(&store, 5);
        assert!(store.get_logs().is_empty());
        assert_eq!(store.stats().dropped_disabled, 1);
    }

    #[test]
    fn test_threshold_boundary() {
        let store = TraceStore::new();
        store.enable();

        chain(&store, 2);
        assert!(store.get_logs().is_empty());

        chain(&store, 3);
        assert_eq!(store.get_logs().len(), 1);

        let stats = store.stats();
        assert_eq!(stats.discarded_shallow, 1);
        assert_eq!(stats.retained, 1);
    }

    #[test]
    fn test_threshold_change_is_not_retroactive() {
        let store = TraceStore::new();
        store.enable();
        chain(&store, 3);

        store.set_min_call_stack_size(10);
        assert_eq!(store.get_logs().len(), 1);

        chain(&store, 3);
        assert_eq!(store.get_logs().len(), 1);
    }

    #[test]
    fn test_snapshot_survives_append() {
        let store = TraceStore::new();
        store.enable();
        chain(&store, 3);

        let before = store.get_logs();
        chain(&store, 4);

        assert_eq!(before.len(), 1);
        assert_eq!(store.get_logs().len(), 2);
    }

    #[test]
    fn test_with_config() {
        let config = RecorderConfig {
            enabled: true,
            min_call_stack_size: 1,
            show_obj_full_name: false,
        };
        let store = TraceStore::with_config(&config);

        chain(&store, 1);
        assert_eq!(store.get_logs().len(), 1);
    }

    #[test]
    fn test_teardown_resets_state() {
        let store = TraceStore::new();
        store.enable();
        store.set_min_call_stack_size(1);
        chain(&store, 2);
        store.start_on(SEQ, "left-open", Attributes::new());

        store.teardown();

        assert!(!store.is_enabled());
        assert!(store.get_logs().is_empty());
        assert_eq!(store.active_sequences(), 0);
        assert_eq!(store.stats(), StoreStats::default());
        assert_eq!(store.min_call_stack_size(), 1);
    }

    #[test]
    fn test_recording_from_thread_local_destructor() {
        struct RecordOnDrop(Arc<TraceStore>);

        impl Drop for RecordOnDrop {
            fn drop(&mut self) {
                self.0.start("teardown", Attributes::new());
                self.0.end("teardown");
            }
        }

        thread_local! {
            static GUARD: RefCell<Option<RecordOnDrop>> = const { RefCell::new(None) };
        }

        let store = Arc::new(TraceStore::new());
        store.set_min_call_stack_size(1);
        store.enable();

        let handle = Arc::clone(&store);
        let joined = thread::spawn(move || {
            GUARD.with(|guard| *guard.borrow_mut() = Some(RecordOnDrop(handle)));
        })
        .join();

        assert!(joined.is_ok());
        assert_eq!(store.active_sequences(), 0);
    }
}
