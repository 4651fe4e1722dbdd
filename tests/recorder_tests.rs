use chain_trace::recorder::{attributes, Attributes, Call, SequenceId};
use chain_trace::store::TraceStore;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Barrier};
use std::thread;

fn enabled_store(min: u16) -> TraceStore {
    let store = TraceStore::new();
    store.set_min_call_stack_size(min);
    store.enable();
    store
}

fn names(calls: &[Call]) -> Vec<&str> {
    calls.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_tree_mirrors_nesting_order() {
    let store = enabled_store(1);

    store.start("main", Attributes::new());
    store.start("load", Attributes::new());
    store.start("read", Attributes::new());
    store.end("read");
    store.start("parse", Attributes::new());
    store.end("parse");
    store.end("load");
    store.start("run", Attributes::new());
    store.end("run");
    store.end("main");

    let logs = store.get_logs();
    assert_eq!(logs.len(), 1);

    let root = &logs[0];
    assert_eq!(root.name, "main");
    assert_eq!(names(&root.children), vec!["load", "run"]);
    assert_eq!(names(&root.children[0].children), vec!["read", "parse"]);
    assert!(root.children[1].children.is_empty());
}

#[test]
fn test_identical_siblings_aggregate() {
    let store = enabled_store(1);

    store.start("parent", Attributes::new());
    for _ in 0..3 {
        store.start("f", attributes([("a", 1u64)]));
        store.end("f");
    }
    store.end("parent");

    let logs = store.get_logs();
    let children = &logs[0].children;

    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "f");
    assert_eq!(children[0].child_count(), 2);

    let mut expected = attributes([("a", 1u64)]);
    expected.insert("childCount".to_string(), 2u64.into());
    assert_eq!(children[0].attributes, expected);
}

#[test]
fn test_distinct_attributes_do_not_aggregate() {
    let store = enabled_store(1);

    store.start("parent", Attributes::new());
    store.start("f", attributes([("a", 1u64)]));
    store.end("f");
    store.start("f", attributes([("a", 2u64)]));
    store.end("f");
    store.end("parent");

    let logs = store.get_logs();
    let children = &logs[0].children;

    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c.child_count() == 0));
}

#[test]
fn test_repeats_keep_first_occurrence_subtree() {
    let store = enabled_store(1);

    store.start("parent", Attributes::new());
    store.start("f", Attributes::new());
    store.start("first_only", Attributes::new());
    store.end("first_only");
    store.end("f");
    store.start("f", Attributes::new());
    store.start("second_only", Attributes::new());
    store.end("second_only");
    store.end("f");
    store.end("parent");

    let logs = store.get_logs();
    let f = &logs[0].children[0];

    assert_eq!(logs[0].children.len(), 1);
    assert_eq!(f.child_count(), 1);
    assert_eq!(names(&f.children), vec!["first_only"]);
}

#[test]
fn test_retention_threshold() {
    let store = enabled_store(3);

    // depth 2
    store.start("a", Attributes::new());
    store.start("b", Attributes::new());
    store.end("b");
    store.end("a");
    assert!(store.get_logs().is_empty());

    // depth 3
    store.start("a", Attributes::new());
    store.start("b", Attributes::new());
    store.start("c", Attributes::new());
    store.end("c");
    store.end("b");
    store.end("a");

    let logs = store.get_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].depth(), 3);
}

#[test]
fn test_clear_then_get_is_empty() {
    let store = enabled_store(1);
    for _ in 0..4 {
        store.start("f", Attributes::new());
        store.end("f");
    }
    assert_eq!(store.get_logs().len(), 4);

    store.clear_logs();
    assert!(store.get_logs().is_empty());
}

#[test]
fn test_snapshot_isolation() {
    let store = enabled_store(1);
    store.start("a", Attributes::new());
    store.start("b", Attributes::new());
    store.end("b");
    store.end("a");

    let snapshot = store.get_logs();
    let captured: Vec<Call> = snapshot.to_calls();

    store.clear_logs();
    store.start("c", Attributes::new());
    store.end("c");

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.node_count(), 2);
    assert_eq!(snapshot.to_calls(), captured);
    assert_eq!(names(&store.get_logs().to_calls()), vec!["c"]);
}

#[test]
fn test_unmatched_end_leaves_no_trace() {
    let store = enabled_store(1);

    store.end("x");
    store.start("y", Attributes::new());
    store.end("y");

    let logs = store.get_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].name, "y");
    assert!(logs[0].children.is_empty());
    assert_eq!(store.stats().builder.unmatched_ends, 1);
}

#[test]
fn test_mismatched_end_keeps_start_name() {
    let store = enabled_store(1);

    store.start("outer", Attributes::new());
    store.start("inner", Attributes::new());
    store.end("not_inner");
    store.end("outer");

    let logs = store.get_logs();
    assert_eq!(logs[0].children[0].name, "inner");
    assert_eq!(store.stats().builder.mismatched_ends, 1);
}

#[test]
fn test_disabled_drops_roots_but_tracks_nesting() {
    let store = TraceStore::new();
    store.set_min_call_stack_size(1);

    // Chain opened while disabled, closed after enabling: the nesting is
    // intact and the root is retained because it completes while enabled.
    store.start("outer", Attributes::new());
    store.start("inner", Attributes::new());
    store.end("inner");
    store.enable();
    store.end("outer");

    // Completes while disabled: dropped.
    store.disable();
    store.start("later", Attributes::new());
    store.end("later");

    let logs = store.get_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(names(&logs[0].children), vec!["inner"]);
    assert_eq!(store.stats().dropped_disabled, 1);
}

#[test]
fn test_interleaved_sequences_stay_independent() {
    let store = enabled_store(2);
    let a = SequenceId(1);
    let b = SequenceId(2);

    store.start_on(a, "a.root", Attributes::new());
    store.start_on(b, "b.root", Attributes::new());
    store.start_on(a, "a.child", Attributes::new());
    store.start_on(b, "b.child", Attributes::new());
    store.end_on(a, "a.child");
    store.start_on(a, "a.child2", Attributes::new());
    store.end_on(b, "b.child");
    store.end_on(b, "b.root");
    store.end_on(a, "a.child2");
    store.end_on(a, "a.root");

    let logs = store.get_logs().to_calls();
    assert_eq!(names(&logs), vec!["b.root", "a.root"]);
    assert_eq!(names(&logs[0].children), vec!["b.child"]);
    assert_eq!(names(&logs[1].children), vec!["a.child", "a.child2"]);
}

#[test]
fn test_concurrent_threads_build_independent_trees() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 50;

    let store = Arc::new(enabled_store(3));
    let barrier = Arc::new(Barrier::new(THREADS));

    thread::scope(|scope| {
        for t in 0..THREADS {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            scope.spawn(move || {
                let root = format!("worker{}", t);
                barrier.wait();
                for _ in 0..ROUNDS {
                    store.start(root.as_str(), attributes([("thread", t as u64)]));
                    store.start("step", Attributes::new());
                    store.start("leaf", Attributes::new());
                    store.end("leaf");
                    store.end("step");
                    store.start("step", Attributes::new());
                    store.start("leaf", Attributes::new());
                    store.end("leaf");
                    store.end("step");
                    store.end(&root);
                }
            });
        }
    });

    let logs = store.get_logs();
    assert_eq!(logs.len(), THREADS * ROUNDS);
    assert_eq!(store.active_sequences(), 0);

    for root in logs.iter() {
        let thread = root.attributes.get("thread").and_then(|v| v.as_u64()).unwrap();
        assert_eq!(root.name, format!("worker{}", thread));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "step");
        assert_eq!(root.children[0].child_count(), 1);
        assert_eq!(names(&root.children[0].children), vec!["leaf"]);
    }
}

#[test]
fn test_snapshot_readers_during_recording() {
    let store = Arc::new(enabled_store(1));

    thread::scope(|scope| {
        let writer = Arc::clone(&store);
        scope.spawn(move || {
            for i in 0..200u64 {
                writer.start("tick", attributes([("frame", i)]));
                writer.end("tick");
                if i % 50 == 49 {
                    writer.clear_logs();
                }
            }
        });

        let reader = Arc::clone(&store);
        scope.spawn(move || {
            for _ in 0..200 {
                let snapshot = reader.get_logs();
                let before = snapshot.to_calls();
                // Ordered frames with no gaps: never a partially cleared view.
                for pair in before.windows(2) {
                    let a = pair[0].attributes["frame"].as_u64().unwrap();
                    let b = pair[1].attributes["frame"].as_u64().unwrap();
                    assert_eq!(a + 1, b);
                }
                assert_eq!(snapshot.to_calls(), before);
            }
        });
    });
}
