//! Demo command implementation.
//!
//! Runs a small game-loop-shaped workload on several threads, intercepted by
//! the hook registry with chain logging installed, and prints what the
//! recorder retained. Useful to see aggregation and the depth filter at work
//! without an event script.

use super::models::DemoArgs;
use crate::hooks::{self, HookRegistry, Invocation};
use crate::output::render_logs;
use crate::store::{LogSnapshot, TraceStore};
use anyhow::Result;
use log::info;
use std::sync::Arc;
use std::thread;

/// Execute the demo command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The snapshot that was printed
pub fn execute_demo(args: DemoArgs) -> Result<LogSnapshot> {
    if args.threads == 0 {
        anyhow::bail!("threads must be greater than 0");
    }

    let registry = HookRegistry::new();
    let store = Arc::new(TraceStore::new());
    store.set_min_call_stack_size(args.min_call_stack_size);
    store.enable();
    hooks::install(&registry, Arc::clone(&store));

    info!("Running demo workload on {} threads", args.threads);

    thread::scope(|scope| {
        for worker in 0..args.threads {
            let registry = &registry;
            scope.spawn(move || {
                for _ in 0..args.frames {
                    tick(registry, worker);
                }
            });
        }
    });

    let snapshot = store.get_logs();
    print!(
        "{}",
        render_logs(snapshot.iter().map(|root| root.as_ref()), &args.render)
    );

    let stats = store.stats();
    info!(
        "Retained {} roots ({} nodes), discarded {} shallow, merged {} repeats",
        snapshot.len(),
        snapshot.node_count(),
        stats.discarded_shallow,
        stats.builder.merged_repeats
    );

    Ok(snapshot)
}

/// One simulated frame for `worker`
///
/// Produces a depth-3 `Tick` tree with three identical `Step` calls, and a
/// depth-1 `Poll` call that the default threshold discards.
fn tick(registry: &HookRegistry, worker: usize) {
    let pawn = format!("Pawn Level.Player_{}", worker);
    let mover = format!("MovementComponent Level.Player_{}.Mover", worker);

    let tick = Invocation::new(pawn.as_str(), "Function Engine.Pawn.Tick");
    let step = Invocation::new(mover.as_str(), "Function Engine.Movement.Step");
    let sweep = Invocation::new(mover.as_str(), "Function Engine.Movement.Sweep");
    let poll = Invocation::new(pawn.as_str(), "Function Engine.Input.Poll");

    registry.invoke(&tick, || {
        for _ in 0..3 {
            registry.invoke(&step, || {
                registry.invoke(&sweep, || ());
            });
        }
    });

    registry.invoke(&poll, || ());
}
