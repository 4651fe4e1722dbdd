//! Chain logging: wires the hook registry to a trace store.
//!
//! Installs one wildcard `Pre` hook and one wildcard `Post` hook. Every
//! intercepted invocation opens a call named after the function (kind prefix
//! stripped) carrying the object's full name, and closes it afterwards.

use super::registry::{ExecutionFlag, HookRegistry, HookType, Invocation};
use crate::recorder::attributes;
use crate::store::TraceStore;
use crate::utils::config::{FUNCTION_PREFIX, OBJ_FULL_NAME_ATTR, WILDCARD_TARGET};
use log::info;
use std::sync::Arc;

/// Strip the leading kind prefix from a full function name
///
/// `"Function Engine.Pawn.Tick"` becomes `"Engine.Pawn.Tick"`; names without
/// the prefix are returned unchanged.
pub fn function_name(function_full_name: &str) -> &str {
    function_full_name
        .strip_prefix(FUNCTION_PREFIX)
        .unwrap_or(function_full_name)
}

/// Register the chain logging hooks on `registry`
///
/// **Public** - called once at startup
///
/// The hooks always notify the store; whether completed trees are kept is
/// decided by the store's enabled flag.
pub fn install(registry: &HookRegistry, store: Arc<TraceStore>) {
    let pre_store = Arc::clone(&store);
    registry.register(WILDCARD_TARGET, HookType::Pre, move |inv: &Invocation| {
        pre_store.start(
            function_name(&inv.function_full_name),
            attributes([(OBJ_FULL_NAME_ATTR, inv.object_full_name.as_str())]),
        );
        ExecutionFlag::ContinueExecution
    });

    registry.register(WILDCARD_TARGET, HookType::Post, move |inv: &Invocation| {
        store.end(function_name(&inv.function_full_name));
        ExecutionFlag::ContinueExecution
    });

    info!("Chain logging hooks installed on all targets");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name_strips_prefix() {
        assert_eq!(function_name("Function Engine.Pawn.Tick"), "Engine.Pawn.Tick");
        assert_eq!(function_name("Engine.Pawn.Tick"), "Engine.Pawn.Tick");
        assert_eq!(function_name("Function "), "");
    }

    #[test]
    fn test_installed_hooks_record_nested_calls() {
        let registry = HookRegistry::new();
        let store = Arc::new(TraceStore::new());
        store.enable();
        store.set_min_call_stack_size(2);
        install(&registry, Arc::clone(&store));

        let outer = Invocation::new("Pawn Level.Player", "Function Engine.Pawn.Tick");
        let inner = Invocation::new("Component Level.Player.Move", "Function Engine.Move.Step");

        registry.invoke(&outer, || {
            registry.invoke(&inner, || ());
            registry.invoke(&inner, || ());
        });

        let logs = store.get_logs();
        assert_eq!(logs.len(), 1);

        let root = &logs[0];
        assert_eq!(root.name, "Engine.Pawn.Tick");
        assert_eq!(root.attr_str(OBJ_FULL_NAME_ATTR), Some("Pawn Level.Player"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "Engine.Move.Step");
        assert_eq!(root.children[0].child_count(), 1);
    }
}
