//! In-process hook registry.
//!
//! Callbacks are registered against a target function name, or against the
//! wildcard `"*"` to observe every invocation, and run before (`Pre`) or
//! after (`Post`) the invocation body.

use crate::utils::config::WILDCARD_TARGET;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// When a hook runs relative to the invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookType {
    Pre,
    Post,
}

/// What a hook asks the dispatcher to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFlag {
    ContinueExecution,
    /// Skip the invocation body (only meaningful for `Pre` hooks)
    SkipOriginal,
}

/// An intercepted invocation as seen by hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Full name of the object the call was made on, e.g. `"Pawn Level.Player_0"`
    pub object_full_name: String,

    /// Full name of the invoked function, e.g. `"Function Engine.Pawn.Tick"`
    pub function_full_name: String,
}

impl Invocation {
    pub fn new(object_full_name: impl Into<String>, function_full_name: impl Into<String>) -> Self {
        Self {
            object_full_name: object_full_name.into(),
            function_full_name: function_full_name.into(),
        }
    }
}

pub type HookFn = Arc<dyn Fn(&Invocation) -> ExecutionFlag + Send + Sync>;

#[derive(Default)]
struct Hooks {
    pre: Vec<HookFn>,
    post: Vec<HookFn>,
}

impl Hooks {
    fn of(&self, kind: HookType) -> &[HookFn] {
        match kind {
            HookType::Pre => &self.pre,
            HookType::Post => &self.post,
        }
    }
}

/// Registry of pre/post hooks keyed by target
///
/// **Public** - the interception surface chain logging installs itself on
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<HashMap<String, Hooks>>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.read();
        f.debug_struct("HookRegistry")
            .field("targets", &hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `target` (`"*"` for every invocation)
    pub fn register<F>(&self, target: impl Into<String>, kind: HookType, callback: F)
    where
        F: Fn(&Invocation) -> ExecutionFlag + Send + Sync + 'static,
    {
        let mut hooks = self.hooks.write();
        let entry = hooks.entry(target.into()).or_default();
        let callback: HookFn = Arc::new(callback);

        match kind {
            HookType::Pre => entry.pre.push(callback),
            HookType::Post => entry.post.push(callback),
        }
    }

    /// Number of hooks registered for `target` and `kind`
    pub fn hook_count(&self, target: &str, kind: HookType) -> usize {
        self.hooks
            .read()
            .get(target)
            .map(|hooks| hooks.of(kind).len())
            .unwrap_or(0)
    }

    /// Run every hook of `kind` matching the invocation
    ///
    /// Exact-target hooks run first, then wildcard hooks, each group in
    /// registration order. All matching hooks run even after one asks to
    /// skip; `SkipOriginal` wins over `ContinueExecution`.
    pub fn dispatch(&self, kind: HookType, invocation: &Invocation) -> ExecutionFlag {
        // Clone out so hooks may register further hooks without deadlocking.
        let callbacks: Vec<HookFn> = {
            let hooks = self.hooks.read();
            let exact = hooks.get(invocation.function_full_name.as_str());
            let wildcard = if invocation.function_full_name == WILDCARD_TARGET {
                None
            } else {
                hooks.get(WILDCARD_TARGET)
            };

            exact
                .into_iter()
                .chain(wildcard)
                .flat_map(|h| h.of(kind).iter().cloned())
                .collect()
        };

        let mut flag = ExecutionFlag::ContinueExecution;
        for callback in callbacks {
            if callback(invocation) == ExecutionFlag::SkipOriginal {
                flag = ExecutionFlag::SkipOriginal;
            }
        }
        flag
    }

    /// Run `body` wrapped in pre and post hooks
    ///
    /// # Returns
    /// `None` when a pre hook skipped the body. Post hooks run either way so
    /// enter/exit notifications stay paired.
    pub fn invoke<T>(&self, invocation: &Invocation, body: impl FnOnce() -> T) -> Option<T> {
        let result = match self.dispatch(HookType::Pre, invocation) {
            ExecutionFlag::ContinueExecution => Some(body()),
            ExecutionFlag::SkipOriginal => None,
        };

        self.dispatch(HookType::Post, invocation);
        result
    }
}
