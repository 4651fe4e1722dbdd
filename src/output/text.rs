//! Plain-text rendering of call trees.
//!
//! Layout follows the interactive inspector: each call on its own line,
//! children indented beneath it, and a node that absorbed repeats headed by
//! `name (N calls)`.
//!
//! ```text
//! Engine.Pawn.Tick
//!   Engine.Move.Step (3 calls)
//!     Engine.Move.Step
//!       Engine.Move.Sweep
//! ```

use crate::recorder::Call;
use crate::utils::config::OBJ_FULL_NAME_ATTR;
use std::fmt::Write;

/// Options for text rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix each call with the object it was made on
    pub show_obj_full_name: bool,

    /// Spaces per nesting level
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_obj_full_name: false,
            indent: 2,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_obj_full_name(mut self, show: bool) -> Self {
        self.show_obj_full_name = show;
        self
    }
}

/// Split an object full name into its type and path
///
/// `"Pawn Level.Player_0"` gives `("Pawn", Some(" Level.Player_0"))`. The
/// path keeps its leading space, as the inspector prints the two side by side.
pub fn split_object_full_name(full_name: &str) -> (&str, Option<&str>) {
    match full_name.find(' ') {
        Some(index) => (&full_name[..index], Some(&full_name[index..])),
        None => (full_name, None),
    }
}

/// Render a sequence of root calls
///
/// **Public** - used by the replay and demo commands
pub fn render_logs<'a, I>(roots: I, options: &RenderOptions) -> String
where
    I: IntoIterator<Item = &'a Call>,
{
    let mut out = String::new();
    for root in roots {
        render_call(root, options, &mut out);
    }
    out
}

/// Render one call and its subtree
pub fn render_tree(call: &Call, options: &RenderOptions) -> String {
    let mut out = String::new();
    render_call(call, options, &mut out);
    out
}

fn render_call(root: &Call, options: &RenderOptions, out: &mut String) {
    let pad = |level: usize| " ".repeat(level * options.indent);
    let mut pending: Vec<(&Call, usize)> = vec![(root, 0)];

    while let Some((call, mut level)) = pending.pop() {
        if call.child_count() > 0 {
            let _ = writeln!(out, "{}{} ({} calls)", pad(level), call.name, call.call_count());
            level += 1;
        }

        let _ = write!(out, "{}", pad(level));
        if options.show_obj_full_name {
            if let Some(full_name) = call.attr_str(OBJ_FULL_NAME_ATTR) {
                let (kind, path) = split_object_full_name(full_name);
                let _ = write!(out, "[{}{}] ", kind, path.unwrap_or(""));
            }
        }
        let _ = writeln!(out, "{}", call.name);

        // Reversed so children pop in call order.
        pending.extend(call.children.iter().rev().map(|child| (child, level + 1)));
    }
}
