//! Unused-variable cleanup.
//!
//! The last pipeline pass. Lifting and lowering can leave engine-generated
//! temporaries (`__tmpN`, `__errN`) bound but never read, most commonly
//! when a propagated expression's value was discarded. Those bindings are
//! blanked (`_`) so the emitted code compiles. Only generated names are
//! touched; user bindings are never second-guessed.

use rustc_hash::{FxHashMap, FxHashSet};

use dingo_ir::ast::{AssignOp, ExprKind, StmtKind};
use dingo_ir::{walk_file, ExprId, Name, NodeRef};

use crate::plugin::Plugin;
use crate::{Context, EngineError};

/// The unused-temporary cleanup plugin.
#[derive(Default)]
pub struct CleanupPlugin;

impl CleanupPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for CleanupPlugin {
    fn name(&self) -> &'static str {
        "unused-var-cleanup"
    }

    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        // Defining occurrences of generated temps: `lhs` idents of `:=`.
        let mut defining: FxHashMap<Name, Vec<ExprId>> = FxHashMap::default();
        let mut defining_ids: FxHashSet<ExprId> = FxHashSet::default();
        walk_file(&cx.arena, &cx.file, &mut |node| {
            let NodeRef::Stmt(id) = node else { return };
            let StmtKind::Assign {
                op: AssignOp::Define,
                lhs,
                ..
            } = &cx.arena.stmt(id).kind
            else {
                return;
            };
            for &target in lhs {
                if let ExprKind::Ident(name) = &cx.arena.expr(target).kind {
                    if is_generated(cx.text(*name)) {
                        defining.entry(*name).or_default().push(target);
                        defining_ids.insert(target);
                    }
                }
            }
        });
        if defining.is_empty() {
            return Ok(());
        }

        // Uses: every other reachable identifier occurrence.
        let mut used: FxHashSet<Name> = FxHashSet::default();
        walk_file(&cx.arena, &cx.file, &mut |node| {
            let NodeRef::Expr(id) = node else { return };
            if defining_ids.contains(&id) {
                return;
            }
            if let ExprKind::Ident(name) = &cx.arena.expr(id).kind {
                if defining.contains_key(name) {
                    used.insert(*name);
                }
            }
        });

        let blank = cx.name("_");
        for (name, sites) in defining {
            if used.contains(&name) {
                continue;
            }
            for site in sites {
                cx.arena.expr_mut(site).kind = ExprKind::Ident(blank);
            }
        }
        Ok(())
    }
}

fn is_generated(text: &str) -> bool {
    text.starts_with("__tmp") || text.starts_with("__err")
}
