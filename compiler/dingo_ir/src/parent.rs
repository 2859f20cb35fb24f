//! Child-to-parent side map.
//!
//! Parent pointers are computed post-hoc and stored in a side map keyed by
//! node id, so node-to-node edges never form ownership cycles. The map is
//! built once per file; transforms that splice generated subtrees call
//! [`ParentMap::record_subtree`] to keep lookups total.

use crate::ast::SourceFile;
use crate::node::{for_each_child, NodeRef};
use crate::SyntaxArena;
use rustc_hash::FxHashMap;

/// O(1) child → parent lookup after a one-time traversal.
#[derive(Debug, Default, Clone)]
pub struct ParentMap {
    map: FxHashMap<NodeRef, NodeRef>,
    built: bool,
}

impl ParentMap {
    /// Create an empty, unbuilt map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map from every node reachable in `file`.
    ///
    /// # Panics
    /// Panics if called twice for the same file; per-file state must be
    /// rebuilt from scratch, never layered.
    pub fn build(&mut self, arena: &SyntaxArena, file: &SourceFile) {
        assert!(!self.built, "parent map built twice for one file");
        self.built = true;
        for &decl in &file.decls {
            self.record_subtree(arena, NodeRef::Decl(decl));
        }
    }

    /// Whether [`ParentMap::build`] has run.
    #[inline]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Record parent edges for the subtree rooted at `root`.
    ///
    /// `root` itself keeps whatever parent it already has (none for
    /// top-level declarations). Used after splicing generated nodes.
    pub fn record_subtree(&mut self, arena: &SyntaxArena, root: NodeRef) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for_each_child(arena, node, &mut |child| {
                self.map.insert(child, node);
                stack.push(child);
            });
        }
    }

    /// Record a single parent edge, for nodes spliced into an existing
    /// parent whose subtree is re-indexed separately.
    #[inline]
    pub fn set_parent(&mut self, child: NodeRef, parent: NodeRef) {
        self.map.insert(child, parent);
    }

    /// Parent of `node`, or `None` for roots and unrecorded nodes.
    #[inline]
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.map.get(&node).copied()
    }

    /// Invoke `f` on each ancestor of `node`, nearest first, until `f`
    /// returns `false` or a root is reached.
    pub fn walk_parents(&self, node: NodeRef, mut f: impl FnMut(NodeRef) -> bool) {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if !f(parent) {
                return;
            }
            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, Expr, ExprKind, LitKind, Stmt, StmtKind};
    use crate::Span;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parent_lookup() {
        let mut arena = SyntaxArena::new();
        let lit = arena.alloc_expr(Expr::new(ExprKind::Lit(LitKind::Int(1)), Span::DUMMY));
        let stmt = arena.alloc_stmt(Stmt::new(StmtKind::Return(vec![lit]), Span::DUMMY));
        let block = arena.alloc_block(Block {
            stmts: vec![stmt],
            span: Span::DUMMY,
        });

        let mut parents = ParentMap::new();
        parents.record_subtree(&arena, NodeRef::Block(block));

        assert_eq!(
            parents.parent(NodeRef::Expr(lit)),
            Some(NodeRef::Stmt(stmt))
        );
        assert_eq!(
            parents.parent(NodeRef::Stmt(stmt)),
            Some(NodeRef::Block(block))
        );
        assert_eq!(parents.parent(NodeRef::Block(block)), None);
    }

    #[test]
    fn test_walk_parents_stops() {
        let mut arena = SyntaxArena::new();
        let lit = arena.alloc_expr(Expr::new(ExprKind::Lit(LitKind::Int(1)), Span::DUMMY));
        let stmt = arena.alloc_stmt(Stmt::new(StmtKind::Return(vec![lit]), Span::DUMMY));
        let block = arena.alloc_block(Block {
            stmts: vec![stmt],
            span: Span::DUMMY,
        });

        let mut parents = ParentMap::new();
        parents.record_subtree(&arena, NodeRef::Block(block));

        let mut seen = Vec::new();
        parents.walk_parents(NodeRef::Expr(lit), |anc| {
            seen.push(anc);
            false // stop after the first ancestor
        });
        assert_eq!(seen, vec![NodeRef::Stmt(stmt)]);
    }
}
