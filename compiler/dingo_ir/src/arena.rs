//! Arena allocation for the syntax tree.
//!
//! All nodes live in flat per-family vectors addressed by typed u32 ids.
//! Transforms rewrite nodes in place (`get_*_mut`); replaced children remain
//! allocated but unreferenced, which is why traversal always starts from the
//! file's declaration list rather than iterating storage.
//!
//! # Capacity Limits
//! Max nodes per family: 4 billion (`u32::MAX`), enforced at runtime with a
//! clear panic message.

use crate::ast::{Block, Decl, Expr, Pattern, Stmt, TypeExprNode};
use crate::{BlockId, DeclId, ExprId, PatternId, StmtId, TypeExprId};
use std::fmt;

/// Panic helper for capacity overflow (cold path, never inlined).
#[cold]
#[inline(never)]
fn panic_capacity_exceeded(value: usize, context: &str) -> ! {
    panic!(
        "arena capacity exceeded: {context} has {value} elements (0x{value:X}), max is {} (0x{:X})",
        u32::MAX,
        u32::MAX
    )
}

/// Convert usize to u32, panicking with a clear message on overflow.
#[inline]
fn to_u32(value: usize, context: &str) -> u32 {
    match u32::try_from(value) {
        Ok(v) => v,
        Err(_) => panic_capacity_exceeded(value, context),
    }
}

/// Contiguous storage for all syntax nodes of a file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SyntaxArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    decls: Vec<Decl>,
    blocks: Vec<Block>,
    patterns: Vec<Pattern>,
    type_exprs: Vec<TypeExprNode>,
}

impl SyntaxArena {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Expressions --

    /// Allocate an expression, return its id.
    #[inline]
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(expr);
        id
    }

    /// Get an expression by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get a mutable expression by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    /// Number of allocated expressions.
    #[inline]
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    // -- Statements --

    /// Allocate a statement, return its id.
    #[inline]
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(to_u32(self.stmts.len(), "statements"));
        self.stmts.push(stmt);
        id
    }

    /// Get a statement by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    /// Get a mutable statement by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn stmt_mut(&mut self, id: StmtId) -> &mut Stmt {
        &mut self.stmts[id.index()]
    }

    /// Number of allocated statements.
    #[inline]
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    // -- Declarations --

    /// Allocate a declaration, return its id.
    #[inline]
    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(to_u32(self.decls.len(), "declarations"));
        self.decls.push(decl);
        id
    }

    /// Get a declaration by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    /// Get a mutable declaration by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    /// Number of allocated declarations.
    #[inline]
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    // -- Blocks --

    /// Allocate a block, return its id.
    #[inline]
    pub fn alloc_block(&mut self, block: Block) -> BlockId {
        let id = BlockId::new(to_u32(self.blocks.len(), "blocks"));
        self.blocks.push(block);
        id
    }

    /// Get a block by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Get a mutable block by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }

    // -- Patterns --

    /// Allocate a pattern, return its id.
    #[inline]
    pub fn alloc_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId::new(to_u32(self.patterns.len(), "patterns"));
        self.patterns.push(pattern);
        id
    }

    /// Get a pattern by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    // -- Type expressions --

    /// Allocate a type expression, return its id.
    #[inline]
    pub fn alloc_type_expr(&mut self, ty: TypeExprNode) -> TypeExprId {
        let id = TypeExprId::new(to_u32(self.type_exprs.len(), "type expressions"));
        self.type_exprs.push(ty);
        id
    }

    /// Get a type expression by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn type_expr(&self, id: TypeExprId) -> &TypeExprNode {
        &self.type_exprs[id.index()]
    }

    /// Get a mutable type expression by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn type_expr_mut(&mut self, id: TypeExprId) -> &mut TypeExprNode {
        &mut self.type_exprs[id.index()]
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty() && self.stmts.is_empty() && self.decls.is_empty()
    }
}

impl fmt::Debug for SyntaxArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SyntaxArena {{ {} exprs, {} stmts, {} decls, {} blocks, {} patterns, {} types }}",
            self.exprs.len(),
            self.stmts.len(),
            self.decls.len(),
            self.blocks.len(),
            self.patterns.len(),
            self.type_exprs.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, LitKind};
    use crate::Span;

    #[test]
    fn test_alloc_expr() {
        let mut arena = SyntaxArena::new();

        let id1 = arena.alloc_expr(Expr::new(ExprKind::Lit(LitKind::Int(1)), Span::new(0, 1)));
        let id2 = arena.alloc_expr(Expr::new(ExprKind::Lit(LitKind::Int(2)), Span::new(2, 3)));

        assert_eq!(id1.index(), 0);
        assert_eq!(id2.index(), 1);
        assert_eq!(arena.expr_count(), 2);

        assert!(matches!(
            arena.expr(id1).kind,
            ExprKind::Lit(LitKind::Int(1))
        ));
    }

    #[test]
    fn test_replace_in_place() {
        let mut arena = SyntaxArena::new();
        let id = arena.alloc_expr(Expr::new(ExprKind::Lit(LitKind::Int(1)), Span::new(0, 1)));

        let span = arena.expr(id).span;
        *arena.expr_mut(id) = Expr::new(ExprKind::Lit(LitKind::Bool(true)), span);

        assert!(matches!(
            arena.expr(id).kind,
            ExprKind::Lit(LitKind::Bool(true))
        ));
        assert_eq!(arena.expr(id).span, Span::new(0, 1));
    }
}
