//! Unified node references and child traversal.
//!
//! [`NodeRef`] erases the node family so the parent map and generic walks can
//! treat the tree uniformly. [`for_each_child`] enumerates the direct
//! children of a node in source order; it is the single place that knows the
//! child edges of every node kind.

use crate::ast::{DeclKind, ExprKind, PatternKind, SourceFile, StmtKind, TypeExprKind};
use crate::{BlockId, DeclId, ExprId, PatternId, StmtId, SyntaxArena, TypeExprId};

/// A reference to any node in the arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeRef {
    Expr(ExprId),
    Stmt(StmtId),
    Decl(DeclId),
    Block(BlockId),
    Pattern(PatternId),
    TypeExpr(TypeExprId),
}

impl NodeRef {
    /// The expression id, if this references an expression.
    #[inline]
    pub fn as_expr(self) -> Option<ExprId> {
        match self {
            NodeRef::Expr(id) => Some(id),
            _ => None,
        }
    }

    /// The statement id, if this references a statement.
    #[inline]
    pub fn as_stmt(self) -> Option<StmtId> {
        match self {
            NodeRef::Stmt(id) => Some(id),
            _ => None,
        }
    }

    /// The block id, if this references a block.
    #[inline]
    pub fn as_block(self) -> Option<BlockId> {
        match self {
            NodeRef::Block(id) => Some(id),
            _ => None,
        }
    }
}

/// Invoke `f` on each direct child of `node`, in source order.
pub fn for_each_child(arena: &SyntaxArena, node: NodeRef, f: &mut impl FnMut(NodeRef)) {
    match node {
        NodeRef::Expr(id) => expr_children(arena, id, f),
        NodeRef::Stmt(id) => stmt_children(arena, id, f),
        NodeRef::Decl(id) => decl_children(arena, id, f),
        NodeRef::Block(id) => {
            for &stmt in &arena.block(id).stmts {
                f(NodeRef::Stmt(stmt));
            }
        }
        NodeRef::Pattern(id) => {
            if let PatternKind::Tuple(subs) = &arena.pattern(id).kind {
                for &sub in subs {
                    f(NodeRef::Pattern(sub));
                }
            }
        }
        NodeRef::TypeExpr(id) => type_expr_children(arena, id, f),
    }
}

/// Walk the subtree rooted at `node` (including `node` itself), depth-first,
/// parents before children.
pub fn walk_subtree(arena: &SyntaxArena, node: NodeRef, f: &mut impl FnMut(NodeRef)) {
    f(node);
    for_each_child(arena, node, &mut |child| walk_subtree(arena, child, f));
}

/// Whether `target` occurs in the subtree rooted at `root` (inclusive).
pub fn subtree_contains(arena: &SyntaxArena, root: NodeRef, target: NodeRef) -> bool {
    if root == target {
        return true;
    }
    let mut found = false;
    for_each_child(arena, root, &mut |child| {
        if !found && subtree_contains(arena, child, target) {
            found = true;
        }
    });
    found
}

/// Walk every node reachable from the file's declaration list.
pub fn walk_file(arena: &SyntaxArena, file: &SourceFile, f: &mut impl FnMut(NodeRef)) {
    for &decl in &file.decls {
        walk_subtree(arena, NodeRef::Decl(decl), f);
    }
}

fn expr_children(arena: &SyntaxArena, id: ExprId, f: &mut impl FnMut(NodeRef)) {
    match &arena.expr(id).kind {
        ExprKind::Lit(_) | ExprKind::Ident(_) => {}
        ExprKind::Selector { recv, .. } | ExprKind::SafeNavigation { recv, .. } => {
            f(NodeRef::Expr(*recv));
        }
        ExprKind::Index { recv, index } => {
            f(NodeRef::Expr(*recv));
            f(NodeRef::Expr(*index));
        }
        ExprKind::Slice { recv, low, high } => {
            f(NodeRef::Expr(*recv));
            if let Some(low) = low {
                f(NodeRef::Expr(*low));
            }
            if let Some(high) = high {
                f(NodeRef::Expr(*high));
            }
        }
        ExprKind::Call { func, args } => {
            f(NodeRef::Expr(*func));
            for &arg in args {
                f(NodeRef::Expr(arg));
            }
        }
        ExprKind::Unary { operand, .. } => f(NodeRef::Expr(*operand)),
        ExprKind::Binary { lhs, rhs, .. } | ExprKind::NullCoalescing { lhs, rhs } => {
            f(NodeRef::Expr(*lhs));
            f(NodeRef::Expr(*rhs));
        }
        ExprKind::Composite { ty, fields } => {
            if let Some(ty) = ty {
                f(NodeRef::TypeExpr(*ty));
            }
            for field in fields {
                f(NodeRef::Expr(field.value));
            }
        }
        ExprKind::FuncLit {
            params,
            results,
            body,
        } => {
            for param in params {
                f(NodeRef::TypeExpr(param.ty));
            }
            for &result in results {
                f(NodeRef::TypeExpr(result));
            }
            f(NodeRef::Block(*body));
        }
        ExprKind::TypeAssert { recv, ty } => {
            f(NodeRef::Expr(*recv));
            f(NodeRef::TypeExpr(*ty));
        }
        ExprKind::Paren(inner) | ExprKind::ErrorPropagation { inner, .. } => {
            f(NodeRef::Expr(*inner));
        }
        ExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            f(NodeRef::Expr(*cond));
            f(NodeRef::Expr(*then_expr));
            f(NodeRef::Expr(*else_expr));
        }
        ExprKind::Match { scrutinee, arms } => {
            f(NodeRef::Expr(*scrutinee));
            for arm in arms {
                f(NodeRef::Pattern(arm.pattern));
                if let Some(guard) = arm.guard {
                    f(NodeRef::Expr(guard));
                }
                f(NodeRef::Expr(arm.body));
            }
        }
    }
}

fn stmt_children(arena: &SyntaxArena, id: StmtId, f: &mut impl FnMut(NodeRef)) {
    match &arena.stmt(id).kind {
        StmtKind::Expr(expr) => f(NodeRef::Expr(*expr)),
        StmtKind::Assign { lhs, rhs, .. } => {
            for &e in lhs {
                f(NodeRef::Expr(e));
            }
            for &e in rhs {
                f(NodeRef::Expr(e));
            }
        }
        StmtKind::VarDecl { ty, values, .. } => {
            if let Some(ty) = ty {
                f(NodeRef::TypeExpr(*ty));
            }
            for &e in values {
                f(NodeRef::Expr(e));
            }
        }
        StmtKind::Return(results) => {
            for &e in results {
                f(NodeRef::Expr(e));
            }
        }
        StmtKind::If {
            cond,
            then_block,
            else_stmt,
        } => {
            f(NodeRef::Expr(*cond));
            f(NodeRef::Block(*then_block));
            if let Some(els) = else_stmt {
                f(NodeRef::Stmt(*els));
            }
        }
        StmtKind::Block(block) => f(NodeRef::Block(*block)),
        StmtKind::Switch { tag, cases } => {
            if let Some(tag) = tag {
                f(NodeRef::Expr(*tag));
            }
            for case in cases {
                for &v in &case.values {
                    f(NodeRef::Expr(v));
                }
                for &s in &case.body {
                    f(NodeRef::Stmt(s));
                }
            }
        }
    }
}

fn decl_children(arena: &SyntaxArena, id: DeclId, f: &mut impl FnMut(NodeRef)) {
    match &arena.decl(id).kind {
        DeclKind::Func(func) => {
            if let Some(recv) = &func.recv {
                f(NodeRef::TypeExpr(recv.ty));
            }
            for param in &func.params {
                f(NodeRef::TypeExpr(param.ty));
            }
            for &result in &func.results {
                f(NodeRef::TypeExpr(result));
            }
            if let Some(body) = func.body {
                f(NodeRef::Block(body));
            }
        }
        DeclKind::TypeSpec { ty, .. } => f(NodeRef::TypeExpr(*ty)),
        DeclKind::Var { ty, values, .. } => {
            if let Some(ty) = ty {
                f(NodeRef::TypeExpr(*ty));
            }
            for &e in values {
                f(NodeRef::Expr(e));
            }
        }
        DeclKind::Const { specs } => {
            for spec in specs {
                if let Some(ty) = spec.ty {
                    f(NodeRef::TypeExpr(ty));
                }
                if let Some(value) = spec.value {
                    f(NodeRef::Expr(value));
                }
            }
        }
        DeclKind::Enum(decl) => {
            for variant in &decl.variants {
                for field in &variant.fields {
                    f(NodeRef::TypeExpr(field.ty));
                }
            }
        }
    }
}

fn type_expr_children(arena: &SyntaxArena, id: TypeExprId, f: &mut impl FnMut(NodeRef)) {
    match &arena.type_expr(id).kind {
        TypeExprKind::Named(_) | TypeExprKind::Qualified { .. } | TypeExprKind::Interface => {}
        TypeExprKind::Pointer(inner)
        | TypeExprKind::Slice(inner)
        | TypeExprKind::Array { elem: inner, .. }
        | TypeExprKind::Chan { elem: inner, .. } => f(NodeRef::TypeExpr(*inner)),
        TypeExprKind::Map { key, value } => {
            f(NodeRef::TypeExpr(*key));
            f(NodeRef::TypeExpr(*value));
        }
        TypeExprKind::Struct { fields } => {
            for field in fields {
                f(NodeRef::TypeExpr(field.ty));
            }
        }
        TypeExprKind::Func { params, results } => {
            for &p in params {
                f(NodeRef::TypeExpr(p));
            }
            for &r in results {
                f(NodeRef::TypeExpr(r));
            }
        }
        TypeExprKind::Generic { args, .. } => {
            for &arg in args {
                f(NodeRef::TypeExpr(arg));
            }
        }
    }
}
