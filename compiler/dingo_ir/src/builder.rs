//! Convenience constructors for generated syntax.
//!
//! The transform plugins synthesize a lot of tree: constructors, helper
//! methods, immediately-invoked function literals, guard chains. The builder
//! packages the alloc-and-wire boilerplate so emission code reads close to
//! the shape of the code it produces. Every node the builder allocates
//! carries the builder's span (the rewrite site), preserving positional
//! metadata through rewrites.

use crate::ast::{
    AssignOp, BinaryOp, Block, CaseClause, Expr, ExprKind, FieldInit, LitKind, Param, Stmt,
    StmtKind, TypeExprKind, TypeExprNode, UnaryOp,
};
use crate::{BlockId, ExprId, Name, Span, StmtId, StringInterner, SyntaxArena, TypeExprId};

/// Builder for generated syntax, pinned to one span.
pub struct AstBuilder<'a> {
    arena: &'a mut SyntaxArena,
    interner: &'a StringInterner,
    span: Span,
}

impl<'a> AstBuilder<'a> {
    /// Create a builder; everything it allocates carries `span`.
    pub fn new(arena: &'a mut SyntaxArena, interner: &'a StringInterner, span: Span) -> Self {
        AstBuilder {
            arena,
            interner,
            span,
        }
    }

    /// The span generated nodes carry.
    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Intern a string.
    #[inline]
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Resolve an interned name back to its text.
    #[inline]
    pub fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    // -- Expressions --

    /// Allocate an arbitrary expression kind.
    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, self.span))
    }

    /// Identifier from text.
    pub fn ident(&mut self, s: &str) -> ExprId {
        let name = self.name(s);
        self.expr(ExprKind::Ident(name))
    }

    /// Identifier from an interned name.
    pub fn ident_name(&mut self, name: Name) -> ExprId {
        self.expr(ExprKind::Ident(name))
    }

    /// Integer literal.
    pub fn lit_int(&mut self, value: i64) -> ExprId {
        self.expr(ExprKind::Lit(LitKind::Int(value)))
    }

    /// String literal.
    pub fn lit_str(&mut self, value: &str) -> ExprId {
        let name = self.name(value);
        self.expr(ExprKind::Lit(LitKind::Str(name)))
    }

    /// Boolean literal.
    pub fn lit_bool(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Lit(LitKind::Bool(value)))
    }

    /// The nil literal.
    pub fn lit_nil(&mut self) -> ExprId {
        self.expr(ExprKind::Lit(LitKind::Nil))
    }

    /// Field selection `recv.field`.
    pub fn selector(&mut self, recv: ExprId, field: &str) -> ExprId {
        let field = self.name(field);
        self.expr(ExprKind::Selector { recv, field })
    }

    /// Field selection with an interned field name.
    pub fn selector_name(&mut self, recv: ExprId, field: Name) -> ExprId {
        self.expr(ExprKind::Selector { recv, field })
    }

    /// Call expression.
    pub fn call(&mut self, func: ExprId, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call { func, args })
    }

    /// Call a named function.
    pub fn call_ident(&mut self, func: &str, args: Vec<ExprId>) -> ExprId {
        let func = self.ident(func);
        self.call(func, args)
    }

    /// Unary operation.
    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    /// Address-of `&operand`.
    pub fn addr_of(&mut self, operand: ExprId) -> ExprId {
        self.unary(UnaryOp::AddrOf, operand)
    }

    /// Dereference `*operand`.
    pub fn deref(&mut self, operand: ExprId) -> ExprId {
        self.unary(UnaryOp::Deref, operand)
    }

    /// Binary operation.
    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, lhs, rhs })
    }

    /// Equality comparison.
    pub fn eq(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Eq, lhs, rhs)
    }

    /// Inequality comparison.
    pub fn ne(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Ne, lhs, rhs)
    }

    /// Composite literal.
    pub fn composite(&mut self, ty: Option<TypeExprId>, fields: Vec<FieldInit>) -> ExprId {
        self.expr(ExprKind::Composite { ty, fields })
    }

    /// Keyed composite-literal entry.
    pub fn field(&self, key: &str, value: ExprId) -> FieldInit {
        FieldInit {
            key: Some(self.name(key)),
            value,
        }
    }

    /// Function literal.
    pub fn func_lit(
        &mut self,
        params: Vec<Param>,
        results: Vec<TypeExprId>,
        body: BlockId,
    ) -> ExprId {
        self.expr(ExprKind::FuncLit {
            params,
            results,
            body,
        })
    }

    /// Immediately-invoked zero-parameter function literal.
    pub fn iife(&mut self, results: Vec<TypeExprId>, body: BlockId) -> ExprId {
        let func = self.func_lit(Vec::new(), results, body);
        self.call(func, Vec::new())
    }

    // -- Statements and blocks --

    /// Allocate an arbitrary statement kind.
    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.arena.alloc_stmt(Stmt::new(kind, self.span))
    }

    /// Allocate a block.
    pub fn block(&mut self, stmts: Vec<StmtId>) -> BlockId {
        self.arena.alloc_block(Block {
            stmts,
            span: self.span,
        })
    }

    /// Expression statement.
    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    /// Short variable declaration `lhs := rhs`.
    pub fn define(&mut self, lhs: Vec<ExprId>, rhs: Vec<ExprId>) -> StmtId {
        self.stmt(StmtKind::Assign {
            op: AssignOp::Define,
            lhs,
            rhs,
        })
    }

    /// Plain assignment `lhs = rhs`.
    pub fn assign(&mut self, lhs: Vec<ExprId>, rhs: Vec<ExprId>) -> StmtId {
        self.stmt(StmtKind::Assign {
            op: AssignOp::Assign,
            lhs,
            rhs,
        })
    }

    /// Return statement.
    pub fn ret(&mut self, results: Vec<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(results))
    }

    /// If statement.
    pub fn if_stmt(
        &mut self,
        cond: ExprId,
        then_block: BlockId,
        else_stmt: Option<StmtId>,
    ) -> StmtId {
        self.stmt(StmtKind::If {
            cond,
            then_block,
            else_stmt,
        })
    }

    /// Switch statement.
    pub fn switch(&mut self, tag: Option<ExprId>, cases: Vec<CaseClause>) -> StmtId {
        self.stmt(StmtKind::Switch { tag, cases })
    }

    /// `panic("msg")` as a statement.
    pub fn panic_stmt(&mut self, msg: &str) -> StmtId {
        let arg = self.lit_str(msg);
        let call = self.call_ident("panic", vec![arg]);
        self.expr_stmt(call)
    }

    /// `if cond { panic("msg") }`.
    pub fn panic_if(&mut self, cond: ExprId, msg: &str) -> StmtId {
        let panic = self.panic_stmt(msg);
        let body = self.block(vec![panic]);
        self.if_stmt(cond, body, None)
    }

    // -- Type expressions --

    /// Allocate an arbitrary type-expression kind.
    pub fn type_expr(&mut self, kind: TypeExprKind) -> TypeExprId {
        self.arena.alloc_type_expr(TypeExprNode::new(kind, self.span))
    }

    /// Named type from text.
    pub fn named_type(&mut self, name: &str) -> TypeExprId {
        let name = self.name(name);
        self.type_expr(TypeExprKind::Named(name))
    }

    /// Pointer type `*inner`.
    pub fn ptr_type(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Pointer(inner))
    }

    /// The empty interface type.
    pub fn iface_type(&mut self) -> TypeExprId {
        self.type_expr(TypeExprKind::Interface)
    }

    /// Function type.
    pub fn func_type(
        &mut self,
        params: Vec<TypeExprId>,
        results: Vec<TypeExprId>,
    ) -> TypeExprId {
        self.type_expr(TypeExprKind::Func { params, results })
    }

    /// A parameter.
    pub fn param(&mut self, name: &str, ty: TypeExprId) -> Param {
        Param {
            name: self.name(name),
            ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;

    #[test]
    fn test_iife_shape() {
        let mut arena = SyntaxArena::new();
        let interner = StringInterner::new();
        let mut b = AstBuilder::new(&mut arena, &interner, Span::new(3, 9));

        let value = b.lit_int(7);
        let ret = b.ret(vec![value]);
        let body = b.block(vec![ret]);
        let result_ty = b.named_type("int");
        let iife = b.iife(vec![result_ty], body);

        let ExprKind::Call { func, args } = &arena.expr(iife).kind else {
            panic!("expected a call");
        };
        assert!(args.is_empty());
        assert!(matches!(arena.expr(*func).kind, ExprKind::FuncLit { .. }));
        assert_eq!(arena.expr(iife).span, Span::new(3, 9));
    }

    #[test]
    fn test_panic_if_shape() {
        let mut arena = SyntaxArena::new();
        let interner = StringInterner::new();
        let mut b = AstBuilder::new(&mut arena, &interner, Span::DUMMY);

        let lhs = b.ident("tag");
        let rhs = b.lit_int(0);
        let cond = b.ne(lhs, rhs);
        let stmt = b.panic_if(cond, "boom");

        assert!(matches!(
            arena.stmt(stmt).kind,
            StmtKind::If { else_stmt: None, .. }
        ));
    }
}
