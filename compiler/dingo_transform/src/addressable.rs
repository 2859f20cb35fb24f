//! Addressability.
//!
//! The generated unions store variant payloads behind pointers, so
//! constructor rewrites must take the address of their argument. Expressions
//! whose address cannot be taken directly are wrapped in the
//! declare-temporary-return-its-address idiom.

use dingo_ir::ast::{ExprKind, UnaryOp};
use dingo_ir::{ExprId, NodeRef, Span, SyntaxArena};
use dingo_types::{type_to_syntax, Type};

use crate::Context;

/// Whether an expression's address can be taken without an auxiliary
/// allocation.
///
/// Addressable: identifiers, field selectors of addressable receivers,
/// index expressions, pointer dereferences, and parenthesizations thereof.
/// Index is addressable even for maps, a pragmatic over-approximation; a
/// precise implementation would split map indexing (non-addressable) from
/// array/slice indexing.
///
/// Non-addressable: literals, composite literals, call results, operator
/// results, type assertions, and slice expressions.
pub fn is_addressable(arena: &SyntaxArena, expr: ExprId) -> bool {
    match &arena.expr(expr).kind {
        ExprKind::Ident(_) => true,
        ExprKind::Selector { recv, .. } => is_addressable(arena, *recv),
        ExprKind::Index { .. } => true,
        ExprKind::Unary {
            op: UnaryOp::Deref, ..
        } => true,
        ExprKind::Paren(inner) => is_addressable(arena, *inner),
        _ => false,
    }
}

/// Produce a `*T`-typed reference to `value`.
///
/// Addressable values become `&value`; everything else is wrapped in an
/// immediately-invoked function that declares a temporary and returns its
/// address:
///
/// ```text
/// (func() *T { __tmpN := value; return &__tmpN })()
/// ```
pub fn addressable_ref(cx: &mut Context<'_>, value: ExprId, ty: &Type, span: Span) -> ExprId {
    if is_addressable(&cx.arena, value) {
        return cx.builder(span).addr_of(value);
    }

    let tmp = cx.next_temp_var();
    let interner = cx.interner().clone();
    let elem_ty = type_to_syntax(ty, &mut cx.arena, &interner, span);

    let mut b = cx.builder(span);
    let tmp_lhs = b.ident_name(tmp);
    let define = b.define(vec![tmp_lhs], vec![value]);
    let tmp_ref = b.ident_name(tmp);
    let addr = b.addr_of(tmp_ref);
    let ret = b.ret(vec![addr]);
    let body = b.block(vec![define, ret]);
    let ptr_ty = b.ptr_type(elem_ty);
    let wrapped = b.iife(vec![ptr_ty], body);
    cx.record_subtree(NodeRef::Expr(wrapped));
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_ir::{AstBuilder, SharedInterner, StringInterner};
    use dingo_types::PrimKind;

    #[test]
    fn test_addressable_shapes() {
        let mut arena = SyntaxArena::new();
        let interner = StringInterner::new();
        let mut b = AstBuilder::new(&mut arena, &interner, Span::DUMMY);

        let ident = b.ident("x");
        let field = b.selector(ident, "y");
        let lit = b.lit_int(1);
        let call = b.call_ident("f", vec![]);
        let call_field = b.selector(call, "y");
        let deref = b.deref(call);
        let paren_ident = b.expr(ExprKind::Paren(ident));
        let sum = b.binary(dingo_ir::ast::BinaryOp::Add, ident, lit);
        let index = b.expr(ExprKind::Index {
            recv: ident,
            index: lit,
        });

        assert!(is_addressable(&arena, ident));
        assert!(is_addressable(&arena, field));
        assert!(is_addressable(&arena, deref));
        assert!(is_addressable(&arena, paren_ident));
        assert!(is_addressable(&arena, index));

        assert!(!is_addressable(&arena, lit));
        assert!(!is_addressable(&arena, call));
        assert!(!is_addressable(&arena, call_field)); // receiver not addressable
        assert!(!is_addressable(&arena, sum));
    }

    #[test]
    fn test_non_addressable_wrapped_in_iife() {
        let registry = dingo_types::SyntheticTypeRegistry::new();
        let mut cx = Context::new(
            SyntaxArena::new(),
            dingo_ir::ast::SourceFile::default(),
            SharedInterner::new(),
            None,
            &registry,
            crate::Config::default(),
        );

        let lit = cx.builder(Span::DUMMY).lit_int(42);
        let wrapped = addressable_ref(&mut cx, lit, &Type::Prim(PrimKind::Int), Span::DUMMY);

        // Shape: Call(FuncLit{results: [*int]}, []).
        let ExprKind::Call { func, args } = &cx.arena.expr(wrapped).kind else {
            panic!("expected an immediately-invoked function");
        };
        assert!(args.is_empty());
        let ExprKind::FuncLit { results, body, .. } = &cx.arena.expr(*func).kind else {
            panic!("expected a function literal");
        };
        assert_eq!(results.len(), 1);
        assert_eq!(cx.arena.block(*body).stmts.len(), 2);
    }

    #[test]
    fn test_addressable_gets_plain_addr_of() {
        let registry = dingo_types::SyntheticTypeRegistry::new();
        let mut cx = Context::new(
            SyntaxArena::new(),
            dingo_ir::ast::SourceFile::default(),
            SharedInterner::new(),
            None,
            &registry,
            crate::Config::default(),
        );

        let ident = cx.builder(Span::DUMMY).ident("v");
        let taken = addressable_ref(&mut cx, ident, &Type::Prim(PrimKind::Int), Span::DUMMY);
        assert!(matches!(
            cx.arena.expr(taken).kind,
            ExprKind::Unary {
                op: UnaryOp::AddrOf,
                ..
            }
        ));
    }
}
