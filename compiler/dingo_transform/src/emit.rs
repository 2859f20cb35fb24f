//! Shared emission helpers: zero values and subtree cloning.

use dingo_ir::ast::{Block, Expr, ExprKind, LitKind};
use dingo_ir::{BlockId, ExprId, Span};
use dingo_types::{type_to_syntax, zero_value, Type, ZeroValue};

use crate::Context;

/// Materialize the zero value of a type as an expression.
pub(crate) fn zero_expr(cx: &mut Context<'_>, span: Span, ty: &Type) -> ExprId {
    let info = cx.type_info();
    let shape = zero_value(ty, &|name| info.and_then(|i| i.underlying(name)));
    shape_to_expr(cx, span, &shape)
}

/// Zero expressions for a result list, element-wise.
pub(crate) fn zero_exprs_for(cx: &mut Context<'_>, span: Span, types: &[Type]) -> Vec<ExprId> {
    types.iter().map(|ty| zero_expr(cx, span, ty)).collect()
}

fn shape_to_expr(cx: &mut Context<'_>, span: Span, shape: &ZeroValue) -> ExprId {
    match shape {
        ZeroValue::False => cx.builder(span).lit_bool(false),
        ZeroValue::Zero => cx.builder(span).lit_int(0),
        ZeroValue::ZeroFloat => cx.builder(span).expr(ExprKind::Lit(LitKind::float(0.0))),
        ZeroValue::EmptyString => cx.builder(span).lit_str(""),
        ZeroValue::Nil => cx.builder(span).lit_nil(),
        ZeroValue::EmptyComposite(ty) => {
            let interner = cx.interner().clone();
            let ty_syntax = type_to_syntax(ty, &mut cx.arena, &interner, span);
            cx.builder(span).composite(Some(ty_syntax), Vec::new())
        }
        // A tuple zero in expression position collapses to its first
        // element; result lists go through `zero_exprs_for` instead.
        ZeroValue::Tuple(elems) => match elems.first() {
            Some(first) => shape_to_expr(cx, span, first),
            None => cx.builder(span).lit_nil(),
        },
    }
}

/// Deep-copy an expression subtree.
///
/// Expressions and blocks are cloned so every occurrence has its own node;
/// type expressions and patterns are shared (nothing rewrites them through
/// parent walks).
pub(crate) fn clone_expr(cx: &mut Context<'_>, id: ExprId) -> ExprId {
    let Expr { kind, span } = cx.arena.expr(id).clone();
    let kind = match kind {
        ExprKind::Lit(_) | ExprKind::Ident(_) => kind,
        ExprKind::Selector { recv, field } => ExprKind::Selector {
            recv: clone_expr(cx, recv),
            field,
        },
        ExprKind::Index { recv, index } => ExprKind::Index {
            recv: clone_expr(cx, recv),
            index: clone_expr(cx, index),
        },
        ExprKind::Slice { recv, low, high } => ExprKind::Slice {
            recv: clone_expr(cx, recv),
            low: low.map(|e| clone_expr(cx, e)),
            high: high.map(|e| clone_expr(cx, e)),
        },
        ExprKind::Call { func, args } => ExprKind::Call {
            func: clone_expr(cx, func),
            args: args.into_iter().map(|a| clone_expr(cx, a)).collect(),
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: clone_expr(cx, operand),
        },
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op,
            lhs: clone_expr(cx, lhs),
            rhs: clone_expr(cx, rhs),
        },
        ExprKind::Composite { ty, fields } => ExprKind::Composite {
            ty,
            fields: fields
                .into_iter()
                .map(|mut f| {
                    f.value = clone_expr(cx, f.value);
                    f
                })
                .collect(),
        },
        ExprKind::FuncLit {
            params,
            results,
            body,
        } => ExprKind::FuncLit {
            params,
            results,
            body: clone_block(cx, body),
        },
        ExprKind::TypeAssert { recv, ty } => ExprKind::TypeAssert {
            recv: clone_expr(cx, recv),
            ty,
        },
        ExprKind::Paren(inner) => ExprKind::Paren(clone_expr(cx, inner)),
        ExprKind::ErrorPropagation { inner, syntax } => ExprKind::ErrorPropagation {
            inner: clone_expr(cx, inner),
            syntax,
        },
        ExprKind::SafeNavigation { recv, field } => ExprKind::SafeNavigation {
            recv: clone_expr(cx, recv),
            field,
        },
        ExprKind::NullCoalescing { lhs, rhs } => ExprKind::NullCoalescing {
            lhs: clone_expr(cx, lhs),
            rhs: clone_expr(cx, rhs),
        },
        ExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => ExprKind::Ternary {
            cond: clone_expr(cx, cond),
            then_expr: clone_expr(cx, then_expr),
            else_expr: clone_expr(cx, else_expr),
        },
        ExprKind::Match { scrutinee, arms } => ExprKind::Match {
            scrutinee: clone_expr(cx, scrutinee),
            arms: arms
                .into_iter()
                .map(|mut arm| {
                    arm.guard = arm.guard.map(|g| clone_expr(cx, g));
                    arm.body = clone_expr(cx, arm.body);
                    arm
                })
                .collect(),
        },
    };
    cx.arena.alloc_expr(Expr::new(kind, span))
}

fn clone_block(cx: &mut Context<'_>, id: BlockId) -> BlockId {
    // Statement subtrees inside cloned function literals are rare and
    // shallow; clone statement ids by re-allocating each statement node.
    let Block { stmts, span } = cx.arena.block(id).clone();
    let stmts = stmts
        .into_iter()
        .map(|s| {
            let stmt = cx.arena.stmt(s).clone();
            cx.arena.alloc_stmt(stmt)
        })
        .collect();
    cx.arena.alloc_block(Block { stmts, span })
}
