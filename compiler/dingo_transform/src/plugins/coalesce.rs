//! Null-coalescing and ternary lowering.
//!
//! Both operators lower to an immediately-invoked zero-parameter function
//! returning the branched value:
//!
//! - `a ?? b`: bind `a`, test `Some`/non-nil, return the payload or `b`.
//!   For an Option-shaped LHS with an RHS of the element type, the lowered
//!   expression has the element type. Pointer support is gated by
//!   `null_coalescing_pointers`; when disabled the Option-unwrap idiom is
//!   emitted regardless, a known-misbehaving trade-off that keeps one
//!   rewrite shape per operator.
//! - `c ? t : e`: `if c { return t }; return e`.

use dingo_diagnostic::diagnostic;
use dingo_ir::ast::ExprKind;
use dingo_ir::{walk_file, ExprId, NodeRef, Span, TypeExprId};
use dingo_types::{type_to_syntax, Type};

use crate::plugin::Plugin;
use crate::shape::{nullable_shape, NullableShape};
use crate::{Context, EngineError};

/// The null-coalescing plugin.
#[derive(Default)]
pub struct NullCoalescePlugin {
    sites: Vec<ExprId>,
}

impl NullCoalescePlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for NullCoalescePlugin {
    fn name(&self) -> &'static str {
        "null-coalesce"
    }

    fn reset(&mut self) {
        self.sites.clear();
    }

    fn discover(&mut self, cx: &Context<'_>) {
        walk_file(&cx.arena, &cx.file, &mut |node| {
            if let NodeRef::Expr(id) = node {
                if matches!(cx.arena.expr(id).kind, ExprKind::NullCoalescing { .. }) {
                    self.sites.push(id);
                }
            }
        });
    }

    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        for site in std::mem::take(&mut self.sites) {
            lower_coalesce(cx, site);
        }
        Ok(())
    }
}

fn lower_coalesce(cx: &mut Context<'_>, site: ExprId) {
    let span = cx.arena.expr(site).span;
    let ExprKind::NullCoalescing { lhs, rhs } = cx.arena.expr(site).kind else {
        return;
    };

    let lhs_ty = match cx.resolver().resolve(lhs) {
        Ok(ty) => ty,
        Err(failure) => {
            cx.report(diagnostic::inference_failure(failure.span, &failure.what));
            return;
        }
    };

    let shape = nullable_shape(&lhs_ty, cx);
    let lowered = match shape {
        Some(NullableShape::Pointer(elem)) if cx.config.null_coalescing_pointers => {
            pointer_coalesce(cx, lhs, rhs, &elem, span)
        }
        Some(NullableShape::Option(elem)) => option_coalesce(cx, lhs, rhs, &elem, span),
        Some(NullableShape::Pointer(elem)) => {
            // Gated off: the Option-unwrap idiom is emitted anyway. The
            // result still claims the element type; the payload access
            // misbehaves at runtime, by documented choice.
            option_coalesce(cx, lhs, rhs, &elem, span)
        }
        None => {
            cx.report(diagnostic::nullable_required(span, &lhs_ty.to_string()));
            return;
        }
    };

    let lowered_kind = cx.arena.expr(lowered).kind.clone();
    cx.arena.expr_mut(site).kind = lowered_kind;
    cx.record_subtree(NodeRef::Expr(site));
}

/// `(func() T { __tmpN := a; if __tmpN != nil { return *__tmpN }; return b })()`
fn pointer_coalesce(
    cx: &mut Context<'_>,
    lhs: ExprId,
    rhs: ExprId,
    elem: &Type,
    span: Span,
) -> ExprId {
    let elem_syntax = elem_syntax(cx, elem, span);
    let tmp = cx.next_temp_var();
    let mut b = cx.builder(span);
    let tmp_lhs = b.ident_name(tmp);
    let bind = b.define(vec![tmp_lhs], vec![lhs]);
    let tmp_ref = b.ident_name(tmp);
    let nil = b.lit_nil();
    let not_nil = b.ne(tmp_ref, nil);
    let tmp_ref = b.ident_name(tmp);
    let payload = b.deref(tmp_ref);
    let ret_payload = b.ret(vec![payload]);
    let then_block = b.block(vec![ret_payload]);
    let guard = b.if_stmt(not_nil, then_block, None);
    let ret_rhs = b.ret(vec![rhs]);
    let body = b.block(vec![bind, guard, ret_rhs]);
    b.iife(vec![elem_syntax], body)
}

/// `(func() T { __tmpN := a; if __tmpN.IsSome() { return __tmpN.Unwrap() };
/// return b })()`
fn option_coalesce(
    cx: &mut Context<'_>,
    lhs: ExprId,
    rhs: ExprId,
    elem: &Type,
    span: Span,
) -> ExprId {
    let elem_syntax = elem_syntax(cx, elem, span);
    let tmp = cx.next_temp_var();
    let mut b = cx.builder(span);
    let tmp_lhs = b.ident_name(tmp);
    let bind = b.define(vec![tmp_lhs], vec![lhs]);
    let tmp_ref = b.ident_name(tmp);
    let is_some_sel = b.selector(tmp_ref, "IsSome");
    let is_some = b.call(is_some_sel, vec![]);
    let tmp_ref = b.ident_name(tmp);
    let unwrap_sel = b.selector(tmp_ref, "Unwrap");
    let payload = b.call(unwrap_sel, vec![]);
    let ret_payload = b.ret(vec![payload]);
    let then_block = b.block(vec![ret_payload]);
    let guard = b.if_stmt(is_some, then_block, None);
    let ret_rhs = b.ret(vec![rhs]);
    let body = b.block(vec![bind, guard, ret_rhs]);
    b.iife(vec![elem_syntax], body)
}

fn elem_syntax(cx: &mut Context<'_>, elem: &Type, span: Span) -> TypeExprId {
    let interner = cx.interner().clone();
    type_to_syntax(elem, &mut cx.arena, &interner, span)
}

/// The ternary plugin.
#[derive(Default)]
pub struct TernaryPlugin {
    sites: Vec<ExprId>,
}

impl TernaryPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for TernaryPlugin {
    fn name(&self) -> &'static str {
        "ternary"
    }

    fn reset(&mut self) {
        self.sites.clear();
    }

    fn discover(&mut self, cx: &Context<'_>) {
        walk_file(&cx.arena, &cx.file, &mut |node| {
            if let NodeRef::Expr(id) = node {
                if matches!(cx.arena.expr(id).kind, ExprKind::Ternary { .. }) {
                    self.sites.push(id);
                }
            }
        });
    }

    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        for site in std::mem::take(&mut self.sites) {
            lower_ternary(cx, site);
        }
        Ok(())
    }
}

fn lower_ternary(cx: &mut Context<'_>, site: ExprId) {
    let span = cx.arena.expr(site).span;
    let ExprKind::Ternary {
        cond,
        then_expr,
        else_expr,
    } = cx.arena.expr(site).kind
    else {
        return;
    };

    // The branch type: either side may carry it.
    let branch_ty = cx
        .resolver()
        .resolve(then_expr)
        .or_else(|_| cx.resolver().resolve(else_expr));
    let branch_ty = match branch_ty {
        Ok(ty) => ty,
        Err(failure) => {
            cx.report(diagnostic::inference_failure(failure.span, &failure.what));
            return;
        }
    };

    let result_syntax = elem_syntax(cx, &branch_ty, span);
    let mut b = cx.builder(span);
    let ret_then = b.ret(vec![then_expr]);
    let then_block = b.block(vec![ret_then]);
    let guard = b.if_stmt(cond, then_block, None);
    let ret_else = b.ret(vec![else_expr]);
    let body = b.block(vec![guard, ret_else]);
    let lowered = b.iife(vec![result_syntax], body);

    let lowered_kind = cx.arena.expr(lowered).kind.clone();
    cx.arena.expr_mut(site).kind = lowered_kind;
    cx.record_subtree(NodeRef::Expr(site));
}
