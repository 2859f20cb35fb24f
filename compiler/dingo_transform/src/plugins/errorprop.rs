//! Error-propagation lifting.
//!
//! `f(args)?` (or `f(args)!`, `try f(args)`; the spellings are
//! semantically identical) becomes
//!
//! ```text
//! __tmpN, __errN := f(args)
//! if __errN != nil { return <zero-T>…, __errN }
//! ```
//!
//! floated to the enclosing statement level, with the original expression
//! replaced by `__tmpN`. Zero values come from the enclosing function's
//! declared results, every position but the trailing error. Nested
//! propagations lift outer-first, which leaves each inner propagation
//! sitting in an already-lifted statement and produces correctly ordered
//! temp definitions.

use dingo_diagnostic::diagnostic;
use dingo_ir::ast::{DeclKind, ExprKind, StmtKind};
use dingo_ir::{walk_file, ExprId, NodeRef, TypeExprId};
use dingo_types::Type;

use crate::emit::zero_exprs_for;
use crate::plugin::Plugin;
use crate::{Context, EngineError};

/// The error-propagation lifter plugin.
#[derive(Default)]
pub struct ErrorPropPlugin {
    sites: Vec<ExprId>,
}

impl ErrorPropPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for ErrorPropPlugin {
    fn name(&self) -> &'static str {
        "error-propagation"
    }

    fn reset(&mut self) {
        self.sites.clear();
    }

    fn discover(&mut self, cx: &Context<'_>) {
        walk_file(&cx.arena, &cx.file, &mut |node| {
            if let NodeRef::Expr(id) = node {
                if matches!(cx.arena.expr(id).kind, ExprKind::ErrorPropagation { .. }) {
                    self.sites.push(id);
                }
            }
        });
    }

    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        for site in std::mem::take(&mut self.sites) {
            self.lift(cx, site)?;
        }
        Ok(())
    }
}

impl ErrorPropPlugin {
    fn lift(&mut self, cx: &mut Context<'_>, site: ExprId) -> Result<(), EngineError> {
        let span = cx.arena.expr(site).span;
        let ExprKind::ErrorPropagation { inner, .. } = cx.arena.expr(site).kind else {
            return Ok(());
        };

        // The enclosing statement at block level; walking up through
        // expression ancestors (return operands, arguments, composite
        // entries) until a statement is found.
        let Some(anchor) = enclosing_stmt(cx, site) else {
            return Err(EngineError::MissingParent {
                plugin: "error-propagation",
            });
        };

        // Zero values for every declared result but the trailing error.
        let result_tys = enclosing_results(cx, site);
        let Some(result_tys) = result_tys else {
            cx.report(diagnostic::inference_failure(
                span,
                "error propagation outside a function with declared results",
            ));
            return Ok(());
        };
        let zero_tys: Vec<Type> = result_tys
            .iter()
            .take(result_tys.len().saturating_sub(1))
            .map(|&ty| cx.resolver().from_syntax(ty))
            .collect();
        let mut returns = zero_exprs_for(cx, span, &zero_tys);

        let (tmp, errv) = cx.next_temp_pair();

        let define = {
            let mut b = cx.builder(span);
            let tmp_lhs = b.ident_name(tmp);
            let err_lhs = b.ident_name(errv);
            b.define(vec![tmp_lhs, err_lhs], vec![inner])
        };
        let early_return = {
            let mut b = cx.builder(span);
            let err_ref = b.ident_name(errv);
            returns.push(err_ref);
            let ret = b.ret(returns);
            let body = b.block(vec![ret]);
            let err_ref = b.ident_name(errv);
            let nil = b.lit_nil();
            let cond = b.ne(err_ref, nil);
            b.if_stmt(cond, body, None)
        };

        // A propagation that *is* its statement leaves no residual use: the
        // statement itself becomes the early-return check.
        let anchor_is_site = matches!(
            cx.arena.stmt(anchor).kind,
            StmtKind::Expr(e) if e == site
        );
        if anchor_is_site {
            cx.insert_before(anchor, &[define])?;
            let early_kind = cx.arena.stmt(early_return).kind.clone();
            cx.arena.stmt_mut(anchor).kind = early_kind;
            cx.record_subtree(NodeRef::Stmt(anchor));
        } else {
            cx.insert_before(anchor, &[define, early_return])?;
            cx.arena.expr_mut(site).kind = ExprKind::Ident(tmp);
        }
        Ok(())
    }
}

/// The statement containing `expr`, found by walking expression ancestors.
fn enclosing_stmt(cx: &Context<'_>, expr: ExprId) -> Option<dingo_ir::StmtId> {
    let mut found = None;
    cx.walk_parents(NodeRef::Expr(expr), |ancestor| match ancestor {
        NodeRef::Stmt(stmt) => {
            found = Some(stmt);
            false
        }
        NodeRef::Expr(_) => true,
        _ => false,
    });
    found
}

/// Declared result types of the function enclosing `expr`.
fn enclosing_results(cx: &Context<'_>, expr: ExprId) -> Option<Vec<TypeExprId>> {
    let mut found = None;
    cx.walk_parents(NodeRef::Expr(expr), |ancestor| match ancestor {
        NodeRef::Expr(e) => {
            if let ExprKind::FuncLit { results, .. } = &cx.arena.expr(e).kind {
                found = Some(results.clone());
                false
            } else {
                true
            }
        }
        NodeRef::Decl(d) => {
            if let DeclKind::Func(func) = &cx.arena.decl(d).kind {
                found = Some(func.results.clone());
            }
            false
        }
        _ => true,
    });
    found
}
