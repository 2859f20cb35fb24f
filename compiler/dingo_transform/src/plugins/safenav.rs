//! Safe-navigation resolution.
//!
//! Two inputs:
//!
//! - **Typed chains**: `SafeNavigation` nodes (`user?.address?.city`) are
//!   lowered directly to nested immediately-invoked functions. Each nullable
//!   step null-checks and either short-circuits to `None` (or the zero
//!   value, in smart mode) or continues down the chain.
//! - **Preprocessed placeholders**: chains the upstream preprocessor already
//!   emitted as IIFEs carry `__INFER__` placeholders: as a function
//!   literal's result type, and as `__INFER___Some`/`__INFER___None`
//!   constructor calls in its body. The resolver substitutes the concrete
//!   `Option_<T>` discovered from the body's concrete constructor calls, or
//!   from the sibling receiver expression for standalone placeholders.
//!
//! Only nullable receivers (pointers and Option-shaped named types) are
//! valid at intermediate steps; anything else diagnoses NullableRequired
//! and leaves the chain unchanged.

use dingo_diagnostic::diagnostic;
use dingo_ir::ast::{ExprKind, StmtKind, TypeExprKind};
use dingo_ir::{walk_file, walk_subtree, ExprId, Name, NodeRef, Span, StmtId, TypeExprId};
use dingo_types::{type_to_syntax, Type};

use crate::config::SafeNavigationUnwrap;
use crate::emit::{clone_expr, zero_expr};
use crate::plugin::{PendingDecl, Plugin};
use crate::plugins::unions::{record_pending_parents, UnionEmitter};
use crate::shape::{nullable_shape, NullableShape};
use crate::{Context, EngineError};

const PLACEHOLDER: &str = "__INFER__";
const PLACEHOLDER_SOME: &str = "__INFER___Some";
const PLACEHOLDER_NONE: &str = "__INFER___None";

/// The safe-navigation resolver plugin.
#[derive(Default)]
pub struct SafeNavPlugin {
    emitter: UnionEmitter,
    /// Outermost `SafeNavigation` nodes (chain roots).
    chains: Vec<ExprId>,
    /// Function literals with a placeholder result type.
    placeholder_funcs: Vec<ExprId>,
    /// Variable declarations with a placeholder type annotation.
    placeholder_vars: Vec<StmtId>,
}

impl SafeNavPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for SafeNavPlugin {
    fn name(&self) -> &'static str {
        "safe-navigation"
    }

    fn reset(&mut self) {
        self.emitter.reset();
        self.chains.clear();
        self.placeholder_funcs.clear();
        self.placeholder_vars.clear();
    }

    fn discover(&mut self, cx: &Context<'_>) {
        walk_file(&cx.arena, &cx.file, &mut |node| match node {
            NodeRef::Expr(id) => match &cx.arena.expr(id).kind {
                ExprKind::SafeNavigation { .. } => {
                    // Only chain roots; inner links are reached through
                    // their root.
                    let parent_is_nav = matches!(
                        cx.parent(node),
                        Some(NodeRef::Expr(p))
                            if matches!(
                                cx.arena.expr(p).kind,
                                ExprKind::SafeNavigation { .. }
                            )
                    );
                    if !parent_is_nav {
                        self.chains.push(id);
                    }
                }
                ExprKind::FuncLit { results, .. } => {
                    let has_placeholder = results.iter().any(|&r| {
                        matches!(
                            &cx.arena.type_expr(r).kind,
                            TypeExprKind::Named(n) if cx.text(*n) == PLACEHOLDER
                        )
                    });
                    if has_placeholder {
                        self.placeholder_funcs.push(id);
                    }
                }
                _ => {}
            },
            NodeRef::Stmt(id) => {
                if let StmtKind::VarDecl { ty: Some(ty), .. } = &cx.arena.stmt(id).kind {
                    if matches!(
                        &cx.arena.type_expr(*ty).kind,
                        TypeExprKind::Named(n) if cx.text(*n) == PLACEHOLDER
                    ) {
                        self.placeholder_vars.push(id);
                    }
                }
            }
            _ => {}
        });
    }

    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        for chain in std::mem::take(&mut self.chains) {
            self.lower_chain(cx, chain);
        }
        for func in std::mem::take(&mut self.placeholder_funcs) {
            self.resolve_placeholder_func(cx, func);
        }
        for var in std::mem::take(&mut self.placeholder_vars) {
            self.resolve_placeholder_var(cx, var);
        }
        record_pending_parents(&self.emitter, cx);
        Ok(())
    }

    fn pending_decls(&mut self) -> Vec<PendingDecl> {
        self.emitter.take_pending()
    }
}

impl SafeNavPlugin {
    // -- Typed chains --

    fn lower_chain(&mut self, cx: &mut Context<'_>, root: ExprId) {
        let span = cx.arena.expr(root).span;

        // Flatten: base expression plus field names, outermost last.
        let mut fields: Vec<Name> = Vec::new();
        let mut cursor = root;
        while let ExprKind::SafeNavigation { recv, field } = cx.arena.expr(cursor).kind {
            fields.push(field);
            cursor = recv;
        }
        fields.reverse();
        let base = cursor;

        let base_ty = match cx.resolver().resolve(base) {
            Ok(ty) => ty,
            Err(failure) => {
                cx.report(diagnostic::inference_failure(failure.span, &failure.what));
                return;
            }
        };

        // Walk the chain's types up front; every step with a remaining
        // field must be nullable, and field types must be known.
        let mut step_tys = Vec::with_capacity(fields.len() + 1);
        step_tys.push(base_ty.clone());
        let mut cur = base_ty;
        for &field in &fields {
            let Some(shape) = nullable_shape(&cur, cx) else {
                cx.report(diagnostic::nullable_required(span, &cur.to_string()));
                return;
            };
            let field_text = cx.text(field);
            let Some(next) = field_type_of(cx, shape.elem(), field_text) else {
                cx.report(diagnostic::inference_failure(
                    span,
                    &format!("field `.{field_text}` in safe-navigation chain"),
                ));
                return;
            };
            step_tys.push(next.clone());
            cur = next;
        }
        let final_ty = cur;

        let result = match cx.config.safe_navigation_unwrap {
            SafeNavigationUnwrap::AlwaysOption => {
                let union =
                    self.emitter
                        .ensure_union(cx, "Option", std::slice::from_ref(&final_ty), span);
                ChainResult::Option(union)
            }
            SafeNavigationUnwrap::Smart => ChainResult::Naked(final_ty.clone()),
        };

        let base_value = clone_expr(cx, base);
        let lowered = self.build_steps(cx, base_value, &step_tys, &fields, &result, span);

        let lowered_kind = cx.arena.expr(lowered).kind.clone();
        cx.arena.expr_mut(root).kind = lowered_kind;
        cx.record_subtree(NodeRef::Expr(root));
    }

    /// Recursively build the nested-IIFE chain.
    ///
    /// `value` is the accumulated access path (`user`, then `user.address`,
    /// …); `step_tys[0]` is its type; `fields` the remaining links.
    fn build_steps(
        &mut self,
        cx: &mut Context<'_>,
        value: ExprId,
        step_tys: &[Type],
        fields: &[Name],
        result: &ChainResult,
        span: Span,
    ) -> ExprId {
        let Some((&field, rest)) = fields.split_first() else {
            // End of the chain: wrap the final value.
            return match result {
                ChainResult::Option(union) => {
                    let mut b = cx.builder(span);
                    b.call_ident(&format!("{union}_Some"), vec![value])
                }
                ChainResult::Naked(_) => value,
            };
        };

        let shape = nullable_shape(&step_tys[0], cx);
        let result_ty_syntax = self.result_syntax(cx, result, span);
        let short_circuit = self.short_circuit_value(cx, result, span);

        match shape {
            Some(NullableShape::Pointer(_)) => {
                let check_value = clone_expr(cx, value);
                let next_value = {
                    let field_text = cx.text(field).to_string();
                    let mut b = cx.builder(span);
                    b.selector(value, &field_text)
                };
                let inner = self.build_steps(cx, next_value, &step_tys[1..], rest, result, span);

                let mut b = cx.builder(span);
                let nil = b.lit_nil();
                let is_nil = b.eq(check_value, nil);
                let ret_none = b.ret(vec![short_circuit]);
                let none_block = b.block(vec![ret_none]);
                let guard = b.if_stmt(is_nil, none_block, None);
                let ret_inner = b.ret(vec![inner]);
                let body = b.block(vec![guard, ret_inner]);
                b.iife(vec![result_ty_syntax], body)
            }
            Some(NullableShape::Option(_)) => {
                // Bind once; the Option is consulted twice.
                let tmp = cx.next_temp_var();
                let next_value = {
                    let field_text = cx.text(field).to_string();
                    let mut b = cx.builder(span);
                    let tmp_ref = b.ident_name(tmp);
                    let unwrap = b.selector(tmp_ref, "Unwrap");
                    let unwrapped = b.call(unwrap, vec![]);
                    b.selector(unwrapped, &field_text)
                };
                let inner = self.build_steps(cx, next_value, &step_tys[1..], rest, result, span);

                let mut b = cx.builder(span);
                let tmp_lhs = b.ident_name(tmp);
                let bind = b.define(vec![tmp_lhs], vec![value]);
                let tmp_ref = b.ident_name(tmp);
                let is_none_sel = b.selector(tmp_ref, "IsNone");
                let is_none = b.call(is_none_sel, vec![]);
                let ret_none = b.ret(vec![short_circuit]);
                let none_block = b.block(vec![ret_none]);
                let guard = b.if_stmt(is_none, none_block, None);
                let ret_inner = b.ret(vec![inner]);
                let body = b.block(vec![bind, guard, ret_inner]);
                b.iife(vec![result_ty_syntax], body)
            }
            // Unreachable after the up-front type walk; degrade gracefully.
            None => value,
        }
    }

    fn result_syntax(
        &mut self,
        cx: &mut Context<'_>,
        result: &ChainResult,
        span: Span,
    ) -> TypeExprId {
        match result {
            ChainResult::Option(union) => cx.builder(span).named_type(union),
            ChainResult::Naked(ty) => {
                let interner = cx.interner().clone();
                type_to_syntax(ty, &mut cx.arena, &interner, span)
            }
        }
    }

    fn short_circuit_value(
        &mut self,
        cx: &mut Context<'_>,
        result: &ChainResult,
        span: Span,
    ) -> ExprId {
        match result {
            ChainResult::Option(union) => {
                cx.builder(span).call_ident(&format!("{union}_None"), vec![])
            }
            ChainResult::Naked(ty) => zero_expr(cx, span, ty),
        }
    }

    // -- Preprocessed placeholders --

    /// Resolve a function literal's `__INFER__` result from the concrete
    /// `Option_<T>_Some`/`_None` calls in its body, then rewrite the body's
    /// placeholder constructors.
    fn resolve_placeholder_func(&mut self, cx: &mut Context<'_>, func: ExprId) {
        let span = cx.arena.expr(func).span;
        let ExprKind::FuncLit { results, body, .. } = cx.arena.expr(func).kind.clone() else {
            return;
        };

        // Scan for concrete Option constructor calls.
        let mut prefix: Option<String> = None;
        walk_subtree(&cx.arena, NodeRef::Block(body), &mut |node| {
            let NodeRef::Expr(id) = node else { return };
            let ExprKind::Ident(name) = &cx.arena.expr(id).kind else {
                return;
            };
            let text = cx.text(*name);
            let candidate = text
                .strip_suffix("_Some")
                .or_else(|| text.strip_suffix("_None"));
            if let Some(candidate) = candidate {
                if candidate.starts_with("Option_") && prefix.is_none() {
                    prefix = Some(candidate.to_string());
                }
            }
        });

        let Some(prefix) = prefix else {
            cx.report(diagnostic::inference_failure(
                span,
                "safe-navigation placeholder return type",
            ));
            return;
        };

        // The shared prefix is the return type.
        for &result in &results {
            if matches!(
                &cx.arena.type_expr(result).kind,
                TypeExprKind::Named(n) if cx.text(*n) == PLACEHOLDER
            ) {
                let name = cx.name(&prefix);
                cx.arena.type_expr_mut(result).kind = TypeExprKind::Named(name);
            }
        }

        // Substitute the prefix into placeholder constructors.
        let mut placeholder_idents: Vec<(ExprId, &'static str)> = Vec::new();
        walk_subtree(&cx.arena, NodeRef::Block(body), &mut |node| {
            let NodeRef::Expr(id) = node else { return };
            if let ExprKind::Ident(name) = &cx.arena.expr(id).kind {
                match cx.text(*name) {
                    PLACEHOLDER_SOME => placeholder_idents.push((id, "_Some")),
                    PLACEHOLDER_NONE => placeholder_idents.push((id, "_None")),
                    _ => {}
                }
            }
        });
        for (id, suffix) in placeholder_idents {
            let name = cx.name(&format!("{prefix}{suffix}"));
            cx.arena.expr_mut(id).kind = ExprKind::Ident(name);
        }
    }

    /// Resolve a standalone placeholder annotation from the initializer,
    /// the sibling expression naming the actual receiver.
    fn resolve_placeholder_var(&mut self, cx: &mut Context<'_>, var: StmtId) {
        let span = cx.arena.stmt(var).span;
        let StmtKind::VarDecl {
            ty: Some(ty),
            values,
            ..
        } = cx.arena.stmt(var).kind.clone()
        else {
            return;
        };
        let Some(&value) = values.first() else {
            cx.report(diagnostic::inference_failure(
                span,
                "safe-navigation placeholder without an initializer",
            ));
            return;
        };
        let resolved = match cx.resolver().resolve(value) {
            Ok(ty) => ty,
            Err(failure) => {
                cx.report(diagnostic::inference_failure(failure.span, &failure.what));
                return;
            }
        };
        if nullable_shape(&resolved, cx).is_none() {
            cx.report(diagnostic::nullable_required(span, &resolved.to_string()));
            return;
        }
        let interner = cx.interner().clone();
        let new_ty = type_to_syntax(&resolved, &mut cx.arena, &interner, span);
        let new_kind = cx.arena.type_expr(new_ty).kind.clone();
        cx.arena.type_expr_mut(ty).kind = new_kind;
        cx.record_subtree(NodeRef::Stmt(var));
    }
}

/// What the lowered chain yields.
enum ChainResult {
    /// `always_option`: an `Option_<T>` union (canonical name).
    Option(String),
    /// `smart`: the naked element type with a zero-value fallback.
    Naked(Type),
}

/// Field type on the named type behind a nullable step.
fn field_type_of(cx: &Context<'_>, owner: &Type, field: &str) -> Option<Type> {
    let name = match owner {
        Type::Named(name) => name.clone(),
        Type::Pointer(inner) => match &**inner {
            Type::Named(name) => name.clone(),
            _ => return None,
        },
        _ => return None,
    };
    cx.type_info()?.field_type(&name, field)
}
