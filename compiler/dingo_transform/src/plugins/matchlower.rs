//! Pattern-match analysis and lowering.
//!
//! Two input paths share the exhaustiveness machinery:
//!
//! - **Typed path** (primary): `Match` nodes attached by the parser are
//!   checked and lowered to a switch on `scrutinee.tag` with pointer-field
//!   destructuring (`v := *r.ok_0`), honoring the nil-safety policy.
//! - **Marker path** (legacy fallback): switches tagged with
//!   `DINGO_MATCH_START`/`DINGO_PATTERN`/`DINGO_GUARD` comments are checked
//!   for exhaustiveness, and guarded arms get their case bodies wrapped in a
//!   nested `if` with no else so a failing guard falls through.
//!
//! Lowering modes for typed matches:
//! - in `return` position, the return statement becomes the switch and each
//!   arm body returns directly;
//! - in statement position without guards, the statement becomes the switch;
//! - anywhere else, the match becomes an immediately-invoked function whose
//!   cases return the arm bodies.

use dingo_diagnostic::{diagnostic, Sink};
use dingo_ir::ast::{
    CaseClause, Decl, DeclKind, ExprKind, LitKind, PatternKind, StmtKind,
};
use dingo_ir::{ExprId, Name, NodeRef, Span, StmtId, TypeExprId};
use dingo_patterns::{
    check, check_tuple, collect_sites, resolve_universe, MatchSite, ParsedPattern, TupleSite,
    VariantUniverse,
};
use dingo_types::{type_to_syntax, SyntheticType, Type};

use crate::config::NilSafety;
use crate::plugin::{PendingDecl, Plugin};
use crate::{Context, EngineError};

const MSG_NIL_DESTRUCTURE: &str = "nil payload in match destructuring";
const DEBUG_FLAG: &str = "__dingo_debug";

/// A typed arm, pre-resolved for lowering.
struct LoweredArm {
    variant: Option<String>,
    bindings: Vec<Name>,
    guard: Option<ExprId>,
    body: ExprId,
    literal: Option<LitKind>,
}

/// The pattern-match plugin.
#[derive(Default)]
pub struct MatchPlugin {
    typed_matches: Vec<ExprId>,
    pending: Vec<PendingDecl>,
    debug_flag_emitted: bool,
}

impl MatchPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for MatchPlugin {
    fn name(&self) -> &'static str {
        "pattern-match"
    }

    fn reset(&mut self) {
        self.typed_matches.clear();
        self.pending.clear();
        self.debug_flag_emitted = false;
    }

    fn discover(&mut self, cx: &Context<'_>) {
        dingo_ir::walk_file(&cx.arena, &cx.file, &mut |node| {
            if let NodeRef::Expr(id) = node {
                if matches!(cx.arena.expr(id).kind, ExprKind::Match { .. }) {
                    self.typed_matches.push(id);
                }
            }
        });
    }

    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        for id in std::mem::take(&mut self.typed_matches) {
            self.lower_typed_match(cx, id)?;
        }
        self.analyze_marker_sites(cx);
        Ok(())
    }

    fn pending_decls(&mut self) -> Vec<PendingDecl> {
        std::mem::take(&mut self.pending)
    }
}

impl MatchPlugin {
    // -- Typed path --

    fn lower_typed_match(&mut self, cx: &mut Context<'_>, id: ExprId) -> Result<(), EngineError> {
        let span = cx.arena.expr(id).span;
        let ExprKind::Match { scrutinee, arms } = cx.arena.expr(id).kind.clone() else {
            return Ok(());
        };

        // Tuple patterns only arrive through the preprocessor's marker form;
        // a typed tuple match is checked but not lowered.
        if arms
            .iter()
            .any(|arm| matches!(cx.arena.pattern(arm.pattern).kind, PatternKind::Tuple(_)))
        {
            self.check_typed_tuple(cx, &arms, span);
            cx.report(diagnostic::inference_failure(
                span,
                "tuple match expression (expected preprocessed form)",
            ));
            return Ok(());
        }

        let lowered: Vec<LoweredArm> = arms
            .iter()
            .map(|arm| {
                let pattern = cx.arena.pattern(arm.pattern).clone();
                let (variant, bindings, literal) = match pattern.kind {
                    PatternKind::Wildcard => (None, Vec::new(), None),
                    PatternKind::Lit(lit) => (None, Vec::new(), Some(lit)),
                    PatternKind::Variant { name, bindings } => {
                        (Some(cx.text(name).to_string()), bindings, None)
                    }
                    PatternKind::Tuple(_) => (None, Vec::new(), None),
                };
                LoweredArm {
                    variant,
                    bindings,
                    guard: arm.guard,
                    body: arm.body,
                    literal,
                }
            })
            .collect();

        // Literal matches lower to a plain value switch; no union involved.
        if lowered.iter().all(|a| a.variant.is_none()) {
            if lowered.iter().any(|a| a.literal.is_some()) {
                self.lower_value_match(cx, id, scrutinee, &lowered, span)?;
            }
            return Ok(());
        }

        // Variant match: the scrutinee must resolve to a registered union.
        let synth = match cx.resolver().resolve(scrutinee) {
            Ok(Type::Named(name)) => match cx.registry().lookup(&name) {
                Some(synth) => synth,
                None => {
                    cx.report(diagnostic::inference_failure(
                        span,
                        &format!("match scrutinee of type `{name}`"),
                    ));
                    return Ok(());
                }
            },
            Ok(other) => {
                cx.report(diagnostic::inference_failure(
                    span,
                    &format!("match scrutinee of type `{other}`"),
                ));
                return Ok(());
            }
            Err(failure) => {
                cx.report(diagnostic::inference_failure(failure.span, &failure.what));
                return Ok(());
            }
        };

        // Exhaustiveness, guards ignored.
        let parsed: Vec<ParsedPattern> = lowered
            .iter()
            .map(|arm| match &arm.variant {
                Some(name) => ParsedPattern::Variant {
                    name: name.clone(),
                    bindings: Vec::new(),
                },
                None => ParsedPattern::Wildcard,
            })
            .collect();
        let universe = VariantUniverse::Known(
            synth.variants.iter().map(|v| v.name.clone()).collect(),
        );
        let report = check(&parsed.iter().collect::<Vec<_>>(), &universe);
        if !report.is_exhaustive() {
            cx.report(diagnostic::non_exhaustive(span, &report.missing));
        }

        self.lower_union_match(cx, id, scrutinee, &lowered, &synth, span)
    }

    fn check_typed_tuple(
        &mut self,
        cx: &mut Context<'_>,
        arms: &[dingo_ir::ast::MatchArm],
        span: Span,
    ) {
        let mut tuple_arms: Vec<Vec<ParsedPattern>> = Vec::new();
        let mut arity = 0usize;
        for arm in arms {
            if let PatternKind::Tuple(subs) = &cx.arena.pattern(arm.pattern).kind {
                arity = arity.max(subs.len());
                tuple_arms.push(
                    subs.iter()
                        .map(|&sub| match &cx.arena.pattern(sub).kind {
                            PatternKind::Variant { name, .. } => ParsedPattern::Variant {
                                name: cx.text(*name).to_string(),
                                bindings: Vec::new(),
                            },
                            _ => ParsedPattern::Wildcard,
                        })
                        .collect(),
                );
            }
        }
        let universes = position_universes(&tuple_arms, arity, cx);
        let report = check_tuple(&tuple_arms, &universes);
        if !report.is_exhaustive() {
            cx.report(diagnostic::non_exhaustive_tuple(span, &report.missing));
        }
    }

    /// Lower a match over literals to a value switch.
    fn lower_value_match(
        &mut self,
        cx: &mut Context<'_>,
        id: ExprId,
        scrutinee: ExprId,
        arms: &[LoweredArm],
        span: Span,
    ) -> Result<(), EngineError> {
        let mode = lowering_mode(cx, id);
        let mut cases = Vec::with_capacity(arms.len());
        for arm in arms {
            let values = match arm.literal {
                Some(lit) => vec![cx.builder(span).expr(ExprKind::Lit(lit))],
                None => Vec::new(), // wildcard → default
            };
            let body = self.arm_body_stmts(cx, arm, &[], "", mode, span);
            cases.push(CaseClause {
                values,
                body,
                span,
            });
        }
        self.splice_switch(cx, id, Some(scrutinee), cases, arms, None, mode, span)
    }

    /// Lower a variant match to a switch on `scrutinee.tag`.
    fn lower_union_match(
        &mut self,
        cx: &mut Context<'_>,
        id: ExprId,
        scrutinee: ExprId,
        arms: &[LoweredArm],
        synth: &SyntheticType,
        span: Span,
    ) -> Result<(), EngineError> {
        let mode = lowering_mode(cx, id);

        // The scrutinee is referenced once per arm; non-identifier
        // scrutinees bind a temporary first.
        let scrut_ident = match &cx.arena.expr(scrutinee).kind {
            ExprKind::Ident(name) => Some(*name),
            _ => None,
        };
        let (scrut_name, scrut_bind): (Name, Option<StmtId>) = match scrut_ident {
            Some(name) => (name, None),
            None => {
                let tmp = cx.next_temp_var();
                let mut b = cx.builder(span);
                let lhs = b.ident_name(tmp);
                let bind = b.define(vec![lhs], vec![scrutinee]);
                (tmp, Some(bind))
            }
        };

        let tag_ty = synth.tag_type();
        let mut cases: Vec<CaseClause> = Vec::new();
        for arm in arms {
            let scrut_text = cx.text(scrut_name).to_string();
            let (values, field_names) = match &arm.variant {
                Some(variant) => {
                    let tag_const = format!("{tag_ty}_{variant}");
                    let value = cx.builder(span).ident(&tag_const);
                    let fields: Vec<String> = synth
                        .variant_fields(variant)
                        .map(|fs| fs.iter().map(|f| f.name.clone()).collect())
                        .unwrap_or_default();
                    (vec![value], fields)
                }
                None => (Vec::new(), Vec::new()),
            };

            let body = self.arm_body_stmts(cx, arm, &field_names, &scrut_text, mode, span);

            // Arms sharing a variant share one case clause; a failing guard
            // falls through to the next arm's statements within it.
            if let Some(existing) = cases
                .iter_mut()
                .find(|c| !values.is_empty() && case_matches(cx, c, &values))
            {
                existing.body.extend(body);
            } else {
                cases.push(CaseClause {
                    values,
                    body,
                    span,
                });
            }
        }

        let tag_expr = {
            let mut b = cx.builder(span);
            let scrut = b.ident_name(scrut_name);
            b.selector(scrut, "tag")
        };

        if let Some(bind) = scrut_bind {
            // A bound scrutinee forces the IIFE form so the binding has a
            // scope of its own.
            return self
                .splice_switch_iife(cx, id, Some(bind), tag_expr, cases, arms, Some(&synth), span);
        }
        self.splice_switch(cx, id, Some(tag_expr), cases, arms, Some(&synth), mode, span)
    }

    /// Destructuring bindings, nil-safety checks, guard nesting, body.
    fn arm_body_stmts(
        &mut self,
        cx: &mut Context<'_>,
        arm: &LoweredArm,
        field_names: &[String],
        scrut_text: &str,
        mode: Mode,
        span: Span,
    ) -> Vec<StmtId> {
        let mut stmts = Vec::new();

        for (binding, field) in arm.bindings.iter().zip(field_names) {
            stmts.extend(self.nil_check(cx, scrut_text, field, span));
            let mut b = cx.builder(span);
            let scrut = b.ident(scrut_text);
            let sel = b.selector(scrut, field);
            let value = b.deref(sel);
            let lhs = b.ident_name(*binding);
            stmts.push(b.define(vec![lhs], vec![value]));
        }

        let body_stmt = {
            let mut b = cx.builder(span);
            match mode {
                Mode::Statement => b.expr_stmt(arm.body),
                Mode::Return | Mode::Iife => b.ret(vec![arm.body]),
            }
        };

        match arm.guard {
            Some(guard) => {
                let mut b = cx.builder(span);
                let guard_block = b.block(vec![body_stmt]);
                // No else: a failing guard falls through to the next arm.
                stmts.push(b.if_stmt(guard, guard_block, None));
            }
            None => stmts.push(body_stmt),
        }
        stmts
    }

    /// Nil-safety checks for one pointer-field read.
    fn nil_check(
        &mut self,
        cx: &mut Context<'_>,
        scrut_text: &str,
        field: &str,
        span: Span,
    ) -> Vec<StmtId> {
        match cx.config.nil_safety {
            NilSafety::Off => Vec::new(),
            NilSafety::On => {
                let mut b = cx.builder(span);
                let scrut = b.ident(scrut_text);
                let sel = b.selector(scrut, field);
                let nil = b.lit_nil();
                let is_nil = b.eq(sel, nil);
                vec![b.panic_if(is_nil, MSG_NIL_DESTRUCTURE)]
            }
            NilSafety::Debug => {
                self.ensure_debug_flag(cx, span);
                let mut b = cx.builder(span);
                let scrut = b.ident(scrut_text);
                let sel = b.selector(scrut, field);
                let nil = b.lit_nil();
                let is_nil = b.eq(sel, nil);
                let check = b.panic_if(is_nil, MSG_NIL_DESTRUCTURE);
                let gated_block = b.block(vec![check]);
                let flag = b.ident(DEBUG_FLAG);
                vec![b.if_stmt(flag, gated_block, None)]
            }
        }
    }

    /// `var __dingo_debug = os.Getenv("DINGO_DEBUG") != ""`, once per file.
    fn ensure_debug_flag(&mut self, cx: &mut Context<'_>, span: Span) {
        if self.debug_flag_emitted {
            return;
        }
        self.debug_flag_emitted = true;
        let mut b = cx.builder(span);
        let os = b.ident("os");
        let getenv = b.selector(os, "Getenv");
        let key = b.lit_str("DINGO_DEBUG");
        let call = b.call(getenv, vec![key]);
        let empty = b.lit_str("");
        let value = b.ne(call, empty);
        let flag = b.name(DEBUG_FLAG);
        let decl = cx.arena.alloc_decl(Decl::new(
            DeclKind::Var {
                names: vec![flag],
                ty: None,
                values: vec![value],
            },
            span,
        ));
        self.pending.push(PendingDecl::new(decl, DEBUG_FLAG));
    }

    /// Splice the lowered switch into the tree according to mode.
    #[expect(
        clippy::too_many_arguments,
        reason = "internal lowering step; the arguments are one match's parts"
    )]
    fn splice_switch(
        &mut self,
        cx: &mut Context<'_>,
        id: ExprId,
        tag: Option<ExprId>,
        cases: Vec<CaseClause>,
        arms: &[LoweredArm],
        synth: Option<&SyntheticType>,
        mode: Mode,
        span: Span,
    ) -> Result<(), EngineError> {
        match mode {
            Mode::Return | Mode::Statement => {
                let Some(NodeRef::Stmt(stmt)) = cx.parent(NodeRef::Expr(id)) else {
                    return Err(EngineError::MissingParent {
                        plugin: "pattern-match",
                    });
                };
                cx.arena.stmt_mut(stmt).kind = StmtKind::Switch { tag, cases };
                cx.record_subtree(NodeRef::Stmt(stmt));
                Ok(())
            }
            Mode::Iife => {
                let Some(tag) = tag else {
                    return Err(EngineError::Internal {
                        plugin: "pattern-match",
                        detail: "expression-position match lowered without a tag".to_string(),
                    });
                };
                self.splice_switch_iife(cx, id, None, tag, cases, arms, synth, span)
            }
        }
    }

    /// Wrap the switch in an immediately-invoked function returning the
    /// arms' common type.
    #[expect(
        clippy::too_many_arguments,
        reason = "internal lowering step; the arguments are one match's parts"
    )]
    fn splice_switch_iife(
        &mut self,
        cx: &mut Context<'_>,
        id: ExprId,
        scrut_bind: Option<StmtId>,
        tag: ExprId,
        cases: Vec<CaseClause>,
        arms: &[LoweredArm],
        synth: Option<&SyntheticType>,
        span: Span,
    ) -> Result<(), EngineError> {
        let result_ty = self.arms_result_type(cx, arms, synth, span);
        let mut b = cx.builder(span);
        let switch = b.switch(Some(tag), cases);
        let mut stmts = Vec::new();
        if let Some(bind) = scrut_bind {
            stmts.push(bind);
        }
        stmts.push(switch);
        let body = b.block(stmts);
        let results = result_ty.into_iter().collect();
        let func = b.func_lit(Vec::new(), results, body);
        cx.arena.expr_mut(id).kind = ExprKind::Call {
            func,
            args: Vec::new(),
        };
        cx.record_subtree(NodeRef::Expr(id));
        Ok(())
    }

    /// The common result type of the arm bodies, if one can be determined.
    ///
    /// Arm bodies that are bare pattern bindings (`Ok(v) => v`) take the
    /// bound payload's type from the union layout.
    fn arms_result_type(
        &self,
        cx: &mut Context<'_>,
        arms: &[LoweredArm],
        synth: Option<&SyntheticType>,
        span: Span,
    ) -> Option<TypeExprId> {
        let mut found: Option<Type> = None;
        for arm in arms {
            if let Ok(ty) = cx.resolver().resolve(arm.body) {
                found = Some(ty);
                break;
            }
            let (Some(synth), Some(variant)) = (synth, &arm.variant) else {
                continue;
            };
            let ExprKind::Ident(name) = &cx.arena.expr(arm.body).kind else {
                continue;
            };
            let Some(pos) = arm.bindings.iter().position(|b| b == name) else {
                continue;
            };
            if let Some(field) = synth.variant_fields(variant).and_then(|fs| fs.get(pos)) {
                found = Some(field.ty.clone());
                break;
            }
        }
        let ty = found?;
        let interner = cx.interner().clone();
        Some(type_to_syntax(&ty, &mut cx.arena, &interner, span))
    }

    // -- Marker path --

    fn analyze_marker_sites(&mut self, cx: &mut Context<'_>) {
        let mut sink = Sink::new();
        let (sites, tuple_sites) = collect_sites(&cx.arena, &cx.file, &mut sink);
        for diag in sink.drain() {
            cx.report(diag);
        }

        for site in sites {
            self.analyze_marker_site(cx, &site);
        }
        for site in tuple_sites {
            self.analyze_tuple_site(cx, &site);
        }
    }

    fn analyze_marker_site(&mut self, cx: &mut Context<'_>, site: &MatchSite) {
        // Exhaustiveness. The scrutinee type is derivable when the switch
        // already dispatches on a union's tag.
        let type_name = self.switch_scrutinee_type(cx, site.switch);
        let arm_variants: Vec<&str> = site
            .arms
            .iter()
            .filter_map(|a| a.pattern.variant_name())
            .collect();
        let universe = resolve_universe(type_name.as_deref(), &arm_variants, cx.registry());
        let patterns: Vec<&ParsedPattern> = site.arms.iter().map(|a| &a.pattern).collect();
        let report = check(&patterns, &universe);
        if !report.is_exhaustive() {
            cx.report(diagnostic::non_exhaustive(site.span, &report.missing));
        }

        // Guard emission: wrap the guarded arms' case bodies. The guard
        // condition text is preserved verbatim; the printer emits it
        // unchanged.
        for arm in &site.arms {
            let Some(guard_text) = &arm.guard else {
                continue;
            };
            let span = arm.span;
            let guard_expr = cx.builder(span).ident(guard_text);

            let original = {
                let StmtKind::Switch { cases, .. } = &mut cx.arena.stmt_mut(site.switch).kind
                else {
                    continue;
                };
                let Some(case) = cases.get_mut(arm.case_index) else {
                    continue;
                };
                std::mem::take(&mut case.body)
            };
            let guarded = {
                let mut b = cx.builder(span);
                let block = b.block(original);
                b.if_stmt(guard_expr, block, None)
            };
            if let StmtKind::Switch { cases, .. } = &mut cx.arena.stmt_mut(site.switch).kind {
                if let Some(case) = cases.get_mut(arm.case_index) {
                    case.body = vec![guarded];
                }
            }
            cx.record_subtree(NodeRef::Stmt(site.switch));
        }
    }

    fn analyze_tuple_site(&mut self, cx: &mut Context<'_>, site: &TupleSite) {
        let mut arms: Vec<Vec<ParsedPattern>> = Vec::new();
        for arm in &site.arms {
            if site.arity != 0 && arm.patterns.len() != site.arity {
                cx.report(diagnostic::marker_malformed(
                    arm.span,
                    &format!(
                        "tuple arm has {} pattern(s), expected {}",
                        arm.patterns.len(),
                        site.arity
                    ),
                ));
                continue;
            }
            arms.push(arm.patterns.clone());
        }
        let arity = if site.arity != 0 {
            site.arity
        } else {
            arms.iter().map(Vec::len).max().unwrap_or(0)
        };
        let universes = position_universes(&arms, arity, cx);
        let report = check_tuple(&arms, &universes);
        if !report.is_exhaustive() {
            cx.report(diagnostic::non_exhaustive_tuple(site.span, &report.missing));
        }
    }

    /// Canonical type name of a switch's scrutinee when the tag expression
    /// has the `x.tag` shape and `x` resolves.
    fn switch_scrutinee_type(&self, cx: &Context<'_>, switch: StmtId) -> Option<String> {
        let StmtKind::Switch { tag: Some(tag), .. } = &cx.arena.stmt(switch).kind else {
            return None;
        };
        let ExprKind::Selector { recv, field } = &cx.arena.expr(*tag).kind else {
            return None;
        };
        if cx.text(*field) != "tag" {
            return None;
        }
        match cx.resolver().resolve(*recv) {
            Ok(Type::Named(name)) => Some(name),
            _ => None,
        }
    }
}

/// Where the lowered switch lands.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Mode {
    /// `return match { … }` with a single result: the return becomes the
    /// switch, arm bodies return.
    Return,
    /// Statement position without guards: the statement becomes the switch.
    Statement,
    /// Anywhere else: immediately-invoked function, arm bodies return.
    Iife,
}

fn lowering_mode(cx: &Context<'_>, id: ExprId) -> Mode {
    match cx.parent(NodeRef::Expr(id)) {
        Some(NodeRef::Stmt(stmt)) => match &cx.arena.stmt(stmt).kind {
            StmtKind::Return(results) if results.len() == 1 && results[0] == id => Mode::Return,
            StmtKind::Expr(e) if *e == id => Mode::Statement,
            _ => Mode::Iife,
        },
        _ => Mode::Iife,
    }
}

fn case_matches(cx: &Context<'_>, case: &CaseClause, values: &[ExprId]) -> bool {
    if case.values.len() != values.len() {
        return false;
    }
    case.values.iter().zip(values).all(|(&a, &b)| {
        match (&cx.arena.expr(a).kind, &cx.arena.expr(b).kind) {
            (ExprKind::Ident(x), ExprKind::Ident(y)) => x == y,
            _ => false,
        }
    })
}

/// Per-position universes for tuple coverage, from the variant names seen
/// at each position.
fn position_universes(
    arms: &[Vec<ParsedPattern>],
    arity: usize,
    cx: &Context<'_>,
) -> Vec<VariantUniverse> {
    (0..arity)
        .map(|pos| {
            let names: Vec<&str> = arms
                .iter()
                .filter_map(|arm| arm.get(pos))
                .filter_map(ParsedPattern::variant_name)
                .collect();
            resolve_universe(None, &names, cx.registry())
        })
        .collect()
}
