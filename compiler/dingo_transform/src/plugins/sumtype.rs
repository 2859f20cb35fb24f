//! Sum-type generation and constructor rewrites.
//!
//! Discovery collects enum declarations, generic instantiation annotations
//! (`Result<int, error>`), and constructor call sites (`Ok`, `Err`, `Some`,
//! `None`, user variants). Transform then:
//!
//! 1. validates and lowers enum declarations into tagged unions;
//! 2. rewrites generic annotations to their canonical union names, emitting
//!    each instantiation once per file;
//! 3. rewrites constructor calls into composite literals with addressable
//!    payload references, inferring type parameters from the argument or,
//!    for `Err`'s value slot and for `None`, from the enclosing context.
//!
//! The `None` ancestor walk tries, in priority order: a variable-declaration
//! annotation, a return statement in a function with known results, a
//! call-argument position with a known parameter type, and an assignment to
//! a variable of known type. When all four fail, the site is diagnosed with
//! a fix-it hint and left unchanged.

use rustc_hash::FxHashMap;

use dingo_diagnostic::diagnostic;
use dingo_ir::ast::{DeclKind, ExprKind, StmtKind, TypeExprKind, VariantKind};
use dingo_ir::{subtree_contains, walk_file, DeclId, ExprId, NodeRef, Span, TypeExprId};
use dingo_types::{
    canonical_union_name, FieldLayout, SyntheticType, Type, VariantLayout,
};

use crate::addressable::addressable_ref;
use crate::plugin::{PendingDecl, Plugin};
use crate::plugins::unions::{record_pending_parents, UnionEmitter};
use crate::{Context, EngineError};

/// A user enum, semantically resolved from its declaration.
#[derive(Clone, Debug)]
struct EnumInfo {
    #[allow(dead_code)]
    name: String,
    type_params: Vec<String>,
    variants: Vec<VariantInfo>,
    #[allow(dead_code)]
    span: Span,
}

#[derive(Clone, Debug)]
struct VariantInfo {
    name: String,
    /// Payload fields: display name (for struct variants) and declared type.
    fields: Vec<(Option<String>, TypeExprId)>,
}

/// The sum-type generator plugin.
#[derive(Default)]
pub struct SumTypePlugin {
    emitter: UnionEmitter,
    enum_decls: Vec<DeclId>,
    ctor_calls: Vec<ExprId>,
    none_idents: Vec<ExprId>,
    generic_annotations: Vec<TypeExprId>,
    enums: FxHashMap<String, EnumInfo>,
    /// Bare variant name → owning enums (ambiguous names are not rewritten).
    variant_owners: FxHashMap<String, Vec<String>>,
}

impl SumTypePlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for SumTypePlugin {
    fn name(&self) -> &'static str {
        "sum-types"
    }

    fn reset(&mut self) {
        self.emitter.reset();
        self.enum_decls.clear();
        self.ctor_calls.clear();
        self.none_idents.clear();
        self.generic_annotations.clear();
        self.enums.clear();
        self.variant_owners.clear();
    }

    fn discover(&mut self, cx: &Context<'_>) {
        // Enum declarations first: variant names steer call-site discovery.
        let mut variant_names: Vec<String> = Vec::new();
        for &decl in &cx.file.decls {
            if let DeclKind::Enum(e) = &cx.arena.decl(decl).kind {
                self.enum_decls.push(decl);
                for variant in &e.variants {
                    variant_names.push(cx.text(variant.name).to_string());
                }
            }
        }

        walk_file(&cx.arena, &cx.file, &mut |node| match node {
            NodeRef::Expr(id) => match &cx.arena.expr(id).kind {
                ExprKind::Call { func, .. } => {
                    if let ExprKind::Ident(name) = &cx.arena.expr(*func).kind {
                        let text = cx.text(*name);
                        if is_ctor_name(text, &variant_names) {
                            self.ctor_calls.push(id);
                        }
                    }
                }
                ExprKind::Ident(name) if cx.text(*name) == "None" => {
                    // Bare `None`, unless it is the callee of a call we
                    // already collected.
                    let is_callee = matches!(
                        cx.parent(node),
                        Some(NodeRef::Expr(parent))
                            if matches!(
                                &cx.arena.expr(parent).kind,
                                ExprKind::Call { func, .. } if *func == id
                            )
                    );
                    if !is_callee {
                        self.none_idents.push(id);
                    }
                }
                _ => {}
            },
            NodeRef::TypeExpr(id) => {
                if matches!(
                    cx.arena.type_expr(id).kind,
                    TypeExprKind::Generic { .. }
                ) {
                    self.generic_annotations.push(id);
                }
            }
            _ => {}
        });
    }

    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        self.lower_enum_decls(cx);
        self.rewrite_generic_annotations(cx);
        for call in std::mem::take(&mut self.ctor_calls) {
            self.rewrite_ctor_call(cx, call);
        }
        for ident in std::mem::take(&mut self.none_idents) {
            self.rewrite_none(cx, ident);
        }
        record_pending_parents(&self.emitter, cx);
        Ok(())
    }

    fn pending_decls(&mut self) -> Vec<PendingDecl> {
        self.emitter.take_pending()
    }
}

impl SumTypePlugin {
    /// Validate enum declarations, emit unions for non-generic ones, and
    /// remove the extended nodes from the tree.
    fn lower_enum_decls(&mut self, cx: &mut Context<'_>) {
        for &decl in &self.enum_decls.clone() {
            let span = cx.arena.decl(decl).span;
            let DeclKind::Enum(e) = cx.arena.decl(decl).kind.clone() else {
                continue;
            };
            let name = cx.text(e.name).to_string();

            if self.enums.contains_key(&name) {
                cx.report(
                    diagnostic::Diagnostic::error(dingo_diagnostic::ErrorCode::E6002)
                        .with_message(format!("enum `{name}` declared more than once"))
                        .with_label(span, "duplicate declaration"),
                );
                continue;
            }
            if e.variants.is_empty() {
                cx.report(
                    diagnostic::Diagnostic::error(dingo_diagnostic::ErrorCode::E6004)
                        .with_message(format!("enum `{name}` has no variants"))
                        .with_label(span, "at least one variant is required"),
                );
                continue;
            }

            let mut variants = Vec::with_capacity(e.variants.len());
            let mut seen = Vec::new();
            let mut valid = true;
            for variant in &e.variants {
                let vname = cx.text(variant.name).to_string();
                if seen.contains(&vname) {
                    cx.report(
                        diagnostic::Diagnostic::error(dingo_diagnostic::ErrorCode::E6003)
                            .with_message(format!(
                                "variant `{vname}` declared more than once in enum `{name}`"
                            ))
                            .with_label(variant.span, "duplicate variant"),
                    );
                    valid = false;
                    break;
                }
                seen.push(vname.clone());
                let fields = variant
                    .fields
                    .iter()
                    .map(|f| {
                        let fname = match variant.kind {
                            VariantKind::Struct => f.name.map(|n| cx.text(n).to_string()),
                            VariantKind::Unit | VariantKind::Tuple => None,
                        };
                        (fname, f.ty)
                    })
                    .collect();
                variants.push(VariantInfo {
                    name: vname,
                    fields,
                });
            }
            if !valid {
                continue;
            }

            for variant in &variants {
                self.variant_owners
                    .entry(variant.name.clone())
                    .or_default()
                    .push(name.clone());
            }
            let info = EnumInfo {
                name: name.clone(),
                type_params: e.type_params.iter().map(|p| cx.text(*p).to_string()).collect(),
                variants,
                span,
            };

            // Non-generic enums instantiate immediately; generic ones wait
            // for use sites.
            if info.type_params.is_empty() {
                let layouts = self.variant_layouts(cx, &info, &FxHashMap::default());
                self.emitter
                    .ensure_layout(cx, &name, &name, Vec::new(), layouts, span);
            }
            self.enums.insert(name, info);
        }

        // The extended declarations must not survive into the output tree.
        let enum_decls = std::mem::take(&mut self.enum_decls);
        cx.file.decls.retain(|d| !enum_decls.contains(d));
    }

    /// Semantic variant layouts with union-struct field names
    /// (`<variant_lower>_<index_or_name>`), substituting enum type
    /// parameters where `subst` maps them.
    fn variant_layouts(
        &self,
        cx: &Context<'_>,
        info: &EnumInfo,
        subst: &FxHashMap<String, Type>,
    ) -> Vec<VariantLayout> {
        info.variants
            .iter()
            .map(|variant| {
                let lower = variant.name.to_ascii_lowercase();
                let fields = variant
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, (fname, ty))| {
                        let field_name = match fname {
                            Some(n) => format!("{lower}_{n}"),
                            None => format!("{lower}_{i}"),
                        };
                        let resolved =
                            substitute(cx.resolver().from_syntax(*ty), subst);
                        FieldLayout {
                            name: field_name,
                            ty: resolved,
                        }
                    })
                    .collect();
                VariantLayout {
                    name: variant.name.clone(),
                    fields,
                }
            })
            .collect()
    }

    /// Rewrite `Result<T, E>`-style annotations to their canonical union
    /// names, emitting each instantiation once.
    fn rewrite_generic_annotations(&mut self, cx: &mut Context<'_>) {
        for &ty_id in &self.generic_annotations.clone() {
            let node = cx.arena.type_expr(ty_id).clone();
            let TypeExprKind::Generic { name, args } = &node.kind else {
                continue;
            };
            let base = cx.text(*name).to_string();
            let params: Vec<Type> = args
                .iter()
                .map(|&a| cx.resolver().from_syntax(a))
                .collect();

            let canonical = match base.as_str() {
                "Result" | "Option" => {
                    self.emitter.ensure_union(cx, &base, &params, node.span)
                }
                _ => {
                    let Some(info) = self.enums.get(&base).cloned() else {
                        cx.report(diagnostic::inference_failure(
                            node.span,
                            &format!("generic type `{base}`"),
                        ));
                        continue;
                    };
                    let canonical = canonical_union_name(&base, &params);
                    let subst: FxHashMap<String, Type> = info
                        .type_params
                        .iter()
                        .cloned()
                        .zip(params.iter().cloned())
                        .collect();
                    let layouts = self.variant_layouts(cx, &info, &subst);
                    let originals = params.iter().map(ToString::to_string).collect();
                    self.emitter
                        .ensure_layout(cx, &base, &canonical, originals, layouts, node.span);
                    canonical
                }
            };

            let name = cx.name(&canonical);
            cx.arena.type_expr_mut(ty_id).kind = TypeExprKind::Named(name);
        }
    }

    /// Rewrite one constructor call into a composite literal.
    fn rewrite_ctor_call(&mut self, cx: &mut Context<'_>, call: ExprId) {
        let span = cx.arena.expr(call).span;
        let ExprKind::Call { func, args } = cx.arena.expr(call).kind.clone() else {
            return; // already rewritten by an earlier site
        };
        let ExprKind::Ident(func_name) = cx.arena.expr(func).kind else {
            return;
        };
        let text = cx.text(func_name).to_string();

        match text.as_str() {
            "Ok" | "Err" | "Some" => {
                if args.len() != 1 {
                    cx.report(diagnostic::invalid_arity(span, &text, 1, args.len()));
                    return;
                }
                self.rewrite_family_ctor(cx, call, &text, Some(args[0]), span);
            }
            "None" => {
                if !args.is_empty() {
                    cx.report(diagnostic::invalid_arity(span, &text, 0, args.len()));
                    return;
                }
                self.rewrite_family_ctor(cx, call, "None", None, span);
            }
            _ => self.rewrite_user_ctor(cx, call, &text, &args, span),
        }
    }

    /// Rewrite `Ok`/`Err`/`Some`/`None`.
    ///
    /// Type parameters come from the enclosing context when it names a
    /// matching union; otherwise the argument's inferred type fills the
    /// variant's own slot and the opposite slot (for `Err`: the value type;
    /// for `Ok`: the error type) is the `interface{}` placeholder. `None`
    /// carries no argument and requires context.
    fn rewrite_family_ctor(
        &mut self,
        cx: &mut Context<'_>,
        call: ExprId,
        variant: &str,
        arg: Option<ExprId>,
        span: Span,
    ) {
        let base = if variant == "Ok" || variant == "Err" {
            "Result"
        } else {
            "Option"
        };

        let context = self.enclosing_union(cx, call, base);
        let canonical = match context {
            Some((canonical, synth)) => {
                // Re-emit in this file if another file registered it first.
                self.emitter.ensure_layout(
                    cx,
                    &synth.base,
                    &canonical,
                    synth.originals.clone(),
                    synth.variants.clone(),
                    span,
                );
                canonical
            }
            None => {
                let Some(arg) = arg else {
                    cx.report(diagnostic::none_requires_annotation(span));
                    return;
                };
                let arg_ty = match cx.resolver().resolve(arg) {
                    Ok(ty) => ty,
                    Err(failure) => {
                        cx.report(diagnostic::inference_failure(failure.span, &failure.what));
                        return;
                    }
                };
                let params = match variant {
                    "Ok" => vec![arg_ty, Type::Interface],
                    "Err" => vec![Type::Interface, arg_ty],
                    _ => vec![arg_ty],
                };
                self.emitter.ensure_union(cx, base, &params, span)
            }
        };

        self.emit_ctor_composite(cx, call, &canonical, base, variant, arg, span);
    }

    /// Rewrite a user-enum constructor call (`Pending()` or
    /// `Status_Pending()`).
    fn rewrite_user_ctor(
        &mut self,
        cx: &mut Context<'_>,
        call: ExprId,
        text: &str,
        args: &[ExprId],
        span: Span,
    ) {
        let Some((enum_name, variant_name)) = self.resolve_user_ctor(text) else {
            return; // an ordinary call that merely resembles a constructor
        };
        let Some(info) = self.enums.get(&enum_name).cloned() else {
            return;
        };
        if !info.type_params.is_empty() {
            // Generic user constructors need an instantiated context.
            let Some((canonical, synth)) = self.enclosing_union(cx, call, &enum_name) else {
                cx.report(diagnostic::inference_failure(
                    span,
                    &format!("generic constructor `{text}`"),
                ));
                return;
            };
            self.emit_user_composite(cx, call, &canonical, &synth, &variant_name, args, span);
            return;
        }

        let Some(synth) = cx.registry().lookup(&enum_name) else {
            return;
        };
        self.emit_user_composite(cx, call, &enum_name, &synth, &variant_name, args, span);
    }

    fn emit_user_composite(
        &mut self,
        cx: &mut Context<'_>,
        call: ExprId,
        canonical: &str,
        synth: &SyntheticType,
        variant: &str,
        args: &[ExprId],
        span: Span,
    ) {
        let Some(fields) = synth.variant_fields(variant).map(<[FieldLayout]>::to_vec) else {
            return;
        };
        if fields.len() != args.len() {
            cx.report(diagnostic::invalid_arity(
                span,
                &format!("{canonical}_{variant}"),
                fields.len(),
                args.len(),
            ));
            return;
        }
        self.emitter.ensure_layout(
            cx,
            &synth.base,
            canonical,
            synth.originals.clone(),
            synth.variants.clone(),
            span,
        );

        let tag_const = format!("{}_{variant}", synth.tag_type());
        let mut inits = {
            let mut b = cx.builder(span);
            let tag = b.ident(&tag_const);
            vec![b.field("tag", tag)]
        };
        for (field, &arg) in fields.iter().zip(args) {
            let payload = addressable_ref(cx, arg, &field.ty, span);
            inits.push(cx.builder(span).field(&field.name, payload));
        }
        let union_ty = cx.builder(span).named_type(canonical);
        cx.arena.expr_mut(call).kind = ExprKind::Composite {
            ty: Some(union_ty),
            fields: inits,
        };
        cx.record_subtree(NodeRef::Expr(call));
    }

    fn emit_ctor_composite(
        &mut self,
        cx: &mut Context<'_>,
        call: ExprId,
        canonical: &str,
        base: &str,
        variant: &str,
        arg: Option<ExprId>,
        span: Span,
    ) {
        let field = cx
            .registry()
            .lookup(canonical)
            .and_then(|synth| {
                synth
                    .variant_fields(variant)
                    .and_then(|fields| fields.first().cloned())
            });

        let tag_const = format!("{base}Tag_{variant}");
        let mut inits = {
            let mut b = cx.builder(span);
            let tag = b.ident(&tag_const);
            vec![b.field("tag", tag)]
        };
        if let (Some(arg), Some(field)) = (arg, field) {
            let payload = addressable_ref(cx, arg, &field.ty, span);
            inits.push(cx.builder(span).field(&field.name, payload));
        }
        let union_ty = cx.builder(span).named_type(canonical);
        cx.arena.expr_mut(call).kind = ExprKind::Composite {
            ty: Some(union_ty),
            fields: inits,
        };
        cx.record_subtree(NodeRef::Expr(call));
    }

    /// Rewrite a bare `None` identifier; context-directed only.
    fn rewrite_none(&mut self, cx: &mut Context<'_>, ident: ExprId) {
        let span = cx.arena.expr(ident).span;
        if !matches!(cx.arena.expr(ident).kind, ExprKind::Ident(_)) {
            return;
        }
        let Some((canonical, synth)) = self.enclosing_union(cx, ident, "Option") else {
            cx.report(diagnostic::none_requires_annotation(span));
            return;
        };
        self.emitter.ensure_layout(
            cx,
            &synth.base,
            &canonical,
            synth.originals.clone(),
            synth.variants.clone(),
            span,
        );

        let tag_const = format!("{}_None", synth.tag_type());
        let mut b = cx.builder(span);
        let tag = b.ident(&tag_const);
        let inits = vec![b.field("tag", tag)];
        let union_ty = b.named_type(&canonical);
        cx.arena.expr_mut(ident).kind = ExprKind::Composite {
            ty: Some(union_ty),
            fields: inits,
        };
        cx.record_subtree(NodeRef::Expr(ident));
    }

    /// Resolve `<Enum>_<Variant>` or a bare variant name unique across the
    /// file's enums.
    fn resolve_user_ctor(&self, text: &str) -> Option<(String, String)> {
        for (enum_name, info) in &self.enums {
            if let Some(variant) = text.strip_prefix(&format!("{enum_name}_")) {
                if info.variants.iter().any(|v| v.name == variant) {
                    return Some((enum_name.clone(), variant.to_string()));
                }
            }
        }
        match self.variant_owners.get(text).map(Vec::as_slice) {
            Some([owner]) => Some((owner.clone(), text.to_string())),
            // Ambiguous or unknown bare name: not a constructor.
            _ => None,
        }
    }

    /// The enclosing-context union for a constructor site, walking ancestors
    /// and preferring, in order: a variable-declaration annotation, a return
    /// statement in a function with known results, a call-argument position,
    /// an assignment to a variable of known type.
    ///
    /// Only unions whose family matches `base` qualify.
    fn enclosing_union(
        &self,
        cx: &Context<'_>,
        expr: ExprId,
        base: &str,
    ) -> Option<(String, SyntheticType)> {
        let mut by_priority: [Option<(String, SyntheticType)>; 4] = [None, None, None, None];

        cx.walk_parents(NodeRef::Expr(expr), |ancestor| {
            match ancestor {
                NodeRef::Stmt(stmt) => match &cx.arena.stmt(stmt).kind {
                    StmtKind::VarDecl { ty: Some(ty), .. } => {
                        store(&mut by_priority[0], self.union_of_syntax(cx, *ty, base));
                    }
                    StmtKind::Return(_) => {
                        let candidate = self
                            .return_position_type(cx, stmt, expr)
                            .and_then(|ty| self.union_of_type(cx, &ty, base));
                        store(&mut by_priority[1], candidate);
                    }
                    StmtKind::Assign {
                        op: dingo_ir::ast::AssignOp::Assign,
                        lhs,
                        rhs,
                    } => {
                        let candidate = rhs
                            .iter()
                            .position(|&r| {
                                subtree_contains(&cx.arena, NodeRef::Expr(r), NodeRef::Expr(expr))
                            })
                            .and_then(|i| lhs.get(i))
                            .and_then(|&target| cx.resolver().resolve(target).ok())
                            .and_then(|ty| self.union_of_type(cx, &ty, base));
                        store(&mut by_priority[3], candidate);
                    }
                    _ => {}
                },
                NodeRef::Expr(parent) => {
                    if let ExprKind::Call { func, args } = &cx.arena.expr(parent).kind {
                        let candidate = self
                            .callee_param_type(cx, *func, args, expr)
                            .and_then(|ty| self.union_of_type(cx, &ty, base));
                        store(&mut by_priority[2], candidate);
                    }
                }
                NodeRef::Decl(decl) => {
                    if let DeclKind::Var { ty: Some(ty), .. } = &cx.arena.decl(decl).kind {
                        store(&mut by_priority[0], self.union_of_syntax(cx, *ty, base));
                    }
                }
                _ => {}
            }
            true
        });

        by_priority.into_iter().flatten().next()
    }

    fn union_of_syntax(
        &self,
        cx: &Context<'_>,
        ty: TypeExprId,
        base: &str,
    ) -> Option<(String, SyntheticType)> {
        let resolved = cx.resolver().from_syntax(ty);
        self.union_of_type(cx, &resolved, base)
    }

    fn union_of_type(
        &self,
        cx: &Context<'_>,
        ty: &Type,
        base: &str,
    ) -> Option<(String, SyntheticType)> {
        let Type::Named(name) = ty else {
            return None;
        };
        let synth = cx.registry().lookup(name)?;
        (synth.base == base).then(|| (name.clone(), synth))
    }

    /// The declared result type at the return position containing `expr`.
    fn return_position_type(
        &self,
        cx: &Context<'_>,
        return_stmt: dingo_ir::StmtId,
        expr: ExprId,
    ) -> Option<Type> {
        let StmtKind::Return(results) = &cx.arena.stmt(return_stmt).kind else {
            return None;
        };
        let index = results.iter().position(|&r| {
            subtree_contains(&cx.arena, NodeRef::Expr(r), NodeRef::Expr(expr))
        })?;

        // Nearest enclosing function: a function literal or a declaration.
        let mut result_tys: Option<Vec<TypeExprId>> = None;
        cx.walk_parents(NodeRef::Stmt(return_stmt), |ancestor| match ancestor {
            NodeRef::Expr(e) => {
                if let ExprKind::FuncLit { results, .. } = &cx.arena.expr(e).kind {
                    result_tys = Some(results.clone());
                    false
                } else {
                    true
                }
            }
            NodeRef::Decl(d) => {
                if let DeclKind::Func(func) = &cx.arena.decl(d).kind {
                    result_tys = Some(func.results.clone());
                }
                false
            }
            _ => true,
        });

        let tys = result_tys?;
        tys.get(index).map(|&ty| cx.resolver().from_syntax(ty))
    }

    /// The declared parameter type at the argument position containing
    /// `expr`, from type-info or a same-file function declaration.
    fn callee_param_type(
        &self,
        cx: &Context<'_>,
        func: ExprId,
        args: &[ExprId],
        expr: ExprId,
    ) -> Option<Type> {
        let index = args.iter().position(|&a| {
            subtree_contains(&cx.arena, NodeRef::Expr(a), NodeRef::Expr(expr))
        })?;
        let ExprKind::Ident(name) = &cx.arena.expr(func).kind else {
            return None;
        };
        let callee = cx.text(*name);

        if let Some(sig) = cx.type_info().and_then(|info| info.function(callee)) {
            return sig.params.get(index).cloned();
        }

        // Same-file declaration.
        for &decl in &cx.file.decls {
            if let DeclKind::Func(func_decl) = &cx.arena.decl(decl).kind {
                if cx.text(func_decl.name) == callee && func_decl.recv.is_none() {
                    return func_decl
                        .params
                        .get(index)
                        .map(|p| cx.resolver().from_syntax(p.ty));
                }
            }
        }
        None
    }
}

fn store(slot: &mut Option<(String, SyntheticType)>, candidate: Option<(String, SyntheticType)>) {
    if slot.is_none() {
        *slot = candidate;
    }
}

/// Substitute named type parameters in a resolved type.
fn substitute(ty: Type, subst: &FxHashMap<String, Type>) -> Type {
    if subst.is_empty() {
        return ty;
    }
    match ty {
        Type::Named(name) => match subst.get(&name) {
            Some(replacement) => replacement.clone(),
            None => Type::Named(name),
        },
        Type::Pointer(inner) => Type::ptr(substitute(*inner, subst)),
        Type::Slice(inner) => Type::Slice(Box::new(substitute(*inner, subst))),
        Type::Array { len, elem } => Type::Array {
            len,
            elem: Box::new(substitute(*elem, subst)),
        },
        Type::Map { key, value } => Type::Map {
            key: Box::new(substitute(*key, subst)),
            value: Box::new(substitute(*value, subst)),
        },
        Type::Chan { dir, elem } => Type::Chan {
            dir,
            elem: Box::new(substitute(*elem, subst)),
        },
        Type::Struct(fields) => Type::Struct(
            fields
                .into_iter()
                .map(|(n, t)| (n, substitute(t, subst)))
                .collect(),
        ),
        Type::Func { params, results } => Type::Func {
            params: params.into_iter().map(|t| substitute(t, subst)).collect(),
            results: results.into_iter().map(|t| substitute(t, subst)).collect(),
        },
        Type::Tuple(elems) => {
            Type::Tuple(elems.into_iter().map(|t| substitute(t, subst)).collect())
        }
        other => other,
    }
}

/// Call-site names worth a second look: the built-in families, declared
/// variant names, and `Enum_Variant`-shaped names. False positives are
/// filtered during rewrite.
fn is_ctor_name(text: &str, variant_names: &[String]) -> bool {
    matches!(text, "Ok" | "Err" | "Some" | "None")
        || variant_names.iter().any(|v| v == text)
        || text.contains('_')
}
