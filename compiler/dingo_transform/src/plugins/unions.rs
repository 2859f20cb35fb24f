//! Tagged-union emission.
//!
//! One emitter instance per plugin, per file. For each canonical union it
//! produces, in order:
//!
//! 1. the family-shared tag alias (`type ResultTag = uint8`) and its
//!    constant group, at most once per family per file;
//! 2. the union struct with a `tag` field plus one *pointer-typed* field per
//!    variant payload (`ok_0 *int`), so the zero value is a well-defined
//!    first-variant/None state and payloads need no embedded storage;
//! 3. one constructor per variant, taking payloads by value and storing
//!    their addresses;
//! 4. the helper methods (see `helpers`).
//!
//! Every declaration carries a canonical dedup key; the driver drops
//! duplicates emitted by different plugins for the same union.

use rustc_hash::FxHashSet;

use dingo_ir::ast::{
    Decl, DeclKind, ConstSpec, FuncDecl, StructField, TypeExprKind,
};
use dingo_ir::{NodeRef, Span, TypeExprId};
use dingo_diagnostic::diagnostic;
use dingo_types::{
    canonical_union_name, type_to_syntax, FieldLayout, RegisterOutcome, Type, VariantLayout,
};

use crate::plugin::PendingDecl;
use crate::plugins::helpers;
use crate::Context;

/// Per-plugin, per-file emitter of tagged-union declarations.
#[derive(Default)]
pub(crate) struct UnionEmitter {
    /// Canonical keys (unions, tags, helper groups) already emitted by this
    /// emitter in the current file.
    emitted: FxHashSet<String>,
    pending: Vec<PendingDecl>,
}

impl UnionEmitter {
    /// Clear per-file state.
    pub(crate) fn reset(&mut self) {
        self.emitted.clear();
        self.pending.clear();
    }

    /// Surrender pending declarations in emission order.
    pub(crate) fn take_pending(&mut self) -> Vec<PendingDecl> {
        std::mem::take(&mut self.pending)
    }

    /// Queue a declaration under its dedup key.
    pub(crate) fn push(&mut self, decl: dingo_ir::DeclId, canonical: impl Into<String>) {
        self.pending.push(PendingDecl::new(decl, canonical));
    }

    /// Mark a key emitted; returns false if it already was.
    pub(crate) fn mark_emitted(&mut self, key: impl Into<String>) -> bool {
        self.emitted.insert(key.into())
    }

    /// Ensure a `Result`/`Option` instantiation is registered and emitted.
    /// Returns the canonical union name.
    pub(crate) fn ensure_union(
        &mut self,
        cx: &mut Context<'_>,
        base: &str,
        params: &[Type],
        span: Span,
    ) -> String {
        let canonical = canonical_union_name(base, params);
        let variants = match base {
            "Result" => vec![
                VariantLayout {
                    name: "Ok".to_string(),
                    fields: vec![FieldLayout {
                        name: "ok_0".to_string(),
                        ty: params.first().cloned().unwrap_or(Type::Interface),
                    }],
                },
                VariantLayout {
                    name: "Err".to_string(),
                    fields: vec![FieldLayout {
                        name: "err_0".to_string(),
                        ty: params.get(1).cloned().unwrap_or(Type::Interface),
                    }],
                },
            ],
            "Option" => vec![
                VariantLayout {
                    name: "Some".to_string(),
                    fields: vec![FieldLayout {
                        name: "some_0".to_string(),
                        ty: params.first().cloned().unwrap_or(Type::Interface),
                    }],
                },
                VariantLayout::unit("None"),
            ],
            _ => {
                // User enums go through `ensure_layout` with their declared
                // variants; a bare base here is an engine bug.
                tracing::error!(base, "ensure_union called with a non-family base");
                return canonical;
            }
        };
        let originals: Vec<String> = params.iter().map(ToString::to_string).collect();
        self.ensure_layout(cx, base, &canonical, originals, variants, span);
        canonical
    }

    /// Ensure an arbitrary union layout (family or user enum) is registered
    /// and emitted under `canonical`.
    ///
    /// `originals` are the pre-sanitization parameter strings; identity in
    /// the registry is decided on them, never on `canonical`.
    pub(crate) fn ensure_layout(
        &mut self,
        cx: &mut Context<'_>,
        base: &str,
        canonical: &str,
        originals: Vec<String>,
        variants: Vec<VariantLayout>,
        span: Span,
    ) {
        if !self.mark_emitted(canonical.to_string()) {
            return;
        }

        let outcome = cx
            .registry()
            .register(canonical, base, originals, variants.clone());
        if outcome == RegisterOutcome::Collision {
            cx.report(diagnostic::registry_collision(span, canonical));
            // First registration wins; keep emitting against our layout so
            // the file is self-consistent.
        }

        self.emit_tag(cx, base, &variants, span);
        self.emit_struct(cx, base, canonical, &variants, span);
        self.emit_constructors(cx, base, canonical, &variants, span);
        helpers::emit_helpers(self, cx, base, canonical, &variants, span);
    }

    /// Emit the family-shared tag alias and constants, once per family.
    fn emit_tag(&mut self, cx: &mut Context<'_>, base: &str, variants: &[VariantLayout], span: Span) {
        let tag = format!("{base}Tag");
        if !self.mark_emitted(tag.clone()) {
            return;
        }

        let mut b = cx.builder(span);
        let uint8 = b.named_type("uint8");
        let tag_name = b.name(&tag);
        let alias = cx.arena.alloc_decl(Decl::new(
            DeclKind::TypeSpec {
                name: tag_name,
                ty: uint8,
                is_alias: true,
            },
            span,
        ));
        self.push(alias, tag.clone());

        // Constants assigned sequentially from zero via the iota idiom: the
        // first spec carries the type and `iota`, the rest inherit.
        let mut specs = Vec::with_capacity(variants.len());
        for (i, variant) in variants.iter().enumerate() {
            let mut b = cx.builder(span);
            let const_name = b.name(&format!("{tag}_{}", variant.name));
            let (ty, value) = if i == 0 {
                let tag_ty = b.named_type(&tag);
                let iota = b.ident("iota");
                (Some(tag_ty), Some(iota))
            } else {
                (None, None)
            };
            specs.push(ConstSpec {
                name: const_name,
                ty,
                value,
            });
        }
        let consts = cx
            .arena
            .alloc_decl(Decl::new(DeclKind::Const { specs }, span));
        self.push(consts, format!("{tag}#consts"));
    }

    /// Emit the union struct: `tag` plus pointer fields for every payload.
    fn emit_struct(
        &mut self,
        cx: &mut Context<'_>,
        base: &str,
        canonical: &str,
        variants: &[VariantLayout],
        span: Span,
    ) {
        let tag = format!("{base}Tag");
        let mut fields = Vec::new();
        {
            let mut b = cx.builder(span);
            let tag_ty = b.named_type(&tag);
            fields.push(StructField {
                name: b.name("tag"),
                ty: tag_ty,
            });
        }
        for variant in variants {
            for field in &variant.fields {
                let field_ty = self.syntax_of(cx, &field.ty, span);
                let mut b = cx.builder(span);
                let ptr = b.ptr_type(field_ty);
                fields.push(StructField {
                    name: b.name(&field.name),
                    ty: ptr,
                });
            }
        }
        let mut b = cx.builder(span);
        let struct_ty = b.type_expr(TypeExprKind::Struct { fields });
        let union_name = b.name(canonical);
        let decl = cx.arena.alloc_decl(Decl::new(
            DeclKind::TypeSpec {
                name: union_name,
                ty: struct_ty,
                is_alias: false,
            },
            span,
        ));
        self.push(decl, canonical.to_string());
    }

    /// Emit `<Union>_<Variant>` constructors.
    ///
    /// Payloads arrive by value; parameters are addressable, so their
    /// addresses go straight into the pointer fields.
    fn emit_constructors(
        &mut self,
        cx: &mut Context<'_>,
        base: &str,
        canonical: &str,
        variants: &[VariantLayout],
        span: Span,
    ) {
        let tag = format!("{base}Tag");
        for variant in variants {
            let ctor_name = format!("{canonical}_{}", variant.name);

            let field_tys: Vec<TypeExprId> = variant
                .fields
                .iter()
                .map(|f| self.syntax_of(cx, &f.ty, span))
                .collect();

            let mut b = cx.builder(span);
            let params: Vec<_> = field_tys
                .iter()
                .enumerate()
                .map(|(i, &ty)| b.param(&format!("v{i}"), ty))
                .collect();

            let tag_const = b.ident(&format!("{tag}_{}", variant.name));
            let mut inits = vec![b.field("tag", tag_const)];
            for (i, field) in variant.fields.iter().enumerate() {
                let param_ref = b.ident(&format!("v{i}"));
                let addr = b.addr_of(param_ref);
                inits.push(b.field(&field.name, addr));
            }
            let union_ty = b.named_type(canonical);
            let lit = b.composite(Some(union_ty), inits);
            let ret = b.ret(vec![lit]);
            let body = b.block(vec![ret]);
            let result_ty = b.named_type(canonical);
            let func_name = b.name(&ctor_name);

            let decl = cx.arena.alloc_decl(Decl::new(
                DeclKind::Func(FuncDecl {
                    name: func_name,
                    recv: None,
                    params,
                    results: vec![result_ty],
                    body: Some(body),
                }),
                span,
            ));
            self.push(decl, ctor_name);
        }
    }

    /// Lower a semantic type into the arena as syntax.
    pub(crate) fn syntax_of(&self, cx: &mut Context<'_>, ty: &Type, span: Span) -> TypeExprId {
        let interner = cx.interner().clone();
        type_to_syntax(ty, &mut cx.arena, &interner, span)
    }
}

/// Re-index parents for every pending declaration subtree.
///
/// Injected declarations become reachable only after the driver appends
/// them; recording here keeps `parent()` total for any later pass that
/// inspects generated code.
pub(crate) fn record_pending_parents(emitter: &UnionEmitter, cx: &mut Context<'_>) {
    for pending in &emitter.pending {
        cx.record_subtree(NodeRef::Decl(pending.decl));
    }
}
