//! Helper-method synthesis for generated unions.
//!
//! Per union: `IsX` predicates for every variant; the full Result and
//! Option helper sets for the built-in families; nothing else for user
//! enums.
//!
//! Methods that would require generics (`Map`, `MapErr`, `AndThen`,
//! `OrElse`, `And`) honor the `helper_generics` setting: in `placeholder`
//! mode their function arguments return `interface{}` and the results are
//! `interface{}`-parameterized derived unions (`Result_any_*`, `Option_any`);
//! in `parameterized` mode they are type-preserving and return the original
//! union type.
//!
//! `Unwrap`/`UnwrapErr` panic with fixed messages; the tag check and the
//! nil-payload check are separate so externally-constructed unions with a
//! plausible tag but no payload still fail loudly.

use dingo_ir::ast::{BinaryOp, Decl, DeclKind, FuncDecl, Param};
use dingo_ir::{BlockId, ExprId, Span, TypeExprId};
use dingo_types::{Type, VariantLayout};

use crate::config::HelperGenerics;
use crate::plugins::unions::UnionEmitter;
use crate::Context;

/// Panic messages for wrong-variant unwraps.
const MSG_UNWRAP_ERR_RESULT: &str = "called Unwrap on an Err Result";
const MSG_UNWRAP_OK_RESULT: &str = "called UnwrapErr on an Ok Result";
const MSG_UNWRAP_NONE: &str = "called Unwrap on a None Option";
/// Panic message for tag/payload disagreement (externally-built unions).
const MSG_NIL_PAYLOAD: &str = "union payload pointer is nil";

/// Emit the helper-method set for one union.
pub(crate) fn emit_helpers(
    emitter: &mut UnionEmitter,
    cx: &mut Context<'_>,
    base: &str,
    canonical: &str,
    variants: &[VariantLayout],
    span: Span,
) {
    emit_is_predicates(emitter, cx, base, canonical, variants, span);
    match base {
        "Result" => emit_result_helpers(emitter, cx, canonical, variants, span),
        "Option" => emit_option_helpers(emitter, cx, canonical, variants, span),
        _ => {}
    }
}

/// The payload type of a single-field variant, `interface{}` when absent.
fn variant_elem(variants: &[VariantLayout], name: &str) -> Type {
    variants
        .iter()
        .find(|v| v.name == name)
        .and_then(|v| v.fields.first())
        .map_or(Type::Interface, |f| f.ty.clone())
}

/// `IsX() bool` for every variant: `tag == <Tag>_<X>`.
fn emit_is_predicates(
    emitter: &mut UnionEmitter,
    cx: &mut Context<'_>,
    base: &str,
    canonical: &str,
    variants: &[VariantLayout],
    span: Span,
) {
    for variant in variants {
        let method = format!("Is{}", variant.name);
        let mut b = cx.builder(span);
        let recv = b.ident("u");
        let tag = b.selector(recv, "tag");
        let tag_const = b.ident(&format!("{base}Tag_{}", variant.name));
        let cmp = b.eq(tag, tag_const);
        let ret = b.ret(vec![cmp]);
        let body = b.block(vec![ret]);
        let bool_ty = b.named_type("bool");
        push_method(emitter, cx, canonical, &method, Vec::new(), vec![bool_ty], body, span);
    }
}

fn emit_result_helpers(
    emitter: &mut UnionEmitter,
    cx: &mut Context<'_>,
    canonical: &str,
    variants: &[VariantLayout],
    span: Span,
) {
    let ok_ty = variant_elem(variants, "Ok");
    let err_ty = variant_elem(variants, "Err");

    // Derived unions for the generic-shaped helpers.
    let (mapped_ok, map_union) = derived_union(
        emitter, cx, "Result", canonical,
        &[Type::Interface, err_ty.clone()],
        &ok_ty, span,
    );
    let (mapped_err, map_err_union) = derived_union(
        emitter, cx, "Result", canonical,
        &[ok_ty.clone(), Type::Interface],
        &err_ty, span,
    );
    let filter_union = emitter.ensure_union(cx, "Option", std::slice::from_ref(&ok_ty), span);

    // Unwrap() T
    {
        let ok_syntax = emitter.syntax_of(cx, &ok_ty, span);
        let body = unwrap_body(cx, "ResultTag_Ok", "ok_0", MSG_UNWRAP_ERR_RESULT, span);
        push_method(emitter, cx, canonical, "Unwrap", Vec::new(), vec![ok_syntax], body, span);
    }

    // UnwrapErr() E
    {
        let err_syntax = emitter.syntax_of(cx, &err_ty, span);
        let body = unwrap_body(cx, "ResultTag_Err", "err_0", MSG_UNWRAP_OK_RESULT, span);
        push_method(emitter, cx, canonical, "UnwrapErr", Vec::new(), vec![err_syntax], body, span);
    }

    // UnwrapOr(def T) T
    {
        let ok_syntax = emitter.syntax_of(cx, &ok_ty, span);
        let ok_syntax_2 = emitter.syntax_of(cx, &ok_ty, span);
        let mut b = cx.builder(span);
        let def = b.param("def", ok_syntax);
        let fallback = b.ident("def");
        let body = unwrap_or_body(&mut b, "ResultTag_Ok", "ok_0", fallback);
        push_method(emitter, cx, canonical, "UnwrapOr", vec![def], vec![ok_syntax_2], body, span);
    }

    // UnwrapOrElse(fn func(E) T) T
    {
        let err_syntax = emitter.syntax_of(cx, &err_ty, span);
        let ok_syntax = emitter.syntax_of(cx, &ok_ty, span);
        let ok_syntax_2 = emitter.syntax_of(cx, &ok_ty, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![err_syntax], vec![ok_syntax]);
        let fn_param = b.param("fn", fn_ty);
        let err_payload = payload(&mut b, "err_0");
        let fallback = b.call_ident("fn", vec![err_payload]);
        let body = unwrap_or_body(&mut b, "ResultTag_Ok", "ok_0", fallback);
        push_method(
            emitter, cx, canonical, "UnwrapOrElse",
            vec![fn_param], vec![ok_syntax_2], body, span,
        );
    }

    // Map(fn func(T) U') Result<U', E>
    {
        let ok_syntax = emitter.syntax_of(cx, &ok_ty, span);
        let mapped_syntax = emitter.syntax_of(cx, &mapped_ok, span);
        let union_syntax = named(cx, &map_union, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![ok_syntax], vec![mapped_syntax]);
        let fn_param = b.param("fn", fn_ty);
        let body = map_result_body(&mut b, &map_union, true);
        push_method(emitter, cx, canonical, "Map", vec![fn_param], vec![union_syntax], body, span);
    }

    // MapErr(fn func(E) F') Result<T, F'>
    {
        let err_syntax = emitter.syntax_of(cx, &err_ty, span);
        let mapped_syntax = emitter.syntax_of(cx, &mapped_err, span);
        let union_syntax = named(cx, &map_err_union, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![err_syntax], vec![mapped_syntax]);
        let fn_param = b.param("fn", fn_ty);
        let body = map_result_body(&mut b, &map_err_union, false);
        push_method(
            emitter, cx, canonical, "MapErr",
            vec![fn_param], vec![union_syntax], body, span,
        );
    }

    // Filter(pred func(T) bool) Option<T>
    {
        let ok_syntax = emitter.syntax_of(cx, &ok_ty, span);
        let option_syntax = named(cx, &filter_union, span);
        let mut b = cx.builder(span);
        let bool_ty = b.named_type("bool");
        let pred_ty = b.func_type(vec![ok_syntax], vec![bool_ty]);
        let pred = b.param("pred", pred_ty);

        let is_ok = method_call(&mut b, "IsOk", vec![]);
        let ok_payload = payload(&mut b, "ok_0");
        let pred_ok = b.call_ident("pred", vec![ok_payload]);
        let cond = b.binary(BinaryOp::And, is_ok, pred_ok);
        let some_payload = payload(&mut b, "ok_0");
        let some = b.call_ident(&format!("{filter_union}_Some"), vec![some_payload]);
        let ret_some = b.ret(vec![some]);
        let then_block = b.block(vec![ret_some]);
        let guard = b.if_stmt(cond, then_block, None);
        let none = b.call_ident(&format!("{filter_union}_None"), vec![]);
        let ret_none = b.ret(vec![none]);
        let body = b.block(vec![guard, ret_none]);
        push_method(emitter, cx, canonical, "Filter", vec![pred], vec![option_syntax], body, span);
    }

    // AndThen(fn func(T) Result<U', E>) Result<U', E>
    {
        let ok_syntax = emitter.syntax_of(cx, &ok_ty, span);
        let union_syntax = named(cx, &map_union, span);
        let union_syntax_2 = named(cx, &map_union, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![ok_syntax], vec![union_syntax]);
        let fn_param = b.param("fn", fn_ty);

        let is_err = method_call(&mut b, "IsErr", vec![]);
        let err_payload = payload(&mut b, "err_0");
        let err = b.call_ident(&format!("{map_union}_Err"), vec![err_payload]);
        let ret_err = b.ret(vec![err]);
        let then_block = b.block(vec![ret_err]);
        let guard = b.if_stmt(is_err, then_block, None);
        let ok_payload = payload(&mut b, "ok_0");
        let chained = b.call_ident("fn", vec![ok_payload]);
        let ret = b.ret(vec![chained]);
        let body = b.block(vec![guard, ret]);
        push_method(
            emitter, cx, canonical, "AndThen",
            vec![fn_param], vec![union_syntax_2], body, span,
        );
    }

    // OrElse(fn func(E) Result<T, F'>) Result<T, F'>
    {
        let err_syntax = emitter.syntax_of(cx, &err_ty, span);
        let union_syntax = named(cx, &map_err_union, span);
        let union_syntax_2 = named(cx, &map_err_union, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![err_syntax], vec![union_syntax]);
        let fn_param = b.param("fn", fn_ty);

        let is_ok = method_call(&mut b, "IsOk", vec![]);
        let ok_payload = payload(&mut b, "ok_0");
        let ok = b.call_ident(&format!("{map_err_union}_Ok"), vec![ok_payload]);
        let ret_ok = b.ret(vec![ok]);
        let then_block = b.block(vec![ret_ok]);
        let guard = b.if_stmt(is_ok, then_block, None);
        let err_payload = payload(&mut b, "err_0");
        let chained = b.call_ident("fn", vec![err_payload]);
        let ret = b.ret(vec![chained]);
        let body = b.block(vec![guard, ret]);
        push_method(
            emitter, cx, canonical, "OrElse",
            vec![fn_param], vec![union_syntax_2], body, span,
        );
    }

    // And(other Result<U', E>) Result<U', E>
    {
        let union_syntax = named(cx, &map_union, span);
        let union_syntax_2 = named(cx, &map_union, span);
        let mut b = cx.builder(span);
        let other = b.param("other", union_syntax);

        let is_err = method_call(&mut b, "IsErr", vec![]);
        let err_payload = payload(&mut b, "err_0");
        let err = b.call_ident(&format!("{map_union}_Err"), vec![err_payload]);
        let ret_err = b.ret(vec![err]);
        let then_block = b.block(vec![ret_err]);
        let guard = b.if_stmt(is_err, then_block, None);
        let other_ref = b.ident("other");
        let ret = b.ret(vec![other_ref]);
        let body = b.block(vec![guard, ret]);
        push_method(emitter, cx, canonical, "And", vec![other], vec![union_syntax_2], body, span);
    }

    // Or(other Result<T, E>) Result<T, E>
    {
        let union_syntax = named(cx, canonical, span);
        let union_syntax_2 = named(cx, canonical, span);
        let mut b = cx.builder(span);
        let other = b.param("other", union_syntax);

        let is_ok = method_call(&mut b, "IsOk", vec![]);
        let recv = b.ident("u");
        let ret_self = b.ret(vec![recv]);
        let then_block = b.block(vec![ret_self]);
        let guard = b.if_stmt(is_ok, then_block, None);
        let other_ref = b.ident("other");
        let ret = b.ret(vec![other_ref]);
        let body = b.block(vec![guard, ret]);
        push_method(emitter, cx, canonical, "Or", vec![other], vec![union_syntax_2], body, span);
    }
}

fn emit_option_helpers(
    emitter: &mut UnionEmitter,
    cx: &mut Context<'_>,
    canonical: &str,
    variants: &[VariantLayout],
    span: Span,
) {
    let elem_ty = variant_elem(variants, "Some");

    let (mapped, map_union) = derived_union(
        emitter, cx, "Option", canonical, &[Type::Interface], &elem_ty, span,
    );

    // Unwrap() T
    {
        let elem_syntax = emitter.syntax_of(cx, &elem_ty, span);
        let body = unwrap_body(cx, "OptionTag_Some", "some_0", MSG_UNWRAP_NONE, span);
        push_method(emitter, cx, canonical, "Unwrap", Vec::new(), vec![elem_syntax], body, span);
    }

    // UnwrapOr(def T) T
    {
        let elem_syntax = emitter.syntax_of(cx, &elem_ty, span);
        let elem_syntax_2 = emitter.syntax_of(cx, &elem_ty, span);
        let mut b = cx.builder(span);
        let def = b.param("def", elem_syntax);
        let fallback = b.ident("def");
        let body = unwrap_or_body(&mut b, "OptionTag_Some", "some_0", fallback);
        push_method(emitter, cx, canonical, "UnwrapOr", vec![def], vec![elem_syntax_2], body, span);
    }

    // UnwrapOrElse(fn func() T) T
    {
        let elem_syntax = emitter.syntax_of(cx, &elem_ty, span);
        let elem_syntax_2 = emitter.syntax_of(cx, &elem_ty, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![], vec![elem_syntax]);
        let fn_param = b.param("fn", fn_ty);
        let fallback = b.call_ident("fn", vec![]);
        let body = unwrap_or_body(&mut b, "OptionTag_Some", "some_0", fallback);
        push_method(
            emitter, cx, canonical, "UnwrapOrElse",
            vec![fn_param], vec![elem_syntax_2], body, span,
        );
    }

    // Map(fn func(T) U') Option<U'>
    {
        let elem_syntax = emitter.syntax_of(cx, &elem_ty, span);
        let mapped_syntax = emitter.syntax_of(cx, &mapped, span);
        let union_syntax = named(cx, &map_union, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![elem_syntax], vec![mapped_syntax]);
        let fn_param = b.param("fn", fn_ty);

        let is_none = method_call(&mut b, "IsNone", vec![]);
        let none = b.call_ident(&format!("{map_union}_None"), vec![]);
        let ret_none = b.ret(vec![none]);
        let then_block = b.block(vec![ret_none]);
        let guard = b.if_stmt(is_none, then_block, None);
        let some_payload = payload(&mut b, "some_0");
        let mapped_value = b.call_ident("fn", vec![some_payload]);
        let some = b.call_ident(&format!("{map_union}_Some"), vec![mapped_value]);
        let ret = b.ret(vec![some]);
        let body = b.block(vec![guard, ret]);
        push_method(emitter, cx, canonical, "Map", vec![fn_param], vec![union_syntax], body, span);
    }

    // AndThen(fn func(T) Option<U'>) Option<U'>
    {
        let elem_syntax = emitter.syntax_of(cx, &elem_ty, span);
        let union_syntax = named(cx, &map_union, span);
        let union_syntax_2 = named(cx, &map_union, span);
        let mut b = cx.builder(span);
        let fn_ty = b.func_type(vec![elem_syntax], vec![union_syntax]);
        let fn_param = b.param("fn", fn_ty);

        let is_none = method_call(&mut b, "IsNone", vec![]);
        let none = b.call_ident(&format!("{map_union}_None"), vec![]);
        let ret_none = b.ret(vec![none]);
        let then_block = b.block(vec![ret_none]);
        let guard = b.if_stmt(is_none, then_block, None);
        let some_payload = payload(&mut b, "some_0");
        let chained = b.call_ident("fn", vec![some_payload]);
        let ret = b.ret(vec![chained]);
        let body = b.block(vec![guard, ret]);
        push_method(
            emitter, cx, canonical, "AndThen",
            vec![fn_param], vec![union_syntax_2], body, span,
        );
    }

    // Filter(pred func(T) bool) Option<T>
    {
        let elem_syntax = emitter.syntax_of(cx, &elem_ty, span);
        let union_syntax = named(cx, canonical, span);
        let mut b = cx.builder(span);
        let bool_ty = b.named_type("bool");
        let pred_ty = b.func_type(vec![elem_syntax], vec![bool_ty]);
        let pred = b.param("pred", pred_ty);

        let is_some = method_call(&mut b, "IsSome", vec![]);
        let some_payload = payload(&mut b, "some_0");
        let pred_call = b.call_ident("pred", vec![some_payload]);
        let cond = b.binary(BinaryOp::And, is_some, pred_call);
        let recv = b.ident("u");
        let ret_self = b.ret(vec![recv]);
        let then_block = b.block(vec![ret_self]);
        let guard = b.if_stmt(cond, then_block, None);
        let none = b.call_ident(&format!("{canonical}_None"), vec![]);
        let ret_none = b.ret(vec![none]);
        let body = b.block(vec![guard, ret_none]);
        push_method(emitter, cx, canonical, "Filter", vec![pred], vec![union_syntax], body, span);
    }
}

// -- Shared fragments --

/// Resolve the mapped element type and result union for a generic-shaped
/// helper, honoring `helper_generics`.
fn derived_union(
    emitter: &mut UnionEmitter,
    cx: &mut Context<'_>,
    base: &str,
    canonical: &str,
    placeholder_params: &[Type],
    original_elem: &Type,
    span: Span,
) -> (Type, String) {
    match cx.config.helper_generics {
        HelperGenerics::Placeholder => {
            let union = emitter.ensure_union(cx, base, placeholder_params, span);
            (Type::Interface, union)
        }
        HelperGenerics::Parameterized => (original_elem.clone(), canonical.to_string()),
    }
}

/// `if u.tag != <tag> { panic(msg) } if u.<field> == nil { panic(...) }
/// return *u.<field>`
fn unwrap_body(
    cx: &mut Context<'_>,
    tag_const: &str,
    field: &str,
    wrong_variant_msg: &str,
    span: Span,
) -> BlockId {
    let mut b = cx.builder(span);
    let recv = b.ident("u");
    let tag = b.selector(recv, "tag");
    let expected = b.ident(tag_const);
    let wrong_tag = b.ne(tag, expected);
    let tag_check = b.panic_if(wrong_tag, wrong_variant_msg);

    // Separate nil check: catches externally-constructed unions whose tag
    // and payload disagree.
    let recv = b.ident("u");
    let field_sel = b.selector(recv, field);
    let nil = b.lit_nil();
    let is_nil = b.eq(field_sel, nil);
    let nil_check = b.panic_if(is_nil, MSG_NIL_PAYLOAD);

    let value = payload(&mut b, field);
    let ret = b.ret(vec![value]);
    b.block(vec![tag_check, nil_check, ret])
}

/// `if u.tag == <tag> && u.<field> != nil { return *u.<field> }
/// return <fallback>`
fn unwrap_or_body(
    b: &mut dingo_ir::AstBuilder<'_>,
    tag_const: &str,
    field: &str,
    fallback: ExprId,
) -> BlockId {
    let recv = b.ident("u");
    let tag = b.selector(recv, "tag");
    let expected = b.ident(tag_const);
    let tag_ok = b.eq(tag, expected);
    let recv = b.ident("u");
    let field_sel = b.selector(recv, field);
    let nil = b.lit_nil();
    let not_nil = b.ne(field_sel, nil);
    let cond = b.binary(BinaryOp::And, tag_ok, not_nil);
    let value = payload(b, field);
    let ret_value = b.ret(vec![value]);
    let then_block = b.block(vec![ret_value]);
    let guard = b.if_stmt(cond, then_block, None);
    let ret_fallback = b.ret(vec![fallback]);
    b.block(vec![guard, ret_fallback])
}

/// Body of `Map`/`MapErr`: forward the untouched side, construct the mapped
/// side through the derived union's constructors.
fn map_result_body(
    b: &mut dingo_ir::AstBuilder<'_>,
    union: &str,
    map_ok_side: bool,
) -> BlockId {
    let (forward_pred, forward_field, forward_ctor, mapped_field, mapped_ctor) = if map_ok_side {
        ("IsErr", "err_0", "Err", "ok_0", "Ok")
    } else {
        ("IsOk", "ok_0", "Ok", "err_0", "Err")
    };

    let pred = method_call(b, forward_pred, vec![]);
    let forward_payload = payload(b, forward_field);
    let forwarded = b.call_ident(&format!("{union}_{forward_ctor}"), vec![forward_payload]);
    let ret_forward = b.ret(vec![forwarded]);
    let then_block = b.block(vec![ret_forward]);
    let guard = b.if_stmt(pred, then_block, None);

    let mapped_payload = payload(b, mapped_field);
    let mapped_value = b.call_ident("fn", vec![mapped_payload]);
    let mapped = b.call_ident(&format!("{union}_{mapped_ctor}"), vec![mapped_value]);
    let ret = b.ret(vec![mapped]);
    b.block(vec![guard, ret])
}

/// `*u.<field>`
fn payload(b: &mut dingo_ir::AstBuilder<'_>, field: &str) -> ExprId {
    let recv = b.ident("u");
    let sel = b.selector(recv, field);
    b.deref(sel)
}

/// `u.<method>(args)`
fn method_call(
    b: &mut dingo_ir::AstBuilder<'_>,
    method: &str,
    args: Vec<ExprId>,
) -> ExprId {
    let recv = b.ident("u");
    let sel = b.selector(recv, method);
    b.call(sel, args)
}

fn named(cx: &mut Context<'_>, name: &str, span: Span) -> TypeExprId {
    cx.builder(span).named_type(name)
}

/// Allocate a method declaration and queue it under `<union>.<method>`.
#[expect(
    clippy::too_many_arguments,
    reason = "internal emission helper; a config struct would only rename the arguments"
)]
fn push_method(
    emitter: &mut UnionEmitter,
    cx: &mut Context<'_>,
    canonical: &str,
    method: &str,
    params: Vec<Param>,
    results: Vec<TypeExprId>,
    body: BlockId,
    span: Span,
) {
    let mut b = cx.builder(span);
    let recv_ty = b.named_type(canonical);
    let recv = b.param("u", recv_ty);
    let name = b.name(method);
    let decl = cx.arena.alloc_decl(Decl::new(
        DeclKind::Func(FuncDecl {
            name,
            recv: Some(recv),
            params,
            results,
            body: Some(body),
        }),
        span,
    ));
    emitter.push(decl, format!("{canonical}.{method}"));
}
