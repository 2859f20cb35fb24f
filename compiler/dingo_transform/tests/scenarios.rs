//! End-to-end pipeline scenarios.
//!
//! Each test builds an input tree the way the upstream parser would hand it
//! over (extended nodes, generic annotations, markers), runs the driver,
//! and checks the essential shape of the lowered output.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "tests can panic")]

use pretty_assertions::assert_eq;

use dingo_ir::ast::{
    Comment, Decl, DeclKind, ExprKind, FuncDecl, MatchArm, Pattern, PatternKind,
    PropagationSyntax, SourceFile, StmtKind, TypeExprKind,
};
use dingo_ir::{AstBuilder, BlockId, DeclId, SharedInterner, Span, SyntaxArena, TypeExprId};
use dingo_types::{SyntheticTypeRegistry, TableTypeInfo, Type};
use dingo_transform::{Config, Driver, RunOutcome};

/// One scenario's moving parts.
struct Fixture {
    arena: SyntaxArena,
    file: SourceFile,
    interner: SharedInterner,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            arena: SyntaxArena::new(),
            file: SourceFile::default(),
            interner: SharedInterner::new(),
        }
    }

    fn builder(&mut self, span: Span) -> AstBuilder<'_> {
        AstBuilder::new(&mut self.arena, &self.interner, span)
    }

    /// Wrap a body in a function declaration and add it to the file.
    fn func(&mut self, name: &str, results: Vec<TypeExprId>, body: BlockId) -> DeclId {
        let name = self.interner.intern(name);
        let decl = self.arena.alloc_decl(Decl::new(
            DeclKind::Func(FuncDecl {
                name,
                recv: None,
                params: Vec::new(),
                results,
                body: Some(body),
            }),
            Span::DUMMY,
        ));
        self.file.decls.push(decl);
        decl
    }

    fn run(self, info: Option<&TableTypeInfo>) -> (SyntaxArena, SourceFile, RunOutcome) {
        let registry = SyntheticTypeRegistry::new();
        let mut driver = Driver::new(&registry, Config::default());
        driver
            .run_file(
                self.arena,
                self.file,
                self.interner.clone(),
                info.map(|i| i as &dyn dingo_types::TypeInfo),
            )
            .expect("pipeline must not abort")
    }
}

/// Names of all type-spec declarations in the file.
fn typespec_names(arena: &SyntaxArena, file: &SourceFile, interner: &SharedInterner) -> Vec<String> {
    file.decls
        .iter()
        .filter_map(|&d| match &arena.decl(d).kind {
            DeclKind::TypeSpec { name, .. } => Some(interner.lookup(*name).to_string()),
            _ => None,
        })
        .collect()
}

/// Names of all function declarations (free functions only).
fn func_names(arena: &SyntaxArena, file: &SourceFile, interner: &SharedInterner) -> Vec<String> {
    file.decls
        .iter()
        .filter_map(|&d| match &arena.decl(d).kind {
            DeclKind::Func(f) if f.recv.is_none() => {
                Some(interner.lookup(f.name).to_string())
            }
            _ => None,
        })
        .collect()
}

/// Method names declared on a given receiver type.
fn method_names(
    arena: &SyntaxArena,
    file: &SourceFile,
    interner: &SharedInterner,
    recv: &str,
) -> Vec<String> {
    file.decls
        .iter()
        .filter_map(|&d| match &arena.decl(d).kind {
            DeclKind::Func(f) => {
                let recv_param = f.recv.as_ref()?;
                let TypeExprKind::Named(n) = &arena.type_expr(recv_param.ty).kind else {
                    return None;
                };
                (interner.lookup(*n) == recv).then(|| interner.lookup(f.name).to_string())
            }
            _ => None,
        })
        .collect()
}

fn body_of(arena: &SyntaxArena, decl: DeclId) -> BlockId {
    match &arena.decl(decl).kind {
        DeclKind::Func(f) => f.body.expect("declared with a body"),
        _ => panic!("not a function"),
    }
}

// -- Scenario 1: Ok(42) with a Result<int, error> return annotation --

#[test]
fn scenario_ok_literal_in_result_function() {
    let mut fx = Fixture::new();
    let span = Span::new(10, 16);

    let (result_annot, err_annot, ret) = {
        let mut b = fx.builder(span);
        let int_ty = b.named_type("int");
        let err_ty = b.named_type("error");
        let result_name = b.name("Result");
        let result_annot = b.type_expr(TypeExprKind::Generic {
            name: result_name,
            args: vec![int_ty, err_ty],
        });
        let err_annot = b.named_type("error");
        let forty_two = b.lit_int(42);
        let ok_call = b.call_ident("Ok", vec![forty_two]);
        let nil = b.lit_nil();
        let ret = b.ret(vec![ok_call, nil]);
        (result_annot, err_annot, ret)
    };
    let body = fx.builder(span).block(vec![ret]);
    let decl = fx.func("build", vec![result_annot, err_annot], body);

    let (arena, _file, outcome) = fx.run(None);
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    // The annotation was canonicalized in place.
    let DeclKind::Func(f) = &arena.decl(decl).kind else {
        panic!("function survived")
    };
    assert!(matches!(
        &arena.type_expr(f.results[0]).kind,
        TypeExprKind::Named(_)
    ));

    // The call became a composite literal: tag + ok_0.
    let block = body_of(&arena, decl);
    let StmtKind::Return(results) = &arena.stmt(arena.block(block).stmts[0]).kind else {
        panic!("return stmt survived")
    };
    let ExprKind::Composite { ty: Some(_), fields } = &arena.expr(results[0]).kind else {
        panic!("Ok(42) must become a composite literal")
    };
    assert_eq!(fields.len(), 2);

    // The non-addressable literal payload went through the address idiom.
    let payload = &arena.expr(fields[1].value).kind;
    assert!(
        matches!(payload, ExprKind::Call { .. }),
        "literal payload must be wrapped in an address-returning function"
    );
}

#[test]
fn scenario_result_declarations_emitted_once() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    let (result_annot, err_annot, ret) = {
        let mut b = fx.builder(span);
        let int_ty = b.named_type("int");
        let err_ty = b.named_type("error");
        let result_name = b.name("Result");
        let result_annot = b.type_expr(TypeExprKind::Generic {
            name: result_name,
            args: vec![int_ty, err_ty],
        });
        let err_annot = b.named_type("error");
        let forty_two = b.lit_int(42);
        let ok_call = b.call_ident("Ok", vec![forty_two]);
        let nil = b.lit_nil();
        let ret = b.ret(vec![ok_call, nil]);
        (result_annot, err_annot, ret)
    };
    let body = fx.builder(span).block(vec![ret]);
    fx.func("build", vec![result_annot, err_annot], body);

    let interner = fx.interner.clone();
    let (arena, file, _) = fx.run(None);

    let types = typespec_names(&arena, &file, &interner);
    assert_eq!(
        types.iter().filter(|t| *t == "Result_int_error").count(),
        1
    );
    assert_eq!(types.iter().filter(|t| *t == "ResultTag").count(), 1);

    let funcs = func_names(&arena, &file, &interner);
    assert!(funcs.contains(&"Result_int_error_Ok".to_string()));
    assert!(funcs.contains(&"Result_int_error_Err".to_string()));

    let methods = method_names(&arena, &file, &interner, "Result_int_error");
    for expected in [
        "IsOk", "IsErr", "Unwrap", "UnwrapErr", "UnwrapOr", "UnwrapOrElse", "Map", "MapErr",
        "Filter", "AndThen", "OrElse", "And", "Or",
    ] {
        assert!(methods.contains(&expected.to_string()), "missing {expected}");
    }
}

// -- Scenario 2: match over Result lowers to a tag switch --

fn match_over_result(fx: &mut Fixture, info: &mut TableTypeInfo) -> DeclId {
    let span = Span::new(50, 80);

    // Register Result_int_error through an annotation on a sibling function.
    let (result_annot, err_annot) = {
        let mut b = fx.builder(span);
        let int_ty = b.named_type("int");
        let err_ty = b.named_type("error");
        let result_name = b.name("Result");
        let annot = b.type_expr(TypeExprKind::Generic {
            name: result_name,
            args: vec![int_ty, err_ty],
        });
        let err_annot = b.named_type("error");
        (annot, err_annot)
    };
    let sibling_body = fx.builder(span).block(vec![]);
    fx.func("producer", vec![result_annot, err_annot], sibling_body);

    // match r { Ok(v) => v, Err(e) => 0 } in return position.
    let scrutinee = fx.builder(span).ident("r");
    info.set_type(scrutinee, Type::named("Result_int_error"));

    let (ok_pattern, err_pattern) = {
        let v = fx.interner.intern("v");
        let e = fx.interner.intern("e");
        let ok_name = fx.interner.intern("Ok");
        let err_name = fx.interner.intern("Err");
        let ok = fx.arena.alloc_pattern(Pattern::new(
            PatternKind::Variant {
                name: ok_name,
                bindings: vec![v],
            },
            span,
        ));
        let err = fx.arena.alloc_pattern(Pattern::new(
            PatternKind::Variant {
                name: err_name,
                bindings: vec![e],
            },
            span,
        ));
        (ok, err)
    };
    let ret = {
        let mut b = fx.builder(span);
        let v_body = b.ident("v");
        let zero_body = b.lit_int(0);
        let match_expr = b.expr(ExprKind::Match {
            scrutinee,
            arms: vec![
                MatchArm {
                    pattern: ok_pattern,
                    guard: None,
                    body: v_body,
                    span,
                },
                MatchArm {
                    pattern: err_pattern,
                    guard: None,
                    body: zero_body,
                    span,
                },
            ],
        });
        b.ret(vec![match_expr])
    };
    let int_result = fx.builder(span).named_type("int");
    let body = fx.builder(span).block(vec![ret]);
    fx.func("consume", vec![int_result], body)
}

#[test]
fn scenario_match_lowers_to_tag_switch() {
    let mut fx = Fixture::new();
    let mut info = TableTypeInfo::new();
    let decl = match_over_result(&mut fx, &mut info);

    let interner = fx.interner.clone();
    let (arena, _, outcome) = fx.run(Some(&info));
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    // The return statement became a switch on r.tag.
    let block = body_of(&arena, decl);
    let stmt = arena.block(block).stmts[0];
    let StmtKind::Switch { tag: Some(tag), cases } = &arena.stmt(stmt).kind else {
        panic!("match must lower to a switch");
    };
    let ExprKind::Selector { field, .. } = &arena.expr(*tag).kind else {
        panic!("switch must dispatch on a tag selector");
    };
    assert_eq!(interner.lookup(*field), "tag");
    assert_eq!(cases.len(), 2);

    // First case: ResultTag_Ok, binding then return.
    let ExprKind::Ident(case0) = &arena.expr(cases[0].values[0]).kind else {
        panic!("case value must be a tag constant");
    };
    assert_eq!(interner.lookup(*case0), "ResultTag_Ok");
    assert_eq!(cases[0].body.len(), 2);
    assert!(matches!(
        arena.stmt(cases[0].body[0]).kind,
        StmtKind::Assign { .. }
    ));
    assert!(matches!(
        arena.stmt(cases[0].body[1]).kind,
        StmtKind::Return(_)
    ));
}

// -- Scenario 3: non-exhaustive user enum match --

#[test]
fn scenario_missing_variants_diagnosed() {
    let mut fx = Fixture::new();
    let span = Span::new(5, 40);

    // enum Status { Pending, Approved, Rejected }
    let status = fx.interner.intern("Status");
    let variants = ["Pending", "Approved", "Rejected"]
        .iter()
        .map(|name| dingo_ir::ast::VariantDecl {
            name: fx.interner.intern(name),
            kind: dingo_ir::ast::VariantKind::Unit,
            fields: Vec::new(),
            span,
        })
        .collect();
    let enum_decl = fx.arena.alloc_decl(Decl::new(
        DeclKind::Enum(dingo_ir::ast::EnumDecl {
            name: status,
            type_params: Vec::new(),
            variants,
        }),
        span,
    ));
    fx.file.decls.push(enum_decl);

    // match s { Pending => 1 }
    let scrutinee = fx.builder(span).ident("s");
    let mut info = TableTypeInfo::new();
    info.set_type(scrutinee, Type::named("Status"));

    let pending = fx.interner.intern("Pending");
    let pattern = fx.arena.alloc_pattern(Pattern::new(
        PatternKind::Variant {
            name: pending,
            bindings: Vec::new(),
        },
        span,
    ));
    let ret = {
        let mut b = fx.builder(span);
        let one = b.lit_int(1);
        let match_expr = b.expr(ExprKind::Match {
            scrutinee,
            arms: vec![MatchArm {
                pattern,
                guard: None,
                body: one,
                span,
            }],
        });
        b.ret(vec![match_expr])
    };
    let int_ty = fx.builder(span).named_type("int");
    let body = fx.builder(span).block(vec![ret]);
    let decl = fx.func("classify", vec![int_ty], body);

    let (arena, _, outcome) = fx.run(Some(&info));

    let non_exhaustive: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code == dingo_diagnostic::ErrorCode::E2001)
        .collect();
    assert_eq!(non_exhaustive.len(), 1);
    assert!(non_exhaustive[0].message.contains("Approved"));
    assert!(non_exhaustive[0].message.contains("Rejected"));

    // The rewrite still proceeded: a partial switch was emitted.
    let block = body_of(&arena, decl);
    assert!(matches!(
        arena.stmt(arena.block(block).stmts[0]).kind,
        StmtKind::Switch { .. }
    ));
}

#[test]
fn user_enum_emits_tag_constructors_and_predicates() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    let status = fx.interner.intern("Status");
    let variants = ["Pending", "Approved", "Rejected"]
        .iter()
        .map(|name| dingo_ir::ast::VariantDecl {
            name: fx.interner.intern(name),
            kind: dingo_ir::ast::VariantKind::Unit,
            fields: Vec::new(),
            span,
        })
        .collect();
    let enum_decl = fx.arena.alloc_decl(Decl::new(
        DeclKind::Enum(dingo_ir::ast::EnumDecl {
            name: status,
            type_params: Vec::new(),
            variants,
        }),
        span,
    ));
    fx.file.decls.push(enum_decl);

    // A constructor call site for one variant.
    let call = fx.builder(span).call_ident("Pending", vec![]);
    let stmt = fx.builder(span).expr_stmt(call);
    let body = fx.builder(span).block(vec![stmt]);
    fx.func("start", Vec::new(), body);

    let interner = fx.interner.clone();
    let (arena, file, outcome) = fx.run(None);
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    // The extended declaration is gone; the union and tag replaced it.
    let types = typespec_names(&arena, &file, &interner);
    assert!(types.contains(&"Status".to_string()));
    assert!(types.contains(&"StatusTag".to_string()));

    let funcs = func_names(&arena, &file, &interner);
    for ctor in ["Status_Pending", "Status_Approved", "Status_Rejected"] {
        assert!(funcs.contains(&ctor.to_string()), "missing {ctor}");
    }

    let methods = method_names(&arena, &file, &interner, "Status");
    for pred in ["IsPending", "IsApproved", "IsRejected"] {
        assert!(methods.contains(&pred.to_string()), "missing {pred}");
    }

    // The call site became a tagged composite.
    assert!(matches!(
        arena.expr(call).kind,
        ExprKind::Composite { .. }
    ));
}

#[test]
fn lifted_temps_do_not_collide() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    // Two propagations in one function: `a()? ; b()?` feeding a return.
    let (int_ty, err_ty, ret) = {
        let mut b = fx.builder(span);
        let int_ty = b.named_type("int");
        let err_ty = b.named_type("error");
        let call_a = b.call_ident("a", vec![]);
        let prop_a = b.expr(ExprKind::ErrorPropagation {
            inner: call_a,
            syntax: PropagationSyntax::Question,
        });
        let call_b = b.call_ident("b", vec![]);
        let prop_b = b.expr(ExprKind::ErrorPropagation {
            inner: call_b,
            syntax: PropagationSyntax::Try,
        });
        let sum = b.binary(dingo_ir::ast::BinaryOp::Add, prop_a, prop_b);
        let nil = b.lit_nil();
        let ret = b.ret(vec![sum, nil]);
        (int_ty, err_ty, ret)
    };
    let body = fx.builder(span).block(vec![ret]);
    let decl = fx.func("addBoth", vec![int_ty, err_ty], body);

    let interner = fx.interner.clone();
    let (arena, _, outcome) = fx.run(None);
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    // Four lifted statements precede the return; all temp names distinct.
    let block = body_of(&arena, decl);
    let stmts = &arena.block(block).stmts;
    assert_eq!(stmts.len(), 5);

    let mut temp_names = Vec::new();
    for &stmt in stmts.iter().take(4) {
        if let StmtKind::Assign { lhs, .. } = &arena.stmt(stmt).kind {
            for &e in lhs {
                if let ExprKind::Ident(n) = &arena.expr(e).kind {
                    temp_names.push(interner.lookup(*n));
                }
            }
        }
    }
    assert_eq!(temp_names, vec!["__tmp0", "__err0", "__tmp1", "__err1"]);
}

#[test]
fn coalesce_on_option_yields_element_type() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    // Register Option_int via a use site, then coalesce an Option_int LHS.
    let some_call = {
        let mut b = fx.builder(span);
        let one = b.lit_int(1);
        b.call_ident("Some", vec![one])
    };
    let seed_stmt = fx.builder(span).expr_stmt(some_call);
    let seed_body = fx.builder(span).block(vec![seed_stmt]);
    fx.func("seed", Vec::new(), seed_body);

    let lhs = fx.builder(span).ident("maybe");
    let mut info = TableTypeInfo::new();
    info.set_type(lhs, Type::named("Option_int"));

    let (coalesce, int_ty) = {
        let mut b = fx.builder(span);
        let rhs = b.lit_int(7);
        let coalesce = b.expr(ExprKind::NullCoalescing { lhs, rhs });
        let int_ty = b.named_type("int");
        (coalesce, int_ty)
    };
    let ret = fx.builder(span).ret(vec![coalesce]);
    let body = fx.builder(span).block(vec![ret]);
    fx.func("orSeven", vec![int_ty], body);

    let interner = fx.interner.clone();
    let (arena, _, outcome) = fx.run(Some(&info));
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    // `a ?? b` with Option<int> LHS and int RHS lowers to an IIFE typed int.
    let ExprKind::Call { func, .. } = &arena.expr(coalesce).kind else {
        panic!("coalesce must lower to an immediately-invoked function");
    };
    let ExprKind::FuncLit { results, .. } = &arena.expr(*func).kind else {
        panic!("expected a function literal");
    };
    let TypeExprKind::Named(n) = &arena.type_expr(results[0]).kind else {
        panic!("expected a named result type");
    };
    assert_eq!(interner.lookup(*n), "int");
}

#[test]
fn ternary_lowers_to_branched_iife() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    let (ternary, int_ty) = {
        let mut b = fx.builder(span);
        let cond = b.ident("ready");
        let one = b.lit_int(1);
        let two = b.lit_int(2);
        let ternary = b.expr(ExprKind::Ternary {
            cond,
            then_expr: one,
            else_expr: two,
        });
        let int_ty = b.named_type("int");
        (ternary, int_ty)
    };
    let ret = fx.builder(span).ret(vec![ternary]);
    let body = fx.builder(span).block(vec![ret]);
    fx.func("pick", vec![int_ty], body);

    let (arena, _, outcome) = fx.run(None);
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    let ExprKind::Call { func, .. } = &arena.expr(ternary).kind else {
        panic!("ternary must lower to an immediately-invoked function");
    };
    let ExprKind::FuncLit { body, .. } = &arena.expr(*func).kind else {
        panic!("expected a function literal");
    };
    // if cond { return 1 }; return 2
    let stmts = &arena.block(*body).stmts;
    assert_eq!(stmts.len(), 2);
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::If { .. }));
    assert!(matches!(arena.stmt(stmts[1]).kind, StmtKind::Return(_)));
}

// -- Scenario 4: safe-navigation chain --

#[test]
fn scenario_safe_navigation_chain() {
    let mut fx = Fixture::new();
    let span = Span::new(100, 120);

    let user = fx.builder(span).ident("user");
    let mut info = TableTypeInfo::new();
    info.set_type(user, Type::ptr(Type::named("User")));
    info.set_field("User", "address", Type::ptr(Type::named("Address")));
    info.set_field("Address", "city", Type::Prim(dingo_types::PrimKind::String));

    let (chain, ret) = {
        let address = fx.interner.intern("address");
        let city = fx.interner.intern("city");
        let mut b = fx.builder(span);
        let inner = b.expr(ExprKind::SafeNavigation {
            recv: user,
            field: address,
        });
        let chain = b.expr(ExprKind::SafeNavigation {
            recv: inner,
            field: city,
        });
        let ret = b.ret(vec![chain]);
        (chain, ret)
    };
    let option_ty = fx.builder(span).named_type("Option_string");
    let body = fx.builder(span).block(vec![ret]);
    fx.func("cityOf", vec![option_ty], body);

    let interner = fx.interner.clone();
    let (arena, file, outcome) = fx.run(Some(&info));
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    // The chain became an immediately-invoked function returning
    // Option_string, whose body starts with the outer nil check.
    let ExprKind::Call { func, args } = &arena.expr(chain).kind else {
        panic!("chain must lower to an immediately-invoked function");
    };
    assert!(args.is_empty());
    let ExprKind::FuncLit { results, body, .. } = &arena.expr(*func).kind else {
        panic!("expected a function literal");
    };
    let TypeExprKind::Named(result_name) = &arena.type_expr(results[0]).kind else {
        panic!("expected a named result type");
    };
    assert_eq!(interner.lookup(*result_name), "Option_string");
    assert!(matches!(
        arena.stmt(arena.block(*body).stmts[0]).kind,
        StmtKind::If { .. }
    ));

    // The Option_string union was injected.
    let types = typespec_names(&arena, &file, &interner);
    assert!(types.contains(&"Option_string".to_string()));
    assert!(types.contains(&"OptionTag".to_string()));
}

// -- Scenario 5: error propagation lifts before the return --

#[test]
fn scenario_error_propagation_lift() {
    let mut fx = Fixture::new();
    let span = Span::new(200, 230);

    let (user_ty, err_ty, ret) = {
        let mut b = fx.builder(span);
        let user_ty = b.named_type("User");
        let err_ty = b.named_type("error");
        let id_arg = b.ident("id");
        let fetch = b.call_ident("fetchUser", vec![id_arg]);
        let prop = b.expr(ExprKind::ErrorPropagation {
            inner: fetch,
            syntax: PropagationSyntax::Question,
        });
        let nil = b.lit_nil();
        let ret = b.ret(vec![prop, nil]);
        (user_ty, err_ty, ret)
    };
    let body = fx.builder(span).block(vec![ret]);
    let decl = fx.func("load", vec![user_ty, err_ty], body);

    let interner = fx.interner.clone();
    let (arena, _, outcome) = fx.run(None);
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    let block = body_of(&arena, decl);
    let stmts = &arena.block(block).stmts;
    assert_eq!(stmts.len(), 3, "define + early return + original return");

    // __tmp0, __err0 := fetchUser(id)
    let StmtKind::Assign { lhs, .. } = &arena.stmt(stmts[0]).kind else {
        panic!("first statement must be the lifted define");
    };
    let names: Vec<&str> = lhs
        .iter()
        .map(|&e| match &arena.expr(e).kind {
            ExprKind::Ident(n) => interner.lookup(*n),
            _ => panic!("lhs must be identifiers"),
        })
        .collect();
    assert_eq!(names, vec!["__tmp0", "__err0"]);

    // if __err0 != nil { return User{}, __err0 }
    let StmtKind::If { then_block, .. } = &arena.stmt(stmts[1]).kind else {
        panic!("second statement must be the early-return check");
    };
    let StmtKind::Return(results) = &arena.stmt(arena.block(*then_block).stmts[0]).kind
    else {
        panic!("early return expected");
    };
    assert!(matches!(
        arena.expr(results[0]).kind,
        ExprKind::Composite { .. }
    ));

    // The original return now references __tmp0.
    let StmtKind::Return(results) = &arena.stmt(stmts[2]).kind else {
        panic!("original return expected");
    };
    let ExprKind::Ident(tmp) = &arena.expr(results[0]).kind else {
        panic!("propagated expression must be replaced by the temp");
    };
    assert_eq!(interner.lookup(*tmp), "__tmp0");
}

// -- Scenario 6: one emission for repeated instantiations --

#[test]
fn scenario_repeated_some_emits_once() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    let (stmt1, stmt2) = {
        let mut b = fx.builder(span);
        let a = b.lit_int(42);
        let some_a = b.call_ident("Some", vec![a]);
        let stmt1 = b.expr_stmt(some_a);
        let c = b.lit_int(100);
        let some_c = b.call_ident("Some", vec![c]);
        let stmt2 = b.expr_stmt(some_c);
        (stmt1, stmt2)
    };
    let body = fx.builder(span).block(vec![stmt1, stmt2]);
    fx.func("pair", Vec::new(), body);

    let interner = fx.interner.clone();
    let (arena, file, outcome) = fx.run(None);
    assert!(outcome.is_clean(), "diagnostics: {:?}", outcome.diagnostics);

    let types = typespec_names(&arena, &file, &interner);
    assert_eq!(types.iter().filter(|t| *t == "Option_int").count(), 1);
    assert_eq!(types.iter().filter(|t| *t == "OptionTag").count(), 1);

    let funcs = func_names(&arena, &file, &interner);
    assert_eq!(
        funcs.iter().filter(|f| *f == "Option_int_Some").count(),
        1
    );
    assert_eq!(
        funcs.iter().filter(|f| *f == "Option_int_None").count(),
        1
    );
}

// -- Round trip: re-running the engine on its own output is a no-op --

#[test]
fn round_trip_is_noop() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    let (result_annot, err_annot, ret) = {
        let mut b = fx.builder(span);
        let int_ty = b.named_type("int");
        let err_ty = b.named_type("error");
        let result_name = b.name("Result");
        let result_annot = b.type_expr(TypeExprKind::Generic {
            name: result_name,
            args: vec![int_ty, err_ty],
        });
        let err_annot = b.named_type("error");
        let forty_two = b.lit_int(42);
        let ok_call = b.call_ident("Ok", vec![forty_two]);
        let nil = b.lit_nil();
        let ret = b.ret(vec![ok_call, nil]);
        (result_annot, err_annot, ret)
    };
    let body = fx.builder(span).block(vec![ret]);
    fx.func("build", vec![result_annot, err_annot], body);

    let interner = fx.interner.clone();
    let (arena, file, first) = fx.run(None);
    assert!(first.is_clean());
    let decl_count = file.decls.len();

    // Second run over the lowered output: fresh registry (a new compilation
    // unit), same tree.
    let registry = SyntheticTypeRegistry::new();
    let mut driver = Driver::new(&registry, Config::default());
    let (_, file2, second) = driver
        .run_file(arena, file, interner, None)
        .expect("round trip must not abort");

    assert!(second.is_clean(), "diagnostics: {:?}", second.diagnostics);
    assert_eq!(file2.decls.len(), decl_count, "no declarations added");
}

// -- Markers: association and guard emission --

#[test]
fn marker_site_guard_and_exhaustiveness() {
    let mut fx = Fixture::new();

    // A preprocessor-built switch at position 100 with two cases, tagged
    // with match markers; the Ok arm carries a guard.
    let case_ok_span = Span::point(110);
    let case_err_span = Span::point(130);
    let (switch, ok_body_stmt) = {
        let mut b = fx.builder(Span::point(110));
        let handle = b.ident("handle");
        let ok_body_stmt = b.expr_stmt(handle);
        let mut b = fx.builder(Span::new(100, 150));
        let tag_ok = b.ident("ResultTag_Ok");
        let tag_err = b.ident("ResultTag_Err");
        let switch = b.switch(
            None,
            vec![
                dingo_ir::ast::CaseClause {
                    values: vec![tag_ok],
                    body: vec![ok_body_stmt],
                    span: case_ok_span,
                },
                dingo_ir::ast::CaseClause {
                    values: vec![tag_err],
                    body: vec![],
                    span: case_err_span,
                },
            ],
        );
        (switch, ok_body_stmt)
    };
    let body = fx.builder(Span::new(100, 150)).block(vec![switch]);
    fx.func("dispatch", Vec::new(), body);

    for (text, pos) in [
        ("// DINGO_MATCH_START: r", 95u32),
        ("// DINGO_PATTERN: Ok(v)", 105),
        ("// DINGO_GUARD: v > 0", 107),
        ("// DINGO_PATTERN: Err(e)", 125),
    ] {
        fx.file.comments.push(Comment {
            text: text.to_string(),
            span: Span::point(pos),
        });
    }

    let (arena, _, outcome) = fx.run(None);

    // Ok/Err cover the Result family: exhaustive, no E2001.
    assert!(
        !outcome
            .diagnostics
            .iter()
            .any(|d| d.code == dingo_diagnostic::ErrorCode::E2001),
        "Ok/Err arms cover Result"
    );

    // The guarded arm's case body is now a single `if` with no else.
    let StmtKind::Switch { cases, .. } = &arena.stmt(switch).kind else {
        panic!("switch survives")
    };
    assert_eq!(cases[0].body.len(), 1);
    let StmtKind::If {
        then_block,
        else_stmt,
        ..
    } = &arena.stmt(cases[0].body[0]).kind
    else {
        panic!("guard must wrap the case body in an if");
    };
    assert!(else_stmt.is_none(), "a failing guard falls through");
    assert_eq!(arena.block(*then_block).stmts, vec![ok_body_stmt]);
}

#[test]
fn unreferenced_temp_blanked() {
    let mut fx = Fixture::new();
    let span = Span::DUMMY;

    // A propagation whose value is discarded: `fetch()?` as a statement.
    let (user_ty, err_ty, stmt) = {
        let mut b = fx.builder(span);
        let user_ty = b.named_type("User");
        let err_ty = b.named_type("error");
        let fetch = b.call_ident("fetch", vec![]);
        let prop = b.expr(ExprKind::ErrorPropagation {
            inner: fetch,
            syntax: PropagationSyntax::Bang,
        });
        let stmt = b.expr_stmt(prop);
        (user_ty, err_ty, stmt)
    };
    let ret = {
        let mut b = fx.builder(span);
        let user = b.ident("u");
        let nil = b.lit_nil();
        b.ret(vec![user, nil])
    };
    let body = fx.builder(span).block(vec![stmt, ret]);
    let decl = fx.func("drop_result", vec![user_ty, err_ty], body);

    let interner = fx.interner.clone();
    let (arena, _, _) = fx.run(None);

    // The discarded temp's binding is blanked; the error temp stays.
    let block = body_of(&arena, decl);
    let StmtKind::Assign { lhs, .. } = &arena.stmt(arena.block(block).stmts[0]).kind else {
        panic!("lifted define expected");
    };
    let names: Vec<&str> = lhs
        .iter()
        .map(|&e| match &arena.expr(e).kind {
            ExprKind::Ident(n) => interner.lookup(*n),
            _ => panic!("identifiers expected"),
        })
        .collect();
    assert_eq!(names, vec!["_", "__err0"]);
}
