//! Four-tier type resolution and syntactic⇄semantic conversion.
//!
//! Resolution order, first success wins:
//!
//! 1. **Type-info lookup**: when a handle is present, trust its answer.
//! 2. **Structural shape**: literal shapes and other facts the tree states
//!    outright (a composite literal's written type, a function literal's
//!    signature, a type assertion's target).
//! 3. **Address-of propagation**: `&e` has type `*τ` when `e` resolves to τ.
//! 4. **Hard failure**: identifiers, calls, selectors, indexing, and
//!    dereferences never get a guessed type without type-info.

use dingo_ir::ast::{ExprKind, LitKind, TypeExprKind, TypeExprNode, UnaryOp};
use dingo_ir::{ExprId, Span, StringInterner, SyntaxArena, TypeExprId};

use crate::sanitize::canonical_union_name;
use crate::{PrimKind, Type, TypeInfo, UntypedKind};

/// A type the resolver could not determine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferFailure {
    /// Human-readable description of the node, e.g. ``identifier `user` ``.
    pub what: String,
    pub span: Span,
}

impl std::fmt::Display for InferFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot infer type of {} at {}", self.what, self.span)
    }
}

impl std::error::Error for InferFailure {}

/// Uniform type queries over syntax nodes.
pub struct TypeResolver<'a> {
    arena: &'a SyntaxArena,
    interner: &'a StringInterner,
    info: Option<&'a dyn TypeInfo>,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver over one file's arena.
    pub fn new(
        arena: &'a SyntaxArena,
        interner: &'a StringInterner,
        info: Option<&'a dyn TypeInfo>,
    ) -> Self {
        TypeResolver {
            arena,
            interner,
            info,
        }
    }

    /// The type-info handle, if one is attached.
    pub fn info(&self) -> Option<&'a dyn TypeInfo> {
        self.info
    }

    /// Underlying type of a named type, when type-info can answer.
    pub fn underlying(&self, name: &str) -> Option<Type> {
        self.info.and_then(|i| i.underlying(name))
    }

    /// Resolve the type of an expression.
    pub fn resolve(&self, expr: ExprId) -> Result<Type, InferFailure> {
        // Tier 1: the type checker's answer is authoritative.
        if let Some(info) = self.info {
            if let Some(ty) = info.type_of(expr) {
                return Ok(ty.normalize());
            }
        }

        let node = self.arena.expr(expr);
        match &node.kind {
            // Tier 2: shapes the tree states outright.
            ExprKind::Lit(lit) => Ok(literal_shape(*lit)),
            ExprKind::Composite { ty: Some(ty), .. } => Ok(self.from_syntax(*ty)),
            ExprKind::FuncLit {
                params, results, ..
            } => Ok(Type::Func {
                params: params.iter().map(|p| self.from_syntax(p.ty)).collect(),
                results: results.iter().map(|r| self.from_syntax(*r)).collect(),
            }),
            ExprKind::TypeAssert { ty, .. } => Ok(self.from_syntax(*ty)),
            ExprKind::Paren(inner) => self.resolve(*inner),

            // Tier 3: address-of propagation.
            ExprKind::Unary {
                op: UnaryOp::AddrOf,
                operand,
            } => Ok(Type::ptr(self.resolve(*operand)?)),

            // Tier 4: deliberate hard failures.
            ExprKind::Ident(name) => Err(self.fail(expr, format!(
                "identifier `{}`",
                self.interner.lookup(*name)
            ))),
            ExprKind::Call { .. } => Err(self.fail(expr, "call expression".to_string())),
            ExprKind::Selector { field, .. } => Err(self.fail(expr, format!(
                "field selector `.{}`",
                self.interner.lookup(*field)
            ))),
            ExprKind::Index { .. } => Err(self.fail(expr, "index expression".to_string())),
            ExprKind::Unary {
                op: UnaryOp::Deref, ..
            } => Err(self.fail(expr, "dereference".to_string())),
            other => Err(self.fail(expr, format!("{} expression", kind_name(other)))),
        }
    }

    fn fail(&self, expr: ExprId, what: String) -> InferFailure {
        InferFailure {
            what,
            span: self.arena.expr(expr).span,
        }
    }

    /// Convert a syntactic type expression to a semantic type.
    ///
    /// Generic instantiations map to the canonical union name their
    /// parameters determine.
    pub fn from_syntax(&self, ty: TypeExprId) -> Type {
        match &self.arena.type_expr(ty).kind {
            TypeExprKind::Named(name) => named_to_type(self.interner.lookup(*name)),
            TypeExprKind::Qualified { pkg, name } => Type::Named(format!(
                "{}.{}",
                self.interner.lookup(*pkg),
                self.interner.lookup(*name)
            )),
            TypeExprKind::Pointer(inner) => Type::ptr(self.from_syntax(*inner)),
            TypeExprKind::Slice(inner) => Type::Slice(Box::new(self.from_syntax(*inner))),
            TypeExprKind::Array { len, elem } => Type::Array {
                len: *len,
                elem: Box::new(self.from_syntax(*elem)),
            },
            TypeExprKind::Map { key, value } => Type::Map {
                key: Box::new(self.from_syntax(*key)),
                value: Box::new(self.from_syntax(*value)),
            },
            TypeExprKind::Chan { dir, elem } => Type::Chan {
                dir: *dir,
                elem: Box::new(self.from_syntax(*elem)),
            },
            TypeExprKind::Struct { fields } => Type::Struct(
                fields
                    .iter()
                    .map(|f| {
                        (
                            self.interner.lookup(f.name).to_string(),
                            self.from_syntax(f.ty),
                        )
                    })
                    .collect(),
            ),
            TypeExprKind::Interface => Type::Interface,
            TypeExprKind::Func { params, results } => Type::Func {
                params: params.iter().map(|p| self.from_syntax(*p)).collect(),
                results: results.iter().map(|r| self.from_syntax(*r)).collect(),
            },
            TypeExprKind::Generic { name, args } => {
                let base = self.interner.lookup(*name);
                let params: Vec<Type> = args.iter().map(|a| self.from_syntax(*a)).collect();
                Type::Named(canonical_union_name(base, &params))
            }
        }
    }

    /// Split a generic instantiation annotation into base name and semantic
    /// parameters. `None` for non-generic type expressions.
    pub fn generic_parts(&self, ty: TypeExprId) -> Option<(String, Vec<Type>)> {
        match &self.arena.type_expr(ty).kind {
            TypeExprKind::Generic { name, args } => {
                let base = self.interner.lookup(*name).to_string();
                let params = args.iter().map(|a| self.from_syntax(*a)).collect();
                Some((base, params))
            }
            _ => None,
        }
    }
}

/// Canonical primitive shapes of literals.
fn literal_shape(lit: LitKind) -> Type {
    match lit {
        LitKind::Int(_) => Type::Prim(PrimKind::Int),
        LitKind::Float(_) => Type::Prim(PrimKind::Float64),
        LitKind::Str(_) => Type::Prim(PrimKind::String),
        LitKind::Char(_) => Type::Prim(PrimKind::Rune),
        LitKind::Bool(_) => Type::Prim(PrimKind::Bool),
        LitKind::Nil => Type::Untyped(UntypedKind::Nil).normalize(),
    }
}

fn named_to_type(name: &str) -> Type {
    if let Some(prim) = PrimKind::from_str_opt(name) {
        return Type::Prim(prim);
    }
    if name == "any" {
        return Type::Interface;
    }
    Type::Named(name.to_string())
}

fn kind_name(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::Lit(_) => "literal",
        ExprKind::Ident(_) => "identifier",
        ExprKind::Selector { .. } => "selector",
        ExprKind::Index { .. } => "index",
        ExprKind::Slice { .. } => "slice",
        ExprKind::Call { .. } => "call",
        ExprKind::Unary { .. } => "unary",
        ExprKind::Binary { .. } => "binary",
        ExprKind::Composite { .. } => "composite literal",
        ExprKind::FuncLit { .. } => "function literal",
        ExprKind::TypeAssert { .. } => "type assertion",
        ExprKind::Paren(_) => "parenthesized",
        ExprKind::ErrorPropagation { .. } => "error propagation",
        ExprKind::SafeNavigation { .. } => "safe navigation",
        ExprKind::NullCoalescing { .. } => "null coalescing",
        ExprKind::Ternary { .. } => "ternary",
        ExprKind::Match { .. } => "match",
    }
}

/// Emit a semantic type back into the tree as a syntactic type expression.
///
/// Tuples have no single-type syntax; callers split them into result lists
/// before emission. A tuple reaching this function indicates a caller bug
/// and degrades to `interface{}` with a warning.
pub fn type_to_syntax(
    ty: &Type,
    arena: &mut SyntaxArena,
    interner: &StringInterner,
    span: Span,
) -> TypeExprId {
    let kind = match ty {
        Type::Prim(p) => TypeExprKind::Named(interner.intern(p.as_str())),
        Type::Named(name) => match name.split_once('.') {
            Some((pkg, simple)) => TypeExprKind::Qualified {
                pkg: interner.intern(pkg),
                name: interner.intern(simple),
            },
            None => TypeExprKind::Named(interner.intern(name)),
        },
        Type::Pointer(inner) => {
            let inner = type_to_syntax(inner, arena, interner, span);
            TypeExprKind::Pointer(inner)
        }
        Type::Slice(inner) => {
            let inner = type_to_syntax(inner, arena, interner, span);
            TypeExprKind::Slice(inner)
        }
        Type::Array { len, elem } => {
            let elem = type_to_syntax(elem, arena, interner, span);
            TypeExprKind::Array { len: *len, elem }
        }
        Type::Map { key, value } => {
            let key = type_to_syntax(key, arena, interner, span);
            let value = type_to_syntax(value, arena, interner, span);
            TypeExprKind::Map { key, value }
        }
        Type::Chan { dir, elem } => {
            let elem = type_to_syntax(elem, arena, interner, span);
            TypeExprKind::Chan { dir: *dir, elem }
        }
        Type::Struct(fields) => {
            let fields = fields
                .iter()
                .map(|(name, field_ty)| dingo_ir::ast::StructField {
                    name: interner.intern(name),
                    ty: type_to_syntax(field_ty, arena, interner, span),
                })
                .collect();
            TypeExprKind::Struct { fields }
        }
        Type::Interface => TypeExprKind::Interface,
        Type::Func { params, results } => {
            let params = params
                .iter()
                .map(|p| type_to_syntax(p, arena, interner, span))
                .collect();
            let results = results
                .iter()
                .map(|r| type_to_syntax(r, arena, interner, span))
                .collect();
            TypeExprKind::Func { params, results }
        }
        Type::Tuple(_) => {
            tracing::warn!(%ty, "tuple type emitted as a single type expression");
            TypeExprKind::Interface
        }
        Type::Untyped(k) => {
            let normalized = Type::Untyped(*k).normalize();
            return type_to_syntax(&normalized, arena, interner, span);
        }
    };
    arena.alloc_type_expr(TypeExprNode::new(kind, span))
}
