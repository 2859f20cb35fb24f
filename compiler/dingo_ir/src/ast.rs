//! Syntax tree node kinds.
//!
//! The node set covers the plain target language (literals, identifiers,
//! selectors, calls, operators, composite literals, blocks, `if`, `return`,
//! assignment, `switch`/`case`, function literals, function declarations,
//! type specs) plus the extended kinds the upstream parser introduces:
//! enum declarations, match expressions with arms and patterns, error
//! propagation, safe navigation, null coalescing, and ternary.
//!
//! Node-to-node references use arena ids (`ExprId`, `StmtId`, …); child
//! *lists* that transforms splice into (block bodies, case bodies, argument
//! lists) are inline `Vec`s so insertion stays local to the owning node.
//!
//! Floats are stored as raw bits so every node kind is `Eq`.

use crate::{BlockId, DeclId, ExprId, Name, PatternId, Span, StmtId, TypeExprId};

// Literals

/// Literal shapes shared by expressions and patterns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LitKind {
    /// Integer literal.
    Int(i64),
    /// Float literal, stored as raw bits.
    Float(u64),
    /// String literal (interned contents).
    Str(Name),
    /// Character literal.
    Char(char),
    /// Boolean literal.
    Bool(bool),
    /// The nil literal.
    Nil,
}

impl LitKind {
    /// Create a float literal from an `f64` value.
    #[inline]
    pub fn float(value: f64) -> Self {
        LitKind::Float(value.to_bits())
    }
}

// Operators

/// Unary operator kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Logical negation `!`.
    Not,
    /// Arithmetic negation `-`.
    Neg,
    /// Address-of `&`.
    AddrOf,
    /// Pointer dereference `*`.
    Deref,
}

/// Binary operator kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Surface syntax of an error-propagation expression.
///
/// The three spellings are semantically identical.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropagationSyntax {
    /// `expr?`
    Question,
    /// `expr!`
    Bang,
    /// `try expr`
    Try,
}

// Expressions

/// An expression node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    /// Create a new expression.
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// A keyed or positional entry of a composite literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInit {
    /// Field name for keyed entries, `None` for positional.
    pub key: Option<Name>,
    pub value: ExprId,
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Name,
    pub ty: TypeExprId,
}

/// One arm of a match expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchArm {
    pub pattern: PatternId,
    /// Optional boolean guard; failing guards fall through to later arms.
    pub guard: Option<ExprId>,
    pub body: ExprId,
    pub span: Span,
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    Lit(LitKind),
    Ident(Name),
    /// Field selection `recv.field`.
    Selector { recv: ExprId, field: Name },
    /// Index expression `recv[index]`.
    Index { recv: ExprId, index: ExprId },
    /// Slice expression `recv[low:high]`.
    Slice {
        recv: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
    },
    /// Call expression.
    Call { func: ExprId, args: Vec<ExprId> },
    Unary { op: UnaryOp, operand: ExprId },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// Composite literal `T{...}` (or untyped `{...}` inside another literal).
    Composite {
        ty: Option<TypeExprId>,
        fields: Vec<FieldInit>,
    },
    /// Function literal.
    FuncLit {
        params: Vec<Param>,
        results: Vec<TypeExprId>,
        body: BlockId,
    },
    /// Type assertion `recv.(T)`.
    TypeAssert { recv: ExprId, ty: TypeExprId },
    /// Parenthesized expression.
    Paren(ExprId),

    // Extended kinds introduced by the upstream parser.
    /// `inner?` / `inner!` / `try inner`.
    ErrorPropagation {
        inner: ExprId,
        syntax: PropagationSyntax,
    },
    /// `recv?.field`.
    SafeNavigation { recv: ExprId, field: Name },
    /// `lhs ?? rhs`.
    NullCoalescing { lhs: ExprId, rhs: ExprId },
    /// `cond ? then_expr : else_expr`.
    Ternary {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    /// `match scrutinee { arms }`.
    Match {
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
    },
}

// Patterns

/// A match pattern node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

impl Pattern {
    /// Create a new pattern.
    #[inline]
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Pattern { kind, span }
    }
}

/// Pattern kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// `_`
    Wildcard,
    /// A literal pattern.
    Lit(LitKind),
    /// `Variant(a, b)`: a variant name with ordered field bindings.
    Variant { name: Name, bindings: Vec<Name> },
    /// `(p1, p2, …)`: a tuple of sub-patterns.
    Tuple(Vec<PatternId>),
}

// Statements

/// A statement node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    /// Create a new statement.
    #[inline]
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Assignment operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
}

/// One `case` clause of a switch statement.
///
/// An empty `values` list is the `default` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseClause {
    pub values: Vec<ExprId>,
    pub body: Vec<StmtId>,
    pub span: Span,
}

/// Statement kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    /// Expression statement.
    Expr(ExprId),
    /// Multi-value assignment or short variable declaration.
    Assign {
        op: AssignOp,
        lhs: Vec<ExprId>,
        rhs: Vec<ExprId>,
    },
    /// `var names ty = values`.
    VarDecl {
        names: Vec<Name>,
        ty: Option<TypeExprId>,
        values: Vec<ExprId>,
    },
    /// `return results`.
    Return(Vec<ExprId>),
    /// `if cond { then } else …`; `else_stmt` is a block or another `if`.
    If {
        cond: ExprId,
        then_block: BlockId,
        else_stmt: Option<StmtId>,
    },
    /// A free-standing block.
    Block(BlockId),
    /// `switch tag { cases }`.
    Switch {
        tag: Option<ExprId>,
        cases: Vec<CaseClause>,
    },
}

/// A braced statement list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<StmtId>,
    pub span: Span,
}

// Declarations

/// A top-level declaration node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

impl Decl {
    /// Create a new declaration.
    #[inline]
    pub fn new(kind: DeclKind, span: Span) -> Self {
        Decl { kind, span }
    }
}

/// A function declaration, optionally with a receiver (a method).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: Name,
    pub recv: Option<Param>,
    pub params: Vec<Param>,
    pub results: Vec<TypeExprId>,
    /// `None` for forward declarations supplied by the type-info layer.
    pub body: Option<BlockId>,
}

/// One spec of a grouped constant declaration.
///
/// The enum-constant idiom leaves `value` as `None` on continuation specs,
/// which inherit the first spec's iota expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstSpec {
    pub name: Name,
    pub ty: Option<TypeExprId>,
    pub value: Option<ExprId>,
}

/// Variant shape of an enum declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// No payload.
    Unit,
    /// Positional payload fields.
    Tuple,
    /// Named payload fields.
    Struct,
}

/// One payload field of an enum variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantField {
    /// `None` for tuple-variant fields, which are addressed by index.
    pub name: Option<Name>,
    pub ty: TypeExprId,
}

/// One variant of an enum declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantDecl {
    pub name: Name,
    pub kind: VariantKind,
    pub fields: Vec<VariantField>,
    pub span: Span,
}

/// An enum declaration (extended kind).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: Name,
    pub type_params: Vec<Name>,
    pub variants: Vec<VariantDecl>,
}

/// Declaration kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Func(FuncDecl),
    /// `type name ty` (or `type name = ty` when `is_alias`).
    TypeSpec {
        name: Name,
        ty: TypeExprId,
        is_alias: bool,
    },
    /// Package-level `var`.
    Var {
        names: Vec<Name>,
        ty: Option<TypeExprId>,
        values: Vec<ExprId>,
    },
    /// Grouped constant declaration.
    Const { specs: Vec<ConstSpec> },
    /// Enum declaration (extended kind).
    Enum(EnumDecl),
}

// Syntactic types

/// Channel direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A field of an inline struct type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructField {
    pub name: Name,
    pub ty: TypeExprId,
}

/// A syntactic type expression node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeExprNode {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExprNode {
    /// Create a new type expression.
    #[inline]
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        TypeExprNode { kind, span }
    }
}

/// Syntactic type expression kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExprKind {
    /// A bare name: `int`, `string`, `User`, `ResultTag`.
    Named(Name),
    /// A package-qualified name: `pkg.Type`.
    Qualified { pkg: Name, name: Name },
    Pointer(TypeExprId),
    Slice(TypeExprId),
    Array { len: u64, elem: TypeExprId },
    Map { key: TypeExprId, value: TypeExprId },
    Chan { dir: ChanDir, elem: TypeExprId },
    Struct { fields: Vec<StructField> },
    /// The empty interface `interface{}`.
    Interface,
    Func {
        params: Vec<TypeExprId>,
        results: Vec<TypeExprId>,
    },
    /// Extended kind: a generic instantiation `Result<int, error>`.
    Generic { name: Name, args: Vec<TypeExprId> },
}

// Source file

/// A comment attached to a source file.
///
/// Comments are the carrier for the preprocessor's marker annotations; the
/// engine otherwise ignores them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// A single source file: package clause, top-level declarations, comments.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SourceFile {
    pub package: Name,
    pub decls: Vec<DeclId>,
    pub comments: Vec<Comment>,
}
