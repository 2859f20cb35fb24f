//! The type-info contract.
//!
//! An optional, opaque handle onto the host language's type checker. When
//! present the engine prefers its answers; when absent the resolver operates
//! on structural facts only and fails hard everywhere else.

use dingo_ir::ExprId;
use rustc_hash::FxHashMap;

use crate::Type;

/// A function or method signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
}

impl Signature {
    /// Create a signature.
    pub fn new(params: Vec<Type>, results: Vec<Type>) -> Self {
        Signature { params, results }
    }
}

/// Opaque type-information handle supplied by the host type checker.
///
/// Every method may answer `None`; the engine treats that as "unknown" and
/// falls through its resolution tiers. Implementations must be consistent:
/// an answer, once given, is trusted without verification.
pub trait TypeInfo {
    /// Resolved type of an expression node.
    fn type_of(&self, expr: ExprId) -> Option<Type>;

    /// Underlying type of a named type.
    fn underlying(&self, name: &str) -> Option<Type> {
        let _ = name;
        None
    }

    /// Type of a named field on a named type.
    fn field_type(&self, owner: &str, field: &str) -> Option<Type> {
        let _ = (owner, field);
        None
    }

    /// Signature of a method on a named type.
    fn method(&self, owner: &str, name: &str) -> Option<Signature> {
        let _ = (owner, name);
        None
    }

    /// Signature of a free function.
    fn function(&self, name: &str) -> Option<Signature> {
        let _ = name;
        None
    }
}

/// Map-backed [`TypeInfo`] adapter.
///
/// Callers that materialize the checker's results as tables (and tests)
/// populate this directly.
#[derive(Debug, Default)]
pub struct TableTypeInfo {
    types: FxHashMap<ExprId, Type>,
    underlying: FxHashMap<String, Type>,
    fields: FxHashMap<(String, String), Type>,
    methods: FxHashMap<(String, String), Signature>,
    functions: FxHashMap<String, Signature>,
}

impl TableTypeInfo {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the type of an expression node.
    pub fn set_type(&mut self, expr: ExprId, ty: Type) {
        self.types.insert(expr, ty);
    }

    /// Record the underlying type of a named type.
    pub fn set_underlying(&mut self, name: impl Into<String>, ty: Type) {
        self.underlying.insert(name.into(), ty);
    }

    /// Record a field type.
    pub fn set_field(
        &mut self,
        owner: impl Into<String>,
        field: impl Into<String>,
        ty: Type,
    ) {
        self.fields.insert((owner.into(), field.into()), ty);
    }

    /// Record a method signature.
    pub fn set_method(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        sig: Signature,
    ) {
        self.methods.insert((owner.into(), name.into()), sig);
    }

    /// Record a function signature.
    pub fn set_function(&mut self, name: impl Into<String>, sig: Signature) {
        self.functions.insert(name.into(), sig);
    }
}

impl TypeInfo for TableTypeInfo {
    fn type_of(&self, expr: ExprId) -> Option<Type> {
        self.types.get(&expr).cloned()
    }

    fn underlying(&self, name: &str) -> Option<Type> {
        self.underlying.get(name).cloned()
    }

    fn field_type(&self, owner: &str, field: &str) -> Option<Type> {
        self.fields
            .get(&(owner.to_string(), field.to_string()))
            .cloned()
    }

    fn method(&self, owner: &str, name: &str) -> Option<Signature> {
        self.methods
            .get(&(owner.to_string(), name.to_string()))
            .cloned()
    }

    fn function(&self, name: &str) -> Option<Signature> {
        self.functions.get(name).cloned()
    }
}
