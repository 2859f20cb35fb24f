//! Semantic type terms.
//!
//! [`Type`] is the engine's working representation of target-language types:
//! what the type-info handle answers with, what the registry stores for
//! variant fields, and what the zero-value formatter consumes. The `Display`
//! impl is the `type_to_string` inverse formatter; it normalizes untyped
//! literal shapes to their typed equivalents.

use std::fmt;

pub use dingo_ir::ast::ChanDir;

/// Primitive type kinds of the target language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    String,
    Rune,
    Byte,
}

impl PrimKind {
    /// The canonical source spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimKind::Bool => "bool",
            PrimKind::Int => "int",
            PrimKind::Int8 => "int8",
            PrimKind::Int16 => "int16",
            PrimKind::Int32 => "int32",
            PrimKind::Int64 => "int64",
            PrimKind::Uint => "uint",
            PrimKind::Uint8 => "uint8",
            PrimKind::Uint16 => "uint16",
            PrimKind::Uint32 => "uint32",
            PrimKind::Uint64 => "uint64",
            PrimKind::Uintptr => "uintptr",
            PrimKind::Float32 => "float32",
            PrimKind::Float64 => "float64",
            PrimKind::String => "string",
            PrimKind::Rune => "rune",
            PrimKind::Byte => "byte",
        }
    }

    /// Parse a primitive spelling.
    pub fn from_str_opt(s: &str) -> Option<PrimKind> {
        Some(match s {
            "bool" => PrimKind::Bool,
            "int" => PrimKind::Int,
            "int8" => PrimKind::Int8,
            "int16" => PrimKind::Int16,
            "int32" => PrimKind::Int32,
            "int64" => PrimKind::Int64,
            "uint" => PrimKind::Uint,
            "uint8" => PrimKind::Uint8,
            "uint16" => PrimKind::Uint16,
            "uint32" => PrimKind::Uint32,
            "uint64" => PrimKind::Uint64,
            "uintptr" => PrimKind::Uintptr,
            "float32" => PrimKind::Float32,
            "float64" => PrimKind::Float64,
            "string" => PrimKind::String,
            "rune" => PrimKind::Rune,
            "byte" => PrimKind::Byte,
            _ => return None,
        })
    }

    /// Whether this primitive is an integer kind (including rune and byte).
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            PrimKind::Bool | PrimKind::Float32 | PrimKind::Float64 | PrimKind::String
        )
    }
}

/// Shapes of untyped literals, normalized before display or emission.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UntypedKind {
    Int,
    Float,
    Rune,
    Str,
    Bool,
    Nil,
}

/// A semantic type term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Prim(PrimKind),
    /// A named (declared) type, including `error` and generated unions.
    Named(String),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { len: u64, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan { dir: ChanDir, elem: Box<Type> },
    /// An inline struct type with ordered fields.
    Struct(Vec<(String, Type)>),
    /// The empty interface `interface{}`.
    Interface,
    Func {
        params: Vec<Type>,
        results: Vec<Type>,
    },
    /// A multi-value type, e.g. a function's `(T, error)` result.
    Tuple(Vec<Type>),
    /// An untyped literal shape; normalized at use sites.
    Untyped(UntypedKind),
}

impl Type {
    /// Shorthand for a pointer type.
    pub fn ptr(inner: Type) -> Type {
        Type::Pointer(Box::new(inner))
    }

    /// Shorthand for a named type.
    pub fn named(name: impl Into<String>) -> Type {
        Type::Named(name.into())
    }

    /// Normalize untyped literal shapes to their typed equivalents.
    ///
    /// `untyped int` → `int`, `untyped float` → `float64`, `untyped rune` →
    /// `rune`, `untyped string` → `string`, `untyped bool` → `bool`,
    /// `untyped nil` → `interface{}`. Recurses structurally.
    pub fn normalize(self) -> Type {
        match self {
            Type::Untyped(UntypedKind::Int) => Type::Prim(PrimKind::Int),
            Type::Untyped(UntypedKind::Float) => Type::Prim(PrimKind::Float64),
            Type::Untyped(UntypedKind::Rune) => Type::Prim(PrimKind::Rune),
            Type::Untyped(UntypedKind::Str) => Type::Prim(PrimKind::String),
            Type::Untyped(UntypedKind::Bool) => Type::Prim(PrimKind::Bool),
            Type::Untyped(UntypedKind::Nil) => Type::Interface,
            Type::Pointer(inner) => Type::Pointer(Box::new(inner.normalize())),
            Type::Slice(inner) => Type::Slice(Box::new(inner.normalize())),
            Type::Array { len, elem } => Type::Array {
                len,
                elem: Box::new(elem.normalize()),
            },
            Type::Map { key, value } => Type::Map {
                key: Box::new(key.normalize()),
                value: Box::new(value.normalize()),
            },
            Type::Chan { dir, elem } => Type::Chan {
                dir,
                elem: Box::new(elem.normalize()),
            },
            Type::Struct(fields) => Type::Struct(
                fields
                    .into_iter()
                    .map(|(name, ty)| (name, ty.normalize()))
                    .collect(),
            ),
            Type::Func { params, results } => Type::Func {
                params: params.into_iter().map(Type::normalize).collect(),
                results: results.into_iter().map(Type::normalize).collect(),
            },
            Type::Tuple(elems) => Type::Tuple(elems.into_iter().map(Type::normalize).collect()),
            other @ (Type::Prim(_) | Type::Named(_) | Type::Interface) => other,
        }
    }

    /// Whether a value of this type can be compared against `nil`.
    ///
    /// This is the "nullable" test for safe navigation: pointers qualify
    /// directly; Option-shaped named types are decided by the caller against
    /// the registry or type-info.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    /// The pointee, for pointer types.
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Prim(p) => f.write_str(p.as_str()),
            Type::Named(name) => f.write_str(name),
            Type::Pointer(inner) => write!(f, "*{inner}"),
            Type::Slice(inner) => write!(f, "[]{inner}"),
            Type::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Type::Map { key, value } => write!(f, "map[{key}]{value}"),
            Type::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            Type::Struct(fields) => {
                f.write_str("struct{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{name} {ty}")?;
                }
                f.write_str("}")
            }
            Type::Interface => f.write_str("interface{}"),
            Type::Func { params, results } => {
                f.write_str("func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str(")")?;
                match results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", results[0]),
                    _ => {
                        f.write_str(" (")?;
                        for (i, r) in results.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{r}")?;
                        }
                        f.write_str(")")
                    }
                }
            }
            Type::Tuple(elems) => {
                f.write_str("(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e}")?;
                }
                f.write_str(")")
            }
            // Untyped shapes print as their normalized equivalents.
            Type::Untyped(k) => {
                let normalized = Type::Untyped(*k).normalize();
                write!(f, "{normalized}")
            }
        }
    }
}

/// The shape of a type's zero value.
///
/// The transform layer turns these into syntax; keeping the shape abstract
/// here avoids a dependency on arena mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZeroValue {
    /// `false`
    False,
    /// `0`
    Zero,
    /// `0.0`
    ZeroFloat,
    /// `""`
    EmptyString,
    /// `nil`
    Nil,
    /// `T{}`, the composite literal with no fields.
    EmptyComposite(Type),
    /// Element-wise zeros of a multi-value type.
    Tuple(Vec<ZeroValue>),
}

/// Compute the zero-value shape for a type.
///
/// Named types delegate to their underlying type when `underlying` can
/// resolve it; otherwise they zero as an empty composite. `error` is a
/// well-known interface type and zeroes to `nil`.
pub fn zero_value(ty: &Type, underlying: &dyn Fn(&str) -> Option<Type>) -> ZeroValue {
    match ty {
        Type::Prim(p) => match p {
            PrimKind::Bool => ZeroValue::False,
            PrimKind::Float32 | PrimKind::Float64 => ZeroValue::ZeroFloat,
            PrimKind::String => ZeroValue::EmptyString,
            _ => ZeroValue::Zero,
        },
        Type::Named(name) => {
            if name == "error" {
                return ZeroValue::Nil;
            }
            match underlying(name) {
                Some(u) => zero_value(&u, underlying),
                None => ZeroValue::EmptyComposite(ty.clone()),
            }
        }
        Type::Pointer(_)
        | Type::Slice(_)
        | Type::Map { .. }
        | Type::Chan { .. }
        | Type::Interface
        | Type::Func { .. } => ZeroValue::Nil,
        Type::Array { .. } | Type::Struct(_) => ZeroValue::EmptyComposite(ty.clone()),
        Type::Tuple(elems) => {
            ZeroValue::Tuple(elems.iter().map(|e| zero_value(e, underlying)).collect())
        }
        Type::Untyped(k) => zero_value(&Type::Untyped(*k).normalize(), underlying),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_underlying(_: &str) -> Option<Type> {
        None
    }

    #[test]
    fn test_type_to_string_all_shapes() {
        assert_eq!(Type::Prim(PrimKind::Int).to_string(), "int");
        assert_eq!(Type::ptr(Type::named("User")).to_string(), "*User");
        assert_eq!(
            Type::Slice(Box::new(Type::Prim(PrimKind::Byte))).to_string(),
            "[]byte"
        );
        assert_eq!(
            Type::Array {
                len: 4,
                elem: Box::new(Type::Prim(PrimKind::Int))
            }
            .to_string(),
            "[4]int"
        );
        assert_eq!(
            Type::Map {
                key: Box::new(Type::Prim(PrimKind::String)),
                value: Box::new(Type::Prim(PrimKind::Int))
            }
            .to_string(),
            "map[string]int"
        );
        assert_eq!(
            Type::Chan {
                dir: ChanDir::Recv,
                elem: Box::new(Type::Prim(PrimKind::Int))
            }
            .to_string(),
            "<-chan int"
        );
        assert_eq!(
            Type::Chan {
                dir: ChanDir::Send,
                elem: Box::new(Type::Prim(PrimKind::Int))
            }
            .to_string(),
            "chan<- int"
        );
        assert_eq!(
            Type::Struct(vec![
                ("a".to_string(), Type::Prim(PrimKind::Int)),
                ("b".to_string(), Type::Prim(PrimKind::String)),
            ])
            .to_string(),
            "struct{a int; b string}"
        );
        assert_eq!(Type::Interface.to_string(), "interface{}");
        assert_eq!(
            Type::Func {
                params: vec![Type::Prim(PrimKind::Int)],
                results: vec![Type::Prim(PrimKind::Bool), Type::named("error")],
            }
            .to_string(),
            "func(int) (bool, error)"
        );
        assert_eq!(
            Type::Tuple(vec![Type::Prim(PrimKind::Int), Type::named("error")]).to_string(),
            "(int, error)"
        );
    }

    #[test]
    fn test_untyped_normalization() {
        assert_eq!(Type::Untyped(UntypedKind::Int).to_string(), "int");
        assert_eq!(Type::Untyped(UntypedKind::Nil).to_string(), "interface{}");
        assert_eq!(
            Type::Untyped(UntypedKind::Float).normalize(),
            Type::Prim(PrimKind::Float64)
        );
        assert_eq!(
            Type::ptr(Type::Untyped(UntypedKind::Int)).normalize(),
            Type::ptr(Type::Prim(PrimKind::Int))
        );
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(
            zero_value(&Type::Prim(PrimKind::Bool), &no_underlying),
            ZeroValue::False
        );
        assert_eq!(
            zero_value(&Type::Prim(PrimKind::Int), &no_underlying),
            ZeroValue::Zero
        );
        assert_eq!(
            zero_value(&Type::Prim(PrimKind::Float64), &no_underlying),
            ZeroValue::ZeroFloat
        );
        assert_eq!(
            zero_value(&Type::Prim(PrimKind::String), &no_underlying),
            ZeroValue::EmptyString
        );
        assert_eq!(
            zero_value(&Type::ptr(Type::named("User")), &no_underlying),
            ZeroValue::Nil
        );
        assert_eq!(zero_value(&Type::named("error"), &no_underlying), ZeroValue::Nil);
        assert_eq!(
            zero_value(&Type::named("User"), &no_underlying),
            ZeroValue::EmptyComposite(Type::named("User"))
        );
    }

    #[test]
    fn test_named_zero_delegates_to_underlying() {
        let underlying = |name: &str| {
            (name == "Celsius").then(|| Type::Prim(PrimKind::Float64))
        };
        assert_eq!(
            zero_value(&Type::named("Celsius"), &underlying),
            ZeroValue::ZeroFloat
        );
    }
}
