//! Nullable-shape tests.
//!
//! Safe navigation and null coalescing accept two receiver shapes: pointers,
//! and *Option-shaped* named types. A named type is Option-shaped iff it has
//! an unexported `tag` field whose type's simple name is exactly `OptionTag`
//! (specifically not `ResultTag`) and a zero-parameter, single-result
//! `Unwrap` method. Unions generated by this engine qualify by construction
//! and are recognized through the registry; host-defined types are probed
//! through type-info.

use dingo_types::Type;

use crate::Context;

/// How a nullable receiver is null-checked and unwrapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NullableShape {
    /// A pointer; null test is `== nil`, unwrap is `*x`.
    Pointer(Type),
    /// An Option-shaped named type; null test is `IsNone()`, unwrap is
    /// `Unwrap()`. Carries the element type.
    Option(Type),
}

impl NullableShape {
    /// The unwrapped element type.
    pub(crate) fn elem(&self) -> &Type {
        match self {
            NullableShape::Pointer(elem) | NullableShape::Option(elem) => elem,
        }
    }
}

/// Classify a type as nullable, or `None` for non-nullable receivers.
pub(crate) fn nullable_shape(ty: &Type, cx: &Context<'_>) -> Option<NullableShape> {
    match ty {
        Type::Pointer(inner) => Some(NullableShape::Pointer((**inner).clone())),
        Type::Named(name) => option_elem(name, cx).map(NullableShape::Option),
        _ => None,
    }
}

/// The element type of an Option-shaped named type, or `None`.
pub(crate) fn option_elem(name: &str, cx: &Context<'_>) -> Option<Type> {
    // Unions generated by this engine: ask the registry.
    if let Some(synth) = cx.registry().lookup(name) {
        if synth.base != "Option" {
            return None;
        }
        return synth
            .variant_fields("Some")
            .and_then(|fields| fields.first())
            .map(|field| field.ty.clone());
    }

    // Host-defined types: probe the structural contract through type-info.
    let info = cx.type_info()?;
    let Type::Struct(fields) = info.underlying(name)? else {
        return None;
    };
    let has_option_tag = fields.iter().any(|(field_name, field_ty)| {
        field_name == "tag"
            && matches!(field_ty, Type::Named(n) if simple_name(n) == "OptionTag")
    });
    if !has_option_tag {
        return None;
    }

    let sig = info.method(name, "Unwrap")?;
    if sig.params.is_empty() && sig.results.len() == 1 {
        Some(sig.results[0].clone())
    } else {
        None
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
