//! Type inference service for the Dingo transformation engine.
//!
//! Provides:
//! - the semantic [`Type`] term and its `type_to_string` formatter
//! - canonical type-name sanitization ([`sanitize`]) and union naming
//! - the synthetic-type registry shared across a compilation unit
//! - the optional [`TypeInfo`] contract onto the host type checker
//! - the four-tier [`TypeResolver`] and syntactic⇄semantic conversion
//! - zero-value shapes for lifted early returns

mod info;
mod registry;
mod resolve;
pub mod sanitize;
mod ty;

pub use info::{Signature, TableTypeInfo, TypeInfo};
pub use registry::{
    FieldLayout, RegisterOutcome, SyntheticType, SyntheticTypeRegistry, VariantLayout,
};
pub use resolve::{type_to_syntax, InferFailure, TypeResolver};
pub use sanitize::{canonical_union_name, sanitize};
pub use ty::{zero_value, ChanDir, PrimKind, Type, UntypedKind, ZeroValue};
