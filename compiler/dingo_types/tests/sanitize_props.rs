//! Property-based tests for canonical-name sanitization.
//!
//! Verifies the invariants downstream code relies on:
//! 1. Output alphabet: `sanitize` produces only `[A-Za-z0-9_]`.
//! 2. Idempotence: `sanitize(sanitize(s)) == sanitize(s)`.
//! 3. Identity on plain identifiers without leading/trailing underscores.
//! 4. Canonical union names are a pure function of the parameter list.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "tests can panic")]

use dingo_types::{canonical_union_name, sanitize, PrimKind, Type};
use proptest::prelude::*;

/// Generate type-ish strings: plain identifiers mixed with the characters
/// the sanitizer rewrites.
fn type_string_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_*\\[\\]{}. <>-]{0,40}").expect("valid regex")
}

proptest! {
    #[test]
    fn sanitize_output_alphabet(s in type_string_strategy()) {
        let out = sanitize(&s);
        prop_assert!(
            out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
            "non-identifier character in {out:?}"
        );
    }

    #[test]
    fn sanitize_idempotent(s in type_string_strategy()) {
        let once = sanitize(&s);
        let twice = sanitize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sanitize_identity_on_plain_identifiers(
        s in prop::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,20}[A-Za-z0-9]").expect("valid regex")
    ) {
        prop_assert_eq!(sanitize(&s), s);
    }

    #[test]
    fn canonical_name_deterministic(use_ptr in any::<bool>(), name in "[A-Z][a-z]{1,8}") {
        let param = if use_ptr {
            Type::ptr(Type::named(name.clone()))
        } else {
            Type::named(name.clone())
        };
        let a = canonical_union_name("Option", &[param.clone()]);
        let b = canonical_union_name("Option", &[param]);
        prop_assert_eq!(a, b);
    }
}

#[test]
fn sanitize_known_shapes() {
    assert_eq!(sanitize("interface{}"), "any");
    assert_eq!(sanitize("map[string]int"), "map_string_int");
    assert_eq!(
        canonical_union_name("Result", &[Type::Prim(PrimKind::Int), Type::named("error")]),
        "Result_int_error"
    );
}
