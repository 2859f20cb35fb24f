//! Canonical type-name sanitization.
//!
//! A deterministic, lossy function from type strings to identifier-safe
//! names. Because it is lossy (`map[string]int` and `map_string_int`
//! collide), the synthetic-type registry always consults the *original*
//! parameter strings when checking identity; reverse parsing from a
//! sanitized name is forbidden everywhere in the engine.

use crate::Type;

/// Sanitize a type string into an identifier-safe name.
///
/// Rules, applied in order:
/// 1. `interface{}` → `any`
/// 2. `*` → `ptr_`
/// 3. `[]` → `slice_`
/// 4. `[` → `_`, `]` → `_`
/// 5. `.` → `_`
/// 6. `{`, `}` → removed
/// 7. whitespace → removed
/// 8. any remaining non-`[A-Za-z0-9_]` character → `_`
/// 9. leading/trailing `_` trimmed
pub fn sanitize(s: &str) -> String {
    let mut out = s.replace("interface{}", "any");
    out = out.replace('*', "ptr_");
    out = out.replace("[]", "slice_");
    out = out.replace('[', "_");
    out = out.replace(']', "_");
    out = out.replace('.', "_");
    out = out.replace(['{', '}'], "");
    out.retain(|c| !c.is_whitespace());
    let mapped: String = out
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    mapped.trim_matches('_').to_string()
}

/// Canonical union name for a generic instantiation.
///
/// A pure function of the base name and the logical type parameters: two
/// logically equal parameter lists always produce the same canonical name.
/// `Result` + `[int, error]` → `Result_int_error`.
pub fn canonical_union_name(base: &str, params: &[Type]) -> String {
    let mut name = String::from(base);
    for param in params {
        name.push('_');
        name.push_str(&sanitize(&param.to_string()));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimKind, Type};

    #[test]
    fn test_sanitize_rules() {
        assert_eq!(sanitize("interface{}"), "any");
        assert_eq!(sanitize("*User"), "ptr_User");
        assert_eq!(sanitize("[]byte"), "slice_byte");
        assert_eq!(sanitize("map[string]int"), "map_string_int");
        assert_eq!(sanitize("pkg.Type"), "pkg_Type");
        assert_eq!(sanitize("struct{a int}"), "structaint");
        assert_eq!(sanitize("  int  "), "int");
        assert_eq!(sanitize("_foo_"), "foo");
    }

    #[test]
    fn test_sanitize_known_collision() {
        // Lossy on purpose: the registry must never trust the sanitized name
        // alone for identity.
        assert_eq!(sanitize("map[string]int"), sanitize("map_string_int"));
    }

    #[test]
    fn test_canonical_union_names() {
        assert_eq!(
            canonical_union_name(
                "Result",
                &[Type::Prim(PrimKind::Int), Type::named("error")]
            ),
            "Result_int_error"
        );
        assert_eq!(
            canonical_union_name("Option", &[Type::Prim(PrimKind::Int)]),
            "Option_int"
        );
        assert_eq!(
            canonical_union_name("Option", &[Type::ptr(Type::named("User"))]),
            "Option_ptr_User"
        );
        assert_eq!(
            canonical_union_name("Result", &[Type::Interface, Type::named("error")]),
            "Result_any_error"
        );
    }
}
