//! Synthetic-type registry.
//!
//! Process-wide (per compilation unit) mapping from canonical union name to
//! the tagged-union layout registered for it. Identity is decided on the
//! *original* parameter strings, never on the sanitized name, because
//! sanitization is lossy. Registration with the same name but different
//! originals is a collision: logged at ERROR, first registration wins, and
//! the run proceeds.
//!
//! The registry is the only state shared between files; a mutex scopes
//! collision detection across a parallel driver.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::Type;

/// One payload field of a registered variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    /// Union-struct field name, e.g. `ok_0`.
    pub name: String,
    pub ty: Type,
}

/// One registered variant of a tagged union.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantLayout {
    pub name: String,
    pub fields: Vec<FieldLayout>,
}

impl VariantLayout {
    /// A payload-free variant.
    pub fn unit(name: impl Into<String>) -> Self {
        VariantLayout {
            name: name.into(),
            fields: Vec::new(),
        }
    }
}

/// A registered tagged-union type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticType {
    /// Family base name (`Result`, `Option`, or the user enum's name).
    /// Determines the shared tag type: `<base>Tag`.
    pub base: String,
    /// Ordered variant layouts.
    pub variants: Vec<VariantLayout>,
    /// The original (pre-sanitization) parameter strings; the identity key.
    pub originals: Vec<String>,
}

impl SyntheticType {
    /// The family-shared tag type name.
    pub fn tag_type(&self) -> String {
        format!("{}Tag", self.base)
    }

    /// The field types of a variant, by variant name.
    pub fn variant_fields(&self, variant: &str) -> Option<&[FieldLayout]> {
        self.variants
            .iter()
            .find(|v| v.name == variant)
            .map(|v| v.fields.as_slice())
    }
}

/// Outcome of a registration attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The name was free; the type is now registered.
    Inserted,
    /// An identical registration already existed; no-op.
    Identical,
    /// Same canonical name, different originals. First registration kept.
    Collision,
}

/// Registry of synthetic tagged-union types for one compilation unit.
#[derive(Debug, Default)]
pub struct SyntheticTypeRegistry {
    inner: Mutex<FxHashMap<String, SyntheticType>>,
}

impl SyntheticTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tagged union under its canonical name.
    ///
    /// Identical re-registration is idempotent. A collision (same name,
    /// different originals) is logged at ERROR severity; the first
    /// registration wins and the caller should also record a diagnostic.
    pub fn register(
        &self,
        canonical: &str,
        base: &str,
        originals: Vec<String>,
        variants: Vec<VariantLayout>,
    ) -> RegisterOutcome {
        let mut guard = self.inner.lock();
        if let Some(existing) = guard.get(canonical) {
            if existing.originals == originals {
                return RegisterOutcome::Identical;
            }
            tracing::error!(
                canonical,
                first = ?existing.originals,
                second = ?originals,
                "synthetic type collision; keeping the first registration"
            );
            return RegisterOutcome::Collision;
        }
        guard.insert(
            canonical.to_string(),
            SyntheticType {
                base: base.to_string(),
                variants,
                originals,
            },
        );
        RegisterOutcome::Inserted
    }

    /// Look up a registered type by canonical name.
    ///
    /// Returns the registered layout and originals, or `None`; never a
    /// best-guess reconstruction from the sanitized name.
    pub fn lookup(&self, canonical: &str) -> Option<SyntheticType> {
        self.inner.lock().get(canonical).cloned()
    }

    /// The ordered variant names of a registered type.
    pub fn variant_names(&self, canonical: &str) -> Option<Vec<String>> {
        self.inner
            .lock()
            .get(canonical)
            .map(|t| t.variants.iter().map(|v| v.name.clone()).collect())
    }

    /// Whether a canonical name is registered.
    pub fn contains(&self, canonical: &str) -> bool {
        self.inner.lock().contains_key(canonical)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimKind;

    fn int_result_variants() -> Vec<VariantLayout> {
        vec![
            VariantLayout {
                name: "Ok".to_string(),
                fields: vec![FieldLayout {
                    name: "ok_0".to_string(),
                    ty: Type::Prim(PrimKind::Int),
                }],
            },
            VariantLayout {
                name: "Err".to_string(),
                fields: vec![FieldLayout {
                    name: "err_0".to_string(),
                    ty: Type::named("error"),
                }],
            },
        ]
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = SyntheticTypeRegistry::new();
        let outcome = registry.register(
            "Result_int_error",
            "Result",
            vec!["int".to_string(), "error".to_string()],
            int_result_variants(),
        );
        assert_eq!(outcome, RegisterOutcome::Inserted);

        let found = registry.lookup("Result_int_error");
        assert!(found.is_some());
        assert_eq!(
            registry.variant_names("Result_int_error"),
            Some(vec!["Ok".to_string(), "Err".to_string()])
        );
        assert!(registry.lookup("Result_int_int").is_none());
    }

    #[test]
    fn test_identical_reregistration_is_idempotent() {
        let registry = SyntheticTypeRegistry::new();
        registry.register(
            "Result_int_error",
            "Result",
            vec!["int".to_string(), "error".to_string()],
            int_result_variants(),
        );
        let outcome = registry.register(
            "Result_int_error",
            "Result",
            vec!["int".to_string(), "error".to_string()],
            int_result_variants(),
        );
        assert_eq!(outcome, RegisterOutcome::Identical);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_collision_keeps_first_winner() {
        let registry = SyntheticTypeRegistry::new();
        registry.register(
            "map_string_int",
            "Option",
            vec!["map[string]int".to_string()],
            vec![VariantLayout::unit("Some"), VariantLayout::unit("None")],
        );
        // Lossy sanitization: a literally-named `map_string_int` parameter
        // collides with the map type above.
        let outcome = registry.register(
            "map_string_int",
            "Option",
            vec!["map_string_int".to_string()],
            vec![VariantLayout::unit("Some"), VariantLayout::unit("None")],
        );
        assert_eq!(outcome, RegisterOutcome::Collision);

        let kept = registry.lookup("map_string_int");
        assert_eq!(
            kept.map(|t| t.originals),
            Some(vec!["map[string]int".to_string()])
        );
    }
}
