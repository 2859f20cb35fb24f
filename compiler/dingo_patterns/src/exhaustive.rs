//! Exhaustiveness checking.
//!
//! Coverage is computed over *covered variants*; the universe of possible
//! variants comes from (in priority order) the synthetic-type registry, the
//! well-known variant families (`Ok`/`Err` → Result, `Some`/`None` →
//! Option), or is unknown, in which case the check is skipped rather than
//! guessed. A wildcard arm always makes a match exhaustive. Guards are
//! ignored for coverage.
//!
//! Tuple matches cover the cartesian product of per-position variant
//! universes with the union of each arm's per-position sets; missing points
//! are enumerated for the diagnostic.

use rustc_hash::FxHashSet;

use dingo_types::SyntheticTypeRegistry;

use crate::parse::ParsedPattern;

/// The universe of variants a scrutinee may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariantUniverse {
    /// The ordered variant names.
    Known(Vec<String>),
    /// No source of truth; exhaustiveness is skipped.
    Unknown,
}

/// Resolve the variant universe for a match.
///
/// `type_name` is the scrutinee's canonical type name when inference
/// succeeded; `arm_variants` are the variant names occurring in the arms,
/// used for the family fallback.
pub fn resolve_universe(
    type_name: Option<&str>,
    arm_variants: &[&str],
    registry: &SyntheticTypeRegistry,
) -> VariantUniverse {
    if let Some(name) = type_name {
        if let Some(variants) = registry.variant_names(name) {
            return VariantUniverse::Known(variants);
        }
    }
    family_universe(arm_variants)
}

/// The family fallback: map arm variant names onto a known family.
fn family_universe(arm_variants: &[&str]) -> VariantUniverse {
    let result_family = arm_variants.iter().any(|v| *v == "Ok" || *v == "Err");
    let option_family = arm_variants.iter().any(|v| *v == "Some" || *v == "None");
    match (result_family, option_family) {
        (true, false) => VariantUniverse::Known(vec!["Ok".to_string(), "Err".to_string()]),
        (false, true) => VariantUniverse::Known(vec!["Some".to_string(), "None".to_string()]),
        // Mixed or absent family names: no safe universe.
        _ => VariantUniverse::Unknown,
    }
}

/// Outcome of an exhaustiveness check. An empty `missing` list is success.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExhaustivenessReport {
    pub missing: Vec<String>,
}

impl ExhaustivenessReport {
    /// Whether the match covers its whole universe.
    pub fn is_exhaustive(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check a single-scrutinee match.
///
/// Guards are ignored: a guarded arm counts as covering its variant.
pub fn check(patterns: &[&ParsedPattern], universe: &VariantUniverse) -> ExhaustivenessReport {
    if patterns.iter().any(|p| matches!(p, ParsedPattern::Wildcard)) {
        return ExhaustivenessReport::default();
    }

    let VariantUniverse::Known(universe) = universe else {
        // Unknown universe: skip rather than guess.
        return ExhaustivenessReport::default();
    };

    let covered: FxHashSet<&str> = patterns.iter().filter_map(|p| p.variant_name()).collect();

    ExhaustivenessReport {
        missing: universe
            .iter()
            .filter(|v| !covered.contains(v.as_str()))
            .cloned()
            .collect(),
    }
}

/// Check a tuple match.
///
/// `arms` holds each arm's per-position patterns; `universes` the variant
/// universe at each position. An unknown universe at any position skips the
/// check. Guards are ignored.
pub fn check_tuple(
    arms: &[Vec<ParsedPattern>],
    universes: &[VariantUniverse],
) -> ExhaustivenessReport {
    let mut known: Vec<&[String]> = Vec::with_capacity(universes.len());
    for universe in universes {
        match universe {
            VariantUniverse::Known(names) => known.push(names),
            VariantUniverse::Unknown => return ExhaustivenessReport::default(),
        }
    }

    // Covered points: union over arms of the cartesian product of each
    // position's set ({variant} for a named pattern, the whole universe for
    // a wildcard).
    let mut covered: FxHashSet<Vec<&str>> = FxHashSet::default();
    for arm in arms {
        if arm.len() != known.len() {
            continue; // arity mismatch; the caller already diagnosed it
        }
        let position_sets: Vec<Vec<&str>> = arm
            .iter()
            .enumerate()
            .map(|(i, pattern)| match pattern.variant_name() {
                Some(name) => vec![name],
                None => known[i].iter().map(String::as_str).collect(),
            })
            .collect();
        for point in cartesian(&position_sets) {
            covered.insert(point);
        }
    }

    let all_points: Vec<Vec<&str>> = {
        let sets: Vec<Vec<&str>> = known
            .iter()
            .map(|u| u.iter().map(String::as_str).collect())
            .collect();
        cartesian(&sets)
    };

    ExhaustivenessReport {
        missing: all_points
            .into_iter()
            .filter(|point| !covered.contains(point))
            .map(|point| format!("({})", point.join(", ")))
            .collect(),
    }
}

/// Cartesian product of position sets, in position-major order.
fn cartesian<'s>(sets: &[Vec<&'s str>]) -> Vec<Vec<&'s str>> {
    let mut points: Vec<Vec<&str>> = vec![Vec::new()];
    for set in sets {
        let mut next = Vec::with_capacity(points.len() * set.len());
        for point in &points {
            for &item in set {
                let mut extended = point.clone();
                extended.push(item);
                next.push(extended);
            }
        }
        points = next;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn variant(name: &str) -> ParsedPattern {
        ParsedPattern::Variant {
            name: name.to_string(),
            bindings: Vec::new(),
        }
    }

    #[test]
    fn test_wildcard_always_exhaustive() {
        let wild = ParsedPattern::Wildcard;
        let report = check(&[&wild], &VariantUniverse::Unknown);
        assert!(report.is_exhaustive());

        let universe = VariantUniverse::Known(vec!["Ok".to_string(), "Err".to_string()]);
        let report = check(&[&wild], &universe);
        assert!(report.is_exhaustive());
    }

    #[test]
    fn test_result_family_complete() {
        let ok = variant("Ok");
        let err = variant("Err");
        let universe = resolve_universe(None, &["Ok", "Err"], &SyntheticTypeRegistry::new());
        assert_eq!(
            universe,
            VariantUniverse::Known(vec!["Ok".to_string(), "Err".to_string()])
        );
        assert!(check(&[&ok, &err], &universe).is_exhaustive());
    }

    #[test]
    fn test_result_family_missing_err() {
        let ok = variant("Ok");
        let universe = resolve_universe(None, &["Ok"], &SyntheticTypeRegistry::new());
        let report = check(&[&ok], &universe);
        assert_eq!(report.missing, vec!["Err".to_string()]);
    }

    #[test]
    fn test_registry_universe() {
        use dingo_types::VariantLayout;

        let registry = SyntheticTypeRegistry::new();
        registry.register(
            "Status",
            "Status",
            vec![],
            vec![
                VariantLayout::unit("Pending"),
                VariantLayout::unit("Approved"),
                VariantLayout::unit("Rejected"),
            ],
        );

        let pending = variant("Pending");
        let universe = resolve_universe(Some("Status"), &["Pending"], &registry);
        let report = check(&[&pending], &universe);
        assert_eq!(
            report.missing,
            vec!["Approved".to_string(), "Rejected".to_string()]
        );
    }

    #[test]
    fn test_unknown_universe_skips() {
        let foo = variant("Whatever");
        let universe = resolve_universe(None, &["Whatever"], &SyntheticTypeRegistry::new());
        assert_eq!(universe, VariantUniverse::Unknown);
        assert!(check(&[&foo], &universe).is_exhaustive());
    }

    #[test]
    fn test_tuple_complete_by_wildcards() {
        let universes = vec![
            VariantUniverse::Known(vec!["Ok".to_string(), "Err".to_string()]),
            VariantUniverse::Known(vec!["Some".to_string(), "None".to_string()]),
        ];
        let arms = vec![vec![ParsedPattern::Wildcard, ParsedPattern::Wildcard]];
        assert!(check_tuple(&arms, &universes).is_exhaustive());
    }

    #[test]
    fn test_tuple_missing_points_enumerated() {
        let universes = vec![
            VariantUniverse::Known(vec!["Ok".to_string(), "Err".to_string()]),
            VariantUniverse::Known(vec!["Some".to_string(), "None".to_string()]),
        ];
        // (Ok, *) and (Err, Some): missing (Err, None).
        let arms = vec![
            vec![variant("Ok"), ParsedPattern::Wildcard],
            vec![variant("Err"), variant("Some")],
        ];
        let report = check_tuple(&arms, &universes);
        assert_eq!(report.missing, vec!["(Err, None)".to_string()]);
    }
}
