//! Engine configuration.
//!
//! Every setting has a recognized effect; none of them change which
//! constructs are discovered, only how they lower.

use serde::{Deserialize, Serialize};

/// How safe-navigation chains surface their result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeNavigationUnwrap {
    /// Chains unwrap to the naked element type with a zero-value fallback.
    Smart,
    /// Chains always yield an Option.
    AlwaysOption,
}

/// Reserved; recognized by the parser only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorPrecedence {
    Standard,
    Explicit,
}

/// Runtime null checks during pattern destructuring.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NilSafety {
    /// No checks.
    Off,
    /// Check-and-panic on every pointer field read.
    On,
    /// Checks gated on a process-wide flag read from `DINGO_DEBUG`.
    Debug,
}

/// Return typing for the helper methods that would need generics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperGenerics {
    /// `Map`-family helpers take `func(T) interface{}` and return unions
    /// with `interface{}` slots (`Result_any_*`, `Option_any`).
    Placeholder,
    /// `Map`-family helpers are type-preserving (`func(T) T`) and return
    /// the original union type.
    Parameterized,
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enable `??` lowering for pointer-typed left-hand sides.
    pub null_coalescing_pointers: bool,
    /// Result shape of safe-navigation chains.
    pub safe_navigation_unwrap: SafeNavigationUnwrap,
    /// Reserved; currently parser-only.
    pub operator_precedence: OperatorPrecedence,
    /// Destructuring null-check policy.
    pub nil_safety: NilSafety,
    /// Helper-method return typing (see `HelperGenerics`).
    pub helper_generics: HelperGenerics,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            null_coalescing_pointers: true,
            safe_navigation_unwrap: SafeNavigationUnwrap::AlwaysOption,
            operator_precedence: OperatorPrecedence::Standard,
            nil_safety: NilSafety::Off,
            helper_generics: HelperGenerics::Placeholder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.null_coalescing_pointers);
        assert_eq!(
            config.safe_navigation_unwrap,
            SafeNavigationUnwrap::AlwaysOption
        );
        assert_eq!(config.nil_safety, NilSafety::Off);
        assert_eq!(config.helper_generics, HelperGenerics::Placeholder);
    }

    #[test]
    fn test_override_one_field() {
        let config = Config {
            nil_safety: NilSafety::Debug,
            ..Config::default()
        };
        assert_eq!(config.nil_safety, NilSafety::Debug);
        assert_eq!(config.helper_generics, HelperGenerics::Placeholder);
    }
}
