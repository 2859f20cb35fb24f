//! Dingo transformation engine: the multi-plugin rewrite pipeline.
//!
//! The engine consumes a per-file syntax tree enriched with extended node
//! kinds (enums, matches, error propagation, safe navigation, null
//! coalescing, ternary) and rewrites it in place into plain target-language
//! constructs, injecting the generated tagged-union declarations at the end
//! of the file.
//!
//! # Pipeline
//!
//! ```text
//! parent map → Discover (all plugins) →
//!   sum types → pattern match → error propagation → safe navigation →
//!   null coalesce → ternary → unused-var cleanup →
//! inject pending declarations (dedup on canonical name)
//! ```
//!
//! Each file gets its own [`Context`]; the only state shared between files
//! is the synthetic-type registry (mutex-guarded) and the interner. A
//! caller may therefore drive files in parallel with one driver per file.

mod addressable;
mod config;
mod context;
mod driver;
mod emit;
mod plugin;
pub mod plugins;
mod shape;

pub use addressable::{addressable_ref, is_addressable};
pub use config::{
    Config, HelperGenerics, NilSafety, OperatorPrecedence, SafeNavigationUnwrap,
};
pub use context::Context;
pub use driver::{Driver, RunOutcome};
pub use plugin::{PendingDecl, Plugin};

/// Internal conditions that abort a file.
///
/// Everything else (inference failures, non-exhaustive matches, registry
/// collisions, dropped markers) flows through the diagnostic sink and the
/// run continues.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A node required a parent pointer that was never recorded.
    #[error("parent pointer missing during `{plugin}`")]
    MissingParent { plugin: &'static str },
    /// Any other broken engine invariant.
    #[error("internal error in `{plugin}`: {detail}")]
    Internal {
        plugin: &'static str,
        detail: String,
    },
}
