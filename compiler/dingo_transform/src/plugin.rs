//! The plugin capability interface.
//!
//! Each transformation conforms to a three-phase lifecycle:
//!
//! - **Discover**: read-only walk; populate private per-file state.
//! - **Transform**: rewrite the tree in place.
//! - **Inject**: surrender pending top-level declarations to the driver,
//!   which appends them in emission order and deduplicates on canonical
//!   name.
//!
//! Plugins hold no cross-file state; the driver calls [`Plugin::reset`]
//! before each file.

use dingo_ir::DeclId;

use crate::{Context, EngineError};

/// A generated top-level declaration awaiting injection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDecl {
    pub decl: DeclId,
    /// Deduplication key: the declared name, or a stable derived key for
    /// declaration groups (`ResultTag#consts`, `Option_int.IsSome`).
    pub canonical: String,
}

impl PendingDecl {
    /// Create a pending declaration.
    pub fn new(decl: DeclId, canonical: impl Into<String>) -> Self {
        PendingDecl {
            decl,
            canonical: canonical.into(),
        }
    }
}

/// One transformation in the pipeline.
pub trait Plugin {
    /// Stable plugin name, used in logs and internal errors.
    fn name(&self) -> &'static str;

    /// Read-only discovery pass. Default: nothing to discover.
    fn discover(&mut self, cx: &Context<'_>) {
        let _ = cx;
    }

    /// Rewrite the tree. `Err` aborts the file (Internal conditions only).
    fn transform(&mut self, cx: &mut Context<'_>) -> Result<(), EngineError>;

    /// Surrender pending declarations, in emission order. Default: none.
    fn pending_decls(&mut self) -> Vec<PendingDecl> {
        Vec::new()
    }

    /// Clear per-file state. Default: stateless.
    fn reset(&mut self) {}
}
