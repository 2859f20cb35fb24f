//! The per-file pipeline driver.
//!
//! Per file: reset plugins, build the parent map, run Discover on every
//! plugin, run Transform in the fixed dependency order, then harvest each
//! plugin's pending declarations and append them to the file, emission
//! order preserved, duplicates dropped on canonical name.
//!
//! The driver holds no per-file state of its own; callers may run one
//! driver per file in parallel threads as long as they share the registry
//! (which is mutex-guarded) and the interner.

use rustc_hash::FxHashSet;

use dingo_diagnostic::Diagnostic;
use dingo_ir::ast::SourceFile;
use dingo_ir::{SharedInterner, SyntaxArena};
use dingo_types::{SyntheticTypeRegistry, TypeInfo};

use crate::config::Config;
use crate::plugin::Plugin;
use crate::plugins::{
    CleanupPlugin, ErrorPropPlugin, MatchPlugin, NullCoalescePlugin, SafeNavPlugin,
    SumTypePlugin, TernaryPlugin,
};
use crate::{Context, EngineError};

/// Result of running the pipeline over one file.
#[derive(Debug)]
pub struct RunOutcome {
    /// Every diagnostic recorded during the run, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl RunOutcome {
    /// Whether the rewritten file is safe to consume.
    ///
    /// Any recorded diagnostic, error or warning, marks the output as
    /// suspect; the caller decides whether to continue.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// The transformation driver.
pub struct Driver<'a> {
    registry: &'a SyntheticTypeRegistry,
    config: Config,
    plugins: Vec<Box<dyn Plugin>>,
}

impl<'a> Driver<'a> {
    /// Create a driver with the standard plugin pipeline:
    /// sum types → pattern match → error propagation → safe navigation →
    /// null coalesce → ternary → unused-var cleanup.
    pub fn new(registry: &'a SyntheticTypeRegistry, config: Config) -> Self {
        Driver {
            registry,
            config,
            plugins: vec![
                Box::new(SumTypePlugin::new()),
                Box::new(MatchPlugin::new()),
                Box::new(ErrorPropPlugin::new()),
                Box::new(SafeNavPlugin::new()),
                Box::new(NullCoalescePlugin::new()),
                Box::new(TernaryPlugin::new()),
                Box::new(CleanupPlugin::new()),
            ],
        }
    }

    /// Run the pipeline over one file.
    ///
    /// Returns the rewritten arena and file plus the run outcome. `Err`
    /// means an Internal condition aborted the file; the inputs are
    /// consumed either way.
    pub fn run_file(
        &mut self,
        arena: SyntaxArena,
        file: SourceFile,
        interner: SharedInterner,
        type_info: Option<&dyn TypeInfo>,
    ) -> Result<(SyntaxArena, SourceFile, RunOutcome), EngineError> {
        let mut cx = Context::new(
            arena,
            file,
            interner,
            type_info,
            self.registry,
            self.config.clone(),
        );

        for plugin in &mut self.plugins {
            plugin.reset();
        }
        cx.build_parent_map();

        for plugin in &mut self.plugins {
            tracing::debug!(plugin = plugin.name(), "discover");
            plugin.discover(&cx);
        }
        for plugin in &mut self.plugins {
            tracing::debug!(plugin = plugin.name(), "transform");
            plugin.transform(&mut cx)?;
        }

        // Inject phase: append pending declarations in plugin order,
        // deduplicating on canonical name across plugins.
        let mut seen: FxHashSet<String> = FxHashSet::default();
        for plugin in &mut self.plugins {
            for pending in plugin.pending_decls() {
                if seen.insert(pending.canonical.clone()) {
                    cx.file.decls.push(pending.decl);
                } else {
                    tracing::debug!(
                        canonical = %pending.canonical,
                        "dropping duplicate injected declaration"
                    );
                }
            }
        }

        cx.flush_sink();
        let diagnostics = cx.drain_sink();
        let Context { arena, file, .. } = cx;
        Ok((arena, file, RunOutcome { diagnostics }))
    }
}
