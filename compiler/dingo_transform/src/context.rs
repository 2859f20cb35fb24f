//! Per-file transformation state.
//!
//! One [`Context`] is created by the driver before the first plugin touches
//! a file and dropped after the last one finishes. It owns the arena, the
//! file, the diagnostic sink, the parent map, and the temp-variable counter;
//! it borrows the type-info handle and the compilation unit's registry.
//! Plugins must not cache cross-file state of their own.

use dingo_diagnostic::{Diagnostic, Sink};
use dingo_ir::ast::{SourceFile, StmtKind};
use dingo_ir::{
    AstBuilder, Name, NodeRef, ParentMap, SharedInterner, Span, StmtId, SyntaxArena,
};
use dingo_types::{SyntheticTypeRegistry, TypeInfo, TypeResolver};

use crate::config::Config;
use crate::EngineError;

/// Per-file transformation state.
pub struct Context<'a> {
    pub arena: SyntaxArena,
    pub file: SourceFile,
    pub config: Config,
    interner: SharedInterner,
    sink: Sink,
    parents: ParentMap,
    temp_counter: u32,
    type_info: Option<&'a dyn TypeInfo>,
    registry: &'a SyntheticTypeRegistry,
}

impl<'a> Context<'a> {
    /// Create the per-file context.
    pub fn new(
        arena: SyntaxArena,
        file: SourceFile,
        interner: SharedInterner,
        type_info: Option<&'a dyn TypeInfo>,
        registry: &'a SyntheticTypeRegistry,
        config: Config,
    ) -> Self {
        Context {
            arena,
            file,
            config,
            interner,
            sink: Sink::new(),
            parents: ParentMap::new(),
            temp_counter: 0,
            type_info,
            registry,
        }
    }

    /// Build the parent map. Called exactly once per file, by the driver.
    pub fn build_parent_map(&mut self) {
        self.parents.build(&self.arena, &self.file);
    }

    /// O(1) parent lookup.
    #[inline]
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.parents.parent(node)
    }

    /// Invoke `f` on each ancestor, nearest first, until it returns `false`.
    pub fn walk_parents(&self, node: NodeRef, f: impl FnMut(NodeRef) -> bool) {
        self.parents.walk_parents(node, f);
    }

    /// Re-index parent edges under a rewritten or spliced subtree.
    pub fn record_subtree(&mut self, root: NodeRef) {
        self.parents.record_subtree(&self.arena, root);
    }

    /// Record a single parent edge for a spliced node.
    pub fn set_parent(&mut self, child: NodeRef, parent: NodeRef) {
        self.parents.set_parent(child, parent);
    }

    /// Allocate the next `__tmpN` name. Unique within the file.
    pub fn next_temp_var(&mut self) -> Name {
        let n = self.temp_counter;
        self.temp_counter += 1;
        self.interner.intern(&format!("__tmp{n}"))
    }

    /// Allocate a paired `(__tmpN, __errN)` from one counter draw, so the
    /// lifted value and error share their index.
    pub fn next_temp_pair(&mut self) -> (Name, Name) {
        let n = self.temp_counter;
        self.temp_counter += 1;
        (
            self.interner.intern(&format!("__tmp{n}")),
            self.interner.intern(&format!("__err{n}")),
        )
    }

    /// Record a diagnostic. Never fails; the caller continues.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }

    /// Read-only view of the sink.
    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Take the sink's contents (driver only).
    pub(crate) fn drain_sink(&mut self) -> Vec<Diagnostic> {
        self.sink.drain()
    }

    /// Flush the sink to the logging facade (driver only).
    pub(crate) fn flush_sink(&self) {
        self.sink.flush_to_log();
    }

    /// The interner handle.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Look up interned text.
    #[inline]
    pub fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Intern text.
    #[inline]
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// The optional type-info handle.
    pub fn type_info(&self) -> Option<&'a dyn TypeInfo> {
        self.type_info
    }

    /// The compilation unit's synthetic-type registry.
    pub fn registry(&self) -> &'a SyntheticTypeRegistry {
        self.registry
    }

    /// A type resolver over the current arena.
    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.arena, &self.interner, self.type_info)
    }

    /// A builder over the current arena, pinned to `span`.
    ///
    /// The borrow is exclusive; finish building before querying the context.
    pub fn builder(&mut self, span: Span) -> AstBuilder<'_> {
        AstBuilder::new(&mut self.arena, &self.interner, span)
    }

    /// Insert statements immediately before `anchor` at the enclosing
    /// statement level, walking out of `if`/`else` chains to the nearest
    /// block or case body.
    ///
    /// Parent edges for the inserted statements are recorded.
    pub fn insert_before(
        &mut self,
        anchor: StmtId,
        new_stmts: &[StmtId],
    ) -> Result<(), EngineError> {
        let mut target = anchor;
        loop {
            let parent = self.parents.parent(NodeRef::Stmt(target)).ok_or(
                EngineError::MissingParent {
                    plugin: "statement insertion",
                },
            )?;
            match parent {
                NodeRef::Block(block) => {
                    let stmts = &mut self.arena.block_mut(block).stmts;
                    let Some(pos) = stmts.iter().position(|&s| s == target) else {
                        return Err(EngineError::Internal {
                            plugin: "statement insertion",
                            detail: "anchor not found in its parent block".to_string(),
                        });
                    };
                    for (i, &stmt) in new_stmts.iter().enumerate() {
                        stmts.insert(pos + i, stmt);
                    }
                    for &stmt in new_stmts {
                        self.parents.set_parent(NodeRef::Stmt(stmt), parent);
                        self.record_subtree(NodeRef::Stmt(stmt));
                    }
                    return Ok(());
                }
                NodeRef::Stmt(outer) => {
                    let mut inserted = false;
                    if let StmtKind::Switch { cases, .. } = &mut self.arena.stmt_mut(outer).kind {
                        for case in cases.iter_mut() {
                            if let Some(pos) = case.body.iter().position(|&s| s == target) {
                                for (i, &stmt) in new_stmts.iter().enumerate() {
                                    case.body.insert(pos + i, stmt);
                                }
                                inserted = true;
                                break;
                            }
                        }
                    }
                    if inserted {
                        for &stmt in new_stmts {
                            self.parents.set_parent(NodeRef::Stmt(stmt), parent);
                            self.record_subtree(NodeRef::Stmt(stmt));
                        }
                        return Ok(());
                    }
                    // An `else if` arm or similar: hoist to the outer statement.
                    target = outer;
                }
                _ => {
                    return Err(EngineError::Internal {
                        plugin: "statement insertion",
                        detail: "statement parented by a non-statement node".to_string(),
                    })
                }
            }
        }
    }
}
