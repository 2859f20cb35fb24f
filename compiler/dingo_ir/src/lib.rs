//! Dingo IR: syntax tree types for the transformation engine.
//!
//! This crate contains the core data structures shared by every transform
//! plugin:
//! - Spans for source locations
//! - Interned names
//! - Syntax node kinds (standard constructs plus the extended kinds the
//!   upstream parser introduces)
//! - Arena allocation with typed u32 ids
//! - The child-to-parent side map
//! - A builder for generated syntax
//!
//! # Design
//!
//! - **Intern identifiers**: strings → `Name(u32)`
//! - **Flatten nodes**: no `Box<Expr>`, node-to-node edges are arena ids
//! - **Parents are post-hoc**: a side map keyed by node id, so the tree has
//!   no ownership cycles

pub mod ast;
mod arena;
mod builder;
mod ids;
mod interner;
mod name;
pub mod node;
mod parent;
mod span;

pub use arena::SyntaxArena;
pub use builder::AstBuilder;
pub use ids::{BlockId, DeclId, ExprId, PatternId, StmtId, TypeExprId};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use node::{for_each_child, subtree_contains, walk_file, walk_subtree, NodeRef};
pub use parent::ParentMap;
pub use span::Span;
