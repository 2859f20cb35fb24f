//! Diagnostic system for the Dingo transformation engine.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Context labels and notes (why it's wrong)
//! - Suggestions (how to fix)
//!
//! Diagnostics are collected per file in a [`Sink`] and never abort the run
//! on their own; only `Internal` conditions abort a file, and those travel
//! as `Result` errors in the transform crate.

pub mod diagnostic;
mod error_code;
mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use sink::Sink;
