//! Pattern-match analysis for the Dingo transformation engine.
//!
//! Marker scanning and association are the legacy path for trees whose
//! parser communicated match structure through comments; the transform
//! layer's typed `Match` nodes share the same pattern and exhaustiveness
//! machinery.

mod associate;
mod exhaustive;
mod marker;
mod parse;

pub use associate::{
    collect_sites, MarkerArm, MatchSite, TupleArm, TupleSite, ASSOCIATION_THRESHOLD,
};
pub use exhaustive::{
    check, check_tuple, resolve_universe, ExhaustivenessReport, VariantUniverse,
};
pub use marker::{scan_markers, Marker, MarkerKind};
pub use parse::{parse_arity, parse_pattern, parse_tuple_arm, ParsedPattern};
