//! The transform plugins, in pipeline order.

mod cleanup;
mod coalesce;
mod errorprop;
mod helpers;
mod matchlower;
mod safenav;
mod sumtype;
mod unions;

pub use cleanup::CleanupPlugin;
pub use coalesce::{NullCoalescePlugin, TernaryPlugin};
pub use errorprop::ErrorPropPlugin;
pub use matchlower::MatchPlugin;
pub use safenav::SafeNavPlugin;
pub use sumtype::SumTypePlugin;
