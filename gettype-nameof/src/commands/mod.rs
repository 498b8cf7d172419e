//! Commands module - CLI subcommand implementations.

mod fix;
mod rules;

pub use fix::{run_fix_nameof, FixResult, NameofFixOptions};
pub use rules::run_rules;
