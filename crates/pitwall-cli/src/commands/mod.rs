//! CLI subcommand implementations.

pub mod analyze;
pub mod drivers;
pub mod sessions;
